//! Bridge lookup through the vendor discovery service.

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Error;
use crate::transport::{ApiRequest, HttpTransport, Method, Transport};

type Result<T> = std::result::Result<T, Error>;

/// Vendor endpoint listing the bridges registered from this public address.
pub const DISCOVERY_URL: &str = "https://discovery.meethue.com/";

/// A bridge reported by the discovery service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveredBridge {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "internalipaddress")]
    pub internal_ip: String,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Ask the vendor discovery service for bridges on the local network.
///
/// This is a single HTTPS call with the default 10 second timeout; no local
/// network scanning is done.
///
/// # Examples
///
/// ```ignore
/// use hue_bridge_rs::discover_bridges;
///
/// for bridge in discover_bridges().await? {
///     println!("{} at {}", bridge.id, bridge.internal_ip);
/// }
/// ```
pub async fn discover_bridges() -> Result<Vec<DiscoveredBridge>> {
    discover_bridges_at(DISCOVERY_URL).await
}

/// Same as [`discover_bridges`] against another endpoint.
pub async fn discover_bridges_at(url: &str) -> Result<Vec<DiscoveredBridge>> {
    discover_bridges_with(&HttpTransport::new(), url).await
}

/// Query a discovery endpoint through the given transport.
pub async fn discover_bridges_with(
    transport: &dyn Transport,
    url: &str,
) -> Result<Vec<DiscoveredBridge>> {
    info!("Connecting to {}", url);
    let value = transport
        .send(&ApiRequest::absolute(Method::Get, url))
        .await?;
    parse_bridges(url, value)
}

pub(crate) fn parse_bridges(address: &str, value: Value) -> Result<Vec<DiscoveredBridge>> {
    if !value.is_array() {
        return Err(Error::unexpected(address, "expected a list of bridges"));
    }
    serde_json::from_value(value).map_err(Error::JsonLoad)
}

/// Address of the first discovered bridge, `None` when it is blank.
pub(crate) fn first_address(bridges: &[DiscoveredBridge]) -> Result<Option<String>> {
    let first = bridges.first().ok_or(Error::BridgeNotFound)?;
    if first.internal_ip.is_empty() {
        Ok(None)
    } else {
        Ok(Some(first.internal_ip.clone()))
    }
}
