//! Connection to a Hue bridge.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{error, info};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::CredentialFile;
use crate::discovery::{self, DISCOVERY_URL};
use crate::errors::Error;
use crate::group::Groups;
use crate::light::Lights;
use crate::registry::{Registry, SharedRegistry};
use crate::response::{self, ApiResponse};
use crate::scene::Scenes;
use crate::schedule::Schedules;
use crate::sensor::Sensors;
use crate::transport::{ApiRequest, HttpTransport, Method, Transport};

type Result<T> = std::result::Result<T, Error>;

/// An HTTP session with one bridge: its address, the registration token
/// ("username") and the name/id caches of its lights and sensors.
///
/// Cloning is cheap; clones share the transport and the caches.
///
/// # Example
///
/// ```ignore
/// use hue_bridge_rs::Bridge;
///
/// // Reads `.hue_bridge` in the working directory, registering if needed.
/// let bridge = Bridge::builder().ip("192.168.1.2").connect().await?;
/// println!("{}", bridge.name().await?);
///
/// let mut kitchen = bridge.lights().get("Kitchen").await?;
/// kitchen.set_on(true).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Bridge {
    ip: Option<String>,
    username: Option<String>,
    credentials: CredentialFile,
    devicetype: String,
    discovery_url: String,
    transport: Arc<dyn Transport>,
    lights: SharedRegistry,
    sensors: SharedRegistry,
}

impl Bridge {
    pub const DEFAULT_DEVICETYPE: &'static str = "hue_bridge_rs";

    /// A bridge with a known address and username. No request is made.
    pub fn new(ip: &str, username: &str) -> Self {
        Bridge::builder().ip(ip).username(username).build()
    }

    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::default()
    }

    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn credential_file(&self) -> &CredentialFile {
        &self.credentials
    }

    /// `/api/<username>`, the prefix of every resource path.
    pub fn api_prefix(&self) -> Result<String> {
        let username = self.username.as_deref().ok_or(Error::NotRegistered)?;
        Ok(format!("/api/{}", username))
    }

    fn host(&self) -> Result<&str> {
        self.ip.as_deref().ok_or(Error::NoBridgeAddress)
    }

    /// Make sure both address and username are known.
    ///
    /// Missing values are read from the credential file. When that fails the
    /// bridge is registered with [`Bridge::register_app`], which requires the
    /// link button to have been pressed.
    pub async fn connect(&mut self) -> Result<()> {
        info!("Attempting to connect to the bridge...");
        if let (Some(ip), Some(username)) = (&self.ip, &self.username) {
            info!("Using ip: {}", ip);
            info!("Using username: {}", username);
            return Ok(());
        }

        match self.load_credentials().await {
            Ok(()) => Ok(()),
            Err(e) => {
                info!(
                    "Error opening config file ({}), will attempt bridge registration",
                    e
                );
                if self.ip.is_none() && self.get_ip_address(true).await?.is_none() {
                    return Err(Error::NoBridgeAddress);
                }
                self.register_app().await
            }
        }
    }

    async fn load_credentials(&mut self) -> Result<()> {
        let stored = self
            .credentials
            .resolve(self.ip.as_deref(), self.username.as_deref())
            .await?;
        self.ip = Some(stored.ip);
        self.username = Some(stored.username);
        Ok(())
    }

    /// Pair with the bridge and store the resulting token.
    ///
    /// The bridge link button must have been pressed within the last 30 seconds.
    pub async fn register_app(&mut self) -> Result<()> {
        let ip = self.host()?.to_string();
        let body = json!({ "devicetype": self.devicetype });
        let reply = self.request(Method::Post, "/api", Some(&body)).await?;

        for entry in response::parse_replies("/api", reply)? {
            match entry {
                ApiResponse::Success(credentials) => {
                    self.credentials.save(&ip, &credentials).await?;
                    info!("Reconnecting to the bridge");
                    self.username = None;
                    return self.load_credentials().await;
                }
                ApiResponse::Error(err) => return Err(Error::from_registration(err)),
            }
        }

        Err(Error::unexpected("/api", "empty registration reply"))
    }

    /// Look up the bridge address through the vendor discovery service,
    /// using this bridge's transport.
    ///
    /// Returns `None` if the service reports a blank address. With
    /// `set_result` the address is adopted by this bridge.
    pub async fn get_ip_address(&mut self, set_result: bool) -> Result<Option<String>> {
        let bridges =
            discovery::discover_bridges_with(self.transport.as_ref(), &self.discovery_url).await?;
        let ip = discovery::first_address(&bridges)?;
        if set_result && let Some(ip) = &ip {
            self.ip = Some(ip.clone());
        }
        Ok(ip)
    }

    /// Send a request to an absolute address.
    pub async fn request(&self, method: Method, address: &str, data: Option<&Value>) -> Result<Value> {
        let request = ApiRequest::new(method, self.host()?, address, data.cloned());
        self.transport.send(&request).await
    }

    /// GET a path below `/api/<username>`.
    pub async fn get(&self, req: &str) -> Result<Value> {
        let address = format!("{}{}", self.api_prefix()?, req);
        self.request(Method::Get, &address, None).await
    }

    pub async fn put(&self, req: &str, data: &Value) -> Result<Value> {
        let address = format!("{}{}", self.api_prefix()?, req);
        self.request(Method::Put, &address, Some(data)).await
    }

    pub async fn post(&self, req: &str, data: &Value) -> Result<Value> {
        let address = format!("{}{}", self.api_prefix()?, req);
        self.request(Method::Post, &address, Some(data)).await
    }

    pub async fn delete(&self, req: &str) -> Result<Value> {
        let address = format!("{}{}", self.api_prefix()?, req);
        self.request(Method::Delete, &address, None).await
    }

    /// GET a single resource, turning an error reply into [`Error::Api`].
    pub(crate) async fn get_resource(&self, req: &str) -> Result<Value> {
        let value = self.get(req).await?;
        response::resource_or_error(req, value)
    }

    pub(crate) async fn get_as<T: DeserializeOwned>(&self, req: &str) -> Result<T> {
        let value = self.get_resource(req).await?;
        serde_json::from_value(value).map_err(Error::JsonLoad)
    }

    pub(crate) async fn put_replies(&self, req: &str, data: &Value) -> Result<Vec<ApiResponse>> {
        let reply = self.put(req, data).await?;
        response::parse_replies(req, reply)
    }

    pub(crate) async fn post_replies(&self, req: &str, data: &Value) -> Result<Vec<ApiResponse>> {
        let reply = self.post(req, data).await?;
        response::parse_replies(req, reply)
    }

    pub(crate) async fn delete_replies(&self, req: &str) -> Result<Vec<ApiResponse>> {
        let reply = self.delete(req).await?;
        response::parse_replies(req, reply)
    }

    /// The bridge configuration object.
    pub async fn config(&self) -> Result<Value> {
        self.get_resource("/config").await
    }

    pub async fn name(&self) -> Result<String> {
        let config = self.config().await?;
        config
            .get("name")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| Error::unexpected("/config", "missing name"))
    }

    pub async fn set_name(&self, name: &str) -> Result<Vec<ApiResponse>> {
        self.put_replies("/config", &json!({ "name": name })).await
    }

    /// The full state dictionary of the bridge.
    pub async fn get_api(&self) -> Result<Value> {
        self.get_resource("").await
    }

    pub fn lights(&self) -> Lights {
        Lights::new(self.clone(), Arc::clone(&self.lights))
    }

    pub fn groups(&self) -> Groups {
        Groups::new(self.clone())
    }

    pub fn sensors(&self) -> Sensors {
        Sensors::new(self.clone(), Arc::clone(&self.sensors))
    }

    pub fn scenes(&self) -> Scenes {
        Scenes::new(self.clone())
    }

    pub fn schedules(&self) -> Schedules {
        Schedules::new(self.clone())
    }

    pub(crate) fn light_registry(&self) -> SharedRegistry {
        Arc::clone(&self.lights)
    }
}

/// Collects the settings of a [`Bridge`].
#[derive(Debug, Default)]
pub struct BridgeBuilder {
    ip: Option<String>,
    username: Option<String>,
    config_file: Option<PathBuf>,
    devicetype: Option<String>,
    discovery_url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl BridgeBuilder {
    /// Address of the bridge as a dotted quad (optionally with `:port`).
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Where the registration token is stored; defaults to `.hue_bridge` in
    /// the current directory.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Device type sent when registering.
    pub fn devicetype(mut self, devicetype: impl Into<String>) -> Self {
        self.devicetype = Some(devicetype.into());
        self
    }

    pub fn discovery_url(mut self, url: impl Into<String>) -> Self {
        self.discovery_url = Some(url.into());
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build without contacting the bridge or reading the credential file.
    pub fn build(self) -> Bridge {
        Bridge {
            ip: self.ip,
            username: self.username,
            credentials: self
                .config_file
                .map(CredentialFile::new)
                .unwrap_or_default(),
            devicetype: self
                .devicetype
                .unwrap_or_else(|| Bridge::DEFAULT_DEVICETYPE.to_string()),
            discovery_url: self
                .discovery_url
                .unwrap_or_else(|| DISCOVERY_URL.to_string()),
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(HttpTransport::new())),
            lights: Arc::new(Mutex::new(Registry::new())),
            sensors: Arc::new(Mutex::new(Registry::new())),
        }
    }

    /// Build and [`connect`](Bridge::connect).
    pub async fn connect(self) -> Result<Bridge> {
        let mut bridge = self.build();
        if let Err(e) = bridge.connect().await {
            error!("Could not connect to the bridge: {}", e);
            return Err(e);
        }
        Ok(bridge)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{self, path};
    use super::*;
    use crate::transport::mock::MockTransport;

    #[test]
    fn test_api_prefix() {
        let bridge = Bridge::new("10.0.0.2", "abc");
        assert_eq!(bridge.api_prefix().unwrap(), "/api/abc");

        let unregistered = Bridge::builder().ip("10.0.0.2").build();
        assert_eq!(unregistered.api_prefix().unwrap_err(), Error::NotRegistered);
    }

    #[tokio::test]
    async fn test_name() {
        let mock = Arc::new(
            MockTransport::new().route(Method::Get, &path("/config"), json!({"name": "Philips hue"})),
        );
        let bridge = testing::bridge(&mock);
        assert_eq!(bridge.name().await.unwrap(), "Philips hue");

        bridge.set_name("Upstairs").await.unwrap();
        let writes = mock.writes();
        assert_eq!(writes[0].method, Method::Put);
        assert_eq!(writes[0].address, "/api/user/config");
        assert_eq!(writes[0].body, Some(json!({"name": "Upstairs"})));
    }

    #[tokio::test]
    async fn test_get_api_uses_prefix() {
        let mock = Arc::new(
            MockTransport::new().route(Method::Get, "/api/user", json!({"lights": {}})),
        );
        let bridge = testing::bridge(&mock);
        let api = bridge.get_api().await.unwrap();
        assert!(api.get("lights").is_some());
        assert_eq!(mock.requests()[0].host, "10.0.0.2");
    }

    #[tokio::test]
    async fn test_connect_with_known_credentials_makes_no_request() {
        let mock = Arc::new(MockTransport::new());
        let mut bridge = testing::bridge(&mock);
        bridge.connect().await.unwrap();
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_connect_reads_credential_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("creds");
        tokio::fs::write(&file, r#"{"10.0.0.9": {"username": "stored"}}"#)
            .await
            .unwrap();

        let mock = Arc::new(MockTransport::new());
        let bridge = Bridge::builder()
            .config_file(&file)
            .transport(mock.clone())
            .connect()
            .await
            .unwrap();

        assert_eq!(bridge.ip(), Some("10.0.0.9"));
        assert_eq!(bridge.username(), Some("stored"));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_connect_registers_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("creds");
        let mock = Arc::new(MockTransport::new().route(
            Method::Post,
            "/api",
            json!([{"success": {"username": "fresh"}}]),
        ));

        let bridge = Bridge::builder()
            .ip("10.0.0.2")
            .config_file(&file)
            .devicetype("test#rig")
            .transport(mock.clone())
            .connect()
            .await
            .unwrap();

        assert_eq!(bridge.username(), Some("fresh"));
        let requests = mock.requests();
        assert_eq!(requests[0].body, Some(json!({"devicetype": "test#rig"})));

        let saved: Value =
            serde_json::from_str(&tokio::fs::read_to_string(&file).await.unwrap()).unwrap();
        assert_eq!(saved, json!({"10.0.0.2": {"username": "fresh"}}));
    }

    const DISCOVERY: &str = "https://discovery.test/";

    fn discovery_reply(ip: &str) -> Value {
        json!([{"id": "001788fffe100491", "internalipaddress": ip}])
    }

    #[tokio::test]
    async fn test_connect_discovers_address_then_registers() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("creds");
        let mock = Arc::new(
            MockTransport::new()
                .route(Method::Get, DISCOVERY, discovery_reply("10.0.0.7"))
                .route(Method::Post, "/api", json!([{"success": {"username": "fresh"}}])),
        );

        let bridge = Bridge::builder()
            .config_file(&file)
            .discovery_url(DISCOVERY)
            .transport(mock.clone())
            .connect()
            .await
            .unwrap();

        assert_eq!(bridge.ip(), Some("10.0.0.7"));
        assert_eq!(bridge.username(), Some("fresh"));

        let requests = mock.requests();
        assert_eq!(requests[0].url(), DISCOVERY);
        assert_eq!(requests[1].method, Method::Post);
        assert_eq!(requests[1].host, "10.0.0.7");

        let saved: Value =
            serde_json::from_str(&tokio::fs::read_to_string(&file).await.unwrap()).unwrap();
        assert_eq!(saved, json!({"10.0.0.7": {"username": "fresh"}}));
    }

    #[tokio::test]
    async fn test_get_ip_address_adopts_result() {
        let mock = Arc::new(MockTransport::new().route(
            Method::Get,
            DISCOVERY,
            discovery_reply("10.0.0.7"),
        ));
        let mut bridge = Bridge::builder()
            .discovery_url(DISCOVERY)
            .transport(mock.clone())
            .build();

        assert_eq!(
            bridge.get_ip_address(false).await.unwrap(),
            Some("10.0.0.7".to_string())
        );
        assert_eq!(bridge.ip(), None);

        bridge.get_ip_address(true).await.unwrap();
        assert_eq!(bridge.ip(), Some("10.0.0.7"));
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_connect_blank_discovered_address() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockTransport::new().route(
            Method::Get,
            DISCOVERY,
            discovery_reply(""),
        ));
        let mut bridge = Bridge::builder()
            .config_file(dir.path().join("creds"))
            .discovery_url(DISCOVERY)
            .transport(mock.clone())
            .build();

        assert_eq!(bridge.get_ip_address(true).await.unwrap(), None);
        assert_eq!(bridge.ip(), None);

        assert_eq!(bridge.connect().await.unwrap_err(), Error::NoBridgeAddress);
        assert!(mock.writes().is_empty());
    }

    #[tokio::test]
    async fn test_register_link_button_not_pressed() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockTransport::new().route(
            Method::Post,
            "/api",
            json!([{"error": {"type": 101, "address": "", "description": "link button not pressed"}}]),
        ));

        let err = Bridge::builder()
            .ip("10.0.0.2")
            .config_file(dir.path().join("creds"))
            .transport(mock)
            .connect()
            .await
            .unwrap_err();
        assert_eq!(err, Error::LinkButtonNotPressed);
    }

    #[tokio::test]
    async fn test_register_unknown_username() {
        let mock = Arc::new(MockTransport::new().route(
            Method::Post,
            "/api",
            json!([{"error": {"type": 7, "address": "", "description": "invalid value"}}]),
        ));
        let mut bridge = Bridge::builder().ip("10.0.0.2").transport(mock).build();
        assert_eq!(bridge.register_app().await.unwrap_err(), Error::UnknownUsername);
    }
}
