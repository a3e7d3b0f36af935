//! Registration token storage.
//!
//! The token obtained by pairing with a bridge is cached in a small JSON file
//! keyed by bridge address:
//!
//! ```json
//! {"192.168.1.2": {"username": "83b7780291a6ceffbe0bd049104df"}}
//! ```

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Stored credentials for one bridge.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub username: String,
    #[serde(default)]
    pub clientkey: Option<String>,
}

/// Bridge address and username resolved from the credential file.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBridge {
    pub ip: String,
    pub username: String,
}

/// The on-disk credential file.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl Default for CredentialFile {
    fn default() -> Self {
        Self::in_current_dir()
    }
}

impl CredentialFile {
    pub const FILE_NAME: &'static str = ".hue_bridge";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialFile { path: path.into() }
    }

    /// `.hue_bridge` in the current working directory.
    pub fn in_current_dir() -> Self {
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file.
    pub async fn read(&self) -> Result<Map<String, Value>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::config_io(&self.path, "read", e))?;
        serde_json::from_str(&contents).map_err(Error::JsonLoad)
    }

    /// Fill in whichever of `ip` and `username` is missing from the file.
    ///
    /// Without an `ip` the first bridge in the file is used, in file order.
    pub async fn resolve(&self, ip: Option<&str>, username: Option<&str>) -> Result<StoredBridge> {
        let config = self.read().await?;

        let ip = match ip {
            Some(ip) => {
                info!("Using ip: {}", ip);
                ip.to_string()
            }
            None => {
                let ip = config.keys().next().cloned().ok_or(Error::NoBridgeAddress)?;
                info!("Using ip from config: {}", ip);
                ip
            }
        };

        let username = match username {
            Some(username) => {
                info!("Using username: {}", username);
                username.to_string()
            }
            None => {
                let entry = config.get(&ip).cloned().ok_or(Error::NotRegistered)?;
                let credentials: Credentials =
                    serde_json::from_value(entry).map_err(Error::JsonLoad)?;
                info!("Using username from config: {}", credentials.username);
                credentials.username
            }
        };

        Ok(StoredBridge { ip, username })
    }

    /// Overwrite the file with the credentials of a single bridge.
    pub async fn save(&self, ip: &str, credentials: &Value) -> Result<()> {
        let mut config = Map::new();
        config.insert(ip.to_string(), credentials.clone());
        let contents = serde_json::to_string(&config).map_err(Error::JsonDump)?;

        info!("Writing configuration file to {}", self.path.display());
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| Error::config_io(&self.path, "write", e))
    }
}
