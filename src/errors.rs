use crate::response::ApiError;
use crate::transport::Method;

/// All error types that can occur when talking to a Hue bridge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP request could not be completed.
    #[error("http {method} {address} failed: {err}")]
    Http {
        method: Method,
        address: String,
        err: reqwest::Error,
    },

    /// The bridge did not answer within the request timeout.
    #[error("{method} request to {host}{address} timed out")]
    RequestTimeout {
        method: Method,
        host: String,
        address: String,
    },

    /// The bridge answered with a non-success HTTP status.
    #[error("http {method} {address} returned status {status}")]
    HttpStatus {
        method: Method,
        address: String,
        status: u16,
    },

    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// Reading or writing the credential file failed.
    #[error("credential file {path} {action} error: {err:?}")]
    ConfigIo {
        path: String,
        action: String,
        err: std::io::Error,
    },

    /// Registration was attempted without pressing the bridge link button.
    #[error("the link button has not been pressed in the last 30 seconds")]
    LinkButtonNotPressed,

    /// The bridge does not know the username used for the request.
    #[error("unknown username")]
    UnknownUsername,

    /// The bridge reported an error for a request.
    #[error("bridge error {} at {}: {}", .0.kind, .0.address, .0.description)]
    Api(ApiError),

    /// An API call needs a registration token that has not been obtained yet.
    #[error("no username; the bridge is not registered")]
    NotRegistered,

    /// No bridge address was given, stored or discovered.
    #[error("no bridge address available")]
    NoBridgeAddress,

    /// The discovery service reported no bridges.
    #[error("no bridge found by the discovery service")]
    BridgeNotFound,

    /// The given key matches no known light.
    #[error("not a valid key (integer index starting with 1, or light name): {0}")]
    LightNotFound(String),

    /// The given key matches no known group.
    #[error("group {0} does not exist")]
    GroupNotFound(String),

    /// The given key matches no known sensor.
    #[error("sensor {0} does not exist")]
    SensorNotFound(String),

    /// The requested parameter is not part of the resource.
    #[error("not a valid key, parameter {parameter} is not associated with {resource}")]
    InvalidParameter { parameter: String, resource: String },

    /// Attempted to send a [`crate::Payload`] with no attributes set.
    #[error("invalid payload; no attributes set")]
    NoAttribute,

    /// The bridge answered with JSON of an unexpected shape.
    #[error("unexpected response for {address}: {reason}")]
    UnexpectedResponse { address: String, reason: String },
}

impl Error {
    /// Create a new credential file error
    pub fn config_io(path: &std::path::Path, action: &str, err: std::io::Error) -> Self {
        Error::ConfigIo {
            path: path.display().to_string(),
            action: action.to_string(),
            err,
        }
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter(parameter: &str, resource: impl std::fmt::Display) -> Self {
        Error::InvalidParameter {
            parameter: parameter.to_string(),
            resource: resource.to_string(),
        }
    }

    /// Create a new unexpected response error
    pub fn unexpected(address: &str, reason: &str) -> Self {
        Error::UnexpectedResponse {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Map a registration error reply to the matching error.
    pub(crate) fn from_registration(err: ApiError) -> Self {
        match err.kind {
            101 => Error::LinkButtonNotPressed,
            7 => Error::UnknownUsername,
            _ => Error::Api(err),
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
