//! Bridge reply envelopes.
//!
//! Write requests are answered with a list of single-key objects:
//!
//! ```json
//! [
//!   {"success": {"/lights/1/state/on": true}},
//!   {"error": {"type": 201, "address": "/lights/1/state/bri", "description": "..."}}
//! ]
//! ```
//!
//! Reads of a single resource answer with the resource object, or with such a
//! list holding one error when the resource does not exist.

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// An error object reported by the bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    /// Numeric error type (e.g. 101 = link button not pressed).
    #[serde(rename = "type")]
    pub kind: u16,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
}

/// One entry of a bridge reply list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ApiResponse {
    Success(Value),
    Error(ApiError),
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }

    pub fn success(&self) -> Option<&Value> {
        match self {
            ApiResponse::Success(value) => Some(value),
            ApiResponse::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            ApiResponse::Success(_) => None,
            ApiResponse::Error(err) => Some(err),
        }
    }
}

/// Parse a reply list.
pub(crate) fn parse_replies(address: &str, value: Value) -> Result<Vec<ApiResponse>> {
    if !value.is_array() {
        return Err(Error::unexpected(address, "expected a reply list"));
    }
    serde_json::from_value(value).map_err(Error::JsonLoad)
}

/// First error entry of a reply list, if any.
pub fn first_error(replies: &[ApiResponse]) -> Option<&ApiError> {
    replies.iter().find_map(ApiResponse::error)
}

/// Log every error entry of a reply list at warn.
pub(crate) fn warn_errors(replies: &[ApiResponse], resource: &str, id: impl fmt::Display) {
    for err in replies.iter().filter_map(ApiResponse::error) {
        warn!("ERROR: {} for {} {}", err.description, resource, id);
    }
}

/// Unwrap a single-resource read, turning an error list into [`Error::Api`].
pub(crate) fn resource_or_error(address: &str, value: Value) -> Result<Value> {
    match value {
        Value::Array(_) => {
            let replies = parse_replies(address, value)?;
            match first_error(&replies) {
                Some(err) => Err(Error::Api(err.clone())),
                None => Err(Error::unexpected(address, "expected an object")),
            }
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_replies() {
        let replies = parse_replies(
            "/lights/1/state",
            json!([
                {"success": {"/lights/1/state/on": true}},
                {"error": {"type": 201, "address": "/lights/1/state/bri", "description": "parameter, bri, is not modifiable. Device is set to off."}}
            ]),
        )
        .unwrap();

        assert_eq!(replies.len(), 2);
        assert!(replies[0].is_success());
        let err = first_error(&replies).unwrap();
        assert_eq!(err.kind, 201);
        assert_eq!(err.address, "/lights/1/state/bri");
    }

    #[test]
    fn test_parse_replies_rejects_object() {
        assert!(parse_replies("/config", json!({"name": "bridge"})).is_err());
    }

    #[test]
    fn test_resource_or_error() {
        let ok = resource_or_error("/lights/1", json!({"name": "Kitchen"})).unwrap();
        assert_eq!(ok["name"], "Kitchen");

        let err = resource_or_error(
            "/lights/9",
            json!([{"error": {"type": 3, "address": "/lights/9", "description": "resource, /lights/9, not available"}}]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError { kind: 3, .. })));
    }
}
