//! HTTP transport to the bridge.
//!
//! The bridge speaks plain HTTP with JSON bodies. All requests go through the
//! [`Transport`] trait so a [`crate::Bridge`] can be driven by something other
//! than a real network connection.

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use log::debug;
use serde_json::Value;
use strum_macros::{AsRefStr, Display};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// HTTP verbs understood by the bridge API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl Method {
    /// Whether requests with this verb carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Put | Method::Post)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single request to the bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Host (and optional port) of the bridge, e.g. `192.168.1.2`.
    pub host: String,
    /// Absolute path, e.g. `/api/<username>/lights/1/state`.
    pub address: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, host: &str, address: &str, body: Option<Value>) -> Self {
        ApiRequest {
            method,
            host: host.to_string(),
            address: address.to_string(),
            body,
        }
    }

    /// A body-less request to a full URL outside the bridge, such as the
    /// discovery service.
    pub fn absolute(method: Method, url: &str) -> Self {
        ApiRequest::new(method, "", url, None)
    }

    /// Full URL of the request.
    pub fn url(&self) -> String {
        if self.address.starts_with("http://") || self.address.starts_with("https://") {
            self.address.clone()
        } else {
            format!("http://{}{}", self.host, self.address)
        }
    }
}

/// Sends requests to a bridge and returns the decoded JSON reply.
pub trait Transport: Send + Sync + fmt::Debug {
    fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<Value>>;
}

/// [`Transport`] over HTTP using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    const TIMEOUT_SECS: u64 = 10;

    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(Self::TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        HttpTransport {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn map_err(request: &ApiRequest, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::RequestTimeout {
                method: request.method,
                host: request.host.clone(),
                address: request.address.clone(),
            }
        } else {
            Error::Http {
                method: request.method,
                address: request.address.clone(),
                err,
            }
        }
    }
}

impl Transport for HttpTransport {
    fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(request.method.into(), request.url())
                .timeout(self.timeout);

            if request.method.has_body() {
                builder = builder.json(request.body.as_ref().unwrap_or(&Value::Null));
            }

            debug!(
                "{} {} {}",
                request.method,
                request.address,
                request
                    .body
                    .as_ref()
                    .map(Value::to_string)
                    .unwrap_or_else(|| "None".to_string())
            );

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_err(request, e))?;

            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| Self::map_err(request, e))?;
            debug!("{}", String::from_utf8_lossy(&body));

            if !status.is_success() {
                return Err(Error::HttpStatus {
                    method: request.method,
                    address: request.address.clone(),
                    status: status.as_u16(),
                });
            }

            decode_body(&body)
        })
    }
}

/// Decode a reply body as UTF-8 JSON.
fn decode_body(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(Error::JsonLoad)
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory bridge used by unit tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Serves canned replies per (method, address) and records every request.
    ///
    /// Unrouted GETs answer with a "resource not available" error list, other
    /// unrouted verbs answer with a success entry echoing the body.
    #[derive(Debug, Default)]
    pub(crate) struct MockTransport {
        routes: Mutex<HashMap<(Method, String), Value>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn route(self, method: Method, address: &str, reply: Value) -> Self {
            self.set_route(method, address, reply);
            self
        }

        pub(crate) fn set_route(&self, method: Method, address: &str, reply: Value) {
            self.routes
                .lock()
                .unwrap()
                .insert((method, address.to_string()), reply);
        }

        pub(crate) fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// Requests other than GET, in order.
        pub(crate) fn writes(&self) -> Vec<ApiRequest> {
            self.requests()
                .into_iter()
                .filter(|r| r.method != Method::Get)
                .collect()
        }

        fn reply(&self, request: &ApiRequest) -> Value {
            let key = (request.method, request.address.clone());
            if let Some(reply) = self.routes.lock().unwrap().get(&key) {
                return reply.clone();
            }
            match request.method {
                Method::Get => json!([{
                    "error": {
                        "type": 3,
                        "address": request.address,
                        "description": "resource, not available",
                    }
                }]),
                _ => {
                    let mut success = serde_json::Map::new();
                    success.insert(
                        request.address.clone(),
                        request.body.clone().unwrap_or(Value::Null),
                    );
                    json!([{ "success": success }])
                }
            }
        }
    }

    impl Transport for MockTransport {
        fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<Value>> {
            self.requests.lock().unwrap().push(request.clone());
            let reply = self.reply(request);
            Box::pin(async move { Ok(reply) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Delete.as_ref(), "DELETE");
    }

    #[test]
    fn test_method_has_body() {
        assert!(Method::Put.has_body());
        assert!(Method::Post.has_body());
        assert!(!Method::Get.has_body());
        assert!(!Method::Delete.has_body());
    }

    #[test]
    fn test_request_url() {
        let request = ApiRequest::new(Method::Get, "10.0.0.2:8080", "/api/abc/lights", None);
        assert_eq!(request.url(), "http://10.0.0.2:8080/api/abc/lights");

        let request = ApiRequest::absolute(Method::Get, "https://discovery.meethue.com/");
        assert_eq!(request.url(), "https://discovery.meethue.com/");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_decode_body_rejects_invalid_utf8() {
        assert_eq!(
            decode_body(br#"[{"success": {"name": "Hall"}}]"#).unwrap(),
            serde_json::json!([{"success": {"name": "Hall"}}])
        );

        let err = decode_body(b"{\"name\": \"Caf\xe9\"}").unwrap_err();
        assert!(matches!(err, Error::JsonLoad(_)));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = mock::MockTransport::new();
        let request = ApiRequest::new(Method::Get, "10.0.0.2", "/api/abc/lights", None);
        let reply = mock.send(&request).await.unwrap();
        assert!(reply.is_array());
        assert_eq!(mock.requests(), vec![request]);
    }
}
