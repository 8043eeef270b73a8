//! HTTP plumbing under the API client.

use crate::error::{ApiError, ApiResult};
use log::debug;
use serde_json::Value;
use std::time::Duration;

/// Query string pairs; `None` parameters are dropped before they get here
pub type Query = [(&'static str, String)];

/// Trait for the request layer to allow mocking and decoration
pub trait Transport {
    fn get(&self, path: &str, query: &Query) -> ApiResult<Value>;
    fn post(&self, path: &str, body: &Value) -> ApiResult<Value>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, path: &str, query: &Query) -> ApiResult<Value> {
        (**self).get(path, query)
    }

    fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        (**self).post(path, body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, path: &str, query: &Query) -> ApiResult<Value> {
        (**self).get(path, query)
    }

    fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        (**self).post(path, body)
    }
}

/// Blocking JSON transport over a shared `ureq` agent.
///
/// The agent keeps a cookie jar, so the backend's session cookie set by
/// login is replayed on later calls.
pub struct HttpTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout_ms: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn read(resp: Result<ureq::Response, ureq::Error>) -> ApiResult<Value> {
        match resp {
            Ok(r) => {
                let body = r
                    .into_string()
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                if body.trim().is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(&body).map_err(|e| ApiError::Decode {
                    resource: "response",
                    message: e.to_string(),
                })
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(ApiError::Status { code, body })
            }
            Err(e) => Err(ApiError::Transport(e.to_string())),
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str, query: &Query) -> ApiResult<Value> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);

        let mut req = self
            .agent
            .get(&url)
            .set("Accept", "application/json")
            .set("Content-Type", "application/json");
        for (key, value) in query {
            req = req.query(key, value);
        }
        Self::read(req.call())
    }

    fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        let url = self.url(path);
        // Bodies may carry credentials, so only the URL is logged
        debug!("POST {}", url);

        let resp = self
            .agent
            .post(&url)
            .set("Accept", "application/json")
            .set("Content-Type", "application/json")
            .send_json(body.clone());
        Self::read(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let t = HttpTransport::new("http://localhost:5000/", 1_000);
        assert_eq!(t.base_url(), "http://localhost:5000");
        assert_eq!(t.url("/orgs/search"), "http://localhost:5000/orgs/search");
        assert_eq!(t.url("orgs/1"), "http://localhost:5000/orgs/1");
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let t = HttpTransport::new("http://127.0.0.1:9", 500);
        let err = t.get("/orgs/search", &[]).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
