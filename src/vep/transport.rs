//! HTTP transport abstraction
//!
//! The client talks to the annotation service through [`Transport`], so the
//! retry logic can be exercised against a scripted transport in tests.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::VepError;

/// Default per-attempt request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP methods the transport supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 with the given body
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

/// Something that can perform one HTTP request
///
/// A non-2xx status is a successful exchange at this layer; only failures to
/// complete the exchange are errors.
pub trait Transport {
    fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, VepError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, VepError> {
        (**self).send(method, url, headers)
    }
}

/// Blocking reqwest transport; the connection pool is reused across requests
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the default timeout
    pub fn new() -> Result<Self, VepError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport whose requests time out after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, VepError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ferro-vep/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VepError::Io {
                msg: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, VepError> {
        let mut request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let transport_error = |e: reqwest::Error| VepError::Transport {
            url: url.to_string(),
            msg: e.to_string(),
        };

        let response = request.send().map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport_error)?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }

    #[test]
    fn test_response_constructors() {
        let ok = HttpResponse::ok("[]");
        assert_eq!(ok.status, 200);
        assert_eq!(ok.body, "[]");
        assert_eq!(HttpResponse::new(503, "").status, 503);
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let transport = HttpTransport::with_timeout(Duration::from_millis(200)).unwrap();
        let result = transport.send(HttpMethod::Get, "http://127.0.0.1:9/vep", &[]);
        assert!(matches!(result, Err(VepError::Transport { .. })));
    }
}
