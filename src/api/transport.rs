//! HTTP transport seam
//!
//! The client talks to the upstream through the [`Transport`] trait so that
//! tests can script responses without a network. [`ReqwestTransport`] is the
//! production implementation.

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde_json::Value;

use super::error::TransportError;

/// An outbound call, relative to the transport's base URL
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path starting with `/`
    pub path: String,
    /// Query string parameters, in caller order
    pub query: Vec<(String, String)>,
    /// JSON body, if any
    pub body: Option<Value>,
    /// Bearer token for the `Authorization` header
    pub bearer: Option<String>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::POST, path);
        request.body = Some(body);
        request
    }

    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Raw upstream response: status code and undecoded body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Sends requests to the upstream booking service
///
/// Implementations report transport failures as [`TransportError`]; any HTTP
/// status, including errors, comes back as an `HttpResponse`.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// [`Transport`] backed by a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, timeout))
    }

    /// Creates a transport around an existing HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(request.method, &url)
            .header(CONTENT_TYPE, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builders() {
        let request = HttpRequest::get("/api/rooms")
            .with_query(vec![("adults".into(), "2".into())])
            .with_bearer("abc");

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/api/rooms");
        assert_eq!(request.query.len(), 1);
        assert_eq!(request.bearer.as_deref(), Some("abc"));
        assert!(request.body.is_none());

        let post = HttpRequest::post("/api/login", json!({"username": "u"}));
        assert_eq!(post.method, Method::POST);
        assert!(post.body.is_some());
        assert!(post.bearer.is_none());
    }

    #[test]
    fn test_response_status_helpers() {
        assert!(HttpResponse::new(200, "{}").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
        assert!(HttpResponse::new(401, "").is_unauthorized());
    }

    #[test]
    fn test_reqwest_transport_trims_base_url() {
        let transport =
            ReqwestTransport::new("https://example.test/hub/", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.base_url(), "https://example.test/hub");
    }

    #[tokio::test]
    async fn test_reqwest_transport_reports_connection_failure() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let transport =
            ReqwestTransport::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = transport.send(HttpRequest::get("/ping")).await;
        assert!(result.is_err());
    }
}
