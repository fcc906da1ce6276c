//! HTTP transport seam.
//!
//! The dispatcher never talks to reqwest directly; it hands a fully resolved
//! [`HttpRequest`] to a [`Transport`] and gets a [`RestResponse`] back. Any
//! failure to obtain a response is a transport error and is retried.

use crate::body::RequestBody;
use crate::endpoint::RestMethod;
use async_trait::async_trait;
use cordwain_error::{RestError, RestResult};
use cordwain_rate_limit::RestConfig;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// A resolved request, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: RestMethod,
    /// Absolute URL including query string
    pub url: String,
    /// Headers, including authorization when it applies
    pub headers: HeaderMap,
    /// Request body
    pub body: RequestBody,
}

impl HttpRequest {
    /// Value of a header as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// Raw response from Discord.
#[derive(Debug, Clone, Default)]
pub struct RestResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl RestResponse {
    /// Create a response from its parts.
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the body is not valid JSON for `T`.
    #[track_caller]
    pub fn json<T: DeserializeOwned>(&self) -> RestResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            RestError::new(cordwain_error::RestErrorKind::Decode(format!(
                "{} (body: {})",
                e,
                self.text()
            )))
        })
    }

    /// Body as untyped JSON, or `None` when empty or not JSON.
    pub fn json_value(&self) -> Option<serde_json::Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }
}

/// Sends resolved requests.
///
/// Implementations report only failures to get a response at all; HTTP error
/// statuses are returned as ordinary responses for the dispatcher to classify.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the raw response.
    async fn send(&self, request: HttpRequest) -> RestResult<RestResponse>;
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with the configured timeouts and user agent.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the TLS backend cannot be initialized.
    pub fn new(config: &RestConfig) -> RestResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RestError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> RestResult<RestResponse> {
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &request.url)
            .headers(request.headers.clone());

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart { .. } => match request.body.to_form()? {
                Some(form) => builder.multipart(form),
                None => builder,
            },
        };

        let response = builder.send().await.map_err(|e| {
            RestError::transport(format!("{} {} failed: {}", request.method, request.url, e))
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            RestError::transport(format!("Failed to read response body: {}", e))
        })?;

        debug!(status, bytes = body.len(), "Received response");
        Ok(RestResponse::new(status, headers, body.to_vec()))
    }
}
