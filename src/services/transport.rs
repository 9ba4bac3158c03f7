//! HTTP transport seam.
//!
//! The protocol clients only need "GET this URL with these headers and hand
//! back status, content type and body". [`HttpTransport`] does that with
//! reqwest; tests substitute scripted implementations.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode, Url};

/// A completed HTTP exchange
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    /// Raw `Content-Type` header value, if the server sent one
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Failure before any HTTP status was received
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("transport timed out: {0}")]
    TimedOut(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::TimedOut(e.to_string())
        } else {
            TransportError::Connection(e.to_string())
        }
    }
}

/// Issues GET requests on behalf of the protocol clients
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: Url,
        headers: &[(&str, &str)],
    ) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self { client })
    }

    pub fn user_agent() -> &'static str {
        concat!("gis-map-client/", env!("CARGO_PKG_VERSION"))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: Url,
        headers: &[(&str, &str)],
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        tracing::trace!(
            status = status.as_u16(),
            content_type = ?content_type,
            bytes = body.len(),
            "HTTP response received"
        );

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}
