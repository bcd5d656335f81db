//! # Advisor Transport
//!
//! One POST per submission: the [`AdvisorRequest`] goes out as JSON, the body comes
//! back as a [`serde_json::Value`]. HTTP status codes are not interpreted here; the
//! advisor puts its error message in the body and the handler decides from that.
//!
//! [`AdvisorTransport`] is the seam the handler is generic over. [`HttpTransport`] is
//! the `reqwest` implementation used in production; tests substitute scripted ones.

use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::config::AdvisorConfig;
use crate::payload::AdvisorRequest;

/// Performs the network exchange for one submission
pub trait AdvisorTransport: Send + Sync {
    /// Send `request` and return the decoded JSON body.
    fn exchange(
        &self,
        request: &AdvisorRequest,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

/// Anything that stops the exchange from producing a JSON body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The HTTP client could not be constructed
    Client(String),
    /// The request could not be sent or the response not received
    /// (connection refused, timeout, reset)
    Request(String),
    /// The response body was not valid JSON
    Decode(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Client(msg) => write!(f, "failed to build HTTP client: {msg}"),
            TransportError::Request(msg) => write!(f, "advisor request failed: {msg}"),
            TransportError::Decode(msg) => write!(f, "advisor response is not JSON: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// `reqwest`-backed transport posting to a fixed endpoint
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Transport with the client's default timeout behavior
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(endpoint, None)
    }

    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be built.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self, TransportError> {
        Self::with_timeout(config.endpoint.clone(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AdvisorTransport for HttpTransport {
    async fn exchange(&self, request: &AdvisorRequest) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), endpoint = %self.endpoint, "advisor responded");

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
