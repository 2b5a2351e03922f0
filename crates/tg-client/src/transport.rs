//! HTTP transport
//!
//! The client talks to the network only through [`Transport`], so it can be
//! driven by the reqwest implementation or by an in-process fake.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Status and undecoded body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single JSON POST
///
/// Implementations must not retry. Failing to obtain a response at all is
/// reported as [`ClientError::Transport`]; any HTTP status is a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: &Value) -> Result<RawResponse>;
}

/// reqwest-backed transport
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with no client-level timeout; deadlines are per call
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(ClientError::from)?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client (shared pool, custom proxy, ...)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<RawResponse> {
        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("HTTP {} ({} bytes)", status, body.len());

        Ok(RawResponse { status, body })
    }
}
