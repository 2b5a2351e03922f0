//! Bot API message client
//!
//! Sends text messages to the configured chat via `sendMessage`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::transport::{HttpTransport, RawResponse, Transport};
use crate::types::{ApiResponse, ChatTarget, SendMessageRequest, SendOptions, SendResult};

/// Bot API message client
///
/// Holds only immutable configuration and a shared transport, so concurrent
/// calls never wait on each other.
#[derive(Clone)]
pub struct MessageClient {
    config: ClientConfig,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl MessageClient {
    /// Create a client backed by the reqwest transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new()?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client with a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let base_url = config.resolved_base_url();

        Ok(Self {
            config,
            base_url,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn target(&self) -> &ChatTarget {
        &self.config.target
    }

    pub fn default_timeout_ms(&self) -> Option<u64> {
        self.config.default_timeout_ms
    }

    /// Send a plain message with no options
    pub async fn send_text(&self, text: &str) -> Result<SendResult> {
        self.send(text, SendOptions::default()).await
    }

    /// Send a message to the configured chat
    ///
    /// Exactly one POST is issued. When a timeout applies, the request is
    /// dropped as soon as the deadline passes and [`ClientError::Timeout`]
    /// is returned.
    pub async fn send(&self, text: &str, options: SendOptions) -> Result<SendResult> {
        if text.trim().is_empty() {
            return Err(ClientError::Validation("message text is required".to_string()));
        }

        let request = SendMessageRequest::new(&self.config.target, text, &options);
        let body = serde_json::to_value(&request)
            .map_err(|e| ClientError::Transport(format!("failed to encode request: {}", e)))?;

        let url = format!("{}/bot{}/sendMessage", self.base_url, self.config.token);
        debug!(
            "Sending message to {} via {}/bot<redacted>/sendMessage",
            self.config.target, self.base_url
        );

        let timeout_ms = options
            .timeout_ms
            .or(self.config.default_timeout_ms)
            .filter(|ms| *ms > 0);

        let pending = self.transport.post_json(&url, &body);
        let raw = match timeout_ms {
            Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), pending).await {
                Ok(response) => response?,
                Err(_) => {
                    warn!("sendMessage to {} timed out after {}ms", self.config.target, ms);
                    return Err(ClientError::Timeout);
                }
            },
            None => pending.await?,
        };

        let result = interpret_response(raw)?;
        info!(
            "Message {} delivered to {}",
            result.message_id, self.config.target
        );
        Ok(result)
    }
}

impl fmt::Debug for MessageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageClient")
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Turn a raw HTTP response into a result or a remote rejection
///
/// The body is decoded before the status is looked at. A body that is not a
/// JSON response envelope is a [`ClientError::Transport`] with no status,
/// whatever the HTTP status was (e.g. an HTML 502 page from a proxy).
fn interpret_response(raw: RawResponse) -> Result<SendResult> {
    let status = raw.status;
    let parsed: ApiResponse = serde_json::from_str(&raw.body)
        .map_err(|e| ClientError::Transport(format!("invalid response body: {}", e)))?;

    if !raw.is_success() {
        warn!("sendMessage failed: HTTP {} - {:?}", status, parsed.description);
        return Err(ClientError::Remote {
            message: parsed
                .description
                .unwrap_or_else(|| format!("HTTP {}", status)),
            http_status: status,
            error_code: parsed.error_code,
        });
    }

    if !parsed.ok {
        warn!("sendMessage rejected: {:?}", parsed.description);
        return Err(ClientError::Remote {
            message: parsed
                .description
                .unwrap_or_else(|| "remote API error".to_string()),
            http_status: status,
            error_code: parsed.error_code,
        });
    }

    match parsed.result {
        Some(message) => Ok(message.into()),
        None => Err(ClientError::Remote {
            message: "remote API returned no result".to_string(),
            http_status: status,
            error_code: parsed.error_code,
        }),
    }
}
