//! Client configuration

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::types::ChatTarget;

/// Public Bot API endpoint used when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Configuration for [`crate::MessageClient`]
///
/// Built once and handed to the client, which never mutates it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Bot token
    pub token: String,

    /// Chat that every message is sent to
    pub target: ChatTarget,

    /// API endpoint (defaults to [`DEFAULT_BASE_URL`])
    #[serde(default)]
    pub base_url: Option<String>,

    /// Timeout applied when a call does not set its own
    #[serde(default)]
    pub default_timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>, target: impl Into<ChatTarget>) -> Self {
        Self {
            token: token.into(),
            target: target.into(),
            base_url: None,
            default_timeout_ms: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_default_timeout_ms(mut self, ms: u64) -> Self {
        self.default_timeout_ms = Some(ms);
        self
    }

    /// Check the required fields
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(ClientError::Validation("bot token is required".to_string()));
        }
        if self.target.is_empty() {
            return Err(ClientError::Validation("chat id is required".to_string()));
        }
        Ok(())
    }

    /// Base URL with the default applied and one trailing slash removed
    pub fn resolved_base_url(&self) -> String {
        let url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        url.strip_suffix('/').unwrap_or(url).to_string()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("target", &self.target)
            .field("base_url", &self.base_url)
            .field("default_timeout_ms", &self.default_timeout_ms)
            .finish()
    }
}
