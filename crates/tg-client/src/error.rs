//! Error types for tg-client

use thiserror::Error;

/// Message shared by every deadline expiry.
pub const TIMEOUT_MESSAGE: &str = "Request timed out";

/// tg-client error type
///
/// Which variant is returned tells the caller whether the request ever
/// reached the remote API: only [`ClientError::Remote`] carries an HTTP status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Bad configuration or input, raised before any network activity
    #[error("{0}")]
    Validation(String),

    /// The per-call deadline fired before a response arrived
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,

    /// No usable response was obtained (DNS, connection, undecodable body)
    #[error("{0}")]
    Transport(String),

    /// The remote API answered but rejected the request
    #[error("{message}")]
    Remote {
        message: String,
        http_status: u16,
        error_code: Option<i64>,
    },
}

impl ClientError {
    /// Human-readable message, identical to the `Display` output
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status of the response, present only for remote rejections
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Remote { http_status, .. } => Some(*http_status),
            _ => None,
        }
    }

    /// `error_code` reported by the remote API, if it supplied one
    pub fn remote_error_code(&self) -> Option<i64> {
        match self {
            Self::Remote { error_code, .. } => *error_code,
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// The request URL embeds the bot token, so it is stripped; the cause chain is kept.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ClientError::Transport(message)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ClientError>;
