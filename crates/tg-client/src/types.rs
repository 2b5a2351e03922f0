//! Bot API types
//!
//! Caller-facing value types plus the JSON shapes exchanged with the
//! `sendMessage` method.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Destination chat: a numeric chat id or a `@username` style string
///
/// Serialized untagged, so the wire sees a JSON number or a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatTarget {
    Id(i64),
    Username(String),
}

impl ChatTarget {
    /// Only an empty string is empty; `Id(0)` is a valid target.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Id(_) => false,
            Self::Username(name) => name.is_empty(),
        }
    }
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Username(name) => f.write_str(name),
        }
    }
}

impl From<i64> for ChatTarget {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ChatTarget {
    fn from(name: &str) -> Self {
        Self::Username(name.to_string())
    }
}

impl From<String> for ChatTarget {
    fn from(name: String) -> Self {
        Self::Username(name)
    }
}

/// Integers become `Id`, anything else is kept verbatim as `Username`.
impl FromStr for ChatTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Username(s.to_string()),
        })
    }
}

/// Text formatting mode understood by the remote API
///
/// Plain text is expressed by leaving `parse_mode` unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Markdown,
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::MarkdownV2 => "MarkdownV2",
            Self::Html => "HTML",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" => Ok(Self::Markdown),
            "markdownv2" => Ok(Self::MarkdownV2),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown parse mode: {}", other)),
        }
    }
}

/// Per-call options for [`crate::MessageClient::send`]
///
/// Every field is optional. Unset fields are left out of the request
/// entirely, while `Some(false)` is sent as an explicit `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub parse_mode: Option<ParseMode>,
    pub disable_notification: Option<bool>,
    pub protect_content: Option<bool>,
    pub reply_to_message_id: Option<i64>,
    pub message_thread_id: Option<i64>,
    pub disable_web_page_preview: Option<bool>,
    /// Overrides the client's default timeout for this call
    pub timeout_ms: Option<u64>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }

    pub fn disable_notification(mut self, value: bool) -> Self {
        self.disable_notification = Some(value);
        self
    }

    pub fn protect_content(mut self, value: bool) -> Self {
        self.protect_content = Some(value);
        self
    }

    pub fn reply_to_message_id(mut self, id: i64) -> Self {
        self.reply_to_message_id = Some(id);
        self
    }

    pub fn message_thread_id(mut self, id: i64) -> Self {
        self.message_thread_id = Some(id);
        self
    }

    pub fn disable_web_page_preview(mut self, value: bool) -> Self {
        self.disable_web_page_preview = Some(value);
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }
}

/// Identity of a delivered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    pub message_id: i64,
    /// Unix timestamp (seconds) assigned by the remote API
    pub unix_date: i64,
    pub text: Option<String>,
}

/// `sendMessage` request body
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: &'a ChatTarget,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protect_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,
}

impl<'a> SendMessageRequest<'a> {
    pub fn new(chat_id: &'a ChatTarget, text: &'a str, options: &SendOptions) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: options.parse_mode,
            disable_notification: options.disable_notification,
            protect_content: options.protect_content,
            reply_to_message_id: options.reply_to_message_id,
            message_thread_id: options.message_thread_id,
            disable_web_page_preview: options.disable_web_page_preview,
        }
    }
}

/// Response envelope shared by every Bot API method
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiResponse {
    #[serde(default)]
    pub ok: bool,
    pub result: Option<WireMessage>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

/// The subset of the remote `Message` object we surface
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireMessage {
    pub message_id: i64,
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
}

impl From<WireMessage> for SendResult {
    fn from(msg: WireMessage) -> Self {
        Self {
            message_id: msg.message_id,
            unix_date: msg.date,
            text: msg.text,
        }
    }
}
