//! tg-client: Bot API message client
//!
//! Sends text messages to a single pre-configured chat through the Bot API
//! `sendMessage` method, with per-call formatting/delivery options and an
//! optional deadline. Every failure is reported as one [`ClientError`].

pub mod client;
pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use client::MessageClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ClientError, Result, TIMEOUT_MESSAGE};
pub use transport::{HttpTransport, RawResponse, Transport};
pub use types::{ChatTarget, ParseMode, SendOptions, SendResult};
