//! mw-notify
//!
//! Report delivery. [`TelegramNotifier`] posts to the Bot API;
//! [`ConsoleNotifier`] prints to stdout for dry runs.

mod console;
mod telegram;

pub use console::ConsoleNotifier;
pub use telegram::TelegramNotifier;

use std::fmt;

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Delivery failure. Messages never contain the bot token.
#[derive(Debug)]
pub enum NotifyError {
    /// Connect, timeout, or body read failure.
    Transport(String),
    /// Non-success HTTP status, with Telegram's description when present.
    Status { code: u16, description: String },
    /// HTTP 2xx but the API answered `ok: false`.
    Rejected(String),
    /// Missing credentials or unusable client settings.
    Config(String),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::Transport(msg) => write!(f, "transport error: {msg}"),
            NotifyError::Status { code, description } => {
                write!(f, "telegram http error status={code}: {description}")
            }
            NotifyError::Rejected(msg) => write!(f, "telegram rejected message: {msg}"),
            NotifyError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for NotifyError {}

// ---------------------------------------------------------------------------
// Notifier trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deliver one rendered report. Returns the number of messages sent.
    async fn deliver(&self, report: &str) -> Result<usize, NotifyError>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn deliver(&self, report: &str) -> Result<usize, NotifyError> {
        (**self).deliver(report).await
    }
}
