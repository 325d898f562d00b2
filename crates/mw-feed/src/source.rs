//! Feed boundary: which feed, what can go wrong, and the fetch contract.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Feed kind
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedKind {
    AccountTotals,
    Trades,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::AccountTotals => "account_totals",
            FeedKind::Trades => "trades",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`FeedSource`] may return. The runtime maps every variant to
/// "this feed yielded nothing this cycle".
#[derive(Debug)]
pub enum FeedError {
    /// Connect, timeout, or body read failure.
    Transport(String),
    /// Upstream answered with a non-success HTTP status.
    Status { code: u16 },
    /// The response body was not valid JSON.
    Decode(String),
    /// The client could not be constructed.
    Config(String),
}

impl FeedError {
    /// Transport failures and 429/500/502/503/504 are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::Transport(_) => true,
            FeedError::Status { code } => matches!(code, 429 | 500 | 502 | 503 | 504),
            FeedError::Decode(_) | FeedError::Config(_) => false,
        }
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Transport(msg) => write!(f, "transport error: {msg}"),
            FeedError::Status { code } => write!(f, "http error status={code}"),
            FeedError::Decode(msg) => write!(f, "decode error: {msg}"),
            FeedError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {}

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Upstream feed contract. Returns the raw JSON document; interpretation is
/// the canonicalizer's job.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, kind: FeedKind) -> Result<Value, FeedError>;
}
