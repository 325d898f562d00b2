//! mw-feed
//!
//! Upstream ingestion: fetch raw JSON ([`FeedSource`], [`HttpFeedClient`])
//! and normalize it into canonical state fragments ([`Canonicalizer`]).
//!
//! The canonicalizer never fails. Unknown shapes, malformed records and
//! missing fields degrade to defaults and are counted in
//! [`CoercionDiagnostics`].

mod canonicalize;
mod client;
mod coerce;
mod diagnostics;
mod payload;
mod source;

pub use canonicalize::{Canonicalized, Canonicalizer};
pub use client::HttpFeedClient;
pub use diagnostics::{CoercionDiagnostics, CoercionKind};
pub use payload::RawPayload;
pub use source::{FeedError, FeedKind, FeedSource};
