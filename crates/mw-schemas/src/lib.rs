//! mw-schemas
//!
//! Canonical record model shared by every other crate in the workspace.
//!
//! Upstream feeds are normalized into these types by `mw-feed`, persisted by
//! `mw-store`, fingerprinted and diffed by `mw-reconcile`, rendered by
//! `mw-report`. The serde field names are the snapshot file format; changing
//! one changes every fingerprint computed from a persisted snapshot.
//!
//! Pure data. No IO.

mod entity;
mod records;
mod state;

pub use entity::{EntityKey, Side};
pub use records::{AccountState, Position, Trade};
pub use state::{CanonicalState, EntityActivity};
