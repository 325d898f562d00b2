//! mw-reconcile
//!
//! Content fingerprints and the snapshot-vs-latest delta.
//!
//! Pure: no IO, no clock. Given the same two states, `reconcile` always
//! returns the same outcome.

mod engine;
mod fingerprint;
mod types;

pub use engine::reconcile;
pub use fingerprint::{fingerprint, Fingerprint};
pub use types::{ChangeTag, Delta, EntityDelta, ReconcileOutcome, Tagged};
