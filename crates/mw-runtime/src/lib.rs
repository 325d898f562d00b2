//! mw-runtime
//!
//! One poll cycle ([`Reporter::run_cycle`]) and the fixed-interval loop
//! around it ([`run_loop`]).
//!
//! Cycles never overlap and never fail: every error is logged and folded
//! into the [`CycleOutcome`].

mod cycle;
mod schedule;

pub use cycle::{CycleOutcome, Reporter};
pub use schedule::{run_loop, shutdown_signal};
