use std::collections::BTreeSet;

use mw_schemas::CanonicalState;
use serde::Serialize;

use crate::{fingerprint, EntityDelta, Fingerprint, ReconcileOutcome, Tagged};

fn fingerprints<T: Serialize + std::fmt::Debug>(records: &[T]) -> BTreeSet<Fingerprint> {
    records.iter().map(fingerprint).collect()
}

fn unseen<T: Serialize + std::fmt::Debug + Clone>(
    records: &[T],
    seen: &BTreeSet<Fingerprint>,
) -> Vec<Tagged<T>> {
    records
        .iter()
        .filter(|r| !seen.contains(&fingerprint(*r)))
        .cloned()
        .map(Tagged::new_or_updated)
        .collect()
}

/// Diff the latest state against the last persisted one.
///
/// - Accounts are passed through whole; they never gate a report.
/// - Per entity in `new.activity`, every position/trade whose fingerprint is
///   absent from the same entity's list in `previous` is tagged new.
/// - Removals are not detected.
///
/// Dedup memory is exactly one snapshot deep: a record that disappears for
/// a cycle and then returns is reported again.
pub fn reconcile(new: &CanonicalState, previous: &CanonicalState) -> ReconcileOutcome {
    let mut delta = crate::Delta::new();
    let mut has_changes = false;

    for (key, activity) in &new.activity {
        let (seen_positions, seen_trades) = match previous.activity.get(key) {
            Some(prev) => (
                fingerprints(&prev.open_positions),
                fingerprints(&prev.recent_trades),
            ),
            None => (BTreeSet::new(), BTreeSet::new()),
        };

        let entry = EntityDelta {
            positions: unseen(&activity.open_positions, &seen_positions),
            trades: unseen(&activity.recent_trades, &seen_trades),
        };
        has_changes |= !entry.is_empty();
        delta.insert(*key, entry);
    }

    ReconcileOutcome {
        accounts: new.accounts.clone(),
        delta,
        has_changes,
    }
}
