//! Counters for every lenient coercion the canonicalizer performs.
//!
//! Upstream payloads are loose; defaulting a field is not an error, but it
//! must not be silent either. Each fallback bumps a counter here and emits a
//! `debug!` event naming the field.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CoercionKind {
    /// Top-level payload matched no known shape.
    UnrecognizedShape,
    /// A list element that is not a JSON object.
    MalformedRecord,
    /// Entity name matched no target.
    UnknownEntity,
    /// Entity name matched an excluded needle.
    ExcludedEntity,
    /// Numeric field absent under every alias; `0.0` used.
    MissingNumeric,
    /// Numeric alias present but not a JSON number; skipped.
    NonNumeric,
    /// Text field absent or not a string; fallback used.
    MissingText,
    /// Position side derived from the sign of its quantity.
    InferredSide,
    /// Leverage absent; `1x` used.
    DefaultLeverage,
}

impl CoercionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoercionKind::UnrecognizedShape => "unrecognized_shape",
            CoercionKind::MalformedRecord => "malformed_record",
            CoercionKind::UnknownEntity => "unknown_entity",
            CoercionKind::ExcludedEntity => "excluded_entity",
            CoercionKind::MissingNumeric => "missing_numeric",
            CoercionKind::NonNumeric => "non_numeric",
            CoercionKind::MissingText => "missing_text",
            CoercionKind::InferredSide => "inferred_side",
            CoercionKind::DefaultLeverage => "default_leverage",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoercionDiagnostics {
    counts: BTreeMap<CoercionKind, usize>,
}

impl CoercionDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// `field` names the alias (or entity name) that triggered the fallback.
    pub fn record(&mut self, kind: CoercionKind, field: &str) {
        *self.counts.entry(kind).or_insert(0) += 1;
        tracing::debug!(kind = kind.as_str(), field, "coercion fallback");
    }

    pub fn count(&self, kind: CoercionKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn merge(&mut self, other: &CoercionDiagnostics) {
        for (kind, n) in &other.counts {
            *self.counts.entry(*kind).or_insert(0) += n;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CoercionKind, usize)> + '_ {
        self.counts.iter().map(|(k, n)| (*k, *n))
    }
}

impl fmt::Display for CoercionDiagnostics {
    /// `non_numeric=1 unknown_entity=2`, or `clean`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.counts.is_empty() {
            return f.write_str("clean");
        }
        let parts: Vec<String> = self
            .counts
            .iter()
            .map(|(k, n)| format!("{}={}", k.as_str(), n))
            .collect();
        f.write_str(&parts.join(" "))
    }
}
