//! Structural classification of a raw feed payload.

use serde_json::Value;

/// The payload shapes the upstream API has been observed to emit.
///
/// Selected by inspecting the top-level structure once; the canonicalizer
/// then dispatches on the variant instead of trying parsers in turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawPayload<'a> {
    /// `{"models": [ {per-entity object}, ... ]}`
    Models(&'a [Value]),
    /// `{"accountTotals": [ {per-entity object}, ... ]}`
    AccountTotals(&'a [Value]),
    /// `{"trades": [ {flat trade with its own model_id}, ... ]}`
    FlatTrades(&'a [Value]),
    /// A top-level array; elements are classified one by one.
    BareList(&'a [Value]),
    /// `null` or an empty object.
    Empty,
    /// Anything else (scalar, object without a known list key).
    Unrecognized,
}

impl<'a> RawPayload<'a> {
    /// Precedence when several keys exist: `models`, `accountTotals`, `trades`.
    pub fn classify(raw: &'a Value) -> Self {
        match raw {
            Value::Null => RawPayload::Empty,
            Value::Array(items) => RawPayload::BareList(items),
            Value::Object(map) => {
                if let Some(Value::Array(items)) = map.get("models") {
                    RawPayload::Models(items)
                } else if let Some(Value::Array(items)) = map.get("accountTotals") {
                    RawPayload::AccountTotals(items)
                } else if let Some(Value::Array(items)) = map.get("trades") {
                    RawPayload::FlatTrades(items)
                } else if map.is_empty() {
                    RawPayload::Empty
                } else {
                    RawPayload::Unrecognized
                }
            }
            _ => RawPayload::Unrecognized,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RawPayload::Models(_) => "models",
            RawPayload::AccountTotals(_) => "account_totals",
            RawPayload::FlatTrades(_) => "flat_trades",
            RawPayload::BareList(_) => "bare_list",
            RawPayload::Empty => "empty",
            RawPayload::Unrecognized => "unrecognized",
        }
    }
}

/// Keys that only a per-entity object carries. A bare-list element holding
/// any of them is parsed as an entity record, otherwise as a flat trade.
const ENTITY_RECORD_KEYS: &[&str] = &[
    "open_positions",
    "positions",
    "recent_trades",
    "equity",
    "dollar_equity",
    "realized_pnl",
    "total_unrealized_pnl",
    "unrealized",
    "sharpe",
    "sharpe_ratio",
];

pub(crate) fn is_entity_record(obj: &serde_json::Map<String, Value>) -> bool {
    ENTITY_RECORD_KEYS.iter().any(|k| obj.contains_key(*k))
        || matches!(obj.get("trades"), Some(Value::Array(_)))
}
