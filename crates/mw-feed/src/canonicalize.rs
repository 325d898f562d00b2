//! Raw feed payload → [`CanonicalState`] fragment.
//!
//! Pure and total: any JSON value produces a fragment (possibly empty) plus
//! diagnostics. Records for entities outside the roster are dropped here, so
//! nothing downstream ever sees a key outside [`EntityKey`].

use mw_config::{EntityRoster, Resolution};
use mw_schemas::{AccountState, CanonicalState, EntityActivity, EntityKey, Position, Side, Trade};
use serde_json::Value;

use crate::coerce::{self, Object};
use crate::diagnostics::{CoercionDiagnostics, CoercionKind};
use crate::payload::{is_entity_record, RawPayload};

const ENTITY_NAME_FIELDS: &[&str] = &["name", "id", "model", "model_id"];
const TRADE_ENTITY_FIELDS: &[&str] = &["model_id", "model", "name"];

// Nested records name the asset first; flat trade rows lead with the symbol.
const NESTED_ASSET_FIELDS: &[&str] = &["asset", "symbol"];
const FLAT_ASSET_FIELDS: &[&str] = &["symbol", "asset"];

const ACCOUNT_FIELDS: &[&str] = &[
    "pnl",
    "realized_pnl",
    "equity",
    "dollar_equity",
    "unrealized",
    "total_unrealized_pnl",
    "sharpe",
    "sharpe_ratio",
];

/// Result of canonicalizing one payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Canonicalized {
    pub state: CanonicalState,
    pub diagnostics: CoercionDiagnostics,
}

#[derive(Clone, Debug, Default)]
pub struct Canonicalizer {
    roster: EntityRoster,
}

impl Canonicalizer {
    pub fn new(roster: EntityRoster) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &EntityRoster {
        &self.roster
    }

    /// Account-totals feed boundary.
    pub fn canonicalize_account_totals(&self, raw: &Value) -> Canonicalized {
        self.canonicalize(raw)
    }

    /// Trades feed boundary.
    pub fn canonicalize_trades(&self, raw: &Value) -> Canonicalized {
        self.canonicalize(raw)
    }

    pub fn canonicalize(&self, raw: &Value) -> Canonicalized {
        let mut out = Canonicalized::default();
        let payload = RawPayload::classify(raw);

        match payload {
            RawPayload::Models(items) | RawPayload::AccountTotals(items) => {
                for item in items {
                    if let Some(obj) = as_record(item, &mut out.diagnostics) {
                        self.ingest_entity_record(obj, &mut out);
                    }
                }
            }
            RawPayload::FlatTrades(items) => {
                for item in items {
                    if let Some(obj) = as_record(item, &mut out.diagnostics) {
                        self.ingest_flat_trade(obj, &mut out);
                    }
                }
            }
            RawPayload::BareList(items) => {
                for item in items {
                    if let Some(obj) = as_record(item, &mut out.diagnostics) {
                        if is_entity_record(obj) {
                            self.ingest_entity_record(obj, &mut out);
                        } else {
                            self.ingest_flat_trade(obj, &mut out);
                        }
                    }
                }
            }
            RawPayload::Empty => {}
            RawPayload::Unrecognized => {
                out.diagnostics
                    .record(CoercionKind::UnrecognizedShape, payload.label());
            }
        }

        tracing::debug!(
            shape = payload.label(),
            accounts = out.state.accounts.len(),
            positions = out.state.position_count(),
            trades = out.state.trade_count(),
            diagnostics = %out.diagnostics,
            "payload canonicalized"
        );
        out
    }

    fn resolve(
        &self,
        obj: &Object,
        fields: &[&str],
        diag: &mut CoercionDiagnostics,
    ) -> Option<EntityKey> {
        let Some(raw) = coerce::entity_name(obj, fields) else {
            diag.record(CoercionKind::UnknownEntity, "<missing>");
            return None;
        };
        match self.roster.resolve(&raw) {
            Resolution::Target(key) => Some(key),
            Resolution::Excluded => {
                diag.record(CoercionKind::ExcludedEntity, &raw);
                None
            }
            Resolution::Unknown => {
                diag.record(CoercionKind::UnknownEntity, &raw);
                None
            }
        }
    }

    /// One model with account figures and/or nested positions and trades.
    ///
    /// Each record owns the whole per-entity block: when the same entity
    /// appears again in one payload, the later record replaces both its
    /// account and its activity. The account is present only when the record
    /// carries at least one account figure.
    fn ingest_entity_record(&self, obj: &Object, out: &mut Canonicalized) {
        let Some(key) = self.resolve(obj, ENTITY_NAME_FIELDS, &mut out.diagnostics) else {
            return;
        };
        let diag = &mut out.diagnostics;

        if ACCOUNT_FIELDS.iter().any(|f| obj.contains_key(*f)) {
            let account = AccountState {
                pnl: coerce::number(obj, &["pnl", "realized_pnl"], diag),
                equity: coerce::number(obj, &["equity", "dollar_equity"], diag),
                unrealized: coerce::number(obj, &["unrealized", "total_unrealized_pnl"], diag),
                sharpe: coerce::number(obj, &["sharpe", "sharpe_ratio"], diag),
            };
            out.state.accounts.insert(key, account);
        } else {
            out.state.accounts.remove(&key);
        }

        let positions = obj
            .get("open_positions")
            .filter(|v| !v.is_null())
            .or_else(|| obj.get("positions").filter(|v| !v.is_null()));
        let trades = obj
            .get("recent_trades")
            .filter(|v| !v.is_null())
            .or_else(|| obj.get("trades").filter(|v| !v.is_null()));

        if positions.is_none() && trades.is_none() {
            out.state.activity.remove(&key);
            return;
        }

        let mut activity = EntityActivity::default();
        match positions {
            Some(Value::Array(items)) => {
                for item in items {
                    if let Some(p) = as_record(item, diag) {
                        activity.open_positions.push(parse_position(p, None, diag));
                    }
                }
            }
            Some(Value::Object(by_symbol)) => {
                for (symbol, item) in by_symbol {
                    if let Some(p) = as_record(item, diag) {
                        activity
                            .open_positions
                            .push(parse_position(p, Some(symbol.as_str()), diag));
                    }
                }
            }
            Some(_) => diag.record(CoercionKind::MalformedRecord, "open_positions"),
            None => {}
        }
        match trades {
            Some(Value::Array(items)) => {
                for item in items {
                    if let Some(t) = as_record(item, diag) {
                        activity
                            .recent_trades
                            .push(parse_trade(t, NESTED_ASSET_FIELDS, diag));
                    }
                }
            }
            Some(_) => diag.record(CoercionKind::MalformedRecord, "recent_trades"),
            None => {}
        }
        out.state.activity.insert(key, activity);
    }

    /// One closed trade carrying its own model reference.
    fn ingest_flat_trade(&self, obj: &Object, out: &mut Canonicalized) {
        let Some(key) = self.resolve(obj, TRADE_ENTITY_FIELDS, &mut out.diagnostics) else {
            return;
        };
        let trade = parse_trade(obj, FLAT_ASSET_FIELDS, &mut out.diagnostics);
        out.state
            .activity
            .entry(key)
            .or_default()
            .recent_trades
            .push(trade);
    }
}

fn as_record<'a>(v: &'a Value, diag: &mut CoercionDiagnostics) -> Option<&'a Object> {
    match v {
        Value::Object(map) => Some(map),
        _ => {
            diag.record(CoercionKind::MalformedRecord, "record");
            None
        }
    }
}

fn asset(
    obj: &Object,
    aliases: &[&str],
    fallback: Option<&str>,
    diag: &mut CoercionDiagnostics,
) -> String {
    if let Some(a) = coerce::text(obj, aliases) {
        return a;
    }
    match fallback.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_string(),
        None => {
            diag.record(CoercionKind::MissingText, "asset");
            "Unknown".to_string()
        }
    }
}

fn parse_position(obj: &Object, symbol: Option<&str>, diag: &mut CoercionDiagnostics) -> Position {
    let quantity = coerce::number(obj, &["qty", "quantity"], diag);
    let side = match coerce::side(obj) {
        Some(s) => s,
        None => {
            diag.record(CoercionKind::InferredSide, "side");
            Side::from_quantity(quantity)
        }
    };
    Position {
        asset: asset(obj, NESTED_ASSET_FIELDS, symbol, diag),
        side,
        quantity,
        entry_price: coerce::number(obj, &["entry", "entry_price"], diag),
        current_price: coerce::number(obj, &["current", "current_price"], diag),
        unrealized_pnl: coerce::number(obj, &["pnl", "unrealized_pnl"], diag),
        leverage: coerce::leverage(obj, diag),
        confidence: coerce::number(obj, &["conf", "confidence"], diag),
    }
}

fn parse_trade(obj: &Object, asset_fields: &[&str], diag: &mut CoercionDiagnostics) -> Trade {
    Trade {
        asset: asset(obj, asset_fields, None, diag),
        side: coerce::side(obj).unwrap_or(Side::Unknown),
        entry_price: coerce::number(obj, &["entry", "entry_price"], diag),
        entry_time: coerce::timestamp(obj, &["entry_human_time", "entry_time"], diag),
        exit_price: coerce::number(obj, &["exit", "exit_price"], diag),
        exit_time: coerce::timestamp(obj, &["exit_human_time", "exit_time"], diag),
        realized_pnl: coerce::number(obj, &["pnl", "realized_net_pnl"], diag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canon() -> Canonicalizer {
        Canonicalizer::new(EntityRoster::defaults())
    }

    #[test]
    fn null_payload_is_an_empty_fragment() {
        let out = canon().canonicalize(&Value::Null);
        assert!(out.state.is_empty());
        assert!(out.diagnostics.is_clean());
    }

    #[test]
    fn side_inferred_from_quantity_sign() {
        let out = canon().canonicalize(&json!({"models": [
            {"id": "grok-4", "positions": [
                {"symbol": "BTC", "quantity": -0.5},
                {"symbol": "ETH", "quantity": 2}
            ]}
        ]}));
        let ps = &out.state.activity[&EntityKey::Grok].open_positions;
        assert_eq!(ps[0].side, Side::Short);
        assert_eq!(ps[1].side, Side::Long);
        assert_eq!(out.diagnostics.count(CoercionKind::InferredSide), 2);
        assert!(!out.state.accounts.contains_key(&EntityKey::Grok));
    }

    #[test]
    fn positions_keyed_by_symbol_use_key_as_asset() {
        let out = canon().canonicalize(&json!({"accountTotals": [
            {"model_id": "qwen3-max", "dollar_equity": 10500.0,
             "positions": {"SOL": {"quantity": 10, "entry_price": 150, "leverage": 3}}}
        ]}));
        let p = &out.state.activity[&EntityKey::Qwen].open_positions[0];
        assert_eq!(p.asset, "SOL");
        assert_eq!(p.leverage, "3x");
        assert_eq!(out.state.accounts[&EntityKey::Qwen].equity, 10500.0);
    }

    #[test]
    fn malformed_and_unrecognized_inputs_are_counted_not_fatal() {
        let out = canon().canonicalize(&json!({"trades": [42, "x", {"model_id": "claude-x", "symbol": "ETH"}]}));
        assert_eq!(out.diagnostics.count(CoercionKind::MalformedRecord), 2);
        assert_eq!(out.state.trade_count(), 1);

        let out = canon().canonicalize(&json!({"unexpected": true}));
        assert!(out.state.is_empty());
        assert_eq!(out.diagnostics.count(CoercionKind::UnrecognizedShape), 1);
    }

    #[test]
    fn repeated_entity_takes_the_later_block_whole() {
        let out = canon().canonicalize(&json!({"accountTotals": [
            {"model_id": "grok-4", "dollar_equity": 1.0,
             "positions": {"BTC": {"quantity": 1}}},
            {"model_id": "grok-4", "dollar_equity": 2.0,
             "positions": {"ETH": {"quantity": 2}}}
        ]}));
        assert_eq!(out.state.accounts[&EntityKey::Grok].equity, 2.0);
        let assets: Vec<&str> = out.state.activity[&EntityKey::Grok]
            .open_positions
            .iter()
            .map(|p| p.asset.as_str())
            .collect();
        assert_eq!(assets, vec!["ETH"]);
    }

    #[test]
    fn repeated_entity_without_activity_drops_the_earlier_lists() {
        let out = canon().canonicalize(&json!({"models": [
            {"id": "claude-sonnet", "equity": 5.0,
             "recent_trades": [{"asset": "SOL", "side": "long"}]},
            {"id": "claude-sonnet", "equity": 6.0}
        ]}));
        assert_eq!(out.state.accounts[&EntityKey::Claude].equity, 6.0);
        assert!(!out.state.activity.contains_key(&EntityKey::Claude));
    }

    #[test]
    fn asset_alias_order_depends_on_record_kind() {
        let out = canon().canonicalize(&json!({"trades": [
            {"model_id": "qwen3-max", "symbol": "BTC", "asset": "XBT"}
        ]}));
        assert_eq!(out.state.activity[&EntityKey::Qwen].recent_trades[0].asset, "BTC");

        let out = canon().canonicalize(&json!({"models": [
            {"id": "qwen3-max",
             "positions": [{"symbol": "BTC", "asset": "XBT", "quantity": 1}],
             "recent_trades": [{"symbol": "ETH", "asset": "WETH"}]}
        ]}));
        let qwen = &out.state.activity[&EntityKey::Qwen];
        assert_eq!(qwen.open_positions[0].asset, "XBT");
        assert_eq!(qwen.recent_trades[0].asset, "WETH");
    }
}
