//! Scenario: a closed trade is reported once, then suppressed while it stays
//! in the latest snapshot.

use mw_reconcile::*;
use mw_schemas::*;

fn eth_trade() -> Trade {
    Trade {
        asset: "ETH".to_string(),
        side: Side::Long,
        entry_price: 3000.0,
        exit_price: 3100.0,
        realized_pnl: 100.0,
        ..Trade::default()
    }
}

fn state_with_trades(trades: Vec<Trade>) -> CanonicalState {
    let mut s = CanonicalState::empty();
    s.activity.insert(
        EntityKey::Deepseek,
        EntityActivity {
            open_positions: vec![],
            recent_trades: trades,
        },
    );
    s
}

#[test]
fn scenario_seen_trade_is_suppressed() {
    let new = state_with_trades(vec![eth_trade()]);
    let previous = state_with_trades(vec![eth_trade()]);

    let out = reconcile(&new, &previous);
    assert!(!out.has_changes);
    assert!(out.delta[&EntityKey::Deepseek].is_empty());
}

#[test]
fn scenario_unseen_trade_is_tagged_new() {
    let new = state_with_trades(vec![eth_trade()]);
    let previous = state_with_trades(vec![]);

    let out = reconcile(&new, &previous);
    assert!(out.has_changes);
    let d = &out.delta[&EntityKey::Deepseek];
    assert_eq!(d.trades.len(), 1);
    assert_eq!(d.trades[0].tag, ChangeTag::NewOrUpdated);
    assert_eq!(d.trades[0].tag.label(), "New/Updated: ");
    assert_eq!(d.trades[0].record, eth_trade());
    assert_eq!(out.new_record_count(), 1);
}

#[test]
fn scenario_first_run_against_empty_snapshot_reports_everything() {
    let new = state_with_trades(vec![eth_trade()]);
    let out = reconcile(&new, &CanonicalState::empty());
    assert!(out.has_changes);
    assert_eq!(out.delta.len(), 1);
}

#[test]
fn scenario_changed_field_is_reported_as_updated() {
    let mut updated = eth_trade();
    updated.exit_time = "10/25 14:30".to_string();
    let out = reconcile(
        &state_with_trades(vec![updated]),
        &state_with_trades(vec![eth_trade()]),
    );
    assert!(out.has_changes);
    assert_eq!(out.delta[&EntityKey::Deepseek].trades[0].record.exit_time, "10/25 14:30");
}

#[test]
fn scenario_snapshot_round_trip_preserves_fingerprints() {
    let s = state_with_trades(vec![eth_trade(), Trade {
        realized_pnl: 0.1 + 0.2,
        ..eth_trade()
    }]);
    let text = serde_json::to_string_pretty(&s).unwrap();
    let reloaded: CanonicalState = serde_json::from_str(&text).unwrap();
    assert!(!reconcile(&s, &reloaded).has_changes);
}
