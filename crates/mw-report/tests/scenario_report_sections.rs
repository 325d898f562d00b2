//! Scenario: account figures are always reported, even when an entity has
//! nothing new.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use mw_config::EntityRoster;
use mw_reconcile::{reconcile, Delta};
use mw_report::{chunk_text, ReportRenderer};
use mw_schemas::*;

fn renderer() -> ReportRenderer {
    ReportRenderer::new("NoF1 AI Trading Update", EntityRoster::defaults())
}

#[test]
fn scenario_account_shown_with_empty_delta() {
    let mut state = CanonicalState::empty();
    state.accounts.insert(
        EntityKey::Grok,
        AccountState {
            pnl: -50.0,
            equity: 9950.0,
            unrealized: 0.0,
            sharpe: -0.2,
        },
    );
    state.activity.insert(EntityKey::Grok, EntityActivity::default());

    let out = reconcile(&state, &state);
    let text = renderer().render(
        &out.accounts,
        &out.delta,
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
    );

    assert!(text.contains("*Grok*"));
    assert!(text.contains("Stats: PnL: $-50.00 | Equity: $9,950.00 | Unrealized: $0.00 | Sharpe: -0.20"));
    assert!(text.contains("- No new/updated open positions"));
    assert!(text.ends_with("- No new/updated trades"));
}

#[test]
fn scenario_sections_sorted_and_missing_account_is_zero() {
    let mut accounts = BTreeMap::new();
    accounts.insert(EntityKey::Qwen, AccountState::default());
    let mut delta = Delta::new();
    delta.insert(EntityKey::Claude, Default::default());

    let text = renderer().render(&accounts, &delta, Utc::now());
    let claude = text.find("*Claude*").unwrap();
    let qwen = text.find("*Qwen*").unwrap();
    assert!(claude < qwen);
    assert_eq!(text.matches("Stats: PnL: $0.00 | Equity: $0.00").count(), 2);
}

#[test]
fn scenario_long_report_chunks_on_section_breaks() {
    let mut accounts = BTreeMap::new();
    for k in EntityKey::ALL {
        accounts.insert(k, AccountState::default());
    }
    let text = renderer().render(&accounts, &Delta::new(), Utc::now());

    let chunks = chunk_text(&text, 200);
    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.chars().count() <= 200));
    assert!(chunks.iter().skip(1).all(|c| !c.starts_with('\n')));
    assert_eq!(chunks.concat().matches("Stats:").count(), 4);
}
