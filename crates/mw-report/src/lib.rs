//! mw-report
//!
//! Plain-text report rendering for one cycle's delta. The output uses
//! Telegram-flavoured Markdown only for `*Entity*` headings.

mod chunk;
mod format;

pub use chunk::chunk_text;
pub use format::{format_money, format_quantity};

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use mw_config::EntityRoster;
use mw_reconcile::{Delta, EntityDelta, Tagged};
use mw_schemas::{AccountState, EntityKey, Position, Trade};

#[derive(Clone, Debug)]
pub struct ReportRenderer {
    title: String,
    roster: EntityRoster,
}

impl ReportRenderer {
    pub fn new(title: impl Into<String>, roster: EntityRoster) -> Self {
        Self {
            title: title.into(),
            roster,
        }
    }

    /// Render the report. One section per entity that has an account or a
    /// delta entry, in [`EntityKey`] order. Account figures are always
    /// shown; record lines only for new/updated records.
    pub fn render(
        &self,
        accounts: &BTreeMap<EntityKey, AccountState>,
        delta: &Delta,
        generated_at: DateTime<Utc>,
    ) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.push(format!(
            "{} - {} UTC",
            self.title,
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        let models: Vec<&str> = self
            .roster
            .target_keys()
            .iter()
            .map(|k| k.as_str())
            .collect();
        lines.push(format!("Models: {}", models.join(", ")));
        lines.push(String::new());

        let entities: BTreeSet<EntityKey> = accounts.keys().chain(delta.keys()).copied().collect();
        let zero = AccountState::default();
        let none = EntityDelta::default();

        for key in entities {
            let acc = accounts.get(&key).unwrap_or(&zero);
            let d = delta.get(&key).unwrap_or(&none);

            lines.push(format!("*{key}*"));
            lines.push(format!(
                "Stats: PnL: {} | Equity: {} | Unrealized: {} | Sharpe: {:.2}",
                format_money(acc.pnl),
                format_money(acc.equity),
                format_money(acc.unrealized),
                acc.sharpe
            ));

            lines.push(String::new());
            lines.push("Open Positions:".to_string());
            if d.positions.is_empty() {
                lines.push("- No new/updated open positions".to_string());
            } else {
                lines.extend(d.positions.iter().map(position_line));
            }

            lines.push(String::new());
            lines.push("Recent Trades:".to_string());
            if d.trades.is_empty() {
                lines.push("- No new/updated trades".to_string());
            } else {
                lines.extend(d.trades.iter().map(trade_line));
            }

            lines.push(String::new());
        }

        lines.join("\n").trim().to_string()
    }
}

fn position_line(t: &Tagged<Position>) -> String {
    let p = &t.record;
    format!(
        "- {}{} {} | Qty: {} | Entry: {} | Current: {} | PnL: {} | Lev: {} | Conf: {:.2}",
        t.tag.label(),
        p.asset,
        p.side,
        format_quantity(p.quantity),
        format_money(p.entry_price),
        format_money(p.current_price),
        format_money(p.unrealized_pnl),
        p.leverage,
        p.confidence
    )
}

fn trade_line(t: &Tagged<Trade>) -> String {
    let r = &t.record;
    format!(
        "- {}{} {} | Entry: {} ({}) | Exit: {} ({}) | PnL: {}",
        t.tag.label(),
        r.asset,
        r.side,
        format_money(r.entry_price),
        r.entry_time,
        format_money(r.exit_price),
        r.exit_time,
        format_money(r.realized_pnl)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mw_schemas::Side;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 25, 14, 30, 0).unwrap()
    }

    #[test]
    fn header_lists_roster_in_priority_order() {
        let r = ReportRenderer::new("NoF1 AI Trading Update", EntityRoster::defaults());
        let out = r.render(&BTreeMap::new(), &Delta::new(), at());
        assert_eq!(
            out,
            "NoF1 AI Trading Update - 2025-10-25 14:30:00 UTC\nModels: Deepseek, Qwen, Grok, Claude"
        );
    }

    #[test]
    fn full_section_layout() {
        let mut accounts = BTreeMap::new();
        accounts.insert(
            EntityKey::Deepseek,
            AccountState {
                pnl: 1234.5,
                equity: 11234.5,
                unrealized: -20.0,
                sharpe: 0.456,
            },
        );
        let mut delta = Delta::new();
        delta.insert(
            EntityKey::Deepseek,
            EntityDelta {
                positions: vec![Tagged::new_or_updated(Position {
                    asset: "BTC".to_string(),
                    side: Side::Long,
                    quantity: 0.05,
                    entry_price: 45000.0,
                    current_price: 46000.0,
                    unrealized_pnl: 50.0,
                    leverage: "5x".to_string(),
                    confidence: 0.85,
                })],
                trades: vec![Tagged::new_or_updated(Trade {
                    asset: "ETH".to_string(),
                    side: Side::Long,
                    entry_price: 3000.0,
                    entry_time: "10/25 10:00".to_string(),
                    exit_price: 3100.0,
                    exit_time: String::new(),
                    realized_pnl: 100.0,
                })],
            },
        );

        let out = ReportRenderer::new("T", EntityRoster::defaults()).render(&accounts, &delta, at());
        let expected = "\
T - 2025-10-25 14:30:00 UTC
Models: Deepseek, Qwen, Grok, Claude

*Deepseek*
Stats: PnL: $1,234.50 | Equity: $11,234.50 | Unrealized: $-20.00 | Sharpe: 0.46

Open Positions:
- New/Updated: BTC Long | Qty: 0.05 | Entry: $45,000.00 | Current: $46,000.00 | PnL: $50.00 | Lev: 5x | Conf: 0.85

Recent Trades:
- New/Updated: ETH Long | Entry: $3,000.00 (10/25 10:00) | Exit: $3,100.00 () | PnL: $100.00";
        assert_eq!(out, expected);
    }
}
