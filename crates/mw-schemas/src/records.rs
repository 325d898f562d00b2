use serde::{Deserialize, Serialize};

use crate::Side;

/// Per-model account figures. Reported every cycle; never gates a report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountState {
    /// Realized profit/loss.
    pub pnl: f64,
    pub equity: f64,
    /// Unrealized profit/loss across open positions.
    pub unrealized: f64,
    /// Risk-adjusted return (Sharpe ratio as published upstream).
    pub sharpe: f64,
}

/// One open position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub asset: String,
    pub side: Side,
    #[serde(rename = "qty")]
    pub quantity: f64,
    #[serde(rename = "entry")]
    pub entry_price: f64,
    #[serde(rename = "current")]
    pub current_price: f64,
    #[serde(rename = "pnl")]
    pub unrealized_pnl: f64,
    /// Always carries the multiplier suffix when it came from a number (`"5x"`).
    #[serde(rename = "lev")]
    pub leverage: String,
    #[serde(rename = "conf")]
    pub confidence: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            asset: "Unknown".to_string(),
            side: Side::Unknown,
            quantity: 0.0,
            entry_price: 0.0,
            current_price: 0.0,
            unrealized_pnl: 0.0,
            leverage: "1x".to_string(),
            confidence: 0.0,
        }
    }
}

/// One closed trade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trade {
    pub asset: String,
    pub side: Side,
    #[serde(rename = "entry")]
    pub entry_price: f64,
    /// Human-readable entry time; empty when upstream gave none.
    pub entry_time: String,
    #[serde(rename = "exit")]
    pub exit_price: f64,
    pub exit_time: String,
    #[serde(rename = "pnl")]
    pub realized_pnl: f64,
}

impl Default for Trade {
    fn default() -> Self {
        Self {
            asset: "Unknown".to_string(),
            side: Side::Unknown,
            entry_price: 0.0,
            entry_time: String::new(),
            exit_price: 0.0,
            exit_time: String::new(),
            realized_pnl: 0.0,
        }
    }
}
