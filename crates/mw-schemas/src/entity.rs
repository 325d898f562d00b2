use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of tracked trading models.
///
/// Variant order is the lexical order of the display names, so `Ord` gives
/// the report section order directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKey {
    Claude,
    Deepseek,
    Grok,
    Qwen,
}

impl EntityKey {
    pub const ALL: [EntityKey; 4] = [
        EntityKey::Claude,
        EntityKey::Deepseek,
        EntityKey::Grok,
        EntityKey::Qwen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKey::Claude => "Claude",
            EntityKey::Deepseek => "Deepseek",
            EntityKey::Grok => "Grok",
            EntityKey::Qwen => "Qwen",
        }
    }

    /// Exact (case-insensitive) name lookup. Substring matching against raw
    /// upstream identifiers is the roster's job, not this one.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a position or closed trade.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Side {
    Long,
    Short,
    #[default]
    Unknown,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "Long",
            Side::Short => "Short",
            Side::Unknown => "Unknown",
        }
    }

    /// Map an upstream side string. Returns `None` for blank or unrecognised
    /// input so callers can decide on a fallback (inference vs `Unknown`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Some(Side::Long),
            "short" | "sell" => Some(Side::Short),
            _ => None,
        }
    }

    /// Positions without an explicit side: positive quantity is long,
    /// everything else (including zero) is short.
    pub fn from_quantity(qty: f64) -> Self {
        if qty > 0.0 {
            Side::Long
        } else {
            Side::Short
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
