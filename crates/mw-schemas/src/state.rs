use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{AccountState, EntityKey, Position, Trade};

/// Open positions and recent closed trades for one model, in upstream order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityActivity {
    pub open_positions: Vec<Position>,
    pub recent_trades: Vec<Trade>,
}

impl EntityActivity {
    pub fn is_empty(&self) -> bool {
        self.open_positions.is_empty() && self.recent_trades.is_empty()
    }
}

/// Fully normalized view of one poll cycle. This is the unit of persistence.
///
/// Always built fresh from the latest fetch; the persisted copy is replaced
/// wholesale each cycle, never accumulated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalState {
    pub accounts: BTreeMap<EntityKey, AccountState>,
    /// Serialized as `trades` for compatibility with existing snapshot files.
    #[serde(rename = "trades")]
    pub activity: BTreeMap<EntityKey, EntityActivity>,
}

impl CanonicalState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.activity.is_empty()
    }

    /// Every entity that appears in either map.
    pub fn entities(&self) -> BTreeSet<EntityKey> {
        self.accounts
            .keys()
            .chain(self.activity.keys())
            .copied()
            .collect()
    }

    pub fn position_count(&self) -> usize {
        self.activity.values().map(|a| a.open_positions.len()).sum()
    }

    pub fn trade_count(&self) -> usize {
        self.activity.values().map(|a| a.recent_trades.len()).sum()
    }

    /// Assemble one cycle's state from two feed fragments.
    ///
    /// Per entity: the account comes from `primary` when present there; each
    /// record list comes from `primary` when non-empty there, otherwise from
    /// `secondary`. Lists are never concatenated.
    pub fn combine(primary: CanonicalState, secondary: CanonicalState) -> CanonicalState {
        let mut accounts = secondary.accounts;
        accounts.extend(primary.accounts);

        let mut activity = secondary.activity;
        for (key, prim) in primary.activity {
            let slot = activity.entry(key).or_default();
            if !prim.open_positions.is_empty() {
                slot.open_positions = prim.open_positions;
            }
            if !prim.recent_trades.is_empty() {
                slot.recent_trades = prim.recent_trades;
            }
        }

        CanonicalState { accounts, activity }
    }
}
