use std::collections::BTreeMap;

use mw_schemas::{AccountState, EntityKey, Position, Trade};

/// Why a record is in the delta. Only additions are detected; a record that
/// changed in place shows up as new because its fingerprint changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeTag {
    NewOrUpdated,
}

impl ChangeTag {
    /// Prefix used in rendered report lines.
    pub fn label(&self) -> &'static str {
        match self {
            ChangeTag::NewOrUpdated => "New/Updated: ",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tagged<T> {
    pub tag: ChangeTag,
    pub record: T,
}

impl<T> Tagged<T> {
    pub fn new_or_updated(record: T) -> Self {
        Self {
            tag: ChangeTag::NewOrUpdated,
            record,
        }
    }
}

/// New records for one entity, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityDelta {
    pub positions: Vec<Tagged<Position>>,
    pub trades: Vec<Tagged<Trade>>,
}

impl EntityDelta {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.trades.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len() + self.trades.len()
    }
}

pub type Delta = BTreeMap<EntityKey, EntityDelta>;

#[derive(Clone, Debug, PartialEq)]
pub struct ReconcileOutcome {
    /// Latest account figures for every entity, changed or not.
    pub accounts: BTreeMap<EntityKey, AccountState>,
    /// One entry per entity present in the latest activity, possibly empty.
    pub delta: Delta,
    /// True iff at least one position or trade is new.
    pub has_changes: bool,
}

impl ReconcileOutcome {
    pub fn new_record_count(&self) -> usize {
        self.delta.values().map(EntityDelta::len).sum()
    }
}
