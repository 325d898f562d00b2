//! Entity allow-list / deny-list matching.
//!
//! Upstream model identifiers look like `deepseek-chat-v3.1_119` or
//! `claude-sonnet-4-5_5`. Classification is case-insensitive substring
//! matching: excluded needles are checked first (exclusion wins on
//! ambiguity), then targets in priority order (first match wins).

use anyhow::{bail, Result};
use mw_schemas::EntityKey;

/// Outcome of classifying one raw identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Target(EntityKey),
    Excluded,
    Unknown,
}

impl Resolution {
    pub fn key(&self) -> Option<EntityKey> {
        match self {
            Resolution::Target(k) => Some(*k),
            Resolution::Excluded | Resolution::Unknown => None,
        }
    }
}

/// Immutable matching rules, built once from config and shared by reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityRoster {
    /// (lowercase needle, key) in priority order.
    targets: Vec<(String, EntityKey)>,
    /// Lowercase needles.
    excluded: Vec<String>,
}

impl EntityRoster {
    /// Every target name must name an [`EntityKey`]; the key set stays closed.
    pub fn new<S: AsRef<str>>(targets: &[S], excluded: &[S]) -> Result<Self> {
        if targets.is_empty() {
            bail!("CONFIG_INVALID /entities/targets: at least one target is required");
        }

        let mut parsed: Vec<(String, EntityKey)> = Vec::with_capacity(targets.len());
        for t in targets {
            let t = t.as_ref();
            let Some(key) = EntityKey::parse(t) else {
                bail!(
                    "CONFIG_INVALID /entities/targets: '{}' is not a known model (expected one of: {})",
                    t,
                    EntityKey::ALL.map(|k| k.as_str()).join(" | ")
                );
            };
            if parsed.iter().any(|(_, k)| *k == key) {
                bail!("CONFIG_INVALID /entities/targets: '{}' listed twice", t);
            }
            parsed.push((key.as_str().to_ascii_lowercase(), key));
        }

        let excluded = excluded
            .iter()
            .map(|e| e.as_ref().trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        Ok(Self {
            targets: parsed,
            excluded,
        })
    }

    /// Targets `deepseek, qwen, grok, claude`; excluded `gemini, gpt-5`.
    pub fn defaults() -> Self {
        Self {
            targets: [
                EntityKey::Deepseek,
                EntityKey::Qwen,
                EntityKey::Grok,
                EntityKey::Claude,
            ]
            .into_iter()
            .map(|k| (k.as_str().to_ascii_lowercase(), k))
            .collect(),
            excluded: vec!["gemini".to_string(), "gpt-5".to_string()],
        }
    }

    pub fn resolve(&self, raw: &str) -> Resolution {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.is_empty() {
            return Resolution::Unknown;
        }
        if self.excluded.iter().any(|ex| lower.contains(ex.as_str())) {
            return Resolution::Excluded;
        }
        self.targets
            .iter()
            .find(|(needle, _)| lower.contains(needle.as_str()))
            .map(|(_, k)| Resolution::Target(*k))
            .unwrap_or(Resolution::Unknown)
    }

    /// Target keys in configured priority order.
    pub fn target_keys(&self) -> Vec<EntityKey> {
        self.targets.iter().map(|(_, k)| *k).collect()
    }
}

impl Default for EntityRoster {
    fn default() -> Self {
        Self::defaults()
    }
}
