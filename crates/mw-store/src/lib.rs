//! mw-store
//!
//! Single-slot snapshot persistence for the last observed [`CanonicalState`].
//!
//! File format (pretty JSON):
//! `{"accounts": {...}, "schema_version": 1, "trades": {Entity: {"open_positions": [...], "recent_trades": [...]}}}`
//!
//! Writes are atomic: temp file in the same directory, `sync_all`, rename.
//! A crash mid-write leaves the previous snapshot intact. Reads never fail
//! the caller: anything unreadable is logged and treated as "no snapshot".

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use mw_schemas::CanonicalState;
use serde_json::Value;

pub const SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last persisted state, or empty. Never fails.
    pub fn load(&self) -> CanonicalState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "no snapshot yet; starting from empty state");
                CanonicalState::empty()
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %format!("{e:#}"),
                    "snapshot unreadable; starting from empty state"
                );
                CanonicalState::empty()
            }
        }
    }

    /// `Ok(None)` when no file exists; `Err` for unreadable, corrupt or
    /// newer-version files.
    pub fn try_load(&self) -> Result<Option<CanonicalState>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read snapshot failed: {}", self.path.display()))
            }
        };

        let doc: Value = serde_json::from_str(&raw)
            .with_context(|| format!("snapshot is not valid json: {}", self.path.display()))?;

        let version = match doc.get("schema_version") {
            None | Some(Value::Null) => SCHEMA_VERSION,
            Some(v) => match v.as_u64() {
                Some(n) => n,
                None => bail!("SNAPSHOT_INVALID schema_version={v}"),
            },
        };
        if version > SCHEMA_VERSION {
            bail!(
                "SNAPSHOT_VERSION_UNSUPPORTED schema_version={} (this build reads <= {})",
                version,
                SCHEMA_VERSION
            );
        }

        let state: CanonicalState = serde_json::from_value(doc)
            .with_context(|| format!("snapshot has unexpected shape: {}", self.path.display()))?;
        Ok(Some(state))
    }

    /// Replace the persisted snapshot with `state`.
    ///
    /// On failure the temp file is removed and the previous snapshot (if
    /// any) is left untouched.
    pub fn save(&self, state: &CanonicalState) -> Result<()> {
        let mut doc = serde_json::to_value(state).context("serialize snapshot failed")?;
        if let Value::Object(map) = &mut doc {
            map.insert("schema_version".to_string(), Value::from(SCHEMA_VERSION));
        }
        let mut bytes = serde_json::to_vec_pretty(&doc).context("serialize snapshot failed")?;
        bytes.push(b'\n');

        atomic_write(&self.path, &bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            entities = state.entities().len(),
            bytes = bytes.len(),
            "snapshot saved"
        );
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .with_context(|| format!("snapshot path has no file name: {}", path.display()))?;
    let temp_name = format!(".{}.tmp.{}", name.to_string_lossy(), std::process::id());
    Ok(path.with_file_name(temp_name))
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create snapshot dir failed: {}", parent.display()))?;
    }

    let temp_path = temp_path_for(path)?;
    let result = write_then_rename(&temp_path, path, data);
    if result.is_err() {
        // Best effort.
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_then_rename(temp_path: &Path, path: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(temp_path)
        .with_context(|| format!("create temp file failed: {}", temp_path.display()))?;
    file.write_all(data)
        .with_context(|| format!("write temp file failed: {}", temp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("sync temp file failed: {}", temp_path.display()))?;
    drop(file);

    fs::rename(temp_path, path).with_context(|| {
        format!(
            "rename {} to {} failed",
            temp_path.display(),
            path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_is_hidden_sibling() {
        let t = temp_path_for(Path::new("/var/lib/mw/snap.json")).unwrap();
        assert_eq!(t.parent(), Some(Path::new("/var/lib/mw")));
        let name = t.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(".snap.json.tmp."));
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        assert!(temp_path_for(Path::new("/")).is_err());
    }
}
