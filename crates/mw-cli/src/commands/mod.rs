//! Command handler modules for the `mw` binary.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod run;
pub mod snapshot;

use anyhow::{Context, Result};
use mw_config::{LoadedConfig, ReporterConfig, UnusedKeyPolicy};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// `RUST_LOG` wins; otherwise `default_level` applies to everything.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.to_ascii_lowercase().into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the given YAML layers (none => built-in defaults), lint unused
/// keys, and build the typed config.
pub fn load_config(config_paths: &[String]) -> Result<(LoadedConfig, ReporterConfig)> {
    let loaded = if config_paths.is_empty() {
        mw_config::load_layered_yaml_from_strings(&[])?
    } else {
        let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
        mw_config::load_layered_yaml(&path_refs)?
    };

    let unused = mw_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    for pointer in &unused.unused_leaf_pointers {
        warn!(pointer = %pointer, "config key is not used by the reporter (typo?)");
    }

    let cfg = ReporterConfig::from_config_json(&loaded.config_json)
        .context("invalid reporter configuration")?;
    info!(
        config_hash = %loaded.config_hash,
        layers = config_paths.len(),
        snapshot = %cfg.snapshot_path.display(),
        interval_secs = cfg.interval.as_secs(),
        "config loaded"
    );
    Ok((loaded, cfg))
}
