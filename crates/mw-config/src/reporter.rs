//! Typed view of the merged config document.
//!
//! Every value is read by JSON pointer with a default, so an empty config
//! is a complete, valid configuration. A present value of the wrong type is
//! a startup error: unlike upstream feed data, config is ours to get right.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use serde_json::Value;

use crate::EntityRoster;

pub const DEFAULT_ACCOUNT_TOTALS_URL: &str = "https://nof1.ai/api/account-totals";
pub const DEFAULT_TRADES_URL: &str = "https://nof1.ai/api/trades";
pub const DEFAULT_SNAPSHOT_PATH: &str = "nof1_data_record.json";
pub const DEFAULT_REPORT_TITLE: &str = "NoF1 AI Trading Update";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Clone, Debug, PartialEq)]
pub struct FeedsConfig {
    pub account_totals_url: String,
    pub trades_url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base of the exponential backoff (`backoff * 2^attempt`).
    pub backoff: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TelegramConfig {
    pub api_base: String,
    /// Env var NAME holding the bot token.
    pub bot_token_env: String,
    /// Env var NAME holding the chat id.
    pub chat_id_env: String,
    pub max_message_len: usize,
}

/// Everything the reporter needs, resolved once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct ReporterConfig {
    pub feeds: FeedsConfig,
    pub http: HttpConfig,
    pub interval: Duration,
    pub roster: EntityRoster,
    pub snapshot_path: PathBuf,
    pub report_title: String,
    pub telegram: TelegramConfig,
}

impl ReporterConfig {
    pub fn defaults() -> Self {
        Self {
            feeds: FeedsConfig {
                account_totals_url: DEFAULT_ACCOUNT_TOTALS_URL.to_string(),
                trades_url: DEFAULT_TRADES_URL.to_string(),
            },
            http: HttpConfig {
                timeout: Duration::from_secs(30),
                max_retries: 3,
                backoff: Duration::from_secs(1),
            },
            interval: Duration::from_secs(60),
            roster: EntityRoster::defaults(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            report_title: DEFAULT_REPORT_TITLE.to_string(),
            telegram: TelegramConfig {
                api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
                bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
                chat_id_env: "TELEGRAM_CHAT_ID".to_string(),
                max_message_len: 4000,
            },
        }
    }

    pub fn from_config_json(cfg: &Value) -> Result<Self> {
        let feeds = FeedsConfig {
            account_totals_url: str_at(cfg, "/feeds/account_totals_url")?
                .unwrap_or_else(|| DEFAULT_ACCOUNT_TOTALS_URL.to_string()),
            trades_url: str_at(cfg, "/feeds/trades_url")?
                .unwrap_or_else(|| DEFAULT_TRADES_URL.to_string()),
        };

        let timeout_secs = u64_at(cfg, "/http/timeout_secs")?.unwrap_or(30);
        if timeout_secs == 0 {
            bail!("CONFIG_INVALID /http/timeout_secs: must be > 0");
        }
        let backoff_secs = f64_at(cfg, "/http/backoff_secs")?.unwrap_or(1.0);
        if !backoff_secs.is_finite() || backoff_secs < 0.0 {
            bail!("CONFIG_INVALID /http/backoff_secs: must be a finite number >= 0");
        }
        let http = HttpConfig {
            timeout: Duration::from_secs(timeout_secs),
            max_retries: u64_at(cfg, "/http/max_retries")?
                .unwrap_or(3)
                .try_into()
                .unwrap_or(u32::MAX),
            backoff: Duration::from_secs_f64(backoff_secs),
        };

        let interval_secs = u64_at(cfg, "/schedule/interval_secs")?.unwrap_or(60);
        if interval_secs == 0 {
            bail!("CONFIG_INVALID /schedule/interval_secs: must be > 0");
        }

        let defaults = EntityRoster::defaults();
        let roster = match (
            str_list_at(cfg, "/entities/targets")?,
            str_list_at(cfg, "/entities/excluded")?,
        ) {
            (None, None) => defaults,
            (targets, excluded) => {
                let targets = targets.unwrap_or_else(|| {
                    defaults
                        .target_keys()
                        .iter()
                        .map(|k| k.as_str().to_string())
                        .collect()
                });
                let excluded =
                    excluded.unwrap_or_else(|| vec!["gemini".to_string(), "gpt-5".to_string()]);
                EntityRoster::new(&targets, &excluded)?
            }
        };

        let max_message_len = u64_at(cfg, "/delivery/telegram/max_message_len")?.unwrap_or(4000);
        if max_message_len < 100 {
            bail!("CONFIG_INVALID /delivery/telegram/max_message_len: must be >= 100");
        }
        let telegram = TelegramConfig {
            api_base: str_at(cfg, "/delivery/telegram/api_base")?
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            bot_token_env: str_at(cfg, "/delivery/telegram/bot_token_env")?
                .unwrap_or_else(|| "TELEGRAM_BOT_TOKEN".to_string()),
            chat_id_env: str_at(cfg, "/delivery/telegram/chat_id_env")?
                .unwrap_or_else(|| "TELEGRAM_CHAT_ID".to_string()),
            max_message_len: usize::try_from(max_message_len).unwrap_or(usize::MAX),
        };

        Ok(Self {
            feeds,
            http,
            interval: Duration::from_secs(interval_secs),
            roster,
            snapshot_path: PathBuf::from(
                str_at(cfg, "/snapshot/path")?.unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string()),
            ),
            report_title: str_at(cfg, "/report/title")?
                .unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string()),
            telegram,
        })
    }
}

// ---------------------------------------------------------------------------
// Pointer readers. Absent / null => Ok(None); wrong type => Err.
// ---------------------------------------------------------------------------

fn present<'a>(cfg: &'a Value, pointer: &str) -> Option<&'a Value> {
    cfg.pointer(pointer).filter(|v| !v.is_null())
}

fn str_at(cfg: &Value, pointer: &str) -> Result<Option<String>> {
    match present(cfg, pointer) {
        None => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => bail!("CONFIG_INVALID {pointer}: expected string, got {other}"),
    }
}

fn u64_at(cfg: &Value, pointer: &str) -> Result<Option<u64>> {
    match present(cfg, pointer) {
        None => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) => Ok(Some(n)),
            None => bail!("CONFIG_INVALID {pointer}: expected non-negative integer, got {v}"),
        },
    }
}

fn f64_at(cfg: &Value, pointer: &str) -> Result<Option<f64>> {
    match present(cfg, pointer) {
        None => Ok(None),
        Some(v) => match v.as_f64() {
            Some(n) => Ok(Some(n)),
            None => bail!("CONFIG_INVALID {pointer}: expected number, got {v}"),
        },
    }
}

fn str_list_at(cfg: &Value, pointer: &str) -> Result<Option<Vec<String>>> {
    match present(cfg, pointer) {
        None => Ok(None),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(s) => out.push(s.to_string()),
                    None => bail!("CONFIG_INVALID {pointer}: expected list of strings, got {item}"),
                }
            }
            Ok(Some(out))
        }
        Some(other) => bail!("CONFIG_INVALID {pointer}: expected list, got {other}"),
    }
}
