//! Delivery secret resolution.
//!
//! # Contract
//! - Config YAML stores only **env var NAMES** (e.g. `"TELEGRAM_BOT_TOKEN"`).
//! - At startup the CLI calls [`resolve_delivery_secrets`] once and passes the
//!   result into the notifier constructor; nothing else reads the environment.
//! - `Debug` redacts values.
//! - Error messages reference the env var **NAME**, never the value.
//!
//! Secrets are required only when a report will actually be delivered
//! (i.e. not in dry-run mode).

use anyhow::{bail, Result};

use crate::TelegramConfig;

/// Resolved Telegram credentials. **Values are redacted in `Debug` output.**
#[derive(Clone, PartialEq, Eq)]
pub struct DeliverySecrets {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl DeliverySecrets {
    /// Both values present.
    pub fn is_complete(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

impl std::fmt::Debug for DeliverySecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The chat id is not a credential on its own, but it is enough to
        // target the channel once a token leaks, so it is redacted too.
        f.debug_struct("DeliverySecrets")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<REDACTED>"))
            .field("chat_id", &self.chat_id.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// Resolve a named environment variable.
/// Returns `None` if the variable is unset or its value is blank.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// Resolve Telegram credentials from the process environment.
///
/// # Errors
/// When `required`, returns `Err` naming the first missing env var.
pub fn resolve_delivery_secrets(cfg: &TelegramConfig, required: bool) -> Result<DeliverySecrets> {
    resolve_delivery_secrets_with(cfg, required, resolve_env)
}

/// Same as [`resolve_delivery_secrets`] with an injectable lookup, so tests
/// do not have to mutate process-global environment.
pub fn resolve_delivery_secrets_with<F>(
    cfg: &TelegramConfig,
    required: bool,
    lookup: F,
) -> Result<DeliverySecrets>
where
    F: Fn(&str) -> Option<String>,
{
    let nonblank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let secrets = DeliverySecrets {
        bot_token: nonblank(&cfg.bot_token_env),
        chat_id: nonblank(&cfg.chat_id_env),
    };

    if required {
        if secrets.bot_token.is_none() {
            bail!(
                "SECRETS_MISSING: required env var '{}' (telegram bot token) is not set or empty",
                cfg.bot_token_env
            );
        }
        if secrets.chat_id.is_none() {
            bail!(
                "SECRETS_MISSING: required env var '{}' (telegram chat id) is not set or empty",
                cfg.chat_id_env
            );
        }
    }

    Ok(secrets)
}
