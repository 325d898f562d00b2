//! Telegram Bot API `sendMessage` delivery.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use mw_config::{DeliverySecrets, TelegramConfig};
use mw_report::chunk_text;
use serde::{Deserialize, Serialize};

use crate::{Notifier, NotifyError};

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
    max_message_len: usize,
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("bot_token", &"<REDACTED>")
            .field("chat_id", &"<REDACTED>")
            .field("max_message_len", &self.max_message_len)
            .finish()
    }
}

impl TelegramNotifier {
    pub fn new(
        cfg: &TelegramConfig,
        secrets: &DeliverySecrets,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let (Some(bot_token), Some(chat_id)) = (&secrets.bot_token, &secrets.chat_id) else {
            return Err(NotifyError::Config(format!(
                "telegram credentials incomplete (env vars '{}' / '{}')",
                cfg.bot_token_env, cfg.chat_id_env
            )));
        };
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Config(e.without_url().to_string()))?;
        Ok(Self {
            http,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.clone(),
            chat_id: chat_id.clone(),
            max_message_len: cfg.max_message_len,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    fn scrub(&self, msg: String) -> String {
        msg.replace(&self.bot_token, "<REDACTED>")
    }

    async fn send_one(&self, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };
        let resp = self
            .http
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(self.scrub(e.without_url().to_string())))?;

        let status = resp.status();
        let raw = resp
            .bytes()
            .await
            .map_err(|e| NotifyError::Transport(self.scrub(e.without_url().to_string())))?;
        let parsed: Option<ApiResponse> = serde_json::from_slice(&raw).ok();

        if !status.is_success() {
            let description = parsed
                .and_then(|r| r.description)
                .unwrap_or_else(|| "no description".to_string());
            return Err(NotifyError::Status {
                code: status.as_u16(),
                description: self.scrub(description),
            });
        }
        match parsed {
            Some(r) if r.ok => Ok(()),
            Some(r) => Err(NotifyError::Rejected(
                self.scrub(r.description.unwrap_or_else(|| "ok=false".to_string())),
            )),
            None => Err(NotifyError::Rejected("response is not valid json".to_string())),
        }
    }
}

/// Chunks of `report`, suffixed ` (part i/n)` when there is more than one.
fn message_parts(report: &str, max_len: usize) -> Vec<String> {
    let chunks = chunk_text(report, max_len);
    let n = chunks.len();
    if n <= 1 {
        return chunks;
    }
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, c)| format!("{c} (part {}/{n})", i + 1))
        .collect()
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn deliver(&self, report: &str) -> Result<usize, NotifyError> {
        let parts = message_parts(report, self.max_message_len);
        for (i, part) in parts.iter().enumerate() {
            self.send_one(part).await.inspect_err(|e| {
                tracing::warn!(part = i + 1, parts = parts.len(), error = %e, "telegram send failed");
            })?;
        }
        tracing::info!(parts = parts.len(), "telegram message sent");
        Ok(parts.len())
    }
}
