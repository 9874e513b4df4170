//! Outbound calls to the WhatsApp bot process.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use lojinha_economy::phone;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthCodePayload<'a> {
    whatsapp_number: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct MessagePayload<'a> {
    to: &'a str,
    message: &'a str,
}

#[derive(Clone)]
pub struct BotClient {
    http: reqwest::Client,
    base_url: String,
}

impl BotClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building bot HTTP client")?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Deliver a login code. The bot expects the number without `55`.
    pub async fn send_auth_code(&self, normalized_number: &str, code: &str) -> Result<()> {
        let payload = AuthCodePayload {
            whatsapp_number: phone::number_for_bot(normalized_number),
            code,
        };
        self.post("/send-auth-code", &payload).await
    }

    /// Send a text to a user number or a group JID.
    pub async fn send_message(&self, to: &str, message: &str) -> Result<()> {
        self.post("/send-message", &MessagePayload { to, message }).await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        self.http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("bot unreachable at {url}"))?
            .error_for_status()
            .with_context(|| format!("bot rejected {path}"))?;
        Ok(())
    }
}

/// Accepts `host:port`, a full URL, or the old style that pointed straight at
/// `/send-auth-code`, and returns a scheme-qualified base without a trailing `/`.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut url = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    if let Some(stripped) = url.strip_suffix("/send-auth-code") {
        url = stripped.to_string();
    }
    while url.ends_with('/') {
        url.pop();
    }
    url
}
