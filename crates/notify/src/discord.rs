use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use url::Url;

use common::{Alert, Error, NotificationChannel, Result};

use crate::format;

const FOOTER: &str = "Pre-Pump Framework Monitor";

/// Posts alerts as embeds to a Discord webhook.
pub struct DiscordChannel {
    webhook_url: Url,
    username: String,
    http: Client,
}

impl DiscordChannel {
    pub fn new(webhook_url: Url, username: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            webhook_url,
            username: username.into(),
            http,
        })
    }
}

#[async_trait]
impl NotificationChannel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn deliver(&self, alert: &Alert) -> Result<()> {
        let payload = payload(alert, &self.username, Utc::now());

        let resp = self
            .http
            .post(self.webhook_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http(format!("Discord webhook returned HTTP {status}: {body}")));
        }
        debug!(%status, "Discord webhook accepted alert");
        Ok(())
    }
}

// ─── Payload types ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub username: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: String,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Build the webhook body for one alert.
pub fn payload(alert: &Alert, username: &str, sent_at: DateTime<Utc>) -> WebhookPayload {
    let fields = format::snapshot_fields(&alert.snapshot)
        .into_iter()
        .map(|(name, value)| EmbedField {
            name: name.to_string(),
            value,
            inline: true,
        })
        .collect();

    WebhookPayload {
        username: username.to_string(),
        embeds: vec![Embed {
            title: alert.title.clone(),
            description: alert.message.clone(),
            color: format::color(alert.priority),
            timestamp: sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            fields,
            footer: EmbedFooter {
                text: FOOTER.to_string(),
            },
        }],
    }
}
