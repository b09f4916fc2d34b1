use async_trait::async_trait;
use chrono::{DateTime, Utc};
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::{ChatId, ParseMode, Recipient};
use teloxide::utils::markdown;
use teloxide::Bot;
use tracing::debug;

use common::config::ChatTarget;
use common::{Alert, Error, NotificationChannel, Result};

use crate::format;

/// Sends alerts to one Telegram chat through the Bot API.
pub struct TelegramChannel {
    bot: Bot,
    chat: Recipient,
}

impl TelegramChannel {
    pub fn new(token: impl Into<String>, chat: &ChatTarget) -> Self {
        Self::with_bot(Bot::new(token), chat)
    }

    /// Use a preconfigured bot, e.g. one pointed at a different API URL.
    pub fn with_bot(bot: Bot, chat: &ChatTarget) -> Self {
        let chat = match chat {
            ChatTarget::Id(id) => Recipient::Id(ChatId(*id)),
            ChatTarget::Username(name) => Recipient::ChannelUsername(name.clone()),
        };
        Self { bot, chat }
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn deliver(&self, alert: &Alert) -> Result<()> {
        let text = message_text(alert, Utc::now());
        self.bot
            .send_message(self.chat.clone(), text)
            .parse_mode(ParseMode::MarkdownV2)
            .await
            .map_err(|e| Error::Telegram(e.to_string()))?;
        debug!(chat = ?self.chat, "Telegram message sent");
        Ok(())
    }
}

/// Render an alert as a MarkdownV2 message body.
pub fn message_text(alert: &Alert, sent_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        format!(
            "{} {}",
            format::emoji(alert.priority),
            markdown::bold(&markdown::escape(&alert.title))
        ),
        String::new(),
        markdown::escape(&alert.message),
        String::new(),
        format!("📊 {}", markdown::bold(&markdown::escape("Market Data:"))),
    ];
    for (label, value) in format::snapshot_fields(&alert.snapshot) {
        lines.push(markdown::escape(&format!("- {label}: {value}")));
    }
    lines.push(String::new());
    lines.push(format!(
        "⏰ {}",
        markdown::escape(&sent_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{AlertKind, Conditions, Observation, Priority};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn alert() -> Alert {
        Alert {
            kind: AlertKind::StreakBuilding,
            priority: Priority::Medium,
            title: "📈 Low Volatility Streak Building".into(),
            message: "Volatility streak: 7/10 cycles. 3 more cycles needed for framework activation.".into(),
            snapshot: Observation {
                timestamp: Utc::now(),
                primary_move: 1.5,
                secondary_move: -0.8,
                activity_count: 42,
                participation_count: 28,
                volatility_streak: 7,
                conditions: Conditions::default(),
                ready: false,
            },
        }
    }

    #[test]
    fn text_is_escaped_markdown_v2() {
        let sent_at: DateTime<Utc> = "2024-05-01T12:00:00Z".parse().unwrap();
        let text = message_text(&alert(), sent_at);

        assert!(text.starts_with("🟡 *📈 Low Volatility Streak Building*"), "{text}");
        assert!(text.contains("Volatility streak: 7/10 cycles\\. 3 more cycles needed"), "{text}");
        assert!(text.contains("\\- Primary Move: \\+1\\.5%"), "{text}");
        assert!(text.contains("\\- Secondary Move: \\-0\\.8%"), "{text}");
        assert!(text.contains("\\- Volatility Streak: 7 cycles"), "{text}");
        assert!(text.ends_with("⏰ 2024\\-05\\-01 12:00:00 UTC"), "{text}");
    }

    #[test]
    fn chat_targets_map_to_recipients() {
        let by_id = TelegramChannel::new("1:x", &ChatTarget::Id(-100));
        assert_eq!(by_id.chat, Recipient::Id(ChatId(-100)));

        let by_name = TelegramChannel::new("1:x", &ChatTarget::Username("@alerts".into()));
        assert_eq!(by_name.chat, Recipient::ChannelUsername("@alerts".into()));
    }

    #[tokio::test]
    async fn delivers_markdown_message_to_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {
                    "message_id": 7,
                    "date": 1714564800,
                    "chat": {"id": -100, "type": "private", "first_name": "Alerts"},
                    "from": {"id": 1, "is_bot": true, "first_name": "Monitor", "username": "monitor_bot"},
                    "text": "ok"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api_url = url::Url::parse(&server.uri()).unwrap();
        let bot = Bot::new("1:x").set_api_url(api_url);
        let channel = TelegramChannel::with_bot(bot, &ChatTarget::Id(-100));

        channel.deliver(&alert()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(
            requests[0].url.path().to_lowercase().ends_with("/sendmessage"),
            "{}",
            requests[0].url
        );
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["chat_id"], -100);
        assert_eq!(body["parse_mode"], "MarkdownV2");
        let text = body["text"].as_str().unwrap();
        assert!(text.starts_with("🟡 *📈 Low Volatility Streak Building*"), "{text}");
        assert!(text.contains("\\- Activity Count: 42"), "{text}");
    }

    #[tokio::test]
    async fn api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let api_url = url::Url::parse(&server.uri()).unwrap();
        let bot = Bot::new("1:x").set_api_url(api_url);
        let channel = TelegramChannel::with_bot(bot, &ChatTarget::Id(1));

        let err = channel.deliver(&alert()).await.unwrap_err();
        assert!(matches!(err, Error::Telegram(_)), "{err}");
    }
}
