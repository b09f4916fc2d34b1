use chrono::{DateTime, Utc};
use tracing::{info, warn};

use common::{Alert, AlertKind, Conditions, Observation, Priority};
use notify::{Delivery, Dispatcher};

/// Fixed informational alert used to check webhook configuration.
pub fn test_alert(now: DateTime<Utc>) -> Alert {
    Alert {
        kind: AlertKind::Test,
        priority: Priority::Info,
        title: "🧪 System Test Alert".to_string(),
        message: "This is a test alert to verify your webhook configuration is working correctly."
            .to_string(),
        snapshot: Observation {
            timestamp: now,
            primary_move: 1.5,
            secondary_move: -0.8,
            activity_count: 42,
            participation_count: 28,
            volatility_streak: 5,
            conditions: Conditions::default(),
            ready: false,
        },
    }
}

/// Send the test alert to every configured channel.
pub async fn send_test_alert(dispatcher: &Dispatcher) -> Vec<Delivery> {
    info!("🧪 Testing notification channels...");
    if dispatcher.is_empty() {
        warn!("No notification channels configured; set DISCORD_WEBHOOK or TELEGRAM_BOT_TOKEN + TELEGRAM_CHAT_ID");
        return Vec::new();
    }
    for name in dispatcher.channel_names() {
        info!(channel = name, "📤 Testing channel");
    }
    let deliveries = dispatcher.send(&test_alert(Utc::now())).await;
    info!("✅ Test completed! Check your channels for the test message.");
    deliveries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_is_info_with_fixed_snapshot() {
        let alert = test_alert(Utc::now());
        assert_eq!(alert.priority, Priority::Info);
        assert_eq!(alert.kind, AlertKind::Test);
        assert_eq!(alert.snapshot.activity_count, 42);
        assert_eq!(alert.snapshot.volatility_streak, 5);
        assert!(!alert.snapshot.ready);
    }

    #[tokio::test]
    async fn no_channels_sends_nothing() {
        assert!(send_test_alert(&Dispatcher::default()).await.is_empty());
    }
}
