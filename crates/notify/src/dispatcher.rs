use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{error, info};

use common::{Alert, NotificationChannel};

/// Outcome of delivering one alert to one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: String,
    /// `None` on success, the error text otherwise.
    pub error: Option<String>,
}

impl Delivery {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Fans alerts out to every configured channel.
///
/// All channels are attempted concurrently and awaited together. A failing
/// channel is logged and reported in its `Delivery`; it never stops or
/// cancels delivery to the others.
#[derive(Clone, Default)]
pub struct Dispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Deliver one alert everywhere. Returns one `Delivery` per channel,
    /// in channel order.
    pub async fn send(&self, alert: &Alert) -> Vec<Delivery> {
        info!("🔔 {}: {}", alert.priority, alert.title);

        let attempts = self.channels.iter().map(|channel| async move {
            let result = channel.deliver(alert).await;
            match &result {
                Ok(()) => info!(channel = channel.name(), "✅ Alert delivered"),
                Err(e) => error!(channel = channel.name(), error = %e, "❌ Alert delivery failed"),
            }
            Delivery {
                channel: channel.name().to_string(),
                error: result.err().map(|e| e.to_string()),
            }
        });

        join_all(attempts).await
    }

    /// Deliver alerts one after another, preserving their order.
    pub async fn send_all(&self, alerts: &[Alert]) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        for alert in alerts {
            deliveries.extend(self.send(alert).await);
        }
        deliveries
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
