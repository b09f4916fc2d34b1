use async_trait::async_trait;

use crate::{Alert, Result};

/// One external chat target an alert can be delivered to.
///
/// Delivery is attempted once. The dispatcher logs a returned error and
/// moves on; it never retries.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Channel label used in logs, e.g. "discord".
    fn name(&self) -> &str;

    async fn deliver(&self, alert: &Alert) -> Result<()>;
}
