use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use common::{HistoryStore, Result, WeeklyReport};
use notify::Dispatcher;

/// Builds the seven-day summary from stored history and sends it out.
pub struct Reporter {
    history: Option<Arc<dyn HistoryStore>>,
    dispatcher: Dispatcher,
}

impl Reporter {
    const WINDOW_DAYS: i64 = 7;

    pub fn new(history: Option<Arc<dyn HistoryStore>>, dispatcher: Dispatcher) -> Self {
        Self { history, dispatcher }
    }

    /// Returns `None` when there is no store, no data, or the read failed.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<Option<WeeklyReport>> {
        info!("📊 Generating weekly report...");

        let Some(store) = &self.history else {
            info!("No database configured for weekly report");
            return Ok(None);
        };

        let window = match store.since(now - Duration::days(Self::WINDOW_DAYS)).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(store = store.name(), error = %e, "Weekly report query failed");
                return Ok(None);
            }
        };

        let Some(report) = decision::summarize(&window, now) else {
            info!("No data available for weekly report");
            return Ok(None);
        };

        info!("📊 Weekly Report: {}", serde_json::to_string_pretty(&report)?);

        // `summarize` returned Some, so the window is non-empty.
        if let Some(latest) = window.first() {
            self.dispatcher
                .send(&decision::report_alert(&report, latest))
                .await;
        }

        Ok(Some(report))
    }
}
