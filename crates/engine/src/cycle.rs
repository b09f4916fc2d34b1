use std::sync::Arc;

use tracing::{info, warn};

use common::{Alert, HistoryStore, MetricSampler, Observation, Result};
use decision::{Decision, DecisionEngine};
use notify::{Delivery, Dispatcher};

/// Everything one poll cycle produced.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub observation: Observation,
    pub alerts: Vec<Alert>,
    /// False when no store is configured or the write failed.
    pub persisted: bool,
    pub deliveries: Vec<Delivery>,
}

/// Runs one sample → decide → persist → notify cycle.
///
/// Only a sampler failure ends the cycle early. History and delivery
/// failures are logged and the cycle carries on without them.
pub struct Monitor {
    engine: DecisionEngine,
    sampler: Arc<dyn MetricSampler>,
    history: Option<Arc<dyn HistoryStore>>,
    dispatcher: Dispatcher,
}

impl Monitor {
    pub fn new(
        engine: DecisionEngine,
        sampler: Arc<dyn MetricSampler>,
        history: Option<Arc<dyn HistoryStore>>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            engine,
            sampler,
            history,
            dispatcher,
        }
    }

    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        info!("🔍 Checking market conditions...");

        let sample = self.sampler.sample().await?;
        let previous = self.previous().await;

        let Decision { observation, alerts } = self.engine.decide(&sample, previous.as_ref());
        info!(
            streak = observation.volatility_streak,
            ready = observation.ready,
            alerts = alerts.len(),
            "Cycle evaluated"
        );

        let persisted = self.persist(&observation).await;
        let deliveries = self.dispatcher.send_all(&alerts).await;

        info!("📊 Results: {}", serde_json::to_string_pretty(&observation)?);

        Ok(CycleOutcome {
            observation,
            alerts,
            persisted,
            deliveries,
        })
    }

    /// Last stored observation; any read failure counts as no history.
    async fn previous(&self) -> Option<Observation> {
        let store = self.history.as_ref()?;
        match store.last().await {
            Ok(last) => last,
            Err(e) => {
                warn!(store = store.name(), error = %e, "⚠️ History read failed, continuing without previous observation");
                None
            }
        }
    }

    async fn persist(&self, observation: &Observation) -> bool {
        let Some(store) = &self.history else {
            info!("💾 No database configured, skipping save");
            return false;
        };
        match store.append(observation).await {
            Ok(()) => {
                info!(store = store.name(), "✅ Results saved");
                true
            }
            Err(e) => {
                warn!(store = store.name(), error = %e, "⚠️ History save failed");
                false
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
