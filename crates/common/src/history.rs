use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Observation, Result};

/// Append-only record of past observations.
///
/// Implementations report failures as errors. Callers in the poll cycle
/// decide how to degrade: a failed read counts as "no history" and a failed
/// write never stops alert dispatch.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Short label for logs, e.g. "rest" or "sqlite".
    fn name(&self) -> &str;

    /// The most recently appended observation, if any.
    async fn last(&self) -> Result<Option<Observation>>;

    /// Persist one observation.
    async fn append(&self, observation: &Observation) -> Result<()>;

    /// Every observation whose own `timestamp` is at or after `cutoff`,
    /// newest first.
    async fn since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Observation>>;
}
