use async_trait::async_trait;

use crate::{RawSample, Result};

/// Source of the raw metrics scored each cycle.
///
/// `SimulatedSampler` (crate `sampler`) produces random readings;
/// `FeedSampler` reads them from an HTTP JSON feed. The decision engine
/// never knows which one produced a sample.
#[async_trait]
pub trait MetricSampler: Send + Sync {
    /// Take one reading.
    async fn sample(&self) -> Result<RawSample>;
}
