pub mod feed;

pub use feed::FeedSampler;

use std::ops::Range;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tracing::{debug, info};

use common::{Error, MetricSampler, RawSample, Result};

/// Chance that a simulated move is drawn from the calm band.
const CALM_PROBABILITY: f64 = 0.7;
/// Total width of the calm band, in percent (±2%).
const CALM_SPAN: f64 = 4.0;
/// Total width of the wild band, in percent (±6%).
const WILD_SPAN: f64 = 12.0;

/// Simulated metric source used when no feed is configured.
///
/// Moves are calm (±2%) 70% of the time and wild (±6%) otherwise, rounded to
/// two decimals. Counts are drawn uniformly from the configured ranges.
pub struct SimulatedSampler {
    rng: Mutex<StdRng>,
    activity: Range<u32>,
    participation: Range<u32>,
}

impl SimulatedSampler {
    pub const DEFAULT_ACTIVITY: Range<u32> = 60..110;
    pub const DEFAULT_PARTICIPATION: Range<u32> = 40..60;

    pub fn new() -> Self {
        info!("SimulatedSampler initialized");
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic sampler for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            activity: Self::DEFAULT_ACTIVITY,
            participation: Self::DEFAULT_PARTICIPATION,
        }
    }

    /// Override the count ranges. Both must be non-empty.
    pub fn with_ranges(mut self, activity: Range<u32>, participation: Range<u32>) -> Result<Self> {
        if activity.is_empty() || participation.is_empty() {
            return Err(Error::Config(format!(
                "simulation ranges must be non-empty, got activity {activity:?}, participation {participation:?}"
            )));
        }
        self.activity = activity;
        self.participation = participation;
        Ok(self)
    }

    fn simulate_move(rng: &mut StdRng) -> f64 {
        let span = if rng.gen::<f64>() < CALM_PROBABILITY {
            CALM_SPAN
        } else {
            WILD_SPAN
        };
        let raw = (rng.gen::<f64>() - 0.5) * span;
        (raw * 100.0).round() / 100.0
    }
}

impl Default for SimulatedSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricSampler for SimulatedSampler {
    async fn sample(&self) -> Result<RawSample> {
        let mut rng = self.rng.lock().await;
        let sample = RawSample {
            primary_move: Self::simulate_move(&mut rng),
            secondary_move: Self::simulate_move(&mut rng),
            activity_count: rng.gen_range(self.activity.clone()),
            participation_count: rng.gen_range(self.participation.clone()),
        };
        debug!(
            primary = sample.primary_move,
            secondary = sample.secondary_move,
            activity = sample.activity_count,
            participation = sample.participation_count,
            "Simulated sample"
        );
        Ok(sample)
    }
}
