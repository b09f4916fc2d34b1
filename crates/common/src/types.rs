use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw reading from a `MetricSampler`, before any scoring.
///
/// Serialized camelCase; this is also the JSON contract of the feed sampler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSample {
    /// Signed percentage move of the primary signal.
    pub primary_move: f64,
    /// Signed percentage move of the secondary signal.
    pub secondary_move: f64,
    /// Entities moving beyond the internal activity threshold.
    pub activity_count: u32,
    /// Entities meeting the informed-participant heuristic.
    pub participation_count: u32,
}

/// The three threshold conditions derived for an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    pub volatility_met: bool,
    pub maturity_met: bool,
    pub participation_met: bool,
}

impl Conditions {
    /// True when every condition holds at once.
    pub fn all(&self) -> bool {
        self.volatility_met && self.maturity_met && self.participation_met
    }
}

/// One poll cycle's full derived record. Created once, persisted, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub primary_move: f64,
    pub secondary_move: f64,
    pub activity_count: u32,
    pub participation_count: u32,
    /// Consecutive low-volatility observations, this one included.
    pub volatility_streak: u32,
    pub conditions: Conditions,
    /// `conditions.all()` at creation time.
    pub ready: bool,
}

/// Severity attached to an alert. Channels map it to a color or emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Critical => write!(f, "CRITICAL"),
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::Low => write!(f, "LOW"),
            Priority::Info => write!(f, "INFO"),
        }
    }
}

/// Which rule produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Every condition is satisfied.
    Ready,
    /// The volatility streak is close to the required length.
    StreakBuilding,
    /// Activity dropped sharply since the previous observation.
    Cooling,
    WeeklyReport,
    /// Manual webhook check.
    Test,
}

/// A notification derived for one cycle. Alerts are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    /// The observation the alert was raised for.
    pub snapshot: Observation,
}

/// Seven-day summary of the stored observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub timestamp: DateTime<Utc>,
    pub period: String,
    /// Number of observations in the period.
    pub samples: usize,
    /// Whether the most recent observation is ready.
    pub ready_now: bool,
    /// Observations in the period that were ready.
    pub ready_count: usize,
    pub avg_volatility_streak: f64,
    pub current_streak: u32,
    pub activity_count: u32,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    ExecuteFramework,
    ContinueMonitoring,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::ExecuteFramework => write!(f, "EXECUTE FRAMEWORK"),
            Recommendation::ContinueMonitoring => write!(f, "CONTINUE MONITORING"),
        }
    }
}
