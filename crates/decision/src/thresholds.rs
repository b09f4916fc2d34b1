use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Fixed limits the decision engine scores every sample against.
///
/// Example thresholds file:
/// ```toml
/// volatility_limit = 3.0
/// maturity_limit = 15
/// participation_minimum = 20
/// streak_required = 10
/// ```
/// Keys left out of the file keep their default.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Largest absolute percent move that still counts as low volatility (exclusive).
    pub volatility_limit: f64,
    /// Largest activity count for a quiet, mature market (inclusive).
    pub maturity_limit: u32,
    /// Smallest participation count that satisfies the participation condition.
    pub participation_minimum: u32,
    /// Consecutive low-volatility cycles needed for the volatility condition.
    pub streak_required: u32,
    /// The streak-building alert fires this many cycles before `streak_required`.
    pub streak_warning_window: u32,
    /// Drop in activity count since the previous cycle that counts as cooling.
    pub cooling_drop: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            volatility_limit: 3.0,
            maturity_limit: 15,
            participation_minimum: 20,
            streak_required: 10,
            streak_warning_window: 3,
            cooling_drop: 10,
        }
    }
}

impl Thresholds {
    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read thresholds file at '{path}': {e}"))
        })?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("Failed to parse thresholds file at '{path}': {e}")))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}
