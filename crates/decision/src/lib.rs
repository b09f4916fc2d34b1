pub mod engine;
pub mod report;
pub mod thresholds;

pub use engine::{Decision, DecisionEngine};
pub use report::{report_alert, summarize};
pub use thresholds::Thresholds;
