pub mod cycle;
pub mod history;
pub mod ping;
pub mod report;

pub use cycle::{CycleOutcome, Monitor};
pub use ping::{send_test_alert, test_alert};
pub use report::Reporter;
