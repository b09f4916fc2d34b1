pub mod channel;
pub mod config;
pub mod error;
pub mod history;
pub mod sampler;
pub mod types;

pub use channel::NotificationChannel;
pub use config::Config;
pub use error::{Error, Result};
pub use history::HistoryStore;
pub use sampler::MetricSampler;
pub use types::*;
