//! Data models and structures for the speed test tooling

pub mod config;
pub mod record;

// Re-export main model types
pub use config::Config;
pub use record::{Measurement, ResultsLog, ServerInfo, SpeedTestResult, StoredRecord};
