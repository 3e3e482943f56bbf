//! Speed Test Graphing
//!
//! Runs internet speed tests against speedtest.net servers, appends every
//! result to a flat JSON log and serves windowed statistics over that log to
//! MRTG and Zabbix through their stdout contracts.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod runner;
pub mod speedtest;
pub mod stats;
pub mod store;
pub mod timestamp;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, Measurement, ResultsLog, ServerInfo, SpeedTestResult};
pub use output::{MetricValue, MrtgReport, ZabbixKey};
pub use runner::Runner;
pub use speedtest::{HttpSpeedTester, SpeedTester};
pub use stats::{Aggregator, WindowSummary};
pub use store::{LoadOutcome, ResultsStore};
pub use types::{Metric, ServerField};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information stamped by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// One-line version banner for debug output
pub fn version_banner() -> String {
    match GIT_COMMIT {
        Some(commit) => format!("{} v{} ({}, {}, built {})", PKG_NAME, VERSION, commit, TARGET_TRIPLE, BUILD_TIME),
        None => format!("{} v{} ({}, built {})", PKG_NAME, VERSION, TARGET_TRIPLE, BUILD_TIME),
    }
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_RESULTS_FILE: &str = "speedtest_results.json";
    pub const DEFAULT_WINDOW_HOURS: u32 = 24;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_SERVER_LIST_URL: &str =
        "https://www.speedtest.net/api/js/servers?engine=js&https_functional=true&limit=10";
    pub const DEFAULT_CANDIDATE_SERVERS: usize = 5;
    pub const DEFAULT_LATENCY_SAMPLES: u32 = 3;
    pub const DEFAULT_TEST_DURATION: Duration = Duration::from_secs(10);
    pub const DEFAULT_CONCURRENCY: usize = 4;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Edge lengths of the `random{N}x{N}.jpg` download images
    pub const DOWNLOAD_SIZES: &[u32] = &[350, 500, 750, 1000, 1500, 2000, 2500, 3000, 3500, 4000];
    pub const DOWNLOAD_REPEATS: usize = 4;
    /// Upload payload sizes in bytes
    pub const UPLOAD_SIZES: &[usize] = &[256 * 1024, 512 * 1024];
    pub const UPLOAD_REPEATS: usize = 10;

    pub const USER_AGENT: &str = concat!("speedtest-graphing/", env!("CARGO_PKG_VERSION"));
}
