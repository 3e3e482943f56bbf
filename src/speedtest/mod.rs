//! Speed measurement against speedtest.net legacy servers

pub mod http;
pub mod servers;


pub use http::{HttpSpeedTester, TestSettings};
pub use servers::{parse_server_list, SelectedServer, ServerEntry};

use crate::{AppError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// The three phases of a speed test.
///
/// The runner drives the phases in order and prints progress in between, so
/// they are separate calls rather than one `measure()`.
#[async_trait]
pub trait SpeedTester: Send + Sync {
    /// Pick the server to test against; its latency is the reported ping
    async fn select_server(&self) -> Result<SelectedServer>;

    /// Download throughput in Mbps
    async fn measure_download(&self, server: &SelectedServer) -> Result<f64>;

    /// Upload throughput in Mbps
    async fn measure_upload(&self, server: &SelectedServer) -> Result<f64>;
}

/// Bytes moved during one transfer phase
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Throughput {
    pub bytes: u64,
    pub elapsed: Duration,
    pub requests: usize,
}

impl Throughput {
    /// Speed in megabits per second; a phase that moved nothing is an error
    pub fn mbps(&self, phase: &str) -> Result<f64> {
        if self.bytes == 0 {
            return Err(AppError::measurement(format!("{} phase transferred no data", phase)));
        }
        Ok(megabits_per_second(self.bytes, self.elapsed))
    }
}

pub fn megabits_per_second(bytes: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if seconds <= 0.0 {
        return 0.0;
    }
    bytes as f64 * 8.0 / seconds / 1_000_000.0
}
