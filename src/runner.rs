//! One speed test run: measure, stamp, append

use crate::{
    defaults::DEFAULT_WINDOW_HOURS,
    logging::{LogLevel, Logger},
    models::{Measurement, SpeedTestResult},
    speedtest::SpeedTester,
    stats::Aggregator,
    store::ResultsStore,
    Result,
};
use chrono::Utc;
use std::io::Write;

/// Drives a [`SpeedTester`] through its phases and persists the result
pub struct Runner<T> {
    tester: T,
    store: ResultsStore,
    logger: Logger,
}

impl<T: SpeedTester> Runner<T> {
    pub fn new(tester: T, store: ResultsStore, logger: Logger) -> Self {
        Self { tester, store, logger }
    }

    pub fn store(&self) -> &ResultsStore {
        &self.store
    }

    /// Run every phase, printing a progress line before each one
    pub async fn measure<W: Write>(&self, out: &mut W) -> Result<Measurement> {
        writeln!(out, "Selecting best server...")?;
        let server = self.tester.select_server().await?;
        self.logger.info(&format!("Selected server {} ({:.2} ms)", server.entry.label(), server.latency_ms))
            .field("server_id", &server.entry.id)
            .field("latency_ms", server.latency_ms)
            .log();

        writeln!(out, "Testing download speed...")?;
        let download_mbps = self.tester.measure_download(&server).await?;

        writeln!(out, "Testing upload speed...")?;
        let upload_mbps = self.tester.measure_upload(&server).await?;

        Ok(Measurement {
            download_mbps,
            upload_mbps,
            ping_ms: server.latency_ms,
            server: server.server_info(),
        })
    }

    /// Measure, stamp with the current UTC time and append to the log.
    /// Nothing is written when any phase fails.
    pub async fn run_and_save<W: Write>(&self, out: &mut W) -> Result<SpeedTestResult> {
        let correlation_id = self.logger.start_operation("speed_test");
        let outcome = self.run_and_save_inner(out, &correlation_id).await;
        self.logger.end_operation(&correlation_id, "speed_test", outcome.is_ok());
        outcome
    }

    async fn run_and_save_inner<W: Write>(&self, out: &mut W, correlation_id: &str) -> Result<SpeedTestResult> {
        let measurement = self.measure(out).await?;
        let result = SpeedTestResult::from_measurement(&measurement, Utc::now());

        self.logger.info("Measurement complete")
            .correlation_id(correlation_id)
            .measurement(&measurement)
            .log();

        let records = self.store.append(&result)?;
        writeln!(out, "Result saved to {}", self.store.path().display())?;

        if self.logger.would_log(LogLevel::Debug) {
            let summary = Aggregator::new(self.store.load()).window_summary(DEFAULT_WINDOW_HOURS);
            self.logger.debug("Results log summary")
                .correlation_id(correlation_id)
                .field("records", records)
                .field("window", &summary)
                .log();
        }

        Ok(result)
    }
}
