//! Time-windowed aggregation over the results log
//!
//! Every query runs over the full log. Records whose timestamp is missing or
//! unparsable are skipped, never reported: the monitoring agents polling
//! these numbers prefer a slightly wrong answer to no answer.

use crate::{
    models::{ResultsLog, StoredRecord},
    timestamp,
    types::{Metric, ServerField},
};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Running arithmetic mean
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Counts and averages of a single window, computed in one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub hours: u32,
    pub count: usize,
    pub download_avg: f64,
    pub upload_avg: f64,
    pub ping_avg: f64,
}

/// Latest/average/count queries over a loaded results log
#[derive(Debug, Clone)]
pub struct Aggregator {
    log: ResultsLog,
    /// Instant windows are measured back from
    reference_time: DateTime<Utc>,
    /// Offset naive timestamps are read in
    local_offset: FixedOffset,
}

impl Aggregator {
    /// Aggregate against the wall clock and the host's current offset
    pub fn new(log: ResultsLog) -> Self {
        Self {
            log,
            reference_time: Utc::now(),
            local_offset: timestamp::current_local_offset(),
        }
    }

    /// Measure windows back from `now` instead of the wall clock
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = now;
        self
    }

    /// Read naive timestamps in `offset` instead of the host's offset
    pub fn with_local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }

    pub fn log(&self) -> &ResultsLog {
        &self.log
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }

    /// Start of the trailing window of `hours` hours. A window reaching past
    /// the earliest representable instant is unbounded.
    pub fn cutoff(&self, hours: u32) -> DateTime<Utc> {
        self.reference_time
            .checked_sub_signed(Duration::hours(i64::from(hours)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn normalized_time(&self, record: &StoredRecord<'_>) -> Option<DateTime<Utc>> {
        let raw = record.timestamp()?;
        timestamp::normalize_with_offset(raw, self.local_offset).ok()
    }

    /// Records whose timestamp is at or after the cutoff
    pub fn records_in_window(&self, hours: u32) -> impl Iterator<Item = StoredRecord<'_>> + '_ {
        let cutoff = self.cutoff(hours);
        self.log
            .iter()
            .filter(move |record| matches!(self.normalized_time(record), Some(at) if at >= cutoff))
    }

    /// Value of `metric` on the last record, `0.0` when there is none
    pub fn latest(&self, metric: Metric) -> f64 {
        self.log
            .last()
            .and_then(|record| record.metric(metric))
            .unwrap_or(0.0)
    }

    /// Mean of `metric` over the window, `0.0` when the window is empty.
    /// Records in the window without a numeric value for `metric` are left out.
    pub fn average(&self, metric: Metric, hours: u32) -> f64 {
        let mut mean = MeanAccumulator::default();
        for record in self.records_in_window(hours) {
            if let Some(value) = record.metric(metric) {
                mean.push(value);
            }
        }
        mean.mean().unwrap_or(0.0)
    }

    /// Number of records in the window
    pub fn count(&self, hours: u32) -> usize {
        self.records_in_window(hours).count()
    }

    /// Unix seconds of the last record, `0` when missing or unparsable
    pub fn last_test_time(&self) -> i64 {
        self.log
            .last()
            .and_then(|record| self.normalized_time(&record))
            .map(|at| at.timestamp())
            .unwrap_or(0)
    }

    /// A field of the last record's `server` object, empty when absent
    pub fn server_field(&self, field: ServerField) -> String {
        self.log
            .last()
            .and_then(|record| record.server_field(field))
            .unwrap_or_default()
    }

    /// Count and all three averages for one window
    pub fn window_summary(&self, hours: u32) -> WindowSummary {
        let mut count = 0;
        let mut download = MeanAccumulator::default();
        let mut upload = MeanAccumulator::default();
        let mut ping = MeanAccumulator::default();

        for record in self.records_in_window(hours) {
            count += 1;
            for (metric, mean) in [
                (Metric::Download, &mut download),
                (Metric::Upload, &mut upload),
                (Metric::Ping, &mut ping),
            ] {
                if let Some(value) = record.metric(metric) {
                    mean.push(value);
                }
            }
        }

        WindowSummary {
            hours,
            count,
            download_avg: download.mean().unwrap_or(0.0),
            upload_avg: upload.mean().unwrap_or(0.0),
            ping_avg: ping.mean().unwrap_or(0.0),
        }
    }
}
