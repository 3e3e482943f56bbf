//! MRTG external-script output

use crate::{stats::Aggregator, types::Metric};
use std::fmt;

/// The four lines MRTG reads from an external script:
/// in value, out value, uptime, target name
#[derive(Debug, Clone, PartialEq)]
pub struct MrtgReport {
    pub value1: f64,
    pub value2: f64,
    pub uptime: String,
    pub system_name: String,
}

impl MrtgReport {
    /// Windowed average of `metric` as the first value, `0` as the second
    pub fn average(aggregator: &Aggregator, metric: Metric, hours: u32) -> Self {
        Self::for_value(metric, aggregator.average(metric, hours))
    }

    pub fn for_value(metric: Metric, value: f64) -> Self {
        Self {
            value1: value,
            value2: 0.0,
            uptime: String::new(),
            system_name: format!("Average {}", metric.display_name()),
        }
    }
}

/// Truncate toward zero; MRTG only takes integers
fn mrtg_integer(value: f64) -> i64 {
    if value.is_finite() {
        value.trunc() as i64
    } else {
        0
    }
}

impl fmt::Display for MrtgReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", mrtg_integer(self.value1))?;
        writeln!(f, "{}", mrtg_integer(self.value2))?;
        writeln!(f, "{}", self.uptime)?;
        write!(f, "{}", self.system_name)
    }
}
