//! Zabbix item keys and value rendering

use crate::{
    stats::Aggregator,
    types::{Metric, ServerField},
    AppError, Result,
};
use std::fmt;
use std::str::FromStr;

/// Window the `*_24h` keys cover
const ZABBIX_WINDOW_HOURS: u32 = 24;

/// Item keys the agent can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZabbixKey {
    Latest(Metric),
    Average24h(Metric),
    TestCount24h,
    LastTestTime,
    Server(ServerField),
}

impl ZabbixKey {
    /// Every key, in the order they are listed to the user
    pub const ALL: [ZabbixKey; 11] = [
        ZabbixKey::Latest(Metric::Download),
        ZabbixKey::Latest(Metric::Upload),
        ZabbixKey::Latest(Metric::Ping),
        ZabbixKey::Average24h(Metric::Download),
        ZabbixKey::Average24h(Metric::Upload),
        ZabbixKey::Average24h(Metric::Ping),
        ZabbixKey::TestCount24h,
        ZabbixKey::LastTestTime,
        ZabbixKey::Server(ServerField::Name),
        ZabbixKey::Server(ServerField::Location),
        ZabbixKey::Server(ServerField::Country),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest(Metric::Download) => "speedtest.download",
            Self::Latest(Metric::Upload) => "speedtest.upload",
            Self::Latest(Metric::Ping) => "speedtest.ping",
            Self::Average24h(Metric::Download) => "speedtest.download_avg_24h",
            Self::Average24h(Metric::Upload) => "speedtest.upload_avg_24h",
            Self::Average24h(Metric::Ping) => "speedtest.ping_avg_24h",
            Self::TestCount24h => "speedtest.test_count_24h",
            Self::LastTestTime => "speedtest.last_test_time",
            Self::Server(ServerField::Name) => "speedtest.server_name",
            Self::Server(ServerField::Location) => "speedtest.server_location",
            Self::Server(ServerField::Country) => "speedtest.server_country",
        }
    }

    /// Comma separated list of every key
    pub fn available_keys() -> String {
        Self::ALL.iter().map(ZabbixKey::as_str).collect::<Vec<_>>().join(", ")
    }

    /// Compute this key's value
    pub fn evaluate(&self, aggregator: &Aggregator) -> MetricValue {
        match *self {
            Self::Latest(metric) => MetricValue::Float(aggregator.latest(metric)),
            Self::Average24h(metric) => MetricValue::Float(aggregator.average(metric, ZABBIX_WINDOW_HOURS)),
            Self::TestCount24h => MetricValue::Integer(aggregator.count(ZABBIX_WINDOW_HOURS) as i64),
            Self::LastTestTime => MetricValue::Integer(aggregator.last_test_time()),
            Self::Server(field) => MetricValue::Text(aggregator.server_field(field)),
        }
    }
}

impl fmt::Display for ZabbixKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZabbixKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| AppError::unknown_metric(s))
    }
}

/// A value printed to the agent
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    /// Integers unadorned, floats at two decimals unless integral, text verbatim
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) if *value == 0.0 => f.write_str("0"),
            Self::Float(value) if value.is_finite() && value.fract() == 0.0 => write!(f, "{:.0}", value),
            Self::Float(value) => write!(f, "{:.2}", value),
            Self::Text(value) => f.write_str(value),
        }
    }
}
