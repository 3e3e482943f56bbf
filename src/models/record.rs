//! Result record and results log data models

use crate::types::{AppError, Metric, Result, ServerField};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder for server fields the measurement could not provide
pub const UNKNOWN: &str = "Unknown";

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// Identity of the speed test server a measurement was taken against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default = "unknown")]
    pub location: String,
    #[serde(default = "unknown")]
    pub country: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: unknown(),
            location: unknown(),
            country: unknown(),
        }
    }
}

impl ServerInfo {
    /// Create server info, replacing blank values with `Unknown`
    pub fn new(name: &str, location: &str, country: &str) -> Self {
        let or_unknown = |value: &str| {
            let value = value.trim();
            if value.is_empty() {
                unknown()
            } else {
                value.to_string()
            }
        };

        Self {
            name: or_unknown(name),
            location: or_unknown(location),
            country: or_unknown(country),
        }
    }

    pub fn field(&self, field: ServerField) -> &str {
        match field {
            ServerField::Name => &self.name,
            ServerField::Location => &self.location,
            ServerField::Country => &self.country,
        }
    }
}

/// Raw outcome of one measurement, before it is stamped and persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_ms: f64,
    pub server: ServerInfo,
}

/// One persisted speed test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTestResult {
    /// ISO-8601 timestamp; always carries `+00:00` when written by this crate
    pub timestamp: String,
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_ms: f64,
    #[serde(default)]
    pub server: ServerInfo,
}

impl SpeedTestResult {
    /// Stamp a measurement, rounding every metric to two decimals
    pub fn from_measurement(measurement: &Measurement, taken_at: DateTime<Utc>) -> Self {
        Self {
            timestamp: format_timestamp(taken_at),
            download_mbps: round2(measurement.download_mbps),
            upload_mbps: round2(measurement.upload_mbps),
            ping_ms: round2(measurement.ping_ms),
            server: measurement.server.clone(),
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Download => self.download_mbps,
            Metric::Upload => self.upload_mbps,
            Metric::Ping => self.ping_ms,
        }
    }

    /// Convert to the JSON object stored in the log
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Render an instant the way the log stores it: microseconds and an explicit `+00:00`
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Read-only view over one stored record.
///
/// Stored records are kept as raw JSON so that hand-edited or legacy entries
/// with missing or mistyped fields can still be read field by field.
#[derive(Debug, Clone, Copy)]
pub struct StoredRecord<'a> {
    raw: &'a Value,
}

impl<'a> StoredRecord<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    /// The `timestamp` field, if present and a string
    pub fn timestamp(&self) -> Option<&'a str> {
        self.raw.get("timestamp").and_then(Value::as_str)
    }

    /// A numeric metric, if present and numeric
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.raw.get(metric.field_name()).and_then(Value::as_f64)
    }

    /// A field of the `server` object. Strings come back verbatim, other
    /// scalars as their JSON text; null and absent fields are `None`.
    pub fn server_field(&self, field: ServerField) -> Option<String> {
        match self.raw.get("server")?.get(field.field_name())? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// The ordered, append-only collection of stored records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsLog {
    records: Vec<Value>,
}

impl ResultsLog {
    pub fn new(records: Vec<Value>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a log document. The top level must be a JSON array.
    pub fn from_json_str(content: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(content)? {
            Value::Array(records) => Ok(Self::new(records)),
            other => Err(AppError::parse(format!(
                "results log must be a JSON array, found {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Serialise with two-space indentation
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = StoredRecord<'_>> + '_ {
        self.records.iter().map(StoredRecord::new)
    }

    /// The most recently appended record
    pub fn last(&self) -> Option<StoredRecord<'_>> {
        self.records.last().map(StoredRecord::new)
    }

    pub fn push(&mut self, result: &SpeedTestResult) -> Result<()> {
        self.records.push(result.to_value()?);
        Ok(())
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use regex::Regex;
    use serde_json::json;

    #[test]
    fn test_format_timestamp_layout() {
        let layout = Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{6}\+00:00$").unwrap();

        assert!(layout.is_match(&format_timestamp(Utc::now())));
        assert_eq!(
            format_timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 0).unwrap()),
            "2024-03-01T14:05:00.000000+00:00"
        );
    }

    fn sample_measurement() -> Measurement {
        Measurement {
            download_mbps: 94.456_78,
            upload_mbps: 11.004,
            ping_ms: 12.346,
            server: ServerInfo::new("Example ISP", "Springfield", "United States"),
        }
    }

    #[test]
    fn test_result_from_measurement_rounds_and_stamps() {
        let taken_at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let result = SpeedTestResult::from_measurement(&sample_measurement(), taken_at);

        assert_eq!(result.timestamp, "2026-10-18T09:30:00.000000+00:00");
        assert_eq!(result.download_mbps, 94.46);
        assert_eq!(result.upload_mbps, 11.0);
        assert_eq!(result.ping_ms, 12.35);
        assert_eq!(result.server.name, "Example ISP");
        assert_eq!(result.metric(Metric::Ping), 12.35);
    }

    #[test]
    fn test_server_info_blank_fields_become_unknown() {
        let server = ServerInfo::new("  ", "Berlin", "");
        assert_eq!(server.name, UNKNOWN);
        assert_eq!(server.location, "Berlin");
        assert_eq!(server.country, UNKNOWN);
        assert_eq!(server.field(ServerField::Location), "Berlin");
    }

    #[test]
    fn test_server_info_defaults_when_missing_from_json() {
        let result: SpeedTestResult = serde_json::from_value(json!({
            "timestamp": "2024-01-01T00:00:00",
            "download_mbps": 1.0,
            "upload_mbps": 2.0,
            "ping_ms": 3.0,
            "server": { "name": "Only Name" }
        }))
        .unwrap();

        assert_eq!(result.server.name, "Only Name");
        assert_eq!(result.server.location, UNKNOWN);
        assert_eq!(result.server.country, UNKNOWN);
    }

    #[test]
    fn test_stored_record_tolerates_bad_fields() {
        let raw = json!({
            "timestamp": 12345,
            "download_mbps": "fast",
            "upload_mbps": 7,
            "server": { "name": "ISP", "location": null, "country": 44 }
        });
        let record = StoredRecord::new(&raw);

        assert_eq!(record.timestamp(), None);
        assert_eq!(record.metric(Metric::Download), None);
        assert_eq!(record.metric(Metric::Upload), Some(7.0));
        assert_eq!(record.metric(Metric::Ping), None);
        assert_eq!(record.server_field(ServerField::Name).as_deref(), Some("ISP"));
        assert_eq!(record.server_field(ServerField::Location), None);
        assert_eq!(record.server_field(ServerField::Country).as_deref(), Some("44"));
    }

    #[test]
    fn test_results_log_requires_array() {
        assert!(ResultsLog::from_json_str("[]").unwrap().is_empty());

        let err = ResultsLog::from_json_str(r#"{"timestamp": "x"}"#).unwrap_err();
        assert_eq!(err.category(), "PARSE");
        assert!(err.to_string().contains("an object"));

        assert!(ResultsLog::from_json_str("not json").is_err());
    }

    #[test]
    fn test_results_log_push_and_last() {
        let mut log = ResultsLog::from_json_str(r#"[{"timestamp": "2024-01-01T00:00:00", "extra": true}]"#).unwrap();
        let taken_at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let result = SpeedTestResult::from_measurement(&sample_measurement(), taken_at);

        log.push(&result).unwrap();

        assert_eq!(log.len(), 2);
        let last = log.last().unwrap();
        assert_eq!(last.timestamp(), Some("2026-01-02T03:04:05.000000+00:00"));
        assert_eq!(last.server_field(ServerField::Name).as_deref(), Some("Example ISP"));
        // Unknown fields on earlier records survive
        assert_eq!(log.records()[0]["extra"], json!(true));
    }

    #[test]
    fn test_pretty_json_uses_two_space_indent() {
        let log = ResultsLog::new(vec![json!({"ping_ms": 1.5})]);
        let text = log.to_pretty_json().unwrap();
        assert_eq!(text, "[\n  {\n    \"ping_ms\": 1.5\n  }\n]");
    }
}
