//! Type definitions shared by the runner, the aggregator and the adapters

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Numeric fields stored on every result record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Download throughput in Mbit/s
    Download,
    /// Upload throughput in Mbit/s
    Upload,
    /// Round trip latency to the selected server in milliseconds
    Ping,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Download, Metric::Upload, Metric::Ping];

    /// JSON field name on a result record
    pub fn field_name(&self) -> &'static str {
        match self {
            Metric::Download => "download_mbps",
            Metric::Upload => "upload_mbps",
            Metric::Ping => "ping_ms",
        }
    }

    /// Short name used on the command line
    pub fn short_name(&self) -> &'static str {
        match self {
            Metric::Download => "download",
            Metric::Upload => "upload",
            Metric::Ping => "ping",
        }
    }

    /// Capitalised name used in human-readable labels
    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::Download => "Download",
            Metric::Upload => "Upload",
            Metric::Ping => "Ping",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Download | Metric::Upload => "Mbps",
            Metric::Ping => "ms",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl std::str::FromStr for Metric {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "download" | "download_mbps" => Ok(Metric::Download),
            "upload" | "upload_mbps" => Ok(Metric::Upload),
            "ping" | "ping_ms" => Ok(Metric::Ping),
            other => Err(AppError::unknown_metric(other.to_string())),
        }
    }
}

/// Fields of the `server` object on a result record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServerField {
    Name,
    Location,
    Country,
}

impl ServerField {
    pub fn field_name(&self) -> &'static str {
        match self {
            ServerField::Name => "name",
            ServerField::Location => "location",
            ServerField::Country => "country",
        }
    }
}

/// How a stored timestamp string was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKind {
    /// Carried a `Z` marker or a numeric UTC offset
    Aware,
    /// No offset; read as host-local time at query time
    Naive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert_eq!(Metric::Download.field_name(), "download_mbps");
        assert_eq!(Metric::Upload.field_name(), "upload_mbps");
        assert_eq!(Metric::Ping.field_name(), "ping_ms");
        assert_eq!(Metric::Ping.display_name(), "Ping");
        assert_eq!(Metric::Upload.unit(), "Mbps");
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("download".parse::<Metric>().unwrap(), Metric::Download);
        assert_eq!("PING".parse::<Metric>().unwrap(), Metric::Ping);
        assert_eq!("upload_mbps".parse::<Metric>().unwrap(), Metric::Upload);

        let err = "jitter".parse::<Metric>().unwrap_err();
        assert_eq!(err.category(), "METRIC");
    }

    #[test]
    fn test_server_field_names() {
        assert_eq!(ServerField::Name.field_name(), "name");
        assert_eq!(ServerField::Location.field_name(), "location");
        assert_eq!(ServerField::Country.field_name(), "country");
    }
}
