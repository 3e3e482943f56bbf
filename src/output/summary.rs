//! Human-readable summary printed by the runner

use crate::{models::SpeedTestResult, AppError, Result};
use colored::*;
use std::fmt::Write as _;

const RULE_WIDTH: usize = 50;

/// Renders one stored result for a terminal
pub trait SummaryFormatter {
    fn format_result(&self, result: &SpeedTestResult) -> Result<String>;
}

/// Render a float the way the log's consumers have always seen it:
/// shortest round-trip form, integral values keep one decimal (`11.0`).
pub fn display_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn summary_error(e: std::fmt::Error) -> AppError {
    AppError::internal(format!("Failed to format summary: {}", e))
}

/// Plain text summary
pub struct PlainSummary;

impl SummaryFormatter for PlainSummary {
    fn format_result(&self, result: &SpeedTestResult) -> Result<String> {
        let rule = "=".repeat(RULE_WIDTH);
        let mut output = String::new();

        writeln!(output, "{}", rule).map_err(summary_error)?;
        writeln!(output, "Speed Test Results:").map_err(summary_error)?;
        writeln!(output, "{}", rule).map_err(summary_error)?;
        writeln!(output, "Download: {} Mbps", display_float(result.download_mbps)).map_err(summary_error)?;
        writeln!(output, "Upload: {} Mbps", display_float(result.upload_mbps)).map_err(summary_error)?;
        writeln!(output, "Ping: {} ms", display_float(result.ping_ms)).map_err(summary_error)?;
        writeln!(output, "Server: {} ({})", result.server.name, result.server.location).map_err(summary_error)?;
        writeln!(output, "Timestamp: {}", result.timestamp).map_err(summary_error)?;
        write!(output, "{}", rule).map_err(summary_error)?;

        Ok(output)
    }
}

/// Summary with the header and values highlighted
pub struct ColoredSummary;

impl SummaryFormatter for ColoredSummary {
    fn format_result(&self, result: &SpeedTestResult) -> Result<String> {
        let rule = "=".repeat(RULE_WIDTH).bright_black();
        let mut output = String::new();

        writeln!(output, "{}", rule).map_err(summary_error)?;
        writeln!(output, "{}", "Speed Test Results:".bold().cyan()).map_err(summary_error)?;
        writeln!(output, "{}", rule).map_err(summary_error)?;
        writeln!(output, "Download: {} Mbps", display_float(result.download_mbps).green().bold()).map_err(summary_error)?;
        writeln!(output, "Upload: {} Mbps", display_float(result.upload_mbps).green().bold()).map_err(summary_error)?;
        writeln!(output, "Ping: {} ms", display_float(result.ping_ms).yellow().bold()).map_err(summary_error)?;
        writeln!(output, "Server: {} ({})", result.server.name.bold(), result.server.location).map_err(summary_error)?;
        writeln!(output, "Timestamp: {}", result.timestamp.dimmed()).map_err(summary_error)?;
        write!(output, "{}", rule).map_err(summary_error)?;

        Ok(output)
    }
}

/// Pick the summary formatter for the terminal
pub fn create_summary_formatter(enable_color: bool) -> Box<dyn SummaryFormatter> {
    if enable_color {
        Box::new(ColoredSummary)
    } else {
        Box::new(PlainSummary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServerInfo;

    fn sample() -> SpeedTestResult {
        SpeedTestResult {
            timestamp: "2026-10-18T09:30:00.123456+00:00".to_string(),
            download_mbps: 94.46,
            upload_mbps: 11.0,
            ping_ms: 12.35,
            server: ServerInfo::new("Example ISP", "Springfield", "United States"),
        }
    }

    #[test]
    fn test_display_float() {
        assert_eq!(display_float(11.0), "11.0");
        assert_eq!(display_float(94.46), "94.46");
        assert_eq!(display_float(0.0), "0.0");
        assert_eq!(display_float(0.1), "0.1");
    }

    #[test]
    fn test_plain_summary_block() {
        let text = PlainSummary.format_result(&sample()).unwrap();
        let rule = "=".repeat(50);
        let expected = [
            rule.as_str(),
            "Speed Test Results:",
            rule.as_str(),
            "Download: 94.46 Mbps",
            "Upload: 11.0 Mbps",
            "Ping: 12.35 ms",
            "Server: Example ISP (Springfield)",
            "Timestamp: 2026-10-18T09:30:00.123456+00:00",
            rule.as_str(),
        ]
        .join("\n");

        assert_eq!(text, expected);
    }

    #[test]
    fn test_colored_summary_keeps_content() {
        colored::control::set_override(false);
        let plain = PlainSummary.format_result(&sample()).unwrap();
        let colored = create_summary_formatter(true).format_result(&sample()).unwrap();
        colored::control::unset_override();

        assert_eq!(plain, colored);
    }
}
