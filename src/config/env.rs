//! Environment variable handling and .env file management

use crate::{
    error::{AppError, Result},
    logging::{LogFormat, LogLevel},
};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env from the current directory if it exists.
    /// Variables already set in the process environment win.
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                eprintln!("Loaded configuration from .env file");
            }
        } else if debug {
            eprintln!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Example .env file content
    pub fn create_example_env_content() -> String {
        let mut content = String::from(
            "# Speed test graphing configuration\n\
             #\n\
             # Values here are defaults; command-line arguments override them.\n\n",
        );

        for (var, description, example) in Self::get_supported_env_vars() {
            content.push_str(&format!("# {}\n# {}={}\n\n", description, var, example));
        }

        content
    }

    /// Check one variable's value before it is merged into the configuration
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let in_range = |min: u64, max: u64| -> Result<()> {
            let parsed: u64 = value
                .parse()
                .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            if parsed < min || parsed > max {
                return Err(AppError::validation(format!(
                    "{} must be between {} and {}, got: {}",
                    key, min, max, parsed
                )));
            }
            Ok(())
        };

        match key {
            "SPEEDTEST_RESULTS_FILE" if value.is_empty() => {
                Err(AppError::config("SPEEDTEST_RESULTS_FILE cannot be empty"))
            }
            "SPEEDTEST_SERVER_LIST_URL" => {
                let parsed = url::Url::parse(value)
                    .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_SERVER_LIST_URL '{}': {}", value, e)))?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!("Server list URL must use http or https: {}", value)));
                }
                Ok(())
            }
            "SPEEDTEST_TIMEOUT_SECONDS" => in_range(1, 300),
            "SPEEDTEST_CANDIDATE_SERVERS" => in_range(1, 20),
            "SPEEDTEST_LATENCY_SAMPLES" => in_range(1, 10),
            "SPEEDTEST_TEST_DURATION" => in_range(1, 120),
            "SPEEDTEST_CONCURRENCY" => in_range(1, 32),
            "SPEEDTEST_LOG_LEVEL" => value.parse::<LogLevel>().map(|_| ()),
            "SPEEDTEST_LOG_FORMAT" => value.parse::<LogFormat>().map(|_| ()),
            "ENABLE_COLOR" => value
                .parse::<bool>()
                .map(|_| ())
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e))),
            _ => Ok(()),
        }
    }

    /// Supported environment variables: name, description, example
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("SPEEDTEST_RESULTS_FILE", "Results log file name or path", "speedtest_results.json"),
            ("SPEEDTEST_DATA_DIR", "Directory relative results paths are resolved against", "/var/lib/speedtest"),
            ("SPEEDTEST_SEARCH_DIRS", "Comma-separated directories searched for an existing results file", "/opt/speedtest,/srv/speedtest"),
            ("SPEEDTEST_TIMEOUT_SECONDS", "HTTP request timeout in seconds (1-300)", "30"),
            ("SPEEDTEST_SERVER_LIST_URL", "speedtest.net server list URL", crate::defaults::DEFAULT_SERVER_LIST_URL),
            ("SPEEDTEST_CANDIDATE_SERVERS", "Servers probed for latency (1-20)", "5"),
            ("SPEEDTEST_LATENCY_SAMPLES", "Latency probes per server (1-10)", "3"),
            ("SPEEDTEST_TEST_DURATION", "Seconds per transfer phase (1-120)", "10"),
            ("SPEEDTEST_CONCURRENCY", "Transfer requests in flight (1-32)", "4"),
            ("SPEEDTEST_LOG_LEVEL", "Minimum log level written to stderr", "WARN"),
            ("SPEEDTEST_LOG_FORMAT", "Log format: console, json or compact", "console"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Environment variable help text
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<28} {}\n", var, description));
            help.push_str(&format!("  {:<28} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Warnings for currently set variables with bad values
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var, _, _)| {
                let value = std::env::var(var).ok()?;
                Self::validate_env_var(var, &value).err().map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}
