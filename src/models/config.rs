//! Configuration data model and validation

use crate::logging::{LogFormat, LogLevel};
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration, shared by all three binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Results log file name or path
    #[serde(default = "default_results_file")]
    pub results_file: String,

    /// Directory relative results paths are resolved against.
    /// `None` means the directory holding the running executable.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Directories probed, in order, for an existing results file before
    /// falling back to `data_dir`
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,

    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Where the speed test server list is fetched from
    #[serde(default = "default_server_list_url")]
    pub server_list_url: String,

    /// How many servers from the list are latency-probed
    #[serde(default = "default_candidate_servers")]
    pub candidate_servers: usize,

    /// Latency probes per candidate server
    #[serde(default = "default_latency_samples")]
    pub latency_samples: u32,

    /// Time budget for each of the download and upload phases
    #[serde(default = "default_test_duration_secs")]
    pub test_duration_seconds: u64,

    /// Maximum transfer requests in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Minimum level written to stderr
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            results_file: default_results_file(),
            data_dir: None,
            search_dirs: Vec::new(),
            timeout_seconds: default_timeout_secs(),
            server_list_url: default_server_list_url(),
            candidate_servers: default_candidate_servers(),
            latency_samples: default_latency_samples(),
            test_duration_seconds: default_test_duration_secs(),
            concurrency: default_concurrency(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Get the per-phase transfer budget as Duration
    pub fn test_duration(&self) -> Duration {
        Duration::from_secs(self.test_duration_seconds)
    }

    /// Effective log level once `--verbose`/`--debug` are taken into account
    pub fn effective_log_level(&self) -> LogLevel {
        if self.debug {
            LogLevel::Debug.min(self.log_level)
        } else if self.verbose {
            LogLevel::Info.min(self.log_level)
        } else {
            self.log_level
        }
    }

    /// Directory relative results paths are resolved against
    pub fn base_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }

        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve the results log location.
    ///
    /// Absolute paths are used as-is. A relative path is looked up in each
    /// search directory first and only the first existing match wins;
    /// otherwise it lands in the base directory.
    pub fn results_path(&self) -> PathBuf {
        let file = Path::new(&self.results_file);
        if file.is_absolute() {
            return file.to_path_buf();
        }

        self.search_dirs
            .iter()
            .map(|dir| dir.join(file))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| self.base_dir().join(file))
    }

    /// Validate every setting; what the runner needs
    pub fn validate(&self) -> Result<()> {
        self.validate_results()?;
        self.validate_measurement()
    }

    /// Validate the settings the metric readers depend on
    pub fn validate_results(&self) -> Result<()> {
        if self.results_file.trim().is_empty() {
            return Err(AppError::validation("Results file cannot be empty"));
        }
        Ok(())
    }

    /// Validate the settings only a measurement run uses
    pub fn validate_measurement(&self) -> Result<()> {
        match url::Url::parse(&self.server_list_url) {
            Ok(parsed) => {
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::validation(format!(
                        "Server list URL must use http or https: {}",
                        self.server_list_url
                    )));
                }
            }
            Err(e) => {
                return Err(AppError::validation(format!(
                    "Invalid server list URL '{}': {}",
                    self.server_list_url, e
                )));
            }
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(AppError::validation("Timeout must be between 1 and 300 seconds"));
        }

        if self.candidate_servers == 0 || self.candidate_servers > 20 {
            return Err(AppError::validation("Candidate servers must be between 1 and 20"));
        }

        if self.latency_samples == 0 || self.latency_samples > 10 {
            return Err(AppError::validation("Latency samples must be between 1 and 10"));
        }

        if self.test_duration_seconds == 0 || self.test_duration_seconds > 120 {
            return Err(AppError::validation("Test duration must be between 1 and 120 seconds"));
        }

        if self.concurrency == 0 || self.concurrency > 32 {
            return Err(AppError::validation("Concurrency must be between 1 and 32"));
        }

        Ok(())
    }

    /// Merge settings from an arbitrary variable lookup
    pub fn merge_from_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.merge_results_vars(&lookup)?;
        self.merge_measurement_vars(&lookup)
    }

    /// Merge only the variables the metric readers use: results location,
    /// logging and color. Measurement variables are left unread.
    pub fn merge_results_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(results_file) = lookup("SPEEDTEST_RESULTS_FILE") {
            if !results_file.trim().is_empty() {
                self.results_file = results_file.trim().to_string();
            }
        }

        if let Some(data_dir) = lookup("SPEEDTEST_DATA_DIR") {
            if !data_dir.trim().is_empty() {
                self.data_dir = Some(PathBuf::from(data_dir.trim()));
            }
        }

        if let Some(search_dirs) = lookup("SPEEDTEST_SEARCH_DIRS") {
            self.search_dirs = search_dirs
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
        }

        if let Some(level) = lookup("SPEEDTEST_LOG_LEVEL") {
            self.log_level = parse_var("SPEEDTEST_LOG_LEVEL", &level)?;
        }

        if let Some(format) = lookup("SPEEDTEST_LOG_FORMAT") {
            self.log_format = parse_var("SPEEDTEST_LOG_FORMAT", &format)?;
        }

        if let Some(enable_color) = lookup("ENABLE_COLOR") {
            self.enable_color = parse_var("ENABLE_COLOR", &enable_color)?;
        }

        Ok(())
    }

    /// Merge the variables only a measurement run uses
    pub fn merge_measurement_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timeout) = lookup("SPEEDTEST_TIMEOUT_SECONDS") {
            self.timeout_seconds = parse_var("SPEEDTEST_TIMEOUT_SECONDS", &timeout)?;
        }

        if let Some(url) = lookup("SPEEDTEST_SERVER_LIST_URL") {
            self.server_list_url = url.trim().to_string();
        }

        if let Some(count) = lookup("SPEEDTEST_CANDIDATE_SERVERS") {
            self.candidate_servers = parse_var("SPEEDTEST_CANDIDATE_SERVERS", &count)?;
        }

        if let Some(samples) = lookup("SPEEDTEST_LATENCY_SAMPLES") {
            self.latency_samples = parse_var("SPEEDTEST_LATENCY_SAMPLES", &samples)?;
        }

        if let Some(duration) = lookup("SPEEDTEST_TEST_DURATION") {
            self.test_duration_seconds = parse_var("SPEEDTEST_TEST_DURATION", &duration)?;
        }

        if let Some(concurrency) = lookup("SPEEDTEST_CONCURRENCY") {
            self.concurrency = parse_var("SPEEDTEST_CONCURRENCY", &concurrency)?;
        }

        Ok(())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}

// Default value functions for serde
fn default_results_file() -> String {
    crate::defaults::DEFAULT_RESULTS_FILE.to_string()
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_server_list_url() -> String {
    crate::defaults::DEFAULT_SERVER_LIST_URL.to_string()
}

fn default_candidate_servers() -> usize {
    crate::defaults::DEFAULT_CANDIDATE_SERVERS
}

fn default_latency_samples() -> u32 {
    crate::defaults::DEFAULT_LATENCY_SAMPLES
}

fn default_test_duration_secs() -> u64 {
    crate::defaults::DEFAULT_TEST_DURATION.as_secs()
}

fn default_concurrency() -> usize {
    crate::defaults::DEFAULT_CONCURRENCY
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_format() -> LogFormat {
    LogFormat::Console
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
