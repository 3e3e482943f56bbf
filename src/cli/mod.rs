//! Command-line interfaces of the three binaries

use crate::{defaults::DEFAULT_WINDOW_HOURS, models::Config, types::Metric};
use clap::{Args, Parser, ValueEnum};
use std::io::{self, IsTerminal};
use std::path::PathBuf;

/// Flags every binary accepts
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct CommonArgs {
    /// Results log file name or path [default: speedtest_results.json]
    #[arg(long, value_name = "PATH")]
    pub results_file: Option<String>,

    /// Directory relative results paths are resolved against
    /// [default: directory of the executable]
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl CommonArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(results_file) = &self.results_file {
            config.results_file = results_file.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = Some(data_dir.clone());
        }
        if self.no_color {
            config.enable_color = false;
        }
        config.verbose = self.verbose;
        config.debug = self.debug;
    }
}

/// A parsed command line that can override configuration
pub trait CliOverrides {
    fn common(&self) -> &CommonArgs;

    /// Binary-specific overrides on top of the common ones
    fn apply_specific(&self, _config: &mut Config) {}

    /// Apply every override in this command line to `config`
    fn apply_overrides(&self, config: &mut Config) {
        self.common().apply(config);
        self.apply_specific(config);
    }

    /// Whether this binary runs a measurement. Binaries that only read the
    /// results log neither read nor validate measurement settings.
    fn measures(&self) -> bool {
        false
    }
}

/// Run an internet speed test and append the result to the results log
#[derive(Parser, Debug, Clone)]
#[command(name = "speedtest-runner", version, long_about = None)]
pub struct RunnerCli {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Request timeout in seconds (1-300)
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// URL of the speedtest.net server list
    #[arg(long, value_name = "URL")]
    pub server_list_url: Option<String>,

    /// Print the supported environment variables and an example .env file, then exit
    #[arg(long)]
    pub show_env: bool,
}

impl CliOverrides for RunnerCli {
    fn common(&self) -> &CommonArgs {
        &self.common
    }

    fn apply_specific(&self, config: &mut Config) {
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = timeout;
        }
        if let Some(url) = &self.server_list_url {
            config.server_list_url = url.clone();
        }
    }

    fn measures(&self) -> bool {
        true
    }
}

/// Metric names accepted by the MRTG adapter
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricArg {
    Download,
    Upload,
    Ping,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Download => Metric::Download,
            MetricArg::Upload => Metric::Upload,
            MetricArg::Ping => Metric::Ping,
        }
    }
}

/// Print a windowed speed test average in MRTG external-script format
#[derive(Parser, Debug, Clone)]
#[command(name = "mrtg-speedtest", version, long_about = None)]
pub struct MrtgCli {
    /// Metric to output
    #[arg(short, long, value_enum)]
    pub metric: MetricArg,

    /// Hours of data to average
    #[arg(long, default_value_t = DEFAULT_WINDOW_HOURS)]
    pub hours: u32,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CliOverrides for MrtgCli {
    fn common(&self) -> &CommonArgs {
        &self.common
    }
}

/// Print one speed test metric for a Zabbix agent
#[derive(Parser, Debug, Clone)]
#[command(name = "zbx-speedtest", version, long_about = None)]
pub struct ZabbixCli {
    /// Item key, for example speedtest.download or speedtest.server_name
    #[arg(value_name = "METRIC")]
    pub key: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CliOverrides for ZabbixCli {
    fn common(&self) -> &CommonArgs {
        &self.common
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if stdout supports color output
pub fn supports_color() -> bool {
    color_from_vars(|key| std::env::var(key).ok(), io::stdout().is_terminal())
}

/// Check if stderr, where log lines go, supports color output
pub fn stderr_supports_color() -> bool {
    color_from_vars(|key| std::env::var(key).ok(), io::stderr().is_terminal())
}

/// `NO_COLOR` and `TERM=dumb` disable color, `FORCE_COLOR` enables it even
/// when the stream is piped; otherwise only terminals get color.
fn color_from_vars<F>(lookup: F, is_terminal: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if lookup("TERM").as_deref() == Some("dumb") || lookup("NO_COLOR").is_some() {
        return false;
    }

    if lookup("FORCE_COLOR").is_some() {
        return true;
    }

    is_terminal
}
