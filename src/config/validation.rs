//! Non-fatal configuration checks

use crate::{error::Result, models::Config};
use std::fmt;

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// A configuration finding that does not stop the run
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

/// Validate hard limits, then collect warnings about settings that work but look wrong
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    config.validate()?;

    let mut warnings = Vec::new();

    if let Ok(parsed) = url::Url::parse(&config.server_list_url) {
        if parsed.scheme() == "http" {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Server list URL '{}' uses HTTP instead of HTTPS", config.server_list_url),
            ));
        }
    }

    for dir in &config.search_dirs {
        if !dir.is_dir() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Search directory '{}' does not exist", dir.display()),
            ));
        }
    }

    if let Some(data_dir) = &config.data_dir {
        if data_dir.exists() && !data_dir.is_dir() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Data directory '{}' is not a directory", data_dir.display()),
            ));
        }
    }

    // Every phase needs at least one full request to finish
    if config.test_duration_seconds > config.timeout_seconds {
        warnings.push(ValidationWarning::new(
            ValidationLevel::Info,
            format!(
                "Transfer phases run for {}s but requests time out after {}s",
                config.test_duration_seconds, config.timeout_seconds
            ),
        ));
    }

    if config.concurrency > 16 {
        warnings.push(ValidationWarning::new(
            ValidationLevel::Warning,
            format!("{} concurrent transfers may saturate the server rather than the link", config.concurrency),
        ));
    }

    Ok(warnings)
}
