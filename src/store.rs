//! Results log persistence
//!
//! The log is a single pretty-printed JSON array. Appends rewrite the whole
//! file; nothing coordinates concurrent writers.

use crate::{
    log_debug, log_info,
    logging::Logger,
    models::{Config, ResultsLog, SpeedTestResult},
    AppError, Result,
};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What a strict load found on disk
#[derive(Debug)]
pub enum LoadOutcome {
    /// No file at the path yet
    Missing,
    Loaded(ResultsLog),
    /// The file exists but is not a JSON array
    Corrupt(AppError),
}

/// Reads and appends to the results log at one path
pub struct ResultsStore {
    path: PathBuf,
    logger: Logger,
}

impl ResultsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            logger: Logger::new("STORE".to_string()),
        }
    }

    /// Store at the configured results path, logging per the configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            path: config.results_path(),
            logger: Logger::with_config("STORE".to_string(), config),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the log, telling a missing file apart from a corrupt one.
    /// Only a failure to read an existing file is an error.
    pub fn load_strict(&self) -> Result<LoadOutcome> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log_debug!(self.logger, "No results log at {}", self.path.display());
                return Ok(LoadOutcome::Missing);
            }
            Err(e) => {
                return Err(AppError::io(format!(
                    "Failed to read results log '{}': {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match ResultsLog::from_json_str(&content) {
            Ok(log) => {
                self.logger.debug(&format!("Loaded {} records from {}", log.len(), self.path.display()))
                    .field("records", log.len())
                    .log();
                Ok(LoadOutcome::Loaded(log))
            }
            Err(e) => Ok(LoadOutcome::Corrupt(e)),
        }
    }

    /// Load the log, degrading every failure to an empty log.
    /// The fallback is only reported at debug level.
    pub fn load(&self) -> ResultsLog {
        match self.load_strict() {
            Ok(LoadOutcome::Loaded(log)) => log,
            Ok(LoadOutcome::Missing) => ResultsLog::empty(),
            Ok(LoadOutcome::Corrupt(e)) | Err(e) => {
                self.logger.debug(&format!("Ignoring unreadable results log {}: {}", self.path.display(), e))
                    .error_info(&e)
                    .log();
                ResultsLog::empty()
            }
        }
    }

    fn ensure_parent_directory(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                log_info!(self.logger, "Creating results directory: {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::io(format!("Failed to create directory '{}': {}", parent.display(), e))
                })?;
            }
        }
        Ok(())
    }

    /// Append one result and rewrite the file, returning the new record count.
    ///
    /// A corrupt log is left untouched and reported as a parse error.
    pub fn append(&self, result: &SpeedTestResult) -> Result<usize> {
        let mut log = match self.load_strict()? {
            LoadOutcome::Missing => ResultsLog::empty(),
            LoadOutcome::Loaded(log) => log,
            LoadOutcome::Corrupt(e) => {
                return Err(AppError::parse(format!(
                    "Refusing to overwrite corrupt results log '{}': {}",
                    self.path.display(),
                    e
                )))
            }
        };

        log.push(result)?;
        self.ensure_parent_directory()?;

        let content = log.to_pretty_json()?;
        fs::write(&self.path, content).map_err(|e| {
            AppError::io(format!("Failed to write results log '{}': {}", self.path.display(), e))
        })?;

        self.logger.debug(&format!("Saved {} records to {}", log.len(), self.path.display())).log();
        Ok(log.len())
    }
}
