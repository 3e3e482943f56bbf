//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::CliOverrides,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Layers defaults, `.env`, the environment and a command line into a [`Config`]
pub struct ConfigParser<'a, C: CliOverrides> {
    cli: &'a C,
}

impl<'a, C: CliOverrides> ConfigParser<'a, C> {
    pub fn new(cli: &'a C) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file(self.cli.common().debug)?;
        self.finish(Config::default(), |key| std::env::var(key).ok())
    }

    /// Like [`parse`](Self::parse) but reading variables from `lookup` and skipping `.env`
    pub fn parse_with_vars<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.finish(Config::default(), lookup)
    }

    fn finish<F>(&self, mut config: Config, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.cli.measures() {
            config.merge_from_vars(lookup)?;
        } else {
            config.merge_results_vars(lookup)?;
        }

        self.cli.apply_overrides(&mut config);

        if self.cli.measures() {
            config.validate()?;
        } else {
            config.validate_results()?;
        }

        Ok(config)
    }
}

/// Convenience function to load complete configuration from a command line
pub fn load_config<C: CliOverrides>(cli: &C) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Configuration summary for debug output
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Results File: {}", config.results_path().display()));
    if !config.search_dirs.is_empty() {
        let dirs: Vec<String> = config.search_dirs.iter().map(|d| d.display().to_string()).collect();
        summary.push(format!("Search Dirs: {}", dirs.join(", ")));
    }
    summary.push(format!("Server List: {}", config.server_list_url));
    summary.push(format!(
        "Servers: {} candidates, {} latency samples",
        config.candidate_servers, config.latency_samples
    ));
    summary.push(format!(
        "Transfers: {}s per phase, {} in flight",
        config.test_duration_seconds, config.concurrency
    ));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Log Level: {}", config.effective_log_level().as_str()));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
