//! Zabbix agent user parameter
//!
//! `zbx-speedtest <metric_name>` prints one value. Any failure, including a
//! bad command line, exits 1 with a message on stderr.

use clap::{error::ErrorKind, Parser};
use speedtest_graphing::{
    cli::ZabbixCli,
    config::load_config,
    error::{AppError, Result},
    logging::LoggerFactory,
    Aggregator, MetricValue, ResultsStore, ZabbixKey,
};
use std::process;

fn main() {
    let cli = match ZabbixCli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            eprintln!("Usage: zbx-speedtest <metric_name>");
            process::exit(1);
        }
    };

    match evaluate(&cli) {
        Ok(value) => println!("{}", value),
        Err(e @ AppError::UnknownMetric(_)) => {
            eprintln!("{}", e);
            eprintln!("Available metrics: {}", ZabbixKey::available_keys());
            process::exit(e.exit_code());
        }
        Err(e) => {
            eprintln!("Error getting metric {}: {}", cli.key, e);
            process::exit(e.exit_code());
        }
    }
}

fn evaluate(cli: &ZabbixCli) -> Result<MetricValue> {
    let key: ZabbixKey = cli.key.parse()?;
    let config = load_config(cli)?;
    let logger = LoggerFactory::new(config.clone()).create_logger("ZABBIX");

    let store = ResultsStore::from_config(&config);
    let value = key.evaluate(&Aggregator::new(store.load()));

    logger.debug(&format!("{} = {}", key, value))
        .field("results_file", store.path().display().to_string())
        .log();

    Ok(value)
}
