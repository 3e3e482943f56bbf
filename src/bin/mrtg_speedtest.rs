//! MRTG external script
//!
//! Prints the windowed average of one metric as the four lines MRTG expects.
//! Once the arguments parse it always exits 0; any failure prints a `0` value.

use clap::Parser;
use speedtest_graphing::{
    cli::MrtgCli,
    config::load_config,
    error::Result,
    logging::LoggerFactory,
    Aggregator, Metric, MrtgReport, ResultsStore,
};

fn main() {
    let cli = MrtgCli::parse();
    let metric = Metric::from(cli.metric);

    let report = build_report(&cli, metric).unwrap_or_else(|e| {
        eprintln!("{}", e.format_for_console(false));
        MrtgReport::for_value(metric, 0.0)
    });

    println!("{}", report);
}

fn build_report(cli: &MrtgCli, metric: Metric) -> Result<MrtgReport> {
    let config = load_config(cli)?;
    let logger = LoggerFactory::new(config.clone()).create_logger("MRTG");

    let store = ResultsStore::from_config(&config);
    let aggregator = Aggregator::new(store.load());
    let report = MrtgReport::average(&aggregator, metric, cli.hours);

    logger.debug(&format!("Average {} over {}h from {}", metric, cli.hours, store.path().display()))
        .field("records", aggregator.log().len())
        .field("value", report.value1)
        .log();

    Ok(report)
}
