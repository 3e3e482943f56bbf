//! Speed test runner
//!
//! Runs one speed test, appends the result to the results log and prints a
//! summary. Meant to be scheduled from cron.

use clap::Parser;
use speedtest_graphing::{
    cli::{stderr_supports_color, supports_color, RunnerCli},
    config::{display_config_summary, load_config, validate_config, EnvManager},
    error::Result,
    logging::LoggerFactory,
    output::create_summary_formatter,
    version_banner, HttpSpeedTester, ResultsStore, Runner,
};
use std::{io, process};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = RunnerCli::parse();

    if cli.show_env {
        print_env_help();
        return;
    }

    if let Err(e) = run_application(cli).await {
        eprintln!("Error running speed test: {}", e.format_for_console(stderr_supports_color()));
        if let Some(suggestion) = e.suggestion() {
            eprintln!();
            eprintln!("  {}", suggestion);
        }
        process::exit(e.exit_code());
    }
}

fn print_env_help() {
    println!("{}", EnvManager::display_env_help());
    println!("Example .env file:\n");
    print!("{}", EnvManager::create_example_env_content());

    for warning in EnvManager::validate_current_env() {
        eprintln!("{}", warning);
    }
}

async fn run_application(cli: RunnerCli) -> Result<()> {
    let config = load_config(&cli)?;
    let use_color = config.enable_color && supports_color();

    let factory = LoggerFactory::new(config.clone());
    let logger = factory.create_logger("RUNNER");

    logger.debug(&version_banner()).log();
    if config.debug {
        for line in display_config_summary(&config).lines() {
            logger.debug(line).log();
        }
    }
    for warning in validate_config(&config)? {
        logger.warn(&warning.to_string()).log();
    }

    let tester = HttpSpeedTester::with_logger(&config, factory.create_network_logger())?;
    let runner = Runner::new(tester, ResultsStore::from_config(&config), logger);

    let result = runner.run_and_save(&mut io::stdout()).await.map_err(|e| {
        factory.create_error_logger().log_error(&e, Some("speed test"), None);
        e
    })?;

    let summary = create_summary_formatter(use_color).format_result(&result)?;
    println!();
    println!("{}", summary);

    Ok(())
}
