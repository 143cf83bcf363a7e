//! Pankha IPMI exporter entry point: CLI dispatch, logging, HTTP server.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use pankha_ipmi_exporter::app::cli::Args;
use pankha_ipmi_exporter::app::logging::{init_tracing, level_filter};
use pankha_ipmi_exporter::collector::Scraper;
use pankha_ipmi_exporter::config::{load_config, SafeConfig};
use pankha_ipmi_exporter::metrics::Descriptors;
use pankha_ipmi_exporter::parser::{self, Parsed};
use pankha_ipmi_exporter::server::{self, AppState};
use pankha_ipmi_exporter::system::executor::{IpmiCommand, Ipmitool};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Priority: 1. --log-level flag, 2. LOG_LEVEL env, 3. default (info)
    let log_level = args
        .log_level
        .clone()
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());

    let filter = level_filter(&log_level).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}'. Using INFO. Valid levels: TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL",
            log_level
        );
        "info"
    });
    init_tracing(filter, args.log_format);

    if let Some(request) = args.parse_request() {
        let (command, file) = request.map_err(anyhow::Error::msg)?;
        let clean = run_parse(command, &file)?;
        std::process::exit(if clean { 0 } else { 1 });
    }

    if args.check {
        return run_check(&args);
    }

    let config = Arc::new(
        SafeConfig::from_path(args.config_file.as_deref()).context("Failed to load configuration")?,
    );
    let runner = Arc::new(Ipmitool::new(Duration::from_secs(args.command_timeout)));
    let scraper = Scraper::new(runner, config, Arc::new(Descriptors::default()));

    if args.test {
        let target = args.target.as_deref().unwrap_or("");
        let metrics = scraper.scrape(target, &args.module).await;
        print!("{}", metrics.render());
        return Ok(());
    }

    info!(
        "Starting pankha-ipmi-exporter v{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH
    );

    let state = AppState {
        scraper,
        config_path: args.config_file.clone().map(Arc::new),
    };

    #[cfg(unix)]
    server::spawn_reload_on_sighup(state.clone())?;

    server::serve(args.listen_address, state).await
}

/// Validate the configuration file and list its modules.
fn run_check(args: &Args) -> Result<()> {
    let Some(path) = args.config_file.as_deref() else {
        println!("No --config-file given; the built-in default module will be used.");
        return Ok(());
    };

    let config = load_config(path)?;
    println!("Configuration OK: {}", path.display());
    for (name, module) in &config.modules {
        let collectors: Vec<&str> = module.collectors.iter().map(|c| c.as_str()).collect();
        println!("  module {:<16} collectors: {}", name, collectors.join(", "));
    }
    Ok(())
}

/// Parse captured ipmitool output from `file` and print it as JSON.
/// Returns false if the parser reported an error.
fn run_parse(command: IpmiCommand, file: &Path) -> Result<bool> {
    let output = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    match command {
        IpmiCommand::Sensor => print_parsed(parser::parse_sensor_list(&output)),
        IpmiCommand::Fru => print_parsed(parser::parse_fru_list(&output)),
        IpmiCommand::Fwum => print_parsed(parser::parse_fwum_info(&output)),
        IpmiCommand::DcmiPower => print_parsed(parser::parse_dcmi_power(&output)),
        IpmiCommand::Lan => print_json(&parser::parse_lan_print(&output)).map(|_| true),
        IpmiCommand::Bmc => print_json(&parser::parse_bmc_info(&output)).map(|_| true),
        IpmiCommand::Power => print_json(&parser::parse_chassis_power(&output)).map(|_| true),
    }
}

fn print_parsed<T: Serialize>(parsed: Parsed<T>) -> Result<bool> {
    print_json(&parsed.records)?;
    match parsed.error {
        Some(e) => {
            warn!("{}", e);
            Ok(false)
        }
        None => Ok(true),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
