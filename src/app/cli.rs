//! Command-line argument definitions (clap).

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::app::logging::LogFormat;
use crate::system::executor::IpmiCommand;

#[derive(Parser, Debug)]
#[command(name = "pankha-ipmi-exporter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pankha IPMI Exporter - BMC telemetry for Prometheus via ipmitool", long_about = None)]
pub struct Args {
    // === Server ===
    /// Path to the YAML module configuration
    #[arg(long = "config-file", help_heading = "Server")]
    pub config_file: Option<PathBuf>,

    /// Address to listen on for HTTP scrapes
    #[arg(long = "listen-address", default_value = "0.0.0.0:9290", help_heading = "Server")]
    pub listen_address: SocketAddr,

    /// Seconds before an ipmitool invocation is killed
    #[arg(long = "command-timeout", default_value_t = 30, help_heading = "Server")]
    pub command_timeout: u64,

    // === Logging ===
    /// Set log level (TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL)
    #[arg(long = "log-level", help_heading = "Logging")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text, help_heading = "Logging")]
    pub log_format: LogFormat,

    // === Config & Debug ===
    /// Validate the configuration file and exit
    #[arg(long, help_heading = "Config & Debug")]
    pub check: bool,

    /// Run a single scrape and print the exposition to stdout
    #[arg(long, help_heading = "Config & Debug")]
    pub test: bool,

    /// Target for --test (omit for the local BMC)
    #[arg(long, requires = "test", help_heading = "Config & Debug")]
    pub target: Option<String>,

    /// Module for --test
    #[arg(long, default_value = "default", help_heading = "Config & Debug")]
    pub module: String,

    /// Parse captured ipmitool output and print the records as JSON
    #[arg(
        long,
        num_args = 2,
        value_names = ["DIALECT", "FILE"],
        conflicts_with_all = ["check", "test"],
        help_heading = "Config & Debug"
    )]
    pub parse: Option<Vec<String>>,
}

impl Args {
    /// Split `--parse DIALECT FILE` into its typed parts.
    pub fn parse_request(&self) -> Option<Result<(IpmiCommand, PathBuf), String>> {
        use clap::ValueEnum;

        let values = self.parse.as_ref()?;
        let [dialect, file] = values.as_slice() else {
            return Some(Err("--parse takes exactly two values".to_string()));
        };
        Some(
            IpmiCommand::from_str(dialect, true)
                .map(|command| (command, PathBuf::from(file))),
        )
    }
}
