//! ipmitool subprocess executor.
//! Builds the ipmitool command line from a resolved module and target, and
//! returns the combined text output for the parsers.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, trace};

use crate::config::types::{CollectorName, ModuleConfig};

/// Default wall-clock limit for one ipmitool invocation.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// ipmitool subcommands, one per output dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum IpmiCommand {
    Sensor,
    Fru,
    Power,
    Fwum,
    Bmc,
    Lan,
    #[value(name = "dcmi-power")]
    DcmiPower,
}

impl IpmiCommand {
    pub fn args(self) -> &'static [&'static str] {
        match self {
            Self::Sensor => &["sensor", "list"],
            Self::Fru => &["fru", "list"],
            Self::Power => &["power", "status"],
            Self::Fwum => &["fwum", "info"],
            Self::Bmc => &["bmc", "info"],
            Self::Lan => &["lan", "print"],
            Self::DcmiPower => &["dcmi", "power", "reading", "1_min"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::Fru => "fru",
            Self::Power => "power",
            Self::Fwum => "fwum",
            Self::Bmc => "bmc",
            Self::Lan => "lan",
            Self::DcmiPower => "dcmi-power",
        }
    }

    /// `fwum info` exits 1 even when it printed valid output.
    fn tolerates_failure(self) -> bool {
        self == Self::Fwum
    }
}

impl From<CollectorName> for IpmiCommand {
    fn from(collector: CollectorName) -> Self {
        match collector {
            CollectorName::Sensor => Self::Sensor,
            CollectorName::Fru => Self::Fru,
            CollectorName::Lan => Self::Lan,
            CollectorName::Bmc => Self::Bmc,
            CollectorName::Fwum => Self::Fwum,
            CollectorName::DcmiPower => Self::DcmiPower,
        }
    }
}

/// A BMC to scrape and the options resolved for it.
#[derive(Debug, Clone)]
pub struct IpmiTarget {
    /// Empty for the local BMC.
    pub host: String,
    pub module: ModuleConfig,
}

impl IpmiTarget {
    pub fn new(host: impl Into<String>, module: ModuleConfig) -> Self {
        Self {
            host: host.into(),
            module,
        }
    }

    pub fn is_local(&self) -> bool {
        self.host.is_empty()
    }

    /// Name for logs: the host, or "[local]".
    pub fn display_name(&self) -> &str {
        if self.is_local() {
            "[local]"
        } else {
            &self.host
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to execute ipmitool {command}: {source}")]
    Spawn {
        command: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("ipmitool {command} timed out after {after:?}")]
    Timeout {
        command: &'static str,
        after: Duration,
    },

    #[error("ipmitool {command} failed ({status}): {output}")]
    Failed {
        command: &'static str,
        status: String,
        output: String,
    },
}

/// Connection flags for a module, in ipmitool's order:
/// `-I <interface> -L <privilege> -U <user> -P <pass> -N <timeout>`.
pub fn ipmitool_args(module: &ModuleConfig) -> Vec<String> {
    let mut args = Vec::new();
    let flags = [
        ("-I", module.interface.as_str()),
        ("-L", module.privilege.as_str()),
        ("-U", module.user.as_str()),
        ("-P", module.pass.as_str()),
    ];
    for (flag, value) in flags {
        if !value.is_empty() {
            args.push(flag.to_string());
            args.push(value.to_string());
        }
    }
    if module.timeout != 0 {
        args.push("-N".to_string());
        args.push(module.timeout.to_string());
    }
    args
}

/// Full argument list: connection flags, `-H <host>` for remote targets, then
/// the subcommand.
pub fn build_args(target: &IpmiTarget, command: IpmiCommand) -> Vec<String> {
    let mut args = ipmitool_args(&target.module);
    if !target.is_local() {
        args.push("-H".to_string());
        args.push(target.host.clone());
    }
    args.extend(command.args().iter().map(|a| a.to_string()));
    args
}

/// Argument list safe for logs.
fn redacted(args: &[String]) -> String {
    let mut out = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            out.push("******");
            hide_next = false;
        } else {
            hide_next = arg == "-P";
            out.push(arg.as_str());
        }
    }
    out.join(" ")
}

/// Source of raw ipmitool output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run one subcommand against `target` and return its combined output.
    async fn run(&self, target: &IpmiTarget, command: IpmiCommand) -> Result<String, ExecError>;
}

/// Runs the real `ipmitool` binary.
#[derive(Debug, Clone)]
pub struct Ipmitool {
    program: String,
    timeout: Duration,
}

impl Ipmitool {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "ipmitool".to_string(),
            timeout,
        }
    }

    /// Use a different binary, e.g. a wrapper script.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for Ipmitool {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

#[async_trait]
impl CommandRunner for Ipmitool {
    async fn run(&self, target: &IpmiTarget, command: IpmiCommand) -> Result<String, ExecError> {
        let args = build_args(target, command);
        trace!("Executing: {} {}", self.program, redacted(&args));

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&args).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ExecError::Timeout {
                command: command.name(),
                after: self.timeout,
            })?
            .map_err(|source| ExecError::Spawn {
                command: command.name(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            if command.tolerates_failure() {
                debug!("Exit status of {} was {}, but it was suppressed", command.name(), output.status);
            } else {
                error!(
                    "Error while calling {} for {}: {} {}",
                    command.name(),
                    target.display_name(),
                    self.program,
                    redacted(&args)
                );
                return Err(ExecError::Failed {
                    command: command.name(),
                    status: output.status.to_string(),
                    output: text.trim().to_string(),
                });
            }
        }

        Ok(text)
    }
}
