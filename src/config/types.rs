//! Exporter configuration structs and defaults.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Module used when a scrape names no module, or one that does not exist.
pub const DEFAULT_MODULE: &str = "default";

/// Top-level YAML document.
///
/// ```yaml
/// modules:
///   default:
///     user: "default_user"
///     pass: "default_pass"
///     privilege: "user"
///     interface: "lanplus"
///     timeout: 5
///     collectors: [sensor, bmc, dcmi-power]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleConfig>,
}

/// Connection options for one module. Empty strings and a zero timeout are
/// left off the ipmitool command line.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    #[serde(default)]
    pub user: String,
    #[serde(default, alias = "password")]
    pub pass: String,
    #[serde(default)]
    pub privilege: String,     // "user", "operator", "administrator"
    #[serde(default)]
    pub interface: String,     // "lan", "lanplus", "open"
    #[serde(default)]
    pub timeout: u64,          // seconds, ipmitool -N
    #[serde(default = "default_collectors")]
    pub collectors: Vec<CollectorName>,
}

pub fn default_collectors() -> Vec<CollectorName> {
    vec![CollectorName::Sensor]
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            pass: String::new(),
            privilege: String::new(),
            interface: String::new(),
            timeout: 0,
            collectors: default_collectors(),
        }
    }
}

// Keep credentials out of debug logs
impl fmt::Debug for ModuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleConfig")
            .field("user", &self.user)
            .field("pass", &if self.pass.is_empty() { "" } else { "<redacted>" })
            .field("privilege", &self.privilege)
            .field("interface", &self.interface)
            .field("timeout", &self.timeout)
            .field("collectors", &self.collectors)
            .finish()
    }
}

/// Collectors a module can enable. Chassis power state is always collected
/// and is not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectorName {
    Sensor,
    Fru,
    Lan,
    Bmc,
    Fwum,
    DcmiPower,
}

impl CollectorName {
    /// Value of the `collector` label on `ipmi_up`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::Fru => "fru",
            Self::Lan => "lan",
            Self::Bmc => "bmc",
            Self::Fwum => "fwum",
            Self::DcmiPower => "dcmi-power",
        }
    }
}

impl fmt::Display for CollectorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
