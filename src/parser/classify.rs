//! Maps sensor units and raw state codes onto the small closed domains the
//! exposition layer selects metric series with.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

/// Discrete sensors named like "PS1 Status" (whitespace already removed).
static PSU_STATUS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PS\dStatus").expect("PSU_STATUS_NAME is a valid regex pattern")
});

const CHASSIS_INTRUSION_NAME: &str = "ChassisIntru";

/// Physical quantity a sensor measures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    FanSpeed,
    Temperature,
    Voltage,
    Current,
    Power,
    ChassisIntrusion,
    ChassisPowerDevice,
    /// Anything else; carries the unit as printed by ipmitool.
    Generic(String),
}

impl SensorKind {
    pub fn classify(unit: &str, name: &str) -> Self {
        match unit {
            "RPM" => Self::FanSpeed,
            "degrees C" => Self::Temperature,
            "Volts" => Self::Voltage,
            // older ipmitool builds spell it "Ampers"
            "Amps" | "Ampers" => Self::Current,
            "Watts" => Self::Power,
            "discrete" if name.contains(CHASSIS_INTRUSION_NAME) => Self::ChassisIntrusion,
            "discrete" if PSU_STATUS_NAME.is_match(name) => Self::ChassisPowerDevice,
            other => Self::Generic(other.to_string()),
        }
    }
}

/// Ordinal severity exported as the `*_state` gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok = 0,
    Critical = 1,
    NonRecoverable = 2,
    NonCritical = 3,
    Unspecified = 4,
}

impl Severity {
    pub fn value(self) -> f64 {
        f64::from(self as u8)
    }
}

/// Classified state column of a sensor row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorState {
    Known(Severity),
    /// The BMC printed "na": there is no state to report.
    NotAvailable,
    /// A code outside the lookup table, kept for diagnostics.
    Unrecognized(String),
}

impl SensorState {
    pub fn classify(raw: &str) -> Self {
        match raw {
            "ok" | "0x0000" => Self::Known(Severity::Ok),
            "cr" | "0x0100" => Self::Known(Severity::Critical),
            "nr" => Self::Known(Severity::NonRecoverable),
            "nc" => Self::Known(Severity::NonCritical),
            "ns" => Self::Known(Severity::Unspecified),
            "na" => Self::NotAvailable,
            other => {
                warn!("Unknown sensor state: '{}'", other);
                Self::Unrecognized(other.to_string())
            }
        }
    }

    /// Gauge value; NaN for both "not available" and "unrecognized".
    pub fn value(&self) -> f64 {
        match self {
            Self::Known(severity) => severity.value(),
            Self::NotAvailable | Self::Unrecognized(_) => f64::NAN,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            Self::Known(severity) => Some(*severity),
            _ => None,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FanSpeed => write!(f, "fan_speed"),
            Self::Temperature => write!(f, "temperature"),
            Self::Voltage => write!(f, "voltage"),
            Self::Current => write!(f, "current"),
            Self::Power => write!(f, "power"),
            Self::ChassisIntrusion => write!(f, "chassis_intrusion"),
            Self::ChassisPowerDevice => write!(f, "chassis_power_device"),
            Self::Generic(unit) => write!(f, "generic ({})", unit),
        }
    }
}
