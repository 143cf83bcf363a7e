//! Metric descriptors exported by the scraper.
//! Built once at startup and shared read-only by every scrape.

use crate::parser::SensorKind;

pub const NAMESPACE: &str = "ipmi";

macro_rules! state_help {
    ($what:literal) => {
        concat!($what, " (0=ok, 1=critical, 2=non-recoverable, 3=non-critical, 4=not-specified).")
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    pub name: String,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

impl Desc {
    fn new(subsystem: &str, name: &str, help: &'static str, labels: &'static [&'static str]) -> Self {
        Self {
            name: fq_name(NAMESPACE, subsystem, name),
            help,
            labels,
        }
    }
}

/// Join the non-empty parts with '_', e.g. ("ipmi", "fan_speed", "rpm").
pub fn fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// Value and state series for one classified sensor kind.
#[derive(Debug, Clone, Copy)]
pub struct SensorSeries<'a> {
    pub value: &'a Desc,
    pub state: &'a Desc,
    /// Generic series carry the unit as a `type` label.
    pub generic: bool,
}

#[derive(Debug, Clone)]
pub struct Descriptors {
    pub up: Desc,
    pub scrape_duration: Desc,

    pub sensor_value: Desc,
    pub sensor_state: Desc,
    pub fan_speed: Desc,
    pub fan_speed_state: Desc,
    pub temperature: Desc,
    pub temperature_state: Desc,
    pub voltage: Desc,
    pub voltage_state: Desc,
    pub current: Desc,
    pub current_state: Desc,
    pub power: Desc,
    pub power_state: Desc,
    pub chassis_intrusion: Desc,
    pub chassis_intrusion_state: Desc,
    pub chassis_power_device: Desc,
    pub chassis_power_device_state: Desc,

    pub chassis_power_state: Desc,
    pub power_consumption: Desc,
    pub fwum_info: Desc,
    pub bmc_info: Desc,
    pub fru_info: Desc,
    pub lan_info: Desc,
}

impl Descriptors {
    pub fn new() -> Self {
        Self {
            up: Desc::new("", "up", "'1' if a scrape of the IPMI device was successful, '0' otherwise.", &["collector"]),
            scrape_duration: Desc::new("scrape_duration", "seconds", "Returns how long the scrape took to complete in seconds.", &[]),

            sensor_value: Desc::new("sensor", "value", "Generic data read from an IPMI sensor of unknown type, relying on labels for context.", &["name", "type"]),
            sensor_state: Desc::new("sensor", "state", state_help!("Indicates the severity of the state reported by an IPMI sensor"), &["name", "type"]),
            fan_speed: Desc::new("fan_speed", "rpm", "Fan speed in rotations per minute.", &["name"]),
            fan_speed_state: Desc::new("fan_speed", "state", state_help!("Reported state of a fan speed sensor"), &["name"]),
            temperature: Desc::new("temperature", "celsius", "Temperature reading in degree Celsius.", &["name"]),
            temperature_state: Desc::new("temperature", "state", state_help!("Reported state of a temperature sensor"), &["name"]),
            voltage: Desc::new("voltage", "volts", "Voltage reading in Volts.", &["name"]),
            voltage_state: Desc::new("voltage", "state", state_help!("Reported state of a voltage sensor"), &["name"]),
            current: Desc::new("current", "amperes", "Current reading in Amperes.", &["name"]),
            current_state: Desc::new("current", "state", state_help!("Reported state of a current sensor"), &["name"]),
            power: Desc::new("power", "watts", "Power reading in Watts.", &["name"]),
            power_state: Desc::new("sensor_power", "state", state_help!("Reported state of a power sensor"), &["name"]),
            chassis_intrusion: Desc::new("chassis_int", "value", "State of Chassis Intrusion.", &["name"]),
            chassis_intrusion_state: Desc::new("chassis_int", "state", "Reported state of a Chassis Intrusion (0=ok, 1=intrusion).", &["name"]),
            chassis_power_device: Desc::new("chassis_power_dev", "value", "Chassis Power Supply device status (0=missing, 1=present).", &["name"]),
            chassis_power_device_state: Desc::new("chassis_power_dev", "state", "Reported state of a Power Supply (0=missing, 1=present).", &["name"]),

            chassis_power_state: Desc::new("power", "state", "Reported Chassis Power State (0=off, 1=on).", &["name"]),
            power_consumption: Desc::new("dcmi", "power_consumption_watts", "Current power consumption in Watts.", &["name"]),
            fwum_info: Desc::new("fwum", "info", "Constant metric with value '1' providing details about the BMC firmware.", &["firmware_revision", "manufacturer_id"]),
            bmc_info: Desc::new("bmc", "info", "Constant metric with value '1' providing details about the BMC.", &["name", "value"]),
            fru_info: Desc::new("fru", "info", "Constant metric with value '1' providing details from FRU.", &["name", "value"]),
            lan_info: Desc::new("lan", "info", "Constant metric with value '1' providing details from LAN.", &["name", "value"]),
        }
    }

    /// Series a sensor of the given kind is exported under.
    pub fn sensor_series(&self, kind: &SensorKind) -> SensorSeries<'_> {
        let (value, state) = match kind {
            SensorKind::FanSpeed => (&self.fan_speed, &self.fan_speed_state),
            SensorKind::Temperature => (&self.temperature, &self.temperature_state),
            SensorKind::Voltage => (&self.voltage, &self.voltage_state),
            SensorKind::Current => (&self.current, &self.current_state),
            SensorKind::Power => (&self.power, &self.power_state),
            SensorKind::ChassisIntrusion => (&self.chassis_intrusion, &self.chassis_intrusion_state),
            SensorKind::ChassisPowerDevice => (&self.chassis_power_device, &self.chassis_power_device_state),
            SensorKind::Generic(_) => {
                return SensorSeries {
                    value: &self.sensor_value,
                    state: &self.sensor_state,
                    generic: true,
                }
            }
        };
        SensorSeries {
            value,
            state,
            generic: false,
        }
    }
}

impl Default for Descriptors {
    fn default() -> Self {
        Self::new()
    }
}
