//! Record types produced by the parsers. All records live for one scrape.

use serde::Serialize;

/// One row of `ipmitool sensor list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRecord {
    pub name: String,       // whitespace removed: "CPU1 Temp" -> "CPU1Temp"
    pub value: f64,         // NaN when the reading is "na"
    pub unit: String,       // "degrees C", "RPM", "discrete", ...
    #[serde(rename = "state")]
    pub raw_state: String,  // "ok", "cr", "0x0100", "na", ...
}

impl SensorRecord {
    /// True when the BMC reported no reading for this sensor.
    pub fn is_unavailable(&self) -> bool {
        self.value.is_nan()
    }
}

/// A named field from one of the key/value listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValueRecord<V> {
    pub name: String,
    pub value: V,
}

impl<V> KeyValueRecord<V> {
    pub fn new(name: impl Into<String>, value: V) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// `ipmitool fwum info` field; values are always numeric.
pub type FirmwareRecord = KeyValueRecord<f64>;
/// `ipmitool fru list` field.
pub type FruRecord = KeyValueRecord<String>;
/// `ipmitool lan print` field.
pub type LanRecord = KeyValueRecord<String>;
/// `ipmitool bmc info` field.
pub type BmcRecord = KeyValueRecord<String>;

/// Chassis power state as reported by `ipmitool power status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    /// Also the answer when no line reports a state.
    #[default]
    Off = 0,
    On = 1,
}

impl PowerState {
    pub fn value(self) -> f64 {
        f64::from(self as u8)
    }
}

/// The four readings of `ipmitool dcmi power reading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DcmiReading {
    Average,
    Minimum,
    Maximum,
    Instantaneous,
}

impl DcmiReading {
    /// Value of the `name` label on `ipmi_dcmi_power_consumption_watts`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Average => "Avg power consumption",
            Self::Minimum => "Min power consumption",
            Self::Maximum => "Max power consumption",
            Self::Instantaneous => "Instantaneous power consumption",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DcmiPowerRecord {
    pub reading: DcmiReading,
    pub watts: f64,
}
