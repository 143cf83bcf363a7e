//! ipmitool output parsers.
//! One entry point per output dialect. Every parser is a pure function from
//! the captured text of one ipmitool invocation to typed records; nothing is
//! cached between calls.

pub mod classify;
pub mod error;
pub mod fields;
pub mod normalize;
pub mod patterns;
pub mod records;
pub mod sensor;

pub use classify::{SensorKind, SensorState, Severity};
pub use error::ParseError;
pub use fields::{parse_fru_list, parse_fwum_info};
pub use patterns::{parse_bmc_info, parse_chassis_power, parse_dcmi_power, parse_lan_print};
pub use records::{
    BmcRecord, DcmiPowerRecord, DcmiReading, FirmwareRecord, FruRecord, KeyValueRecord,
    LanRecord, PowerState, SensorRecord,
};
pub use sensor::parse_sensor_list;

/// Records accumulated from one output blob plus the first terminal error.
///
/// Whether the error stopped the parse early or only cost a single line
/// depends on the dialect; see the individual `parse_*` functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub error: Option<ParseError>,
}

impl<T> Parsed<T> {
    /// Keep the first error only; later ones are dropped.
    pub(crate) fn record_error(&mut self, err: ParseError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }

    /// Collapse into a `Result`, discarding the records if an error was kept.
    pub fn into_result(self) -> Result<Vec<T>, ParseError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.records),
        }
    }
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            error: None,
        }
    }
}

/// Remove every whitespace character, e.g. "CPU1 Temp" -> "CPU1Temp".
pub(crate) fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Iterate the non-blank lines of an output blob in source order.
pub(crate) fn content_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().filter(|line| !line.trim().is_empty())
}
