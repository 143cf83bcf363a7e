//! `ipmitool sensor list` parser.
//! Input:  "CPU1 Temp | 31.000 | degrees C | ok | 0.000 | ..."
//! Only the first four pipe-separated columns are used; the threshold
//! columns that follow are ignored.

use tracing::debug;

use super::error::ParseError;
use super::normalize::normalize_reading;
use super::records::SensorRecord;
use super::{compact, content_lines, Parsed};

/// Parse the pipe table into sensor records.
///
/// A short row or an unparseable value costs only that row: it is skipped,
/// the first such error is kept in the result, and parsing continues.
pub fn parse_sensor_list(output: &str) -> Parsed<SensorRecord> {
    let mut parsed = Parsed::default();

    for line in content_lines(output) {
        match parse_sensor_line(line) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                debug!("Skipping sensor row: {}", e);
                parsed.record_error(e);
            }
        }
    }

    parsed
}

fn parse_sensor_line(line: &str) -> Result<SensorRecord, ParseError> {
    let cols: Vec<&str> = line.split('|').collect();
    if cols.len() < 4 {
        return Err(ParseError::malformed(line));
    }

    let raw_value = cols[1].trim();
    let value = normalize_reading(raw_value)
        .ok_or_else(|| ParseError::conversion(line, raw_value))?;

    Ok(SensorRecord {
        name: compact(cols[0]),
        value,
        unit: cols[2].trim().to_string(),
        raw_state: cols[3].trim().to_string(),
    })
}
