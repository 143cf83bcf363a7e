//! Colon-split dialects: `ipmitool fwum info` and `ipmitool fru list`.
//! Whitespace is removed from the whole line before splitting on the first
//! ':', so "Manufacturer Id : 10876" becomes ("ManufacturerId", "10876").

use tracing::debug;

use super::error::ParseError;
use super::patterns::{match_field, FRU_FIELDS};
use super::records::{FirmwareRecord, FruRecord, KeyValueRecord};
use super::{compact, content_lines, Parsed};

/// Parse `ipmitool fwum info`.
///
/// Lines without ':' (banners, "=====" rules) carry no field and are skipped.
/// Every field value must be decimal: the first one that is not ends the
/// parse, keeping the records read before it.
pub fn parse_fwum_info(output: &str) -> Parsed<FirmwareRecord> {
    let mut parsed = Parsed::default();

    for line in content_lines(output) {
        let compacted = compact(line);
        let Some((name, raw)) = compacted.split_once(':') else {
            continue;
        };

        match raw.parse::<f64>() {
            Ok(value) => parsed.records.push(KeyValueRecord::new(name, value)),
            Err(_) => {
                parsed.record_error(ParseError::conversion(line, raw));
                break;
            }
        }
    }

    parsed
}

/// Parse `ipmitool fru list`.
///
/// `Board Mfg Date` goes through its own pattern because the timestamp holds
/// colons and meaningful spaces. A line without ':' is skipped as malformed
/// and the first such error is kept.
pub fn parse_fru_list(output: &str) -> Parsed<FruRecord> {
    let mut parsed = Parsed::default();

    for line in content_lines(output) {
        if let Some(record) = match_field(&FRU_FIELDS, line) {
            parsed.records.push(record);
            continue;
        }

        let compacted = compact(line);
        match compacted.split_once(':') {
            Some((name, value)) => parsed
                .records
                .push(KeyValueRecord::new(name, value.to_string())),
            None => {
                debug!("Skipping FRU line without a field separator: '{}'", line);
                parsed.record_error(ParseError::malformed(line));
            }
        }
    }

    parsed
}
