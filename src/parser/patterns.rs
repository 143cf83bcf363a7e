//! Regex-table dialects: `lan print`, `bmc info`, `power status` and
//! `dcmi power reading`, plus the FRU board date row.
//!
//! Each table is an ordered list of anchored patterns. A line is tested
//! against the rows in order and the first match names the record; rows
//! anchor distinct labels, so at most one can match.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::error::ParseError;
use super::records::{
    BmcRecord, DcmiPowerRecord, DcmiReading, KeyValueRecord, LanRecord, PowerState,
};
use super::{compact, content_lines, Parsed};

/// How the `value` capture is turned into the record value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// Surrounding whitespace removed, interior kept ("Mon Jan  1 03:00:00 1996").
    Trimmed,
    /// Every whitespace character removed ("Static Address" -> "StaticAddress").
    Compact,
}

impl Extract {
    fn apply(self, raw: &str) -> String {
        match self {
            Self::Trimmed => raw.trim().to_string(),
            Self::Compact => compact(raw),
        }
    }
}

/// One row of a dialect table: a fixed record name and the pattern that
/// captures its value in a group named `value`.
#[derive(Debug)]
pub struct FieldPattern {
    pub label: &'static str,
    pub regex: Regex,
    pub extract: Extract,
}

impl FieldPattern {
    fn new(label: &'static str, pattern: &str, extract: Extract) -> Self {
        Self {
            label,
            regex: Regex::new(pattern).expect("field table holds valid regex patterns"),
            extract,
        }
    }

    pub fn capture(&self, line: &str) -> Option<KeyValueRecord<String>> {
        let caps = self.regex.captures(line)?;
        let value = caps.name("value")?.as_str();
        Some(KeyValueRecord::new(self.label, self.extract.apply(value)))
    }
}

/// First row of `table` matching `line`.
pub fn match_field(table: &[FieldPattern], line: &str) -> Option<KeyValueRecord<String>> {
    table.iter().find_map(|row| row.capture(line))
}

pub static LAN_FIELDS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        FieldPattern::new("IPSource", r"^IP\sAddress\sSource\s*:\s*(?P<value>.*)", Extract::Compact),
        FieldPattern::new("IPAddress", r"^IP\sAddress\s*:\s*(?P<value>.*)", Extract::Trimmed),
        FieldPattern::new("SubnetMask", r"^Subnet\sMask\s*:\s*(?P<value>.*)", Extract::Trimmed),
        FieldPattern::new("MACAddress", r"^MAC\sAddress\s*:\s*(?P<value>.*)", Extract::Trimmed),
        FieldPattern::new("DefaultGateway", r"^Default\sGateway\sIP\s*:\s*(?P<value>.*)", Extract::Trimmed),
        FieldPattern::new("VLANID", r"^802\.1q\sVLAN\sID\s*:\s*(?P<value>.*)", Extract::Trimmed),
        FieldPattern::new("VLANPriority", r"^802\.1q\sVLAN\sPriority\s*:\s*(?P<value>.*)", Extract::Trimmed),
    ]
});

pub static BMC_FIELDS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        FieldPattern::new("FirmwareRevision", r"^Firmware\sRevision\s*:\s*(?P<value>.*)", Extract::Trimmed),
        FieldPattern::new("IPMIVersion", r"^IPMI\sVersion\s*:\s*(?P<value>.*)", Extract::Trimmed),
        FieldPattern::new("Manufacturer", r"^Manufacturer\sName\s*:\s*(?P<value>.*)", Extract::Trimmed),
    ]
});

/// FRU rows whose value may itself contain colons.
pub static FRU_FIELDS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![FieldPattern::new(
        "BoardMfgDate",
        r"^\s*Board\sMfg\sDate\s*:\s*(?P<value>.*)",
        Extract::Trimmed,
    )]
});

static CHASSIS_POWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Chassis\s*Power\s*is\s*(?P<value>on|off)\b")
        .expect("CHASSIS_POWER is a valid regex pattern")
});

static DCMI_READINGS: LazyLock<Vec<(DcmiReading, Regex)>> = LazyLock::new(|| {
    [
        (DcmiReading::Average, r"^\s*Average\spower\sreading\sover\ssample\speriod:\s*(?P<value>.*) Watts"),
        (DcmiReading::Minimum, r"^\s*Minimum\sduring\ssampling\speriod:\s*(?P<value>.*) Watts"),
        (DcmiReading::Maximum, r"^\s*Maximum\sduring\ssampling\speriod:\s*(?P<value>.*) Watts"),
        (DcmiReading::Instantaneous, r"^\s*Instantaneous\spower\sreading:\s*(?P<value>.*) Watts"),
    ]
    .into_iter()
    .map(|(reading, pattern)| {
        (reading, Regex::new(pattern).expect("DCMI table holds valid regex patterns"))
    })
    .collect()
});

fn parse_table(output: &str, table: &[FieldPattern]) -> Vec<KeyValueRecord<String>> {
    content_lines(output)
        .filter_map(|line| match_field(table, line))
        .collect()
}

/// Parse `ipmitool lan print`. Lines outside the table are ignored.
pub fn parse_lan_print(output: &str) -> Vec<LanRecord> {
    parse_table(output, &LAN_FIELDS)
}

/// Parse `ipmitool bmc info`. Lines outside the table are ignored.
pub fn parse_bmc_info(output: &str) -> Vec<BmcRecord> {
    parse_table(output, &BMC_FIELDS)
}

/// Parse `ipmitool power status`.
/// The first "Chassis Power is on|off" line decides; without one the chassis
/// is reported as off.
pub fn parse_chassis_power(output: &str) -> PowerState {
    for line in content_lines(output) {
        if let Some(caps) = CHASSIS_POWER.captures(line.trim()) {
            return match &caps["value"] {
                "on" => PowerState::On,
                _ => PowerState::Off,
            };
        }
    }
    debug!("No chassis power line found, defaulting to off");
    PowerState::default()
}

/// Parse `ipmitool dcmi power reading`.
/// Every line is tested against all four readings. An unparseable wattage
/// drops that reading only; the first such error is kept.
pub fn parse_dcmi_power(output: &str) -> Parsed<DcmiPowerRecord> {
    let mut parsed = Parsed::default();

    for line in content_lines(output) {
        for (reading, regex) in DCMI_READINGS.iter() {
            let Some(caps) = regex.captures(line) else {
                continue;
            };
            let raw = caps["value"].trim();
            match raw.parse::<f64>() {
                Ok(watts) => parsed.records.push(DcmiPowerRecord {
                    reading: *reading,
                    watts,
                }),
                Err(_) => parsed.record_error(ParseError::conversion(line, raw)),
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAN_PRINT: &str = "\
Set in Progress         : Set Complete
Auth Type Support       : NONE MD2 MD5 PASSWORD
IP Address Source       : Static Address
IP Address              : 10.0.10.21
Subnet Mask             : 255.255.255.0
MAC Address             : 0c:c4:7a:3a:e1:5c
SNMP Community String   : public
Default Gateway IP      : 10.0.10.1
Default Gateway MAC     : 00:00:00:00:00:00
802.1q VLAN ID          : Disabled
802.1q VLAN Priority    : 0
RMCP+ Cipher Suites     : 1,2,3,6,7,8,11,12
";

    #[test]
    fn lan_fields_in_source_order() {
        let records = parse_lan_print(LAN_PRINT);
        let pairs: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.name.as_str(), r.value.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("IPSource", "StaticAddress"),
                ("IPAddress", "10.0.10.21"),
                ("SubnetMask", "255.255.255.0"),
                ("MACAddress", "0c:c4:7a:3a:e1:5c"),
                ("DefaultGateway", "10.0.10.1"),
                ("VLANID", "Disabled"),
                ("VLANPriority", "0"),
            ]
        );
    }

    #[test]
    fn bmc_fields() {
        let output = "\
Device ID                 : 32
Device Revision           : 1
Firmware Revision         : 3.76
IPMI Version              : 2.0
Manufacturer ID           : 10876
Manufacturer Name         : Supermicro
Product ID                : 2130 (0x0852)
";
        let records = parse_bmc_info(output);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], KeyValueRecord::new("FirmwareRevision", "3.76".to_string()));
        assert_eq!(records[1], KeyValueRecord::new("IPMIVersion", "2.0".to_string()));
        assert_eq!(records[2], KeyValueRecord::new("Manufacturer", "Supermicro".to_string()));
    }

    #[test]
    fn power_off() {
        assert_eq!(parse_chassis_power("Chassis Power is off"), PowerState::Off);
        assert_eq!(parse_chassis_power("Chassis Power is off").value(), 0.0);
    }

    #[test]
    fn power_on_after_noise() {
        let output = "Unable to get something\nChassis Power is on\n";
        assert_eq!(parse_chassis_power(output), PowerState::On);
        assert_eq!(parse_chassis_power(output).value(), 1.0);
    }

    #[test]
    fn power_defaults_to_off_without_a_match() {
        assert_eq!(parse_chassis_power(""), PowerState::Off);
        assert_eq!(
            parse_chassis_power("Error: Unable to establish IPMI v2 / RMCP+ session"),
            PowerState::Off
        );
        assert_eq!(parse_chassis_power("Chassis Power is offline"), PowerState::Off);
    }

    #[test]
    fn dcmi_readings() {
        let output = "
    Instantaneous power reading:                   220 Watts
    Minimum during sampling period:                 64 Watts
    Maximum during sampling period:                304 Watts
    Average power reading over sample period:      190 Watts
    IPMI timestamp:                           Thu Jan  1 00:00:00 2020
    Sampling period:                          00000060 Seconds.
    Power reading state is:                   activated
";
        let parsed = parse_dcmi_power(output);
        assert!(parsed.is_clean());
        assert_eq!(
            parsed.records,
            vec![
                DcmiPowerRecord { reading: DcmiReading::Instantaneous, watts: 220.0 },
                DcmiPowerRecord { reading: DcmiReading::Minimum, watts: 64.0 },
                DcmiPowerRecord { reading: DcmiReading::Maximum, watts: 304.0 },
                DcmiPowerRecord { reading: DcmiReading::Average, watts: 190.0 },
            ]
        );
    }

    #[test]
    fn dcmi_bad_wattage_drops_that_reading() {
        let output = "Instantaneous power reading: ??? Watts\nMinimum during sampling period: 64 Watts";
        let parsed = parse_dcmi_power(output);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].reading, DcmiReading::Minimum);
        assert!(matches!(parsed.error, Some(ParseError::Conversion { .. })));
    }

    #[test]
    fn dcmi_unsupported_is_empty() {
        let parsed = parse_dcmi_power("DCMI request failed because: Invalid command (c1)");
        assert!(parsed.records.is_empty());
        assert!(parsed.is_clean());
    }
}
