//! Property tests for the ipmitool output parsers

use pankha_ipmi_exporter::parser::{
    normalize::normalize_reading, parse_bmc_info, parse_chassis_power, parse_fwum_info,
    parse_sensor_list, PowerState, SensorKind, SensorState,
};
use proptest::prelude::*;

/// Strategy for sensor names as ipmitool prints them (may contain spaces)
fn sensor_name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _.-]{0,15}".prop_map(|s| s.to_string())
}

/// Strategy for units without the '|' column separator
fn unit_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("RPM".to_string()),
        Just("degrees C".to_string()),
        Just("Volts".to_string()),
        Just("Watts".to_string()),
        Just("discrete".to_string()),
        "[a-z]{1,8}".prop_map(|s| s.to_string()),
    ]
}

/// Strategy for state codes, including ones outside the lookup table
fn state_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ok".to_string()),
        Just("cr".to_string()),
        Just("nr".to_string()),
        Just("nc".to_string()),
        Just("ns".to_string()),
        Just("na".to_string()),
        Just("0x0100".to_string()),
        "[a-z0-9]{1,6}".prop_map(|s| s.to_string()),
    ]
}

proptest! {
    /// Property: an "na" reading is NaN whatever the other columns say
    #[test]
    fn na_reading_is_nan(
        name in sensor_name_strategy(),
        unit in unit_strategy(),
        state in state_strategy(),
    ) {
        let output = format!("{} | na | {} | {}\n", name, unit, state);
        let parsed = parse_sensor_list(&output);

        prop_assert!(parsed.error.is_none());
        prop_assert_eq!(parsed.records.len(), 1);
        prop_assert!(parsed.records[0].value.is_nan());
    }

    /// Property: hex readings decode to their exact integer value
    #[test]
    fn hex_reading_is_exact(value in 0u32..=u32::MAX) {
        let field = format!("0x{:x}", value);
        prop_assert_eq!(normalize_reading(&field), Some(f64::from(value)));
    }

    /// Property: a hex sensor value lands in the record as its exact integer
    #[test]
    fn hex_sensor_value_is_exact(name in sensor_name_strategy(), value in 0u64..(1u64 << 53)) {
        let output = format!("{} | 0x{:x} | discrete | ok\n", name, value);
        let parsed = parse_sensor_list(&output);

        prop_assert!(parsed.error.is_none());
        prop_assert_eq!(parsed.records.len(), 1);
        prop_assert_eq!(parsed.records[0].value, value as f64);
        prop_assert_eq!(parsed.records[0].unit.as_str(), "discrete");
    }

    /// Property: decimal readings round-trip through formatting
    #[test]
    fn decimal_reading_matches_float(value in -1.0e6f64..1.0e6) {
        let field = format!("{:.3}", value);
        let expected: f64 = field.parse().unwrap();
        prop_assert_eq!(normalize_reading(&field), Some(expected));
    }

    /// Property: a discrete chassis intrusion sensor classifies the same
    /// regardless of the rest of its name
    #[test]
    fn chassis_intrusion_by_name(prefix in "[A-Za-z]{0,6}", suffix in "[A-Za-z0-9]{0,6}") {
        let name = format!("{}ChassisIntru{}", prefix, suffix);
        prop_assert_eq!(SensorKind::classify("discrete", &name), SensorKind::ChassisIntrusion);
    }

    /// Property: state classification is total and only "na" has no value
    /// besides unrecognized codes
    #[test]
    fn state_lookup_is_total(state in state_strategy()) {
        let classified = SensorState::classify(&state);
        match &classified {
            SensorState::Known(severity) => prop_assert_eq!(classified.value(), severity.value()),
            SensorState::NotAvailable => prop_assert_eq!(state.as_str(), "na"),
            SensorState::Unrecognized(raw) => prop_assert_eq!(raw, &state),
        }
    }

    /// Property: sensor rows with fewer than four columns are reported and skipped
    #[test]
    fn short_rows_are_skipped(name in sensor_name_strategy(), value in 0u16..1000) {
        let output = format!("{} | {}\nFan1 | 1200 | RPM | ok\n", name, value);
        let parsed = parse_sensor_list(&output);

        prop_assert!(parsed.error.is_some());
        prop_assert_eq!(parsed.records.len(), 1);
        prop_assert_eq!(parsed.records[0].name.as_str(), "Fan1");
    }

    /// Property: parsing the same output twice yields the same records
    #[test]
    fn sensor_parse_is_deterministic(
        rows in prop::collection::vec((sensor_name_strategy(), 0u16..5000, unit_strategy(), state_strategy()), 0..8),
    ) {
        let output: String = rows
            .iter()
            .map(|(name, value, unit, state)| format!("{} | {} | {} | {}\n", name, value, unit, state))
            .collect();

        let first = parse_sensor_list(&output);
        let second = parse_sensor_list(&output);

        prop_assert!(first.error.is_none());
        prop_assert_eq!(first.records.len(), rows.len());
        prop_assert_eq!(first, second);
    }

    /// Property: fwum records keep everything before the first bad value
    #[test]
    fn fwum_stops_at_first_bad_value(good in prop::collection::vec(0u32..100_000, 0..5)) {
        let mut output: String = good
            .iter()
            .enumerate()
            .map(|(i, v)| format!("Field{} : {}\n", i, v))
            .collect();
        output.push_str("Broken : not-a-number\nLate : 7\n");

        let parsed = parse_fwum_info(&output);

        prop_assert!(parsed.error.is_some());
        prop_assert_eq!(parsed.records.len(), good.len());
    }

    /// Property: power status defaults to off unless a line says "on"
    #[test]
    fn power_defaults_to_off(noise in "[a-z ]{0,40}") {
        prop_assume!(!noise.contains("Chassis"));
        prop_assert_eq!(parse_chassis_power(&noise), PowerState::Off);

        let output = format!("{}\nChassis Power is on\n", noise);
        prop_assert_eq!(parse_chassis_power(&output), PowerState::On);
    }

    /// Property: bmc info never fails on arbitrary text
    #[test]
    fn bmc_info_is_infallible(text in "[ -~\n]{0,200}") {
        let _ = parse_bmc_info(&text);
    }
}
