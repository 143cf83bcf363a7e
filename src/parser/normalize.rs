//! Numeric decoding of sensor value fields.

/// Literal ipmitool prints when a reading cannot be obtained.
pub const NOT_AVAILABLE: &str = "na";

/// Decode one sensor value field.
///
/// Precedence: the `na` sentinel becomes NaN, then an unsigned integer with an
/// optional `0x`/`0o`/`0b` prefix (discrete states such as `0x0080`) is widened
/// to f64, then a plain decimal float. `None` means the caller should drop the
/// record.
pub fn normalize_reading(field: &str) -> Option<f64> {
    if field == NOT_AVAILABLE {
        return Some(f64::NAN);
    }
    if let Some(raw) = parse_unsigned(field) {
        return Some(raw as f64);
    }
    field.parse::<f64>().ok()
}

/// Unsigned integer honoring an explicit radix prefix. A bare leading zero is
/// still decimal.
pub fn parse_unsigned(field: &str) -> Option<u64> {
    let (digits, radix) = match field.get(..2) {
        Some("0x" | "0X") => (&field[2..], 16),
        Some("0o" | "0O") => (&field[2..], 8),
        Some("0b" | "0B") => (&field[2..], 2),
        _ => (field, 10),
    };

    // from_str_radix tolerates a leading '+', ipmitool never prints one
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_nan() {
        assert!(normalize_reading("na").unwrap().is_nan());
    }

    #[test]
    fn sentinel_match_is_exact() {
        assert_eq!(normalize_reading("NA"), None);
        assert_eq!(normalize_reading("n/a"), None);
    }

    #[test]
    fn hex_fields_widen_exactly() {
        assert_eq!(normalize_reading("0x0"), Some(0.0));
        assert_eq!(normalize_reading("0x0100"), Some(256.0));
        assert_eq!(normalize_reading("0XfF"), Some(255.0));
    }

    #[test]
    fn other_prefixes() {
        assert_eq!(parse_unsigned("0o17"), Some(15));
        assert_eq!(parse_unsigned("0b101"), Some(5));
        assert_eq!(parse_unsigned("010"), Some(10));
    }

    #[test]
    fn decimals_and_negatives_fall_through_to_float() {
        assert_eq!(normalize_reading("31.000"), Some(31.0));
        assert_eq!(normalize_reading("-1.5"), Some(-1.5));
        assert_eq!(normalize_reading("1800"), Some(1800.0));
    }

    #[test]
    fn garbage_is_skipped() {
        assert_eq!(normalize_reading(""), None);
        assert_eq!(normalize_reading("0x"), None);
        assert_eq!(normalize_reading("0xZZ"), None);
        assert_eq!(normalize_reading("+12"), Some(12.0));
        assert_eq!(normalize_reading("abc"), None);
    }

    #[test]
    fn u64_overflow_still_parses_as_float() {
        assert_eq!(
            normalize_reading("18446744073709551616"),
            Some(18446744073709551616.0)
        );
    }
}
