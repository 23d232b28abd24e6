/// Decimal places used when no rounding precision is configured
pub const DEFAULT_ROUNDING_DECIMALS: f64 = 4.0;

/// Rounds a number to an amount of decimal places.
///
/// `decimals` is itself rounded to the nearest integer first. A negative
/// amount rounds to a power of ten left of the decimal point, so
/// `round(15.0, -1.0) == 20.0`. Ties round toward positive infinity.
///
/// The shift is done by appending a decimal exponent to the formatted value
/// and parsing it back, which keeps cases such as `round(1.005, 2.0)` from
/// picking up binary representation error.
pub fn round(value: f64, decimals: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let decimals_int = round_half_up(decimals) as i64;
    let abs_decimals = decimals_int.unsigned_abs();

    if decimals_int >= 0 {
        shift_round_shift(value, abs_decimals, "", "-")
    } else {
        shift_round_shift(value, abs_decimals, "-", "")
    }
}

fn shift_round_shift(value: f64, exponent: u64, up_sign: &str, down_sign: &str) -> f64 {
    let shifted = parse_or_nan(&format!("{value}e{up_sign}{exponent}"));
    let rounded = round_half_up(shifted);
    parse_or_nan(&format!("{rounded}e{down_sign}{exponent}"))
}

fn parse_or_nan(text: &str) -> f64 {
    text.parse().unwrap_or(f64::NAN)
}

/// Rounds to the nearest integer, ties toward positive infinity
fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    // exact for every finite float
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_representation_case() {
        assert_eq!(round(1.005, 2.0), 1.01);
        assert_eq!(round(1.255, 2.0), 1.26);
        assert_eq!(round(0.1 + 0.2, 4.0), 0.3);
    }

    #[test]
    fn test_default_precision() {
        assert_eq!(round(1.0 / 3.0, DEFAULT_ROUNDING_DECIMALS), 0.3333);
        assert_eq!(round(2.0 / 3.0, DEFAULT_ROUNDING_DECIMALS), 0.6667);
        assert_eq!(round(12.0, DEFAULT_ROUNDING_DECIMALS), 12.0);
    }

    #[test]
    fn test_idempotent() {
        for value in [0.0, 1.005, 2.0 / 3.0, 123.456789, -9.87654321, 1e-7, 98765.43215] {
            let once = round(value, 4.0);
            assert_eq!(round(once, 4.0), once, "value {value}");
        }
    }

    #[test]
    fn test_negative_decimals() {
        assert_eq!(round(15.0, -1.0), 20.0);
        assert_eq!(round(14.9, -1.0), 10.0);
        assert_eq!(round(-15.0, -1.0), -10.0);
        assert_eq!(round(1234.0, -2.0), 1200.0);
        assert_eq!(round(1250.0, -2.0), 1300.0);
    }

    #[test]
    fn test_ties_toward_positive_infinity() {
        assert_eq!(round(2.5, 0.0), 3.0);
        assert_eq!(round(-2.5, 0.0), -2.0);
        assert_eq!(round(0.125, 2.0), 0.13);
    }

    #[test]
    fn test_fractional_decimals() {
        // 1.6 decimals means 2, -0.4 means 0
        assert_eq!(round(3.14159, 1.6), 3.14);
        assert_eq!(round(3.5, -0.4), 4.0);
    }

    #[test]
    fn test_non_finite() {
        assert!(round(f64::NAN, 2.0).is_nan());
        assert_eq!(round(f64::INFINITY, 2.0), f64::INFINITY);
        assert_eq!(round(f64::NEG_INFINITY, -3.0), f64::NEG_INFINITY);
    }
}
