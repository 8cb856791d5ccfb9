//! Numeric parsing and range helpers shared with the presentation layer.
//!
//! # Responsibility
//! - Parse user-typed decimal text into rounded `f64` values.
//! - Provide latitude/longitude range checks used by entry validation.
//!
//! # Invariants
//! - All functions are pure; none touch storage or logging.
//! - Rounding is half away from zero (`f64::round`).

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const MAX_INPUT_CHARS: usize = 15;
const MAX_DECIMAL_PLACES: u32 = 15;

static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("valid decimal regex"));

/// Failures of [`parse_decimal`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    #[error("number of decimal places must be at most 15, got {0}")]
    TooManyPlaces(u32),
    #[error("input is empty")]
    Empty,
    #[error("input longer than 15 characters")]
    TooLong,
    #[error("cannot parse `{0}` as a decimal number")]
    Malformed(String),
}

/// Parses `input` as a decimal number rounded to `places` decimal places.
///
/// Surrounding whitespace is ignored. Comma decimal separators are not
/// accepted; the caller normalizes locale input first.
pub fn parse_decimal(input: &str, places: u32) -> Result<f64, NumericError> {
    if places > MAX_DECIMAL_PLACES {
        return Err(NumericError::TooManyPlaces(places));
    }
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(NumericError::Empty);
    }
    if trimmed.chars().count() > MAX_INPUT_CHARS {
        return Err(NumericError::TooLong);
    }
    if !DECIMAL_RE.is_match(trimmed) {
        return Err(NumericError::Malformed(trimmed.to_string()));
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| NumericError::Malformed(trimmed.to_string()))?;
    Ok(round_to(value, places))
}

/// Rounds `value` to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places.min(MAX_DECIMAL_PLACES) as i32);
    (value * factor).round() / factor
}

/// Drops everything past the second decimal place.
pub fn truncate_to_2(value: f64) -> f64 {
    (value * 100.0).trunc() / 100.0
}

pub fn is_valid_latitude(value: f64) -> bool {
    (-90.0..=90.0).contains(&value)
}

pub fn is_valid_longitude(value: f64) -> bool {
    (-180.0..=180.0).contains(&value)
}

pub fn is_negative(value: f64) -> bool {
    value < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_rounds_to_requested_places() {
        assert_eq!(parse_decimal("2.2", 3).unwrap(), 2.2);
        assert_eq!(parse_decimal("5", 3).unwrap(), 5.0);
        assert_eq!(parse_decimal(" 37.983812 ", 5).unwrap(), 37.98381);
        assert_eq!(parse_decimal("450.126", 2).unwrap(), 450.13);
        assert_eq!(parse_decimal("-23.5", 0).unwrap(), -24.0);
    }

    #[test]
    fn parse_decimal_rejects_bad_input() {
        assert_eq!(parse_decimal("", 2), Err(NumericError::Empty));
        assert_eq!(parse_decimal("   ", 2), Err(NumericError::Empty));
        assert_eq!(
            parse_decimal("1.2341454312324432123", 5),
            Err(NumericError::TooLong)
        );
        assert_eq!(
            parse_decimal("lol", 6),
            Err(NumericError::Malformed("lol".to_string()))
        );
        assert_eq!(
            parse_decimal("1,5", 2),
            Err(NumericError::Malformed("1,5".to_string()))
        );
        assert_eq!(parse_decimal("1", 16), Err(NumericError::TooManyPlaces(16)));
    }

    #[test]
    fn truncate_keeps_two_places_toward_zero() {
        assert_eq!(truncate_to_2(1.0), 1.0);
        assert_eq!(truncate_to_2(45.39102932), 45.39);
        assert_eq!(truncate_to_2(-32.239581), -32.23);
    }

    #[test]
    fn coordinate_ranges_are_inclusive() {
        assert!(is_valid_latitude(40.49591));
        assert!(is_valid_latitude(-90.0));
        assert!(!is_valid_latitude(-199.23102));
        assert!(!is_valid_latitude(282.0));

        assert!(is_valid_longitude(23.069222));
        assert!(is_valid_longitude(180.0));
        assert!(is_valid_longitude(-180.0));
        assert!(!is_valid_longitude(-199.23102));
    }

    #[test]
    fn negative_check() {
        assert!(is_negative(-2.0));
        assert!(!is_negative(0.0));
        assert!(!is_negative(1.239102));
    }
}
