//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Plausible range of a facility temperature sensor, in °C.
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = -80.0..=150.0;

lazy_static! {
    /// 3-10 characters, alphanumeric at both ends, spaces or dashes inside.
    static ref POSTAL_CODE: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,8}[A-Za-z0-9]$").expect("valid postal code regex");
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates a location postal code.
pub fn validate_postal_code(value: &str) -> Result<(), ValidationError> {
    if POSTAL_CODE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(error(
            "postal_code_format",
            "Postal code must be 3-10 letters, digits, spaces or dashes",
        ))
    }
}

/// Rejects strings that are empty once trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Value must not be blank"))
    } else {
        Ok(())
    }
}

/// Validates a temperature reading or bound.
pub fn validate_temperature(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && TEMPERATURE_RANGE.contains(&value) {
        Ok(())
    } else {
        Err(error(
            "temperature_range",
            "Temperature must be between -80 and 150",
        ))
    }
}

/// Validates a relative humidity reading or bound (0 to 100).
pub fn validate_humidity(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(error("humidity_range", "Humidity must be between 0 and 100"))
    }
}

/// Validates that an optional lower bound does not exceed an optional upper bound.
pub fn validate_bounds(min: Option<f64>, max: Option<f64>) -> Result<(), ValidationError> {
    match (min, max) {
        (Some(lo), Some(hi)) if lo > hi => Err(error(
            "threshold_order",
            "Minimum threshold cannot exceed maximum threshold",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_postal_code() {
        assert!(validate_postal_code("560001").is_ok());
        assert!(validate_postal_code("SW1A 1AA").is_ok());
        assert!(validate_postal_code("12345-6789").is_ok());
        assert!(validate_postal_code(" 94107 ").is_ok());
    }

    #[test]
    fn test_validate_postal_code_rejects() {
        assert!(validate_postal_code("").is_err());
        assert!(validate_postal_code("12").is_err());
        assert!(validate_postal_code("-1234").is_err());
        assert!(validate_postal_code("12345678901").is_err());
        assert!(validate_postal_code("12#45").is_err());
    }

    #[test]
    fn test_validate_postal_code_error_message() {
        let err = validate_postal_code("x").unwrap_err();
        assert_eq!(err.code, "postal_code_format");
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Cold Room").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_validate_temperature() {
        assert!(validate_temperature(28.0).is_ok());
        assert!(validate_temperature(-80.0).is_ok());
        assert!(validate_temperature(150.1).is_err());
        assert!(validate_temperature(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_humidity() {
        assert!(validate_humidity(0.0).is_ok());
        assert!(validate_humidity(100.0).is_ok());
        assert!(validate_humidity(-0.5).is_err());
        assert!(validate_humidity(100.5).is_err());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(validate_bounds(Some(2.0), Some(8.0)).is_ok());
        assert!(validate_bounds(Some(8.0), Some(8.0)).is_ok());
        assert!(validate_bounds(None, Some(8.0)).is_ok());
        assert!(validate_bounds(Some(9.0), Some(8.0)).is_err());
    }
}
