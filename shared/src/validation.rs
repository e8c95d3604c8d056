//! Validation utilities for the Harvest Quality Prediction Platform
//!
//! Numeric input ranges live as `validator` derives on the request
//! structs themselves; the helpers here cover the checks a derive
//! cannot express.

use chrono::NaiveDate;

/// Days a measurement may lag its prediction and still match it
pub const MEASUREMENT_MATCH_WINDOW_DAYS: i64 = 30;

/// Validate a reference identifier (cultivar, crop, region, rootstock):
/// lowercase snake_case, 2-64 characters
pub fn validate_reference_id(id: &str) -> Result<(), &'static str> {
    if id.len() < 2 {
        return Err("Identifier must be at least 2 characters");
    }
    if id.len() > 64 {
        return Err("Identifier must be at most 64 characters");
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err("Identifier must be lowercase snake_case alphanumeric");
    }
    Ok(())
}

/// Validate a date range runs forward
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), &'static str> {
    if end < start {
        return Err("Date range end must not precede its start");
    }
    Ok(())
}

/// Check whether a measurement date can plausibly match a prediction:
/// same day or up to the match window later
pub fn is_matchable_measurement(predicted_at: NaiveDate, measured_at: NaiveDate) -> bool {
    let lag = (measured_at - predicted_at).num_days();
    (0..=MEASUREMENT_MATCH_WINDOW_DAYS).contains(&lag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reference_id() {
        assert!(validate_reference_id("navel_orange").is_ok());
        assert!(validate_reference_id("cv_42").is_ok());
        assert!(validate_reference_id("a").is_err()); // Too short
        assert!(validate_reference_id("Navel").is_err()); // Uppercase
        assert!(validate_reference_id("navel orange").is_err()); // Space
    }

    #[test]
    fn test_validate_date_range() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert!(validate_date_range(start, end).is_ok());
        assert!(validate_date_range(start, start).is_ok());
        assert!(validate_date_range(end, start).is_err());
    }

    #[test]
    fn test_measurement_matching_window() {
        let predicted = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(is_matchable_measurement(predicted, predicted));
        assert!(is_matchable_measurement(
            predicted,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        ));
        assert!(!is_matchable_measurement(
            predicted,
            NaiveDate::from_ymd_opt(2025, 7, 2).unwrap()
        ));
        assert!(!is_matchable_measurement(
            predicted,
            NaiveDate::from_ymd_opt(2025, 5, 31).unwrap()
        ));
    }
}
