// Custom validation functions for domain-specific rules

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time regex"))
}

/// Validates a time-of-day string in 24h "HH:MM" form, e.g. "09:00"
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    if time_regex().is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_time_of_day"))
    }
}

/// Validates that a grade lies in the 0..=100 range
pub fn validate_grade_range(grade: i32) -> Result<(), ValidationError> {
    if (0..=100).contains(&grade) {
        Ok(())
    } else {
        Err(ValidationError::new("grade_out_of_range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_times_pass() {
        for t in ["00:00", "09:00", "10:30", "23:59"] {
            assert!(validate_time_of_day(t).is_ok(), "{t} should be valid");
        }
    }

    #[test]
    fn test_invalid_times_fail() {
        for t in ["24:00", "9:00", "09:60", "0900", "morning", ""] {
            assert!(validate_time_of_day(t).is_err(), "{t} should be invalid");
        }
    }

    #[test]
    fn test_grade_bounds() {
        assert!(validate_grade_range(0).is_ok());
        assert!(validate_grade_range(100).is_ok());
        assert!(validate_grade_range(-1).is_err());
        assert!(validate_grade_range(101).is_err());
    }
}
