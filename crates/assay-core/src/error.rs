//! # Error Module
//!
//! Validation failures for caller-supplied limits and criteria.
//!
//! The engine never clamps out-of-range settings on its own. These errors
//! exist so that a process boundary (CLI, HTTP, config loader) can reject bad
//! values before they reach the lifecycle engine.

use thiserror::Error;

/// A setting that falls outside its documented range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A value that must lie in `[0, 1]` does not.
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    /// A value that must be strictly positive is zero.
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    /// A value that must be non-negative and finite is not.
    #[error("{field} must be a finite, non-negative number, got {value}")]
    Negative { field: &'static str, value: f64 },
}

/// Check that `value` lies in `[0, 1]`.
pub(crate) fn check_unit(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfUnitRange { field, value })
    }
}

/// Check that `value` is finite and `>= 0`.
pub(crate) fn check_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::Negative { field, value })
    }
}

/// Check that a count is non-zero.
pub(crate) fn check_non_zero(field: &'static str, value: usize) -> Result<(), ValidationError> {
    if value == 0 {
        Err(ValidationError::Zero { field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_range_accepts_bounds() {
        assert!(check_unit("threshold", 0.0).is_ok());
        assert!(check_unit("threshold", 1.0).is_ok());
    }

    #[test]
    fn unit_range_rejects_outside() {
        let err = check_unit("threshold", 1.5);
        assert_eq!(
            err,
            Err(ValidationError::OutOfUnitRange {
                field: "threshold",
                value: 1.5
            })
        );
    }

    #[test]
    fn non_negative_rejects_nan() {
        assert!(check_non_negative("budget", f64::NAN).is_err());
        assert!(check_non_negative("budget", -0.5).is_err());
        assert!(check_non_negative("budget", 0.0).is_ok());
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = ValidationError::Zero {
            field: "max_hypotheses",
        };
        assert_eq!(err.to_string(), "max_hypotheses must be greater than zero");
    }
}
