//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i32,
        max: i32,
        actual: i32,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i32, max: i32, actual: i32) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
///
/// Used as a stable `error_code` field in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyDomain,
    UnknownOption,
    UnknownLabel,
    InvalidProbability,
    InvalidTimeline,

    // State errors
    InvalidStateTransition,
    StepOutOfOrder,
    IndexOutOfRange,

    // Infrastructure errors
    StorageUnavailable,
    CorruptValue,
    PriceUnavailable,
    InvalidPriceResponse,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyDomain => "EMPTY_DOMAIN",
            ErrorCode::UnknownOption => "UNKNOWN_OPTION",
            ErrorCode::UnknownLabel => "UNKNOWN_LABEL",
            ErrorCode::InvalidProbability => "INVALID_PROBABILITY",
            ErrorCode::InvalidTimeline => "INVALID_TIMELINE",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::StepOutOfOrder => "STEP_OUT_OF_ORDER",
            ErrorCode::IndexOutOfRange => "INDEX_OUT_OF_RANGE",
            ErrorCode::StorageUnavailable => "STORAGE_UNAVAILABLE",
            ErrorCode::CorruptValue => "CORRUPT_VALUE",
            ErrorCode::PriceUnavailable => "PRICE_UNAVAILABLE",
            ErrorCode::InvalidPriceResponse => "INVALID_PRICE_RESPONSE",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("label");
        assert_eq!(format!("{}", err), "Field 'label' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("step", 0, 2, 7);
        assert_eq!(format!("{}", err), "Field 'step' must be between 0 and 2, got 7");
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("experiment_id", "contains spaces");
        assert_eq!(
            format!("{}", err),
            "Field 'experiment_id' has invalid format: contains spaces"
        );
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::EmptyDomain), "EMPTY_DOMAIN");
        assert_eq!(format!("{}", ErrorCode::StorageUnavailable), "STORAGE_UNAVAILABLE");
    }
}
