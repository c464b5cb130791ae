//! Interaction-specific error types.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Invariant violations in the interaction engine.
///
/// Constructors validate their inputs, so these surface while wiring an
/// experiment up rather than while a visitor is clicking through it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("Choice domain must contain at least one option")]
    EmptyDomain,

    #[error("Choice domain contains duplicate option '{0}'")]
    DuplicateOption(String),

    #[error("Option {option} is not part of a domain with {domain_size} options")]
    UnknownOption { option: usize, domain_size: usize },

    #[error("Option key '{0}' is not part of the domain")]
    UnknownOptionKey(String),

    #[error("Expected a choice for step {expected}, got step {actual}")]
    StepOutOfOrder { expected: usize, actual: usize },

    #[error("Session already holds all {steps} choices")]
    SequenceFull { steps: usize },

    #[error("Session is missing choices: {recorded} of {steps} recorded")]
    SequenceIncomplete { recorded: usize, steps: usize },

    #[error("Index {index} is out of range for a sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Label '{0}' is not part of the catalog")]
    UnknownLabel(String),

    #[error("Label catalog contains duplicate label '{0}'")]
    DuplicateLabel(String),

    #[error("Invalid reveal timeline: {0}")]
    InvalidTimeline(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl InteractionError {
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        InteractionError::IndexOutOfRange { index, len }
    }

    pub fn invalid_timeline(reason: impl Into<String>) -> Self {
        InteractionError::InvalidTimeline(reason.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            InteractionError::EmptyDomain => ErrorCode::EmptyDomain,
            InteractionError::DuplicateOption(_) => ErrorCode::ValidationFailed,
            InteractionError::UnknownOption { .. } => ErrorCode::UnknownOption,
            InteractionError::UnknownOptionKey(_) => ErrorCode::UnknownOption,
            InteractionError::StepOutOfOrder { .. } => ErrorCode::StepOutOfOrder,
            InteractionError::SequenceFull { .. } => ErrorCode::StepOutOfOrder,
            InteractionError::SequenceIncomplete { .. } => ErrorCode::InvalidStateTransition,
            InteractionError::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            InteractionError::UnknownLabel(_) => ErrorCode::UnknownLabel,
            InteractionError::DuplicateLabel(_) => ErrorCode::ValidationFailed,
            InteractionError::InvalidTimeline(_) => ErrorCode::InvalidTimeline,
            InteractionError::Validation(ValidationError::InvalidFormat { field, .. })
                if field == "state_transition" =>
            {
                ErrorCode::InvalidStateTransition
            }
            InteractionError::Validation(ValidationError::InvalidFormat { field, .. })
                if field == "divergence_probability" =>
            {
                ErrorCode::InvalidProbability
            }
            InteractionError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_out_of_range_displays_bounds() {
        let err = InteractionError::index_out_of_range(5, 3);
        assert_eq!(
            err.to_string(),
            "Index 5 is out of range for a sequence of length 3"
        );
        assert_eq!(err.code(), ErrorCode::IndexOutOfRange);
    }

    #[test]
    fn transition_failures_map_to_state_code() {
        let err: InteractionError =
            ValidationError::invalid_format("state_transition", "Cannot transition").into();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn probability_failures_map_to_probability_code() {
        let err: InteractionError =
            ValidationError::invalid_format("divergence_probability", "too big").into();
        assert_eq!(err.code(), ErrorCode::InvalidProbability);
    }
}
