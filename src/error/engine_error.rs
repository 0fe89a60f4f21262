//! Engine-level error types.

use thiserror::Error;

use super::{ErrorCategory, ErrorSeverity};
use crate::core::event_bus::StepKind;
use crate::domain::execution::ControlState;

/// Engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("A run is already active (state: {0})")]
    RunInProgress(ControlState),
    #[error("Array values must be positive: found {value} at index {index}")]
    NonPositiveValue { index: usize, value: u32 },
    #[error("Array too large: {len} elements, limit is {limit}")]
    ArrayTooLarge { len: usize, limit: usize },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Index out of bounds in {kind}: index={index}, len={len}")]
    IndexOutOfBounds {
        kind: StepKind,
        index: usize,
        len: usize,
    },
    #[error("Invalid range: lo={lo} > hi={hi}")]
    InvalidRange { lo: usize, hi: usize },
    #[error("Index already marked sorted: {0}")]
    AlreadySorted(usize),
    #[error("Run cancelled")]
    Cancelled,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Classify the error along the caller-misuse / defect axis.
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::UnknownAlgorithm(_)
            | EngineError::RunInProgress(_)
            | EngineError::NonPositiveValue { .. }
            | EngineError::ArrayTooLarge { .. }
            | EngineError::InvalidConfig(_) => ErrorCategory::CallerMisuse,
            EngineError::IndexOutOfBounds { .. }
            | EngineError::InvalidRange { .. }
            | EngineError::AlreadySorted(_) => ErrorCategory::InvariantViolation,
            EngineError::Cancelled => ErrorCategory::Cancelled,
            EngineError::Internal(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.category().severity()
    }

    /// Whether the error was caused by the caller rather than the engine.
    pub fn is_caller_misuse(&self) -> bool {
        self.category() == ErrorCategory::CallerMisuse
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::InvalidConfig(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        assert_eq!(
            EngineError::UnknownAlgorithm("bogo".into()).to_string(),
            "Unknown algorithm: bogo"
        );
        assert_eq!(
            EngineError::RunInProgress(ControlState::Paused).to_string(),
            "A run is already active (state: paused)"
        );
        assert_eq!(
            EngineError::NonPositiveValue { index: 2, value: 0 }.to_string(),
            "Array values must be positive: found 0 at index 2"
        );
        assert_eq!(
            EngineError::ArrayTooLarge { len: 11, limit: 10 }.to_string(),
            "Array too large: 11 elements, limit is 10"
        );
        assert_eq!(
            EngineError::IndexOutOfBounds {
                kind: StepKind::Swap,
                index: 9,
                len: 4
            }
            .to_string(),
            "Index out of bounds in swap: index=9, len=4"
        );
        assert_eq!(
            EngineError::InvalidRange { lo: 3, hi: 1 }.to_string(),
            "Invalid range: lo=3 > hi=1"
        );
        assert_eq!(
            EngineError::AlreadySorted(5).to_string(),
            "Index already marked sorted: 5"
        );
        assert_eq!(EngineError::Cancelled.to_string(), "Run cancelled");
    }

    #[test]
    fn test_engine_error_category() {
        assert_eq!(
            EngineError::UnknownAlgorithm("x".into()).category(),
            ErrorCategory::CallerMisuse
        );
        assert!(EngineError::RunInProgress(ControlState::Running).is_caller_misuse());
        assert_eq!(
            EngineError::AlreadySorted(0).category(),
            ErrorCategory::InvariantViolation
        );
        assert_eq!(
            EngineError::InvalidRange { lo: 1, hi: 0 }.severity(),
            ErrorSeverity::Fatal
        );
        assert_eq!(EngineError::Cancelled.category(), ErrorCategory::Cancelled);
        assert!(!EngineError::Internal("x".into()).is_caller_misuse());
    }

    #[test]
    fn test_engine_error_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let engine_err: EngineError = err.into();
        assert!(matches!(engine_err, EngineError::InvalidConfig(_)));
    }
}
