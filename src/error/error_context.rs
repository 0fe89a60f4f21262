use serde::{Deserialize, Serialize};

/// Error classification, following the engine's error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Rejected synchronously; run state unchanged, no events emitted.
    CallerMisuse,
    /// A stepper broke a primitive precondition; the run is aborted.
    InvariantViolation,
    /// The run was cancelled from outside.
    Cancelled,
    Internal,
}

/// Error severity marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Info,
    Error,
    Fatal,
}

impl ErrorCategory {
    pub fn severity(self) -> ErrorSeverity {
        match self {
            ErrorCategory::CallerMisuse => ErrorSeverity::Error,
            ErrorCategory::InvariantViolation | ErrorCategory::Internal => ErrorSeverity::Fatal,
            ErrorCategory::Cancelled => ErrorSeverity::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_snake_case() {
        let s = serde_json::to_string(&ErrorCategory::InvariantViolation).unwrap();
        assert_eq!(s, "\"invariant_violation\"");
        let back: ErrorCategory = serde_json::from_str("\"caller_misuse\"").unwrap();
        assert_eq!(back, ErrorCategory::CallerMisuse);
    }

    #[test]
    fn test_category_severity() {
        assert_eq!(ErrorCategory::CallerMisuse.severity(), ErrorSeverity::Error);
        assert_eq!(ErrorCategory::Internal.severity(), ErrorSeverity::Fatal);
        assert_eq!(ErrorCategory::Cancelled.severity(), ErrorSeverity::Info);
    }
}
