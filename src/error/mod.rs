//! Error types for the sort engine.
//!
//! - [`EngineError`]: every error the engine can raise, from caller misuse to
//!   stepper invariant violations.
//! - [`ErrorCategory`]: coarse classification used by callers to decide
//!   whether an error is user-facing or a programming defect.

pub mod engine_error;
pub mod error_context;

pub use engine_error::EngineError;
pub use error_context::{ErrorCategory, ErrorSeverity};

/// Convenience alias for engine-level results.
pub type EngineResult<T> = Result<T, EngineError>;
