//! Execution status types.

mod status;

pub use status::{ControlState, RunOutcome, RunStats, RunStatus};
