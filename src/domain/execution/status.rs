//! Execution status: run control states, counters and outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::model::Algorithm;
use crate::error::EngineError;

/// Control state of the execution controller.
///
/// `Idle → Running ⇄ Paused → Completed`, with `Running`/`Paused → Cancelled`
/// at any time. `Completed` and `Cancelled` are terminal for a run but allow
/// a new `start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
}

impl ControlState {
    /// A run exists and still owns its array.
    pub fn is_active(self) -> bool {
        matches!(self, ControlState::Running | ControlState::Paused)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ControlState::Completed | ControlState::Cancelled)
    }

    pub fn can_start(self) -> bool {
        !self.is_active()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ControlState::Idle => "idle",
            ControlState::Running => "running",
            ControlState::Paused => "paused",
            ControlState::Completed => "completed",
            ControlState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cumulative counters of one run. Reset only by `start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub comparisons: u64,
    pub swaps: u64,
    /// Step events produced so far, of any kind.
    pub steps: u64,
}

/// Point-in-time view of the controller, readable at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatus {
    pub run_id: Option<String>,
    pub algorithm: Option<Algorithm>,
    pub state: ControlState,
    pub speed_ms: u64,
    pub stats: RunStats,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { array: Vec<u32>, stats: RunStats },
    Cancelled { stats: RunStats },
    /// A stepper violated a primitive precondition.
    Aborted { error: EngineError, stats: RunStats },
}

impl RunOutcome {
    pub fn stats(&self) -> RunStats {
        match self {
            RunOutcome::Completed { stats, .. }
            | RunOutcome::Cancelled { stats }
            | RunOutcome::Aborted { stats, .. } => *stats,
        }
    }

    pub fn state(&self) -> ControlState {
        match self {
            RunOutcome::Completed { .. } => ControlState::Completed,
            RunOutcome::Cancelled { .. } | RunOutcome::Aborted { .. } => ControlState::Cancelled,
        }
    }
}
