use std::collections::BTreeSet;

use crate::domain::execution::{ControlState, RunStats, RunStatus};
use crate::domain::model::Algorithm;

/// Per-execution state: the array under sort, its counters and its control
/// state. Owned by exactly one run; the array is only mutated through
/// [`StepPrimitives`](crate::core::primitives::StepPrimitives).
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: String,
    algorithm: Algorithm,
    pub(crate) array: Vec<u32>,
    pub(crate) sorted: BTreeSet<usize>,
    pub(crate) stats: RunStats,
    pub(crate) speed_ms: u64,
    pub(crate) state: ControlState,
}

impl RunContext {
    pub fn new(algorithm: Algorithm, array: Vec<u32>, speed_ms: u64) -> Self {
        Self::with_run_id(uuid::Uuid::new_v4().to_string(), algorithm, array, speed_ms)
    }

    pub fn with_run_id(
        run_id: impl Into<String>,
        algorithm: Algorithm,
        array: Vec<u32>,
        speed_ms: u64,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            algorithm,
            array,
            sorted: BTreeSet::new(),
            stats: RunStats::default(),
            speed_ms,
            state: ControlState::Running,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn array(&self) -> &[u32] {
        &self.array
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn is_sorted_index(&self, index: usize) -> bool {
        self.sorted.contains(&index)
    }

    pub fn sorted_indices(&self) -> Vec<usize> {
        self.sorted.iter().copied().collect()
    }

    pub fn status(&self) -> RunStatus {
        RunStatus {
            run_id: Some(self.run_id.clone()),
            algorithm: Some(self.algorithm),
            state: self.state,
            speed_ms: self.speed_ms,
            stats: self.stats,
        }
    }

    pub fn into_array(self) -> Vec<u32> {
        self.array
    }
}
