//! Step primitive layer.
//!
//! The only way a stepper can touch the array. Each call validates its
//! indices, applies its mutation, publishes exactly one [`StepEvent`] and then
//! passes through the suspension boundary before control returns to the
//! stepper. A call that fails validation changes nothing and publishes
//! nothing.

use crate::core::event_bus::{EngineEvent, EventPublisher, StepEvent, StepKind};
use crate::core::gate::StepGate;
use crate::core::run_context::RunContext;
use crate::error::{EngineError, EngineResult};

pub struct StepPrimitives<'a> {
    ctx: &'a mut RunContext,
    publisher: &'a EventPublisher,
    gate: &'a mut dyn StepGate,
}

impl<'a> StepPrimitives<'a> {
    pub fn new(
        ctx: &'a mut RunContext,
        publisher: &'a EventPublisher,
        gate: &'a mut dyn StepGate,
    ) -> Self {
        Self {
            ctx,
            publisher,
            gate,
        }
    }

    pub fn len(&self) -> usize {
        self.ctx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctx.is_empty()
    }

    /// Returns whether `a[i] > a[j]`.
    pub async fn compare(&mut self, i: usize, j: usize) -> EngineResult<bool> {
        self.check_index(StepKind::Compare, i)?;
        self.check_index(StepKind::Compare, j)?;
        let greater = self.ctx.array[i] > self.ctx.array[j];
        self.ctx.stats.comparisons += 1;
        self.emit(StepKind::Compare, vec![i, j]).await?;
        Ok(greater)
    }

    /// Exchange `a[i]` and `a[j]` in place.
    pub async fn swap(&mut self, i: usize, j: usize) -> EngineResult<()> {
        self.check_index(StepKind::Swap, i)?;
        self.check_index(StepKind::Swap, j)?;
        self.ctx.array.swap(i, j);
        self.ctx.stats.swaps += 1;
        self.emit(StepKind::Swap, vec![i, j]).await
    }

    pub async fn mark_pivot(&mut self, index: usize) -> EngineResult<()> {
        self.check_index(StepKind::MarkPivot, index)?;
        self.emit(StepKind::MarkPivot, vec![index]).await
    }

    /// Highlight the inclusive range `[lo, hi]`.
    pub async fn mark_range(&mut self, lo: usize, hi: usize) -> EngineResult<()> {
        self.check_index(StepKind::MarkRange, lo)?;
        self.check_index(StepKind::MarkRange, hi)?;
        if lo > hi {
            return Err(EngineError::InvalidRange { lo, hi });
        }
        self.emit(StepKind::MarkRange, vec![lo, hi]).await
    }

    /// Permanently settle one or more positions. Each position may be
    /// settled once per run. An empty set is a no-op and emits nothing.
    pub async fn mark_sorted(
        &mut self,
        indices: impl IntoIterator<Item = usize>,
    ) -> EngineResult<()> {
        let mut fresh: Vec<usize> = indices.into_iter().collect();
        if fresh.is_empty() {
            return Ok(());
        }
        fresh.sort_unstable();
        for (pos, &index) in fresh.iter().enumerate() {
            self.check_index(StepKind::MarkSorted, index)?;
            if self.ctx.is_sorted_index(index) || (pos > 0 && fresh[pos - 1] == index) {
                return Err(EngineError::AlreadySorted(index));
            }
        }
        self.ctx.sorted.extend(fresh.iter().copied());
        self.emit(StepKind::MarkSorted, fresh).await
    }

    fn check_index(&self, kind: StepKind, index: usize) -> EngineResult<()> {
        let len = self.ctx.len();
        if index < len {
            Ok(())
        } else {
            Err(EngineError::IndexOutOfBounds { kind, index, len })
        }
    }

    async fn emit(&mut self, kind: StepKind, indices: Vec<usize>) -> EngineResult<()> {
        let sequence = self.ctx.stats.steps;
        self.ctx.stats.steps += 1;
        let event = StepEvent {
            sequence,
            kind,
            indices,
            array: self.ctx.array.clone(),
            sorted_indices: self.ctx.sorted_indices(),
            comparisons: self.ctx.stats.comparisons,
            swaps: self.ctx.stats.swaps,
        };
        tracing::trace!(sequence, kind = %kind, indices = ?event.indices, "step");
        self.publisher.publish(EngineEvent::Step(event)).await;
        self.gate.suspend(&mut *self.ctx).await
    }
}
