//! Suspension boundary between two primitives.
//!
//! [`StepGate::suspend`] runs after every emitted step event. It is the only
//! place where a run yields control: throttling, pause/resume and
//! cancellation are all decided here, never in the middle of a primitive.

use async_trait::async_trait;

use crate::core::run_context::RunContext;
use crate::error::EngineResult;

#[async_trait]
pub trait StepGate: Send {
    /// Returning an error unwinds the stepper; [`EngineError::Cancelled`]
    /// ends the run without a completion event.
    ///
    /// [`EngineError::Cancelled`]: crate::error::EngineError::Cancelled
    async fn suspend(&mut self, ctx: &mut RunContext) -> EngineResult<()>;
}

/// Gate that never suspends. Drives a stepper straight to completion.
pub struct NoopGate;

#[async_trait]
impl StepGate for NoopGate {
    async fn suspend(&mut self, _ctx: &mut RunContext) -> EngineResult<()> {
        Ok(())
    }
}
