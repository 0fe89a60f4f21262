use async_trait::async_trait;

use super::{bubble, heap, insertion, merge, quick, selection, StepPrimitives};
use crate::domain::model::Algorithm;
use crate::error::EngineResult;

/// A sort expressed as an ordered sequence of step primitives.
#[async_trait]
pub trait Stepper: Send + Sync {
    async fn run(&self, p: &mut StepPrimitives<'_>) -> EngineResult<()>;
}

/// Dispatch an [`Algorithm`] to its stepper.
pub async fn run_algorithm(algorithm: Algorithm, p: &mut StepPrimitives<'_>) -> EngineResult<()> {
    match algorithm {
        Algorithm::Bubble => bubble::sort(p).await,
        Algorithm::Selection => selection::sort(p).await,
        Algorithm::Insertion => insertion::sort(p).await,
        Algorithm::Merge => merge::sort(p).await,
        Algorithm::Quick => quick::sort(p).await,
        Algorithm::Heap => heap::sort(p).await,
    }
}

#[async_trait]
impl Stepper for Algorithm {
    async fn run(&self, p: &mut StepPrimitives<'_>) -> EngineResult<()> {
        run_algorithm(*self, p).await
    }
}
