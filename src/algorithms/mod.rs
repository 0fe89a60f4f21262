//! The six steppers.
//!
//! Each module exposes `async fn sort(p: &mut StepPrimitives<'_>)`, a plain
//! decomposition of the algorithm into primitive calls. Suspension happens
//! inside the primitives, so a stepper reads like an ordinary in-place sort.
//!
//! Every stepper settles each index exactly once through
//! [`StepPrimitives::mark_sorted`] and never calls a primitive after
//! returning.

pub mod bubble;
pub mod heap;
pub mod insertion;
pub mod merge;
pub mod quick;
pub mod selection;
pub mod stepper;

pub use stepper::{run_algorithm, Stepper};

use crate::core::primitives::StepPrimitives;
