//! # stepsort: a stepwise, pausable sorting engine
//!
//! `stepsort` turns six classic in-place sorts (bubble, selection,
//! insertion, merge, quick, heap) into a throttled sequence of observable
//! step events. A caller can pause, resume, re-time or cancel a run at any
//! boundary between two primitives while the engine keeps exclusive
//! ownership of the array under sort.
//!
//! - **Step primitives**: `compare`, `swap`, `mark_pivot`, `mark_range` and
//!   `mark_sorted`, each emitting exactly one [`StepEvent`].
//! - **Steppers**: one per [`Algorithm`], written as plain async sorts over
//!   the primitives.
//! - **Execution controller**: [`SortEngine`] and [`RunHandle`], a small
//!   state machine (`Idle → Running ⇄ Paused → Completed | Cancelled`).
//! - **Event publisher**: ordered delivery to a single [`EventSink`], with a
//!   terminal [`EngineEvent::Completed`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stepsort::{create_bounded_event_channel, Algorithm, SortEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (sink, mut events) = create_bounded_event_channel(1);
//!     let mut engine = SortEngine::new(sink);
//!     let run = engine.start(vec![5, 3, 8, 1], Algorithm::Bubble, Some(10)).unwrap();
//!     while let Some(event) = events.recv().await {
//!         println!("{}", serde_json::to_string(&event).unwrap());
//!         if event.is_completed() {
//!             break;
//!         }
//!     }
//!     println!("{:?}", run.wait().await);
//! }
//! ```

pub mod algorithms;
pub mod api;
pub mod core;
pub mod domain;
pub mod error;

pub use crate::algorithms::Stepper;
pub use crate::api::{RunHandle, SortEngine, SortEngineBuilder};
pub use crate::core::delay::{DelayProvider, ManualDelay, NoDelay, TokioDelay};
pub use crate::core::dispatcher::EngineConfig;
pub use crate::core::event_bus::{
    create_bounded_event_channel, create_event_channel, CallbackSink, ChannelSink, EngineEvent,
    EventReceiver, EventSink, SinkError, StepEvent, StepKind,
};
pub use crate::domain::execution::{ControlState, RunOutcome, RunStats, RunStatus};
pub use crate::domain::model::Algorithm;
pub use crate::error::{EngineError, EngineResult, ErrorCategory};
