//! Public API layer: the engine entry point and per-run handles.

mod engine;
mod handle;

pub use engine::{SortEngine, SortEngineBuilder};
pub use handle::RunHandle;
