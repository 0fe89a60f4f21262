//! Core runtime: step primitives, the suspension boundary and the run loop.

pub mod cancel;
pub mod delay;
pub mod dispatcher;
pub mod event_bus;
pub mod gate;
pub mod primitives;
pub mod run_context;

pub use cancel::CancelSignal;
pub use delay::{DelayProvider, ManualDelay, NoDelay, TokioDelay};
pub use dispatcher::{Command, ControlGate, EngineConfig, RunDispatcher};
pub use event_bus::{
    create_bounded_event_channel, create_event_channel, CallbackSink, ChannelSink, EngineEvent,
    EventPublisher, EventReceiver, EventSink, SinkError, StepEvent, StepKind,
};
pub use gate::{NoopGate, StepGate};
pub use primitives::StepPrimitives;
pub use run_context::RunContext;
