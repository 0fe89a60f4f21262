//! Step events and the single-consumer event publisher.
//!
//! Every primitive produces exactly one [`StepEvent`]; a run that exhausts its
//! stepper ends with one [`EngineEvent::Completed`]. The [`EventPublisher`]
//! hands them to the registered [`EventSink`] one at a time, in execution
//! order, and drops them silently once the run has been cancelled.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::core::cancel::CancelSignal;
use crate::domain::execution::RunStats;

/// Kind of primitive that produced a step event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// `indices = [i, j]`, array unchanged.
    Compare,
    /// `indices = [i, j]`, array already reflects the exchange.
    Swap,
    /// `indices` = positions newly finalized.
    MarkSorted,
    /// `indices = [pivot]`.
    MarkPivot,
    /// `indices = [lo, hi]`, inclusive.
    MarkRange,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Compare => "compare",
            StepKind::Swap => "swap",
            StepKind::MarkSorted => "mark_sorted",
            StepKind::MarkPivot => "mark_pivot",
            StepKind::MarkRange => "mark_range",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one primitive's effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Zero-based position of this event within its run.
    pub sequence: u64,
    pub kind: StepKind,
    pub indices: Vec<usize>,
    /// Full array after the primitive was applied.
    pub array: Vec<u32>,
    /// Every position settled so far, ascending.
    pub sorted_indices: Vec<usize>,
    pub comparisons: u64,
    pub swaps: u64,
}

/// Event delivered to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    Step(StepEvent),
    /// Terminal signal, published once per completed run.
    Completed {
        array: Vec<u32>,
        comparisons: u64,
        swaps: u64,
    },
}

impl EngineEvent {
    pub fn as_step(&self) -> Option<&StepEvent> {
        match self {
            EngineEvent::Step(step) => Some(step),
            EngineEvent::Completed { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, EngineEvent::Completed { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Event consumer disconnected")]
    Disconnected,
    #[error("Event delivery failed: {0}")]
    Delivery(String),
}

/// The single consumer of a run's events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, event: EngineEvent) -> Result<(), SinkError>;
}

/// Receiving end of an unbounded event channel.
pub type EventReceiver = mpsc::UnboundedReceiver<EngineEvent>;

/// Create an unbounded event channel and the sink that feeds it.
///
/// Delivery never waits on the consumer, so with a fast delay provider a
/// whole run can queue up ahead of it. Use
/// [`create_bounded_event_channel(1)`](create_bounded_event_channel) when
/// the consumer must see at most one event in flight.
pub fn create_event_channel() -> (ChannelSink, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink::Unbounded(tx), rx)
}

/// Create a bounded event channel.
///
/// With `capacity == 1` the run cannot get more than one event ahead of the
/// consumer: a slow consumer slows the run down instead of queueing events.
pub fn create_bounded_event_channel(
    capacity: usize,
) -> (ChannelSink, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ChannelSink::Bounded(tx), rx)
}

/// Sink backed by a Tokio mpsc channel.
#[derive(Clone)]
pub enum ChannelSink {
    Unbounded(mpsc::UnboundedSender<EngineEvent>),
    Bounded(mpsc::Sender<EngineEvent>),
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn deliver(&self, event: EngineEvent) -> Result<(), SinkError> {
        match self {
            ChannelSink::Unbounded(tx) => tx.send(event).map_err(|_| SinkError::Disconnected),
            ChannelSink::Bounded(tx) => tx.send(event).await.map_err(|_| SinkError::Disconnected),
        }
    }
}

/// Sink that invokes a synchronous callback for every event.
pub struct CallbackSink<F> {
    callback: F,
}

impl<F> CallbackSink<F>
where
    F: Fn(EngineEvent) -> Result<(), SinkError> + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> EventSink for CallbackSink<F>
where
    F: Fn(EngineEvent) -> Result<(), SinkError> + Send + Sync,
{
    async fn deliver(&self, event: EngineEvent) -> Result<(), SinkError> {
        (self.callback)(event)
    }
}

/// Delivers the events of one run to its sink.
///
/// Delivery failures are logged and counted but never reach the step loop:
/// the run keeps advancing and failed events are not replayed.
pub struct EventPublisher {
    sink: Arc<dyn EventSink>,
    cancel: CancelSignal,
    finished: AtomicBool,
    failures: AtomicU64,
}

impl EventPublisher {
    pub fn new(sink: Arc<dyn EventSink>, cancel: CancelSignal) -> Self {
        Self {
            sink,
            cancel,
            finished: AtomicBool::new(false),
            failures: AtomicU64::new(0),
        }
    }

    #[inline(always)]
    fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && !self.finished.load(Ordering::Acquire)
    }

    /// Publish one event. Returns whether the sink accepted it.
    pub async fn publish(&self, event: EngineEvent) -> bool {
        if !self.is_active() {
            return false;
        }
        let delivery = self.sink.deliver(event);
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return false,
            result = delivery => result,
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(error = %err, failures, "event delivery failed");
                false
            }
        }
    }

    /// Publish the terminal signal; nothing is published afterwards.
    pub async fn publish_completed(&self, array: Vec<u32>, stats: RunStats) -> bool {
        let delivered = self
            .publish(EngineEvent::Completed {
                array,
                comparisons: stats.comparisons,
                swaps: stats.swaps,
            })
            .await;
        self.finished.store(true, Ordering::Release);
        delivered
    }

    pub fn delivery_failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}
