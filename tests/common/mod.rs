#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use stepsort::{
    create_event_channel, Algorithm, EngineEvent, EventReceiver, EventSink, NoDelay, RunOutcome,
    SinkError, SortEngine, StepEvent,
};

pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(10), fut)
        .await
        .expect("test timed out")
}

/// Engine without throttling, feeding an unbounded channel.
pub fn fast_engine() -> (SortEngine, EventReceiver) {
    let (sink, rx) = create_event_channel();
    let engine = SortEngine::builder(sink)
        .delay_provider(Arc::new(NoDelay))
        .build()
        .unwrap();
    (engine, rx)
}

/// Everything currently queued on the receiver.
pub fn drain(rx: &mut EventReceiver) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(evt) = rx.try_recv() {
        events.push(evt);
    }
    events
}

pub fn steps(events: &[EngineEvent]) -> Vec<StepEvent> {
    events.iter().filter_map(|e| e.as_step().cloned()).collect()
}

pub struct CompletedRun {
    pub steps: Vec<StepEvent>,
    pub events: Vec<EngineEvent>,
    pub outcome: RunOutcome,
}

/// Run `algorithm` over `array` without delays and collect the full stream.
pub async fn run_to_completion(algorithm: Algorithm, array: Vec<u32>) -> CompletedRun {
    let (mut engine, mut rx) = fast_engine();
    let run = engine.start(array, algorithm, Some(0)).unwrap();
    let outcome = with_timeout(run.wait()).await;
    let events = drain(&mut rx);
    CompletedRun {
        steps: steps(&events),
        events,
        outcome,
    }
}

/// Sink that keeps every delivered event in memory.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn deliver(&self, event: EngineEvent) -> Result<(), SinkError> {
        self.events.lock().push(event);
        Ok(())
    }
}
