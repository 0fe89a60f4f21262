//! Sort engine and builder.
//!
//! [`SortEngine`] (constructed via [`SortEngineBuilder`]) is the execution
//! controller seen by callers. It owns the event sink, the delay provider and
//! the configuration, allows a single active run at a time and forwards the
//! control calls to that run's [`RunHandle`].

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::api::handle::RunHandle;
use crate::core::cancel::CancelSignal;
use crate::core::delay::{DelayProvider, TokioDelay};
use crate::core::dispatcher::{ControlGate, EngineConfig, RunDispatcher};
use crate::core::event_bus::{EventPublisher, EventSink};
use crate::core::run_context::RunContext;
use crate::domain::execution::{ControlState, RunOutcome, RunStats, RunStatus};
use crate::domain::model::Algorithm;
use crate::error::{EngineError, EngineResult};

/// Execution controller for stepwise sorts.
///
/// Use [`SortEngine::builder(sink)`](Self::builder) to obtain a
/// [`SortEngineBuilder`].
pub struct SortEngine {
    sink: Arc<dyn EventSink>,
    delay: Arc<dyn DelayProvider>,
    config: EngineConfig,
    speed_ms: u64,
    current: Option<RunHandle>,
}

impl SortEngine {
    pub fn builder(sink: impl EventSink + 'static) -> SortEngineBuilder {
        SortEngineBuilder {
            sink: Arc::new(sink),
            delay: Arc::new(TokioDelay),
            config: EngineConfig::default(),
        }
    }

    /// Engine with the default configuration and the Tokio timer.
    pub fn new(sink: impl EventSink + 'static) -> Self {
        let config = EngineConfig::default();
        Self {
            sink: Arc::new(sink),
            delay: Arc::new(TokioDelay),
            speed_ms: config.default_speed_ms,
            config,
            current: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start sorting `array` on the current Tokio runtime.
    ///
    /// Accepted from `Idle`, `Completed` and `Cancelled`. Without an explicit
    /// speed the last speed set through [`update_speed`](Self::update_speed)
    /// (initially `default_speed_ms`) is used.
    pub fn start(
        &mut self,
        array: Vec<u32>,
        algorithm: Algorithm,
        speed_ms: Option<u64>,
    ) -> EngineResult<RunHandle> {
        let state = self.state();
        if !state.can_start() {
            return Err(EngineError::RunInProgress(state));
        }
        if array.len() > self.config.max_array_len {
            return Err(EngineError::ArrayTooLarge {
                len: array.len(),
                limit: self.config.max_array_len,
            });
        }
        if let Some(index) = array.iter().position(|&value| value == 0) {
            return Err(EngineError::NonPositiveValue { index, value: 0 });
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| EngineError::Internal(format!("no Tokio runtime available: {}", e)))?;

        let speed_ms = match speed_ms {
            Some(speed_ms) => self.config.clamp_speed(speed_ms),
            None => self.speed_ms,
        };
        let ctx = RunContext::new(algorithm, array, speed_ms);
        let run_id = ctx.run_id().to_string();

        let (status_tx, status_rx) = watch::channel(ctx.status());
        let status_tx = Arc::new(status_tx);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let cancel = CancelSignal::new();

        let publisher = EventPublisher::new(self.sink.clone(), cancel.clone());
        let gate = ControlGate::new(
            command_rx,
            status_tx.clone(),
            cancel.clone(),
            self.delay.clone(),
        );
        let dispatcher = RunDispatcher::new(
            ctx,
            algorithm,
            publisher,
            gate,
            status_tx.clone(),
            cancel.clone(),
        );
        let join = runtime.spawn(dispatcher.run());

        let handle = RunHandle::new(
            run_id,
            algorithm,
            self.config.clone(),
            command_tx,
            status_tx,
            status_rx,
            cancel,
            join,
        );
        self.current = Some(handle.clone());
        Ok(handle)
    }

    /// [`start`](Self::start) with the algorithm given by its identifier.
    pub fn start_named(
        &mut self,
        array: Vec<u32>,
        algorithm: &str,
        speed_ms: Option<u64>,
    ) -> EngineResult<RunHandle> {
        let algorithm: Algorithm = algorithm.parse()?;
        self.start(array, algorithm, speed_ms)
    }

    pub fn pause(&self) -> bool {
        self.current.as_ref().is_some_and(RunHandle::pause)
    }

    pub fn resume(&self) -> bool {
        self.current.as_ref().is_some_and(RunHandle::resume)
    }

    pub fn cancel(&self) -> bool {
        self.current.as_ref().is_some_and(RunHandle::cancel)
    }

    /// Change the per-step delay.
    ///
    /// With an active run the change applies from its next suspension. The
    /// value is also kept as the speed of the next run, so calling this while
    /// idle only affects future runs.
    pub fn update_speed(&mut self, speed_ms: u64) -> bool {
        let speed_ms = self.config.clamp_speed(speed_ms);
        self.speed_ms = speed_ms;
        match self.current.as_ref() {
            Some(run) if run.state().is_active() => run.update_speed(speed_ms),
            _ => true,
        }
    }

    /// Speed used by the next `start` without an explicit speed.
    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    pub fn state(&self) -> ControlState {
        self.current
            .as_ref()
            .map_or(ControlState::Idle, RunHandle::state)
    }

    pub fn status(&self) -> RunStatus {
        match self.current.as_ref() {
            Some(run) => run.status(),
            None => RunStatus {
                speed_ms: self.speed_ms,
                ..RunStatus::default()
            },
        }
    }

    /// Counters of the current or most recent run.
    pub fn stats(&self) -> RunStats {
        self.current
            .as_ref()
            .map(RunHandle::stats)
            .unwrap_or_default()
    }

    pub fn current_run(&self) -> Option<&RunHandle> {
        self.current.as_ref()
    }

    /// Wait for the current run to finish. `None` if nothing was started.
    pub async fn wait(&self) -> Option<RunOutcome> {
        match self.current.as_ref() {
            Some(run) => Some(run.wait().await),
            None => None,
        }
    }
}

/// Builder for configuring a [`SortEngine`].
pub struct SortEngineBuilder {
    sink: Arc<dyn EventSink>,
    delay: Arc<dyn DelayProvider>,
    config: EngineConfig,
}

impl SortEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the Tokio timer, e.g. with a
    /// [`ManualDelay`](crate::core::delay::ManualDelay) in tests.
    pub fn delay_provider(mut self, delay: Arc<dyn DelayProvider>) -> Self {
        self.delay = delay;
        self
    }

    pub fn build(self) -> EngineResult<SortEngine> {
        self.config.validate()?;
        Ok(SortEngine {
            sink: self.sink,
            delay: self.delay,
            speed_ms: self.config.default_speed_ms,
            config: self.config,
            current: None,
        })
    }
}
