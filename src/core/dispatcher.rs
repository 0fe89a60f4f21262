//! Run dispatcher: the step loop of one run.
//!
//! A [`RunDispatcher`] owns the [`RunContext`] of a single run and drives a
//! [`Stepper`] to completion. Control commands arrive over an mpsc channel
//! and are applied by the [`ControlGate`] at the suspension boundary only;
//! observable status is mirrored into a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::Instrument;

use crate::algorithms::Stepper;
use crate::core::cancel::CancelSignal;
use crate::core::delay::DelayProvider;
use crate::core::event_bus::EventPublisher;
use crate::core::gate::StepGate;
use crate::core::primitives::StepPrimitives;
use crate::core::run_context::RunContext;
use crate::domain::execution::{ControlState, RunOutcome, RunStatus};
use crate::domain::model::Algorithm;
use crate::error::{EngineError, EngineResult};

/// Configuration for the sort engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default = "default_speed_ms")]
    pub default_speed_ms: u64,
    #[serde(default = "default_max_speed_ms")]
    pub max_speed_ms: u64,
    #[serde(default = "default_max_array_len")]
    pub max_array_len: usize,
}

fn default_speed_ms() -> u64 {
    50
}

fn default_max_speed_ms() -> u64 {
    2000
}

fn default_max_array_len() -> usize {
    10_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_speed_ms: default_speed_ms(),
            max_speed_ms: default_max_speed_ms(),
            max_array_len: default_max_array_len(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.max_array_len == 0 {
            return Err(EngineError::InvalidConfig(
                "max_array_len must be at least 1".to_string(),
            ));
        }
        if self.default_speed_ms > self.max_speed_ms {
            return Err(EngineError::InvalidConfig(format!(
                "default_speed_ms ({}) exceeds max_speed_ms ({})",
                self.default_speed_ms, self.max_speed_ms
            )));
        }
        Ok(())
    }

    /// Clamp a requested per-step delay to `max_speed_ms`.
    pub fn clamp_speed(&self, speed_ms: u64) -> u64 {
        if speed_ms > self.max_speed_ms {
            tracing::warn!(
                requested = speed_ms,
                max = self.max_speed_ms,
                "speed clamped to maximum"
            );
            self.max_speed_ms
        } else {
            speed_ms
        }
    }
}

/// External command to control a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    UpdateSpeed { speed_ms: u64 },
}

enum Wake {
    Cancelled,
    Command(Option<Command>),
    Elapsed,
}

/// The suspension boundary of a controlled run.
///
/// Publishes the counters, applies queued commands in arrival order, waits
/// `speed_ms` while running and parks while paused. A pause received during
/// the wait ends the wait; a speed change does not shorten it.
pub struct ControlGate {
    commands: Option<mpsc::UnboundedReceiver<Command>>,
    status_tx: Arc<watch::Sender<RunStatus>>,
    cancel: CancelSignal,
    delay: Arc<dyn DelayProvider>,
}

impl ControlGate {
    pub fn new(
        commands: mpsc::UnboundedReceiver<Command>,
        status_tx: Arc<watch::Sender<RunStatus>>,
        cancel: CancelSignal,
        delay: Arc<dyn DelayProvider>,
    ) -> Self {
        Self {
            commands: Some(commands),
            status_tx,
            cancel,
            delay,
        }
    }

    fn publish_stats(&self, ctx: &RunContext) {
        let stats = ctx.stats();
        self.status_tx.send_if_modified(|status| {
            if status.stats == stats {
                false
            } else {
                status.stats = stats;
                true
            }
        });
    }

    fn drain_commands(&mut self, ctx: &mut RunContext) {
        loop {
            let Some(rx) = self.commands.as_mut() else {
                return;
            };
            match rx.try_recv() {
                Ok(cmd) => apply(ctx, cmd),
                Err(mpsc::error::TryRecvError::Empty) => return,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.commands = None;
                    return;
                }
            }
        }
    }

    async fn throttle(&mut self, ctx: &mut RunContext) -> EngineResult<()> {
        let delay = self.delay.clone();
        let mut wait = delay.delay(Duration::from_millis(ctx.speed_ms));
        loop {
            let wake = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Wake::Cancelled,
                cmd = recv_command(&mut self.commands) => Wake::Command(cmd),
                _ = &mut wait => Wake::Elapsed,
            };
            match wake {
                Wake::Cancelled => return Err(EngineError::Cancelled),
                Wake::Elapsed => return Ok(()),
                Wake::Command(Some(cmd)) => {
                    apply(ctx, cmd);
                    if ctx.state != ControlState::Running {
                        return Ok(());
                    }
                }
                Wake::Command(None) => self.commands = None,
            }
        }
    }

    async fn wait_while_paused(&mut self, ctx: &mut RunContext) -> EngineResult<()> {
        while ctx.state == ControlState::Paused {
            if self.commands.is_none() {
                return Err(self.abandon(ctx));
            }
            let wake = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Wake::Cancelled,
                cmd = recv_command(&mut self.commands) => Wake::Command(cmd),
            };
            match wake {
                Wake::Command(Some(cmd)) => apply(ctx, cmd),
                Wake::Command(None) => self.commands = None,
                Wake::Cancelled | Wake::Elapsed => return Err(EngineError::Cancelled),
            }
        }
        Ok(())
    }

    /// Nobody can resume a paused run whose controller is gone.
    fn abandon(&self, ctx: &mut RunContext) -> EngineError {
        tracing::warn!("control channel closed while paused, cancelling run");
        ctx.state = ControlState::Cancelled;
        let cancel = &self.cancel;
        self.status_tx.send_if_modified(|status| {
            if status.state.is_active() {
                status.state = ControlState::Cancelled;
                cancel.cancel();
                true
            } else {
                false
            }
        });
        EngineError::Cancelled
    }
}

#[async_trait::async_trait]
impl StepGate for ControlGate {
    async fn suspend(&mut self, ctx: &mut RunContext) -> EngineResult<()> {
        self.publish_stats(ctx);
        self.drain_commands(ctx);
        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        if ctx.state == ControlState::Running {
            self.throttle(ctx).await?;
        }
        self.wait_while_paused(ctx).await?;
        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }
}

async fn recv_command(commands: &mut Option<mpsc::UnboundedReceiver<Command>>) -> Option<Command> {
    match commands.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn apply(ctx: &mut RunContext, cmd: Command) {
    match cmd {
        Command::Pause if ctx.state == ControlState::Running => {
            ctx.state = ControlState::Paused;
            tracing::debug!(steps = ctx.stats.steps, "run paused");
        }
        Command::Resume if ctx.state == ControlState::Paused => {
            ctx.state = ControlState::Running;
            tracing::debug!(steps = ctx.stats.steps, "run resumed");
        }
        Command::UpdateSpeed { speed_ms } => {
            ctx.speed_ms = speed_ms;
            tracing::debug!(speed_ms, "speed updated");
        }
        other => {
            tracing::debug!(command = ?other, state = %ctx.state, "ignored control command");
        }
    }
}

/// Drives one run from its first primitive to a [`RunOutcome`].
pub struct RunDispatcher<S: Stepper = Algorithm, G: StepGate = ControlGate> {
    ctx: RunContext,
    stepper: S,
    publisher: EventPublisher,
    gate: G,
    status_tx: Arc<watch::Sender<RunStatus>>,
    cancel: CancelSignal,
}

impl<S: Stepper, G: StepGate> RunDispatcher<S, G> {
    pub fn new(
        ctx: RunContext,
        stepper: S,
        publisher: EventPublisher,
        gate: G,
        status_tx: Arc<watch::Sender<RunStatus>>,
        cancel: CancelSignal,
    ) -> Self {
        Self {
            ctx,
            stepper,
            publisher,
            gate,
            status_tx,
            cancel,
        }
    }

    pub async fn run(self) -> RunOutcome {
        let span = tracing::info_span!(
            "run",
            run_id = %self.ctx.run_id(),
            algorithm = %self.ctx.algorithm()
        );
        self.run_inner().instrument(span).await
    }

    async fn run_inner(mut self) -> RunOutcome {
        tracing::info!(
            len = self.ctx.len(),
            speed_ms = self.ctx.speed_ms(),
            "run started"
        );
        let result = {
            let mut p = StepPrimitives::new(&mut self.ctx, &self.publisher, &mut self.gate);
            self.stepper.run(&mut p).await
        };
        let stats = self.ctx.stats();

        match result {
            Ok(()) => {
                if !self.try_complete() {
                    tracing::info!(steps = stats.steps, "run cancelled before completion");
                    return RunOutcome::Cancelled { stats };
                }
                self.ctx.state = ControlState::Completed;
                let array = self.ctx.into_array();
                self.publisher.publish_completed(array.clone(), stats).await;
                tracing::info!(
                    comparisons = stats.comparisons,
                    swaps = stats.swaps,
                    steps = stats.steps,
                    "run completed"
                );
                RunOutcome::Completed { array, stats }
            }
            Err(EngineError::Cancelled) => {
                tracing::info!(steps = stats.steps, "run cancelled");
                RunOutcome::Cancelled { stats }
            }
            Err(error) => {
                tracing::error!(%error, steps = stats.steps, "stepper aborted");
                self.mark_cancelled();
                RunOutcome::Aborted { error, stats }
            }
        }
    }

    /// Flip the observable state to `Completed` unless a cancel won the race.
    fn try_complete(&self) -> bool {
        let stats = self.ctx.stats();
        let mut completed = false;
        self.status_tx.send_if_modified(|status| {
            status.stats = stats;
            if status.state.is_active() {
                status.state = ControlState::Completed;
                completed = true;
            }
            true
        });
        completed
    }

    fn mark_cancelled(&self) {
        let stats = self.ctx.stats();
        self.status_tx.send_modify(|status| {
            status.stats = stats;
            if status.state.is_active() {
                status.state = ControlState::Cancelled;
            }
        });
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::core::delay::{ManualDelay, NoDelay};
    use crate::core::event_bus::{create_event_channel, EngineEvent};

    struct Faulty;

    #[async_trait]
    impl Stepper for Faulty {
        async fn run(&self, p: &mut StepPrimitives<'_>) -> EngineResult<()> {
            p.compare(0, 1).await?;
            p.swap(0, 9).await
        }
    }

    fn status_channel(ctx: &RunContext) -> (Arc<watch::Sender<RunStatus>>, watch::Receiver<RunStatus>) {
        let (tx, rx) = watch::channel(ctx.status());
        (Arc::new(tx), rx)
    }

    #[test]
    fn test_config_defaults_and_parse() {
        let config = EngineConfig::default();
        assert_eq!(config.default_speed_ms, 50);
        assert_eq!(config.max_speed_ms, 2000);
        assert_eq!(config.max_array_len, 10_000);

        let parsed = EngineConfig::from_json_str(r#"{"max_speed_ms": 500}"#).unwrap();
        assert_eq!(parsed.max_speed_ms, 500);
        assert_eq!(parsed.default_speed_ms, 50);
        assert_eq!(parsed.clamp_speed(900), 500);
        assert_eq!(parsed.clamp_speed(10), 10);
    }

    #[test]
    fn test_config_validation() {
        let err = EngineConfig::from_json_str(r#"{"default_speed_ms": 10, "max_speed_ms": 5}"#)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        assert!(EngineConfig::from_json_str("{not json").is_err());
        assert!(EngineConfig::from_json_str(r#"{"max_array_len": 0}"#).is_err());
    }

    #[test]
    fn test_apply_ignores_invalid_transitions() {
        let mut ctx = RunContext::with_run_id("t", Algorithm::Bubble, vec![1], 10);
        apply(&mut ctx, Command::Resume);
        assert_eq!(ctx.state(), ControlState::Running);
        apply(&mut ctx, Command::Pause);
        apply(&mut ctx, Command::Pause);
        assert_eq!(ctx.state(), ControlState::Paused);
        apply(&mut ctx, Command::UpdateSpeed { speed_ms: 3 });
        apply(&mut ctx, Command::UpdateSpeed { speed_ms: 7 });
        assert_eq!(ctx.speed_ms(), 7);
        apply(&mut ctx, Command::Resume);
        assert_eq!(ctx.state(), ControlState::Running);
    }

    #[tokio::test]
    async fn test_faulty_stepper_aborts_run() {
        let ctx = RunContext::with_run_id("t", Algorithm::Bubble, vec![2, 1], 0);
        let (status_tx, status_rx) = status_channel(&ctx);
        let (sink, mut events) = create_event_channel();
        let cancel = CancelSignal::new();
        let publisher = EventPublisher::new(Arc::new(sink), cancel.clone());
        let (_cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let gate = ControlGate::new(cmd_rx, status_tx.clone(), cancel.clone(), Arc::new(NoDelay));

        let outcome = RunDispatcher::new(ctx, Faulty, publisher, gate, status_tx, cancel.clone())
            .run()
            .await;

        match outcome {
            RunOutcome::Aborted { error, stats } => {
                assert!(matches!(error, EngineError::IndexOutOfBounds { index: 9, .. }));
                assert_eq!(stats.comparisons, 1);
                assert_eq!(stats.swaps, 0);
            }
            other => panic!("Expected aborted outcome, got {:?}", other),
        }
        assert_eq!(status_rx.borrow().state, ControlState::Cancelled);
        assert!(cancel.is_cancelled());
        // only the compare made it out
        assert!(events.recv().await.unwrap().as_step().is_some());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_run_to_completion_publishes_completed_last() {
        let ctx = RunContext::with_run_id("t", Algorithm::Selection, vec![3, 1, 2], 5);
        let (status_tx, status_rx) = status_channel(&ctx);
        let (sink, mut events) = create_event_channel();
        let cancel = CancelSignal::new();
        let publisher = EventPublisher::new(Arc::new(sink), cancel.clone());
        let (_cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let delay = Arc::new(ManualDelay::new());
        delay.open();
        let gate = ControlGate::new(cmd_rx, status_tx.clone(), cancel.clone(), delay.clone());

        let outcome =
            RunDispatcher::new(ctx, Algorithm::Selection, publisher, gate, status_tx, cancel)
                .run()
                .await;

        assert_eq!(outcome.state(), ControlState::Completed);
        assert_eq!(status_rx.borrow().state, ControlState::Completed);
        let mut last = None;
        while let Ok(evt) = events.try_recv() {
            last = Some(evt);
        }
        assert_eq!(
            last,
            Some(EngineEvent::Completed {
                array: vec![1, 2, 3],
                comparisons: outcome.stats().comparisons,
                swaps: outcome.stats().swaps,
            })
        );
        assert!(delay
            .requested()
            .iter()
            .all(|d| *d == Duration::from_millis(5)));
        assert_eq!(delay.request_count() as u64, outcome.stats().steps);
    }

    #[tokio::test]
    async fn test_closed_channel_while_paused_cancels() {
        let ctx = RunContext::with_run_id("t", Algorithm::Bubble, vec![2, 1, 3], 0);
        let (status_tx, status_rx) = status_channel(&ctx);
        let (sink, _events) = create_event_channel();
        let cancel = CancelSignal::new();
        let publisher = EventPublisher::new(Arc::new(sink), cancel.clone());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let gate = ControlGate::new(cmd_rx, status_tx.clone(), cancel.clone(), Arc::new(NoDelay));

        status_tx.send_modify(|s| s.state = ControlState::Paused);
        cmd_tx.send(Command::Pause).unwrap();
        drop(cmd_tx);

        let outcome = RunDispatcher::new(ctx, Algorithm::Bubble, publisher, gate, status_tx, cancel)
            .run()
            .await;
        assert!(matches!(outcome, RunOutcome::Cancelled { .. }));
        assert_eq!(outcome.stats().steps, 1);
        assert_eq!(status_rx.borrow().state, ControlState::Cancelled);
    }
}
