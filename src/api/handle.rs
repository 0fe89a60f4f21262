//! Per-run control and observation handle.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::core::cancel::CancelSignal;
use crate::core::dispatcher::{Command, EngineConfig};
use crate::domain::execution::{ControlState, RunOutcome, RunStats, RunStatus};
use crate::domain::model::Algorithm;
use crate::error::EngineError;

enum OutcomeSlot {
    Pending(JoinHandle<RunOutcome>),
    Done(RunOutcome),
}

struct RunShared {
    run_id: String,
    algorithm: Algorithm,
    config: EngineConfig,
    command_tx: mpsc::UnboundedSender<Command>,
    status_tx: Arc<watch::Sender<RunStatus>>,
    status_rx: watch::Receiver<RunStatus>,
    cancel: CancelSignal,
    outcome: Mutex<OutcomeSlot>,
}

/// Handle to a running or finished sort.
///
/// Control calls change the observable state at once and queue a command
/// that the run applies at its next suspension boundary. A call that is not
/// valid in the current state is a no-op and returns `false`.
#[derive(Clone)]
pub struct RunHandle {
    inner: Arc<RunShared>,
}

impl RunHandle {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        run_id: String,
        algorithm: Algorithm,
        config: EngineConfig,
        command_tx: mpsc::UnboundedSender<Command>,
        status_tx: Arc<watch::Sender<RunStatus>>,
        status_rx: watch::Receiver<RunStatus>,
        cancel: CancelSignal,
        join: JoinHandle<RunOutcome>,
    ) -> Self {
        Self {
            inner: Arc::new(RunShared {
                run_id,
                algorithm,
                config,
                command_tx,
                status_tx,
                status_rx,
                cancel,
                outcome: Mutex::new(OutcomeSlot::Pending(join)),
            }),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.inner.run_id
    }

    pub fn algorithm(&self) -> Algorithm {
        self.inner.algorithm
    }

    /// Return the current status (non-blocking).
    pub fn status(&self) -> RunStatus {
        self.inner.status_rx.borrow().clone()
    }

    pub fn state(&self) -> ControlState {
        self.inner.status_rx.borrow().state
    }

    pub fn stats(&self) -> RunStats {
        self.inner.status_rx.borrow().stats
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<RunStatus> {
        self.inner.status_rx.clone()
    }

    /// `Running → Paused`. The run halts at its next suspension boundary.
    pub fn pause(&self) -> bool {
        self.control(Command::Pause, |status| {
            if status.state != ControlState::Running {
                return false;
            }
            status.state = ControlState::Paused;
            true
        })
    }

    /// `Paused → Running`. The run continues with its next primitive.
    pub fn resume(&self) -> bool {
        self.control(Command::Resume, |status| {
            if status.state != ControlState::Paused {
                return false;
            }
            status.state = ControlState::Running;
            true
        })
    }

    /// Change the per-step delay. Applies from the next suspension onwards;
    /// if several updates arrive between two steps the latest wins.
    pub fn update_speed(&self, speed_ms: u64) -> bool {
        let speed_ms = self.inner.config.clamp_speed(speed_ms);
        self.control(Command::UpdateSpeed { speed_ms }, |status| {
            if !status.state.is_active() {
                return false;
            }
            status.speed_ms = speed_ms;
            true
        })
    }

    /// Cancel the run. Once this returns `true` no further event of this run
    /// reaches the sink.
    pub fn cancel(&self) -> bool {
        let cancel = &self.inner.cancel;
        self.inner.status_tx.send_if_modified(|status| {
            if !status.state.is_active() {
                return false;
            }
            status.state = ControlState::Cancelled;
            cancel.cancel();
            true
        })
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Wait until the run reaches `state` or a terminal state, whichever
    /// comes first. Returns the status observed at that point.
    pub async fn wait_for_state(&self, state: ControlState) -> RunStatus {
        let mut rx = self.inner.status_rx.clone();
        loop {
            {
                let status = rx.borrow_and_update();
                if status.state == state || status.state.is_terminal() {
                    return status.clone();
                }
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }

    /// Block until the run task has finished and return its outcome.
    pub async fn wait(&self) -> RunOutcome {
        let mut slot = self.inner.outcome.lock().await;
        let outcome = match &mut *slot {
            OutcomeSlot::Done(outcome) => return outcome.clone(),
            OutcomeSlot::Pending(join) => match join.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::error!(run_id = %self.inner.run_id, error = %err, "run task failed");
                    self.cancel();
                    RunOutcome::Aborted {
                        error: EngineError::Internal(err.to_string()),
                        stats: self.stats(),
                    }
                }
            },
        };
        *slot = OutcomeSlot::Done(outcome.clone());
        outcome
    }

    /// Apply `update` to the observable status and queue `cmd`, atomically
    /// with respect to every other control call.
    fn control(&self, cmd: Command, update: impl FnOnce(&mut RunStatus) -> bool) -> bool {
        let tx = &self.inner.command_tx;
        let mut accepted = false;
        self.inner.status_tx.send_if_modified(|status| {
            let mut next = status.clone();
            if !update(&mut next) || tx.send(cmd).is_err() {
                tracing::debug!(command = ?cmd, state = %status.state, "control command ignored");
                return false;
            }
            *status = next;
            accepted = true;
            true
        });
        accepted
    }
}

impl std::fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunHandle")
            .field("run_id", &self.inner.run_id)
            .field("algorithm", &self.inner.algorithm)
            .field("state", &self.state())
            .finish()
    }
}
