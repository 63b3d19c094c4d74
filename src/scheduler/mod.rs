//! The load scheduler.
//!
//! Owns the registered queue, the step counters, and the session state
//! machine. Execution is cooperative and single-threaded: the host calls
//! [`Scheduler::tick`] once per frame, and the drive loop (in `drive.rs`)
//! runs micro-steps until the yield policy ends the slice.
//!
//! Calls made in the wrong session state are recovered, not fatal: they are
//! logged as warnings, returned as [`SchedulerError::InvalidState`], and
//! leave all in-flight state untouched.

pub(crate) mod drive;
pub(crate) mod session;
pub(crate) mod stack;

#[cfg(test)]
mod tests;

use std::sync::Once;

use tracing::warn;

use crate::config::{Config, Platform};
use crate::error::SchedulerError;
use crate::host::{HostBridge, NullBridge};
use crate::progress::StepCounters;
use crate::task::{Loader, LoaderCollection, Sequence, SequenceLoader};
use session::{Session, SessionKind};

/// Bookkeeping steps per session: one for setup, one for completion.
const BOOKKEEPING_STEPS: u32 = 2;

/// Completion callback handed to `start`/`run_sequence_now`. Returned by
/// [`Scheduler::tick`] once the session finishes, after the scheduler has
/// already returned to `Idle`, so the callback may immediately register and
/// start a follow-up session.
pub type OnComplete = Box<dyn FnOnce() + Send>;

/// One-time platform bridge initialization, shared across instances.
static BRIDGE_INIT: Once = Once::new();

/* ===================== Types ===================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Paused,
}

pub(crate) struct RegisteredTask {
    pub(crate) loader: Box<dyn Loader + Send>,
    pub(crate) additional_steps: u32,
}

pub struct Scheduler {
    config: Config,
    bridge: Box<dyn HostBridge + Send>,
    registered: Vec<RegisteredTask>,
    counters: StepCounters,
    state: SessionState,
    session: Option<Session>,
    has_focus: bool,
    original_run_in_background: bool,
}

/* ===================== Construction ===================== */

impl Scheduler {
    /// Scheduler for a host without platform integration.
    pub fn new(config: Config) -> Self {
        Self::with_bridge(config, Box::new(NullBridge))
    }

    /// Scheduler with an injected host bridge.
    pub fn with_bridge(config: Config, mut bridge: Box<dyn HostBridge + Send>) -> Self {
        if config.platform == Platform::Constrained && !config.development {
            BRIDGE_INIT.call_once(|| bridge.initialize());
        }

        Self {
            config,
            bridge,
            registered: Vec::new(),
            counters: StepCounters::new(),
            state: SessionState::Idle,
            session: None,
            has_focus: true,
            original_run_in_background: true,
        }
    }
}

/* ===================== Registration ===================== */

impl Scheduler {
    /// Register a loader to be driven by the next session.
    pub fn register(
        &mut self,
        loader: impl Loader + Send + 'static,
        additional_steps: u32,
    ) -> Result<(), SchedulerError> {
        self.register_boxed(Box::new(loader), additional_steps)
    }

    /// Register a batch of loaders, each with zero additional steps.
    pub fn register_many(
        &mut self,
        loaders: impl IntoIterator<Item = Box<dyn Loader + Send>>,
    ) -> Result<(), SchedulerError> {
        self.guard_idle("register_many")?;
        for loader in loaders {
            self.registered.push(RegisteredTask {
                loader,
                additional_steps: 0,
            });
        }
        Ok(())
    }

    /// Walk a collaborator-defined object graph and register every loader
    /// it contains, each with zero additional steps.
    pub fn register_deep(
        &mut self,
        root: &mut dyn LoaderCollection,
    ) -> Result<(), SchedulerError> {
        self.guard_idle("register_deep")?;
        let registered = &mut self.registered;
        root.visit_loaders(&mut |loader| {
            registered.push(RegisteredTask {
                loader,
                additional_steps: 0,
            });
        });
        Ok(())
    }

    /// Register a bare sequence; it is wrapped in a loader with a no-op
    /// loaded hook.
    pub fn register_sequence(
        &mut self,
        sequence: impl Sequence + Send + 'static,
        additional_steps: u32,
    ) -> Result<(), SchedulerError> {
        self.register_boxed(
            Box::new(SequenceLoader::new(Box::new(sequence))),
            additional_steps,
        )
    }

    /// Discard all registered loaders. Only valid between sessions.
    pub fn clear_registration(&mut self) -> Result<(), SchedulerError> {
        self.guard_idle("clear_registration")?;
        self.registered.clear();
        Ok(())
    }

    fn register_boxed(
        &mut self,
        loader: Box<dyn Loader + Send>,
        additional_steps: u32,
    ) -> Result<(), SchedulerError> {
        self.guard_idle("register")?;
        self.registered.push(RegisteredTask {
            loader,
            additional_steps,
        });
        Ok(())
    }

    fn guard_idle(&self, operation: &'static str) -> Result<(), SchedulerError> {
        if self.state != SessionState::Idle {
            warn!(
                "{operation} invoked in the middle of a load session; \
                 this isn't allowed, invoke it after the session finishes"
            );
            return Err(SchedulerError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }
}

/* ===================== Session control ===================== */

impl Scheduler {
    /// Begin driving all registered loaders, in registration order.
    ///
    /// Computes the session's step total (one step per task, plus each
    /// task's declared additional steps, plus setup and completion), takes
    /// the registered queue, and keeps the host awake in the background for
    /// the duration of the session.
    pub fn start(
        &mut self,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Result<(), SchedulerError> {
        self.guard_idle("start")?;

        let tasks = std::mem::take(&mut self.registered);
        let total = tasks.len() as u32
            + tasks.iter().map(|t| t.additional_steps).sum::<u32>()
            + BOOKKEEPING_STEPS;

        let session = Session::new(SessionKind::Registered, tasks, Box::new(on_complete));
        self.begin_session(session, total);
        Ok(())
    }

    /// Drive a single caller-supplied sequence as the entire session.
    ///
    /// `total_steps` declares how many times the sequence will advance the
    /// step counter itself. The registered queue is not touched and stays
    /// usable for a later session; no step reconciliation and no loaded
    /// hooks apply in this mode.
    pub fn run_sequence_now(
        &mut self,
        sequence: impl Sequence + Send + 'static,
        on_complete: impl FnOnce() + Send + 'static,
        total_steps: u32,
    ) -> Result<(), SchedulerError> {
        self.guard_idle("run_sequence_now")?;

        let task = RegisteredTask {
            loader: Box::new(SequenceLoader::new(Box::new(sequence))),
            additional_steps: total_steps,
        };

        self.begin_session(
            Session::new(SessionKind::Raw, vec![task], Box::new(on_complete)),
            total_steps + BOOKKEEPING_STEPS,
        );
        Ok(())
    }

    /// Pause the session in progress. Takes effect at the next yield
    /// boundary; the step being executed is never preempted.
    pub fn pause(&mut self) -> Result<(), SchedulerError> {
        self.guard_state("pause", SessionState::Running)?;
        self.state = SessionState::Paused;
        Ok(())
    }

    /// Resume a paused session at exactly the position it left off.
    pub fn resume(&mut self) -> Result<(), SchedulerError> {
        self.guard_state("resume", SessionState::Paused)?;
        self.state = SessionState::Running;
        Ok(())
    }

    /// Cancel the session in progress: discard all in-flight work and the
    /// pending queue, restore host background behavior, return to `Idle`.
    /// The completion callback never fires.
    pub fn cancel(&mut self) -> Result<(), SchedulerError> {
        if self.state == SessionState::Idle {
            warn!("cancel invoked when not loading; this will be ignored");
            return Err(SchedulerError::InvalidState {
                operation: "cancel",
                state: self.state,
            });
        }

        self.session = None;
        self.registered.clear();
        self.state = SessionState::Idle;
        self.bridge
            .set_runs_in_background(self.original_run_in_background);
        Ok(())
    }

    fn begin_session(&mut self, session: Session, total: u32) {
        self.counters.begin(total);
        self.original_run_in_background = self.bridge.runs_in_background();
        self.bridge.set_runs_in_background(true);
        self.state = SessionState::Running;
        self.session = Some(session);
    }

    fn guard_state(
        &self,
        operation: &'static str,
        expected: SessionState,
    ) -> Result<(), SchedulerError> {
        if self.state != expected {
            warn!("{operation} invoked when not loading; this will be ignored");
            return Err(SchedulerError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }
}

/* ===================== Observation ===================== */

impl Scheduler {
    /// Progress through the current session, from 0 to 1. Reads 0 before the
    /// first session and stays at 1 after a completed one.
    pub fn progress(&self) -> f32 {
        self.counters.fraction()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Host focus change notification. Feeds the yield policy's no-focus
    /// grace budget.
    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }
}
