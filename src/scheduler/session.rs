//! Session state.
//!
//! A session is one full run from `start`/`run_sequence_now` to completion or
//! cancellation. All of its mutable state lives here as an explicit phase
//! machine so the drive loop can stop at any yield boundary and pick up at
//! exactly the same position on the next frame.

use std::time::Instant;

use crate::scheduler::stack::ExecutionStack;
use crate::scheduler::{OnComplete, RegisteredTask};

/// How the session was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionKind {
    /// `start`: drive the registered queue, reconcile each task's step
    /// reporting, then run the loaded hooks.
    Registered,
    /// `run_sequence_now`: drive a single caller-supplied sequence with a
    /// caller-declared step total. No reconciliation, no loaded hooks.
    Raw,
}

/// Where the drive loop currently is within the session.
pub(crate) enum Phase {
    /// Account for the setup step, then move to driving.
    Setup,
    /// Driving task `index` through its execution stack.
    Drive {
        index: usize,
        stack: ExecutionStack,
        /// `current` as it was when this task began, for reconciliation.
        pre_task_step: u32,
        started: Instant,
    },
    /// Invoking loaded hooks in registration order.
    Loaded { index: usize },
    /// Account for the completion step and finish.
    Finish,
}

pub(crate) struct Session {
    pub(crate) kind: SessionKind,
    pub(crate) tasks: Vec<RegisteredTask>,
    pub(crate) phase: Phase,
    pub(crate) on_complete: Option<OnComplete>,
    pub(crate) started: Instant,
}

impl Session {
    pub(crate) fn new(kind: SessionKind, tasks: Vec<RegisteredTask>, on_complete: OnComplete) -> Self {
        Self {
            kind,
            tasks,
            phase: Phase::Setup,
            on_complete: Some(on_complete),
            started: Instant::now(),
        }
    }

    /// Phase entry for driving the task at `index`, with a freshly seeded
    /// stack.
    pub(crate) fn drive_phase(index: usize, current_step: u32) -> Phase {
        Phase::Drive {
            index,
            stack: ExecutionStack::seeded(),
            pre_task_step: current_step,
            started: Instant::now(),
        }
    }
}
