//! Error types for the load scheduler.
//!
//! None of these abort a session. State errors are recovered: the offending
//! call is logged as a warning and becomes a no-op, mirroring how a misbehaving
//! caller must never corrupt an in-flight load. Step over/under-reporting is
//! not an error at all; it is reconciled silently by the drive loop (with a
//! logged warning) and never surfaces here.

use thiserror::Error;

use crate::scheduler::SessionState;

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A registration or session-control method was called in the wrong
    /// session state. The call was logged and ignored.
    #[error("{operation} invoked while the scheduler is {state:?}; the call was ignored")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// The global scheduler was accessed before one was installed.
    #[error("no scheduler instance has been created; call instance::create first")]
    MissingInstance,

    /// A second global scheduler was attempted while one exists.
    #[error("a scheduler instance already exists; the second create call was ignored")]
    DuplicateInstance,
}
