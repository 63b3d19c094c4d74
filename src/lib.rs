//! Frameload - a cooperative, frame-budgeted load scheduler.
//!
//! Many independent units of work, each expressed as a resumable sequence of
//! steps, are driven to completion inside a host render loop. The scheduler
//! runs as many micro-steps as the per-frame time budget allows, then hands
//! control back to the host so the application keeps rendering smoothly.

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod instance;
pub mod policy;
pub mod progress;
pub mod scheduler;
pub mod task;

// Re-export main types
pub use config::{Config, Platform};
pub use error::SchedulerError;
pub use host::{HostBridge, NullBridge};
pub use progress::StepContext;
pub use scheduler::{OnComplete, Scheduler, SessionState};
pub use task::{from_fn, Flow, Loader, LoaderCollection, Sequence};
