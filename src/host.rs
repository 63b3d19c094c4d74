//! Host bridge.
//!
//! The scheduler needs a handful of signals from whatever is hosting the
//! frame loop: whether the display surface is visible, how much memory is in
//! use on constrained platforms, and a switch to keep the host ticking while
//! it is unfocused. All of it goes through an injectable trait so the core
//! stays free of platform linkage; hosts without a bridge use [`NullBridge`].

pub trait HostBridge {
    /// One-time platform setup. Invoked at most once per process, and only
    /// on constrained platforms outside development contexts.
    fn initialize(&mut self) {}

    /// Whether the host's display surface is currently active/visible.
    /// Polled on every yield decision on constrained platforms.
    fn display_active(&self) -> bool {
        true
    }

    /// Current memory usage in bytes, where the platform can measure it.
    fn memory_in_use(&self) -> u64 {
        0
    }

    /// Whether the host keeps ticking while in the background.
    fn runs_in_background(&self) -> bool {
        true
    }

    /// Override the host's background behavior. The scheduler turns this on
    /// for the duration of a session and restores the captured value when
    /// the session completes or is cancelled.
    fn set_runs_in_background(&mut self, _enabled: bool) {}
}

/// No-op bridge for hosts without platform integration.
pub struct NullBridge;

impl HostBridge for NullBridge {}
