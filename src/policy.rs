//! The yield decision.
//!
//! After every micro-step the drive loop asks whether the current frame slice
//! must end. The answer depends on elapsed time, the host platform, and
//! focus/visibility state; the function itself is pure, which keeps every
//! branch unit-testable without a frame loop.

use std::time::Duration;

use tracing::debug;

use crate::config::{Config, Platform};
use crate::host::HostBridge;

/// How long an unfocused native host may run before yielding. Longer than
/// any sane per-frame budget: with nobody watching there is no frame to
/// protect, but the process must stay responsive to being refocused.
pub(crate) const NO_FOCUS_FRAME_BUDGET: Duration = Duration::from_secs(1);

/// Decide whether the drive loop must yield back to the host.
pub(crate) fn should_yield(
    config: &Config,
    bridge: &dyn HostBridge,
    has_focus: bool,
    elapsed: Duration,
) -> bool {
    match config.platform {
        Platform::Constrained => {
            if !config.development {
                // Memory pressure wins over throughput: yielding gives the
                // host a chance to collect before the sandbox stalls.
                if bridge.memory_in_use() > config.memory_yield_threshold {
                    debug!("yielding due to memory pressure");
                    return true;
                }

                // No visible surface means no frame to protect.
                if !bridge.display_active() {
                    return false;
                }
            }
        }
        Platform::Native => {
            if !config.development && !has_focus {
                // Unfocused: go nuts, but surface occasionally.
                return elapsed >= NO_FOCUS_FRAME_BUDGET;
            }
        }
    }

    elapsed >= config.frame_budget()
}
