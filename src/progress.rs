//! Step accounting.
//!
//! Progress through a load session is measured in steps: one per registered
//! task, one per declared additional step, and two bookkeeping steps (setup
//! and completion). The bookkeeping steps keep `progress` from reporting
//! exactly `1.0` until the completion callback is about to fire, and from
//! sitting at `0` once the session has begun driving tasks.

/* ===================== StepCounters ===================== */

/// Current/total step counters for one session.
///
/// `total` is at least 1 at all times, so `fraction` never divides by zero,
/// even before the first session starts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StepCounters {
    current: u32,
    total: u32,
}

impl StepCounters {
    pub(crate) fn new() -> Self {
        Self { current: 0, total: 1 }
    }

    /// Reset the counters for a new session.
    pub(crate) fn begin(&mut self, total: u32) {
        self.current = 0;
        self.total = total.max(1);
    }

    /// Advance the current step by one.
    pub(crate) fn advance(&mut self) {
        self.current += 1;
    }

    pub(crate) fn current(&self) -> u32 {
        self.current
    }

    /// Forcibly set the current step. Used by the drive loop to reconcile a
    /// task that under- or over-reported its own step advances.
    pub(crate) fn set_current(&mut self, current: u32) {
        self.current = current;
    }

    /// Progress in `[0, 1]`.
    pub(crate) fn fraction(&self) -> f32 {
        (self.current as f32 / self.total as f32).clamp(0.0, 1.0)
    }
}

/* ===================== StepContext ===================== */

/// Handle passed to a sequence while it is being resumed.
///
/// This is the only way to advance the step counter, which makes the
/// "only during an active session" rule structural: outside the drive loop
/// no context exists, so no stray advance can skew a progress bar.
pub struct StepContext<'a> {
    counters: &'a mut StepCounters,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(counters: &'a mut StepCounters) -> Self {
        Self { counters }
    }

    /// Increment the progress step counter. By contract, a task calls this
    /// exactly as many times as the `additional_steps` it declared at
    /// registration.
    pub fn advance_step(&mut self) {
        self.counters.advance();
    }

    /// Progress of the session so far, from 0 to 1.
    pub fn progress(&self) -> f32 {
        self.counters.fraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_is_defined_before_any_session() {
        let counters = StepCounters::new();
        assert_eq!(counters.fraction(), 0.0);
    }

    #[test]
    fn begin_guards_against_zero_total() {
        let mut counters = StepCounters::new();
        counters.begin(0);
        assert_eq!(counters.fraction(), 0.0);
        counters.advance();
        assert_eq!(counters.fraction(), 1.0);
    }

    #[test]
    fn fraction_is_clamped_when_a_task_over_reports() {
        let mut counters = StepCounters::new();
        counters.begin(2);
        for _ in 0..5 {
            counters.advance();
        }
        assert_eq!(counters.fraction(), 1.0);
    }

    #[test]
    fn context_advances_the_shared_counter() {
        let mut counters = StepCounters::new();
        counters.begin(4);
        let mut cx = StepContext::new(&mut counters);
        cx.advance_step();
        cx.advance_step();
        assert_eq!(cx.progress(), 0.5);
        assert_eq!(counters.current(), 2);
    }
}
