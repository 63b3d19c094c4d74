//! The per-frame drive loop.
//!
//! The host calls [`Scheduler::tick`] once per frame. The loop advances the
//! session's phase machine one micro-step at a time, consulting the yield
//! policy after every step; when the policy (or a force-yield) ends the
//! slice, the phase machine stays exactly where it is and the next tick
//! resumes from the same position.

use std::mem;
use std::time::Instant;

use tracing::{info, warn};

use crate::policy::should_yield;
use crate::progress::StepContext;
use crate::scheduler::session::{Phase, Session, SessionKind};
use crate::scheduler::{OnComplete, Scheduler, SessionState};
use crate::task::Flow;

/// What a frame slice ended with.
enum Slice {
    /// Budget spent or force-yield; the session continues next frame.
    Suspended,
    /// Every phase has run; the session is done.
    Completed,
}

impl Scheduler {
    /// Drive the current session for one frame slice.
    ///
    /// Returns the completion callback when this tick finished the session.
    /// The scheduler is already back in `Idle` at that point, so the callback
    /// is free to register loaders and start a follow-up session before the
    /// caller invokes it. While `Paused` the tick performs no work; while
    /// `Idle` it is a no-op.
    #[must_use]
    pub fn tick(&mut self) -> Option<OnComplete> {
        if self.state != SessionState::Running {
            return None;
        }

        let frame_start = Instant::now();
        let mut session = self.session.take()?;

        match self.drive_slice(&mut session, frame_start) {
            Slice::Suspended => {
                self.session = Some(session);
                None
            }
            Slice::Completed => {
                if self.config.verbose_logging {
                    info!(elapsed = ?session.started.elapsed(), "load session complete");
                }
                self.state = SessionState::Idle;
                self.bridge
                    .set_runs_in_background(self.original_run_in_background);
                session.on_complete.take()
            }
        }
    }

    fn drive_slice(&mut self, session: &mut Session, frame_start: Instant) -> Slice {
        loop {
            match mem::replace(&mut session.phase, Phase::Finish) {
                Phase::Setup => {
                    self.counters.advance();
                    if self.config.verbose_logging {
                        info!(elapsed = ?session.started.elapsed(), "setup");
                    }
                    session.phase = Session::drive_phase(0, self.counters.current());
                    if self.must_yield(frame_start) {
                        return Slice::Suspended;
                    }
                }

                Phase::Drive {
                    index,
                    mut stack,
                    pre_task_step,
                    started,
                } => {
                    if index >= session.tasks.len() {
                        session.phase = match session.kind {
                            SessionKind::Registered => Phase::Loaded { index: 0 },
                            SessionKind::Raw => Phase::Finish,
                        };
                        continue;
                    }

                    let task = &mut session.tasks[index];
                    let flow = {
                        let mut cx = StepContext::new(&mut self.counters);
                        stack.resume_top(task.loader.as_mut(), &mut cx)
                    };

                    let mut force_yield = false;
                    let mut task_complete = false;

                    match flow {
                        Flow::Continue => {}
                        Flow::ForceYield => force_yield = true,
                        Flow::Nested(sequence) => stack.push(sequence),
                        Flow::Done => task_complete = stack.pop(),
                    }

                    if task_complete {
                        if session.kind == SessionKind::Registered {
                            let observed = self.counters.current() - pre_task_step;
                            if observed != task.additional_steps {
                                warn!(
                                    loader = task.loader.name(),
                                    declared = task.additional_steps,
                                    observed,
                                    "progress step count mismatch; expecting advance_step \
                                     to be invoked the same number of times supplied during \
                                     registration; fixing"
                                );
                                self.counters
                                    .set_current(pre_task_step + task.additional_steps);
                            }
                            // The task's own done step.
                            self.counters.advance();
                        }
                        if self.config.verbose_logging {
                            info!(
                                loader = task.loader.name(),
                                elapsed = ?started.elapsed(),
                                "loading"
                            );
                        }
                        session.phase =
                            Session::drive_phase(index + 1, self.counters.current());
                    } else {
                        session.phase = Phase::Drive {
                            index,
                            stack,
                            pre_task_step,
                            started,
                        };
                    }

                    if force_yield || self.must_yield(frame_start) {
                        return Slice::Suspended;
                    }
                }

                Phase::Loaded { index } => {
                    if index >= session.tasks.len() {
                        session.phase = Phase::Finish;
                        continue;
                    }

                    let hook_started = Instant::now();
                    let task = &mut session.tasks[index];
                    task.loader.loaded();
                    if self.config.verbose_logging {
                        info!(
                            loader = task.loader.name(),
                            elapsed = ?hook_started.elapsed(),
                            "loaded"
                        );
                    }

                    session.phase = Phase::Loaded { index: index + 1 };
                    if self.must_yield(frame_start) {
                        return Slice::Suspended;
                    }
                }

                Phase::Finish => {
                    self.counters.advance();
                    return Slice::Completed;
                }
            }
        }
    }

    fn must_yield(&self, frame_start: Instant) -> bool {
        should_yield(
            &self.config,
            self.bridge.as_ref(),
            self.has_focus,
            frame_start.elapsed(),
        )
    }
}
