//! Global scheduler instance.
//!
//! Most embeddings should own a [`Scheduler`] directly, next to whatever owns
//! the frame loop. For hosts that want the original singleton ergonomics this
//! module offers a controlled accessor: at most one instance per process,
//! created explicitly, with loud failures instead of silent defaults.
//!
//! Calling this module multiple times is safe - a second `create` is rejected
//! and the existing instance is unaffected.

use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::error;

use crate::config::Config;
use crate::error::SchedulerError;
use crate::host::HostBridge;
use crate::scheduler::Scheduler;

static INSTANCE: OnceLock<Mutex<Scheduler>> = OnceLock::new();

/// Create the process-wide scheduler instance.
///
/// Rejected (logged as an error, the existing instance unaffected) if an
/// instance already exists.
pub fn create(
    config: Config,
    bridge: Box<dyn HostBridge + Send>,
) -> Result<(), SchedulerError> {
    let mut installed = false;
    INSTANCE.get_or_init(|| {
        installed = true;
        Mutex::new(Scheduler::with_bridge(config, bridge))
    });

    if !installed {
        error!("a scheduler instance already exists; this create call is ignored");
        return Err(SchedulerError::DuplicateInstance);
    }

    Ok(())
}

/// Run a closure against the global scheduler.
///
/// Fails (logged as an error) when no instance has been created. Must not be
/// called from inside a completion callback fired by [`tick`]; use the
/// scheduler handle the callback already runs under instead - `tick` releases
/// the lock before invoking the callback precisely so follow-up sessions can
/// be started from it.
pub fn with<R>(f: impl FnOnce(&mut Scheduler) -> R) -> Result<R, SchedulerError> {
    let Some(slot) = INSTANCE.get() else {
        error!("no scheduler instance can be found; call instance::create first");
        return Err(SchedulerError::MissingInstance);
    };

    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(f(&mut guard))
}

/// Drive the global scheduler for one frame slice.
///
/// The lock is released before the completion callback is invoked, so the
/// callback may register loaders and start the next session through this
/// module (the multi-phase load pattern).
pub fn tick() -> Result<(), SchedulerError> {
    let on_complete = with(|scheduler| scheduler.tick())?;

    if let Some(on_complete) = on_complete {
        on_complete();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::host::NullBridge;
    use crate::scheduler::SessionState;
    use crate::task::{from_fn, Flow};

    fn stepper(steps: u32) -> impl crate::task::Sequence + Send {
        let mut remaining = steps;
        from_fn(move |cx| {
            if remaining == 0 {
                return Flow::Done;
            }
            remaining -= 1;
            cx.advance_step();
            Flow::Continue
        })
    }

    // One test function: the global slot is process-wide, so ordering between
    // separate #[test]s cannot be relied on.
    #[test]
    fn global_instance_lifecycle() {
        // Access before creation fails loudly.
        assert!(matches!(
            with(|_| ()),
            Err(SchedulerError::MissingInstance)
        ));

        let config = Config {
            seconds_per_frame: 100.0,
            ..Config::default()
        };
        create(config.clone(), Box::new(NullBridge)).unwrap();

        // A second instance is rejected; the first is unaffected.
        assert!(matches!(
            create(config, Box::new(NullBridge)),
            Err(SchedulerError::DuplicateInstance)
        ));

        // Two chained sessions: the first phase's completion callback starts
        // the second through this module, the way a multi-phase load does.
        let phases = Arc::new(AtomicU32::new(0));

        let phases_second = phases.clone();
        let second_phase = move || {
            phases_second.fetch_add(1, Ordering::SeqCst);
        };

        let phases_first = phases.clone();
        let first_phase = move || {
            phases_first.fetch_add(1, Ordering::SeqCst);
            with(|scheduler| {
                scheduler.register_sequence(stepper(2), 2).unwrap();
                scheduler.start(second_phase).unwrap();
            })
            .unwrap();
        };

        with(|scheduler| {
            scheduler
                .run_sequence_now(stepper(3), first_phase, 3)
                .unwrap();
        })
        .unwrap();

        for _ in 0..100 {
            tick().unwrap();
            if phases.load(Ordering::SeqCst) == 2 {
                break;
            }
        }

        assert_eq!(phases.load(Ordering::SeqCst), 2);
        with(|scheduler| {
            assert_eq!(scheduler.state(), SessionState::Idle);
            assert_eq!(scheduler.progress(), 1.0);
        })
        .unwrap();
    }
}
