//! Suspendable units of work.
//!
//! A loadable unit is an explicit state machine rather than a generator: each
//! call to [`Sequence::resume`] performs one uninterruptible micro-step and
//! reports what happened through [`Flow`]. The drive loop decides after every
//! micro-step whether the frame slice has run out of budget.

use crate::progress::StepContext;

/* ===================== Flow ===================== */

/// What one micro-step of a sequence produced.
pub enum Flow {
    /// The step completed; more work remains. A frame break here is
    /// acceptable if the budget has run out.
    Continue,

    /// End the current frame slice immediately, regardless of how much time
    /// budget remains.
    ForceYield,

    /// Drive the yielded sequence to exhaustion before resuming this one.
    Nested(Box<dyn Sequence + Send>),

    /// No more work; the sequence is exhausted.
    Done,
}

/* ===================== Sequence & Loader ===================== */

/// A resumable sequence of steps.
///
/// `resume` is called repeatedly by the drive loop; between calls the
/// sequence must remember its own position. Runs on whichever thread owns
/// the scheduler, never concurrently with itself.
pub trait Sequence {
    fn resume(&mut self, cx: &mut StepContext<'_>) -> Flow;
}

/// A registrable unit of load work.
///
/// Beyond its step sequence, a loader gets a [`loaded`](Loader::loaded) hook
/// invoked once after every registered loader's sequence has exhausted, in
/// registration order.
pub trait Loader: Sequence {
    /// Called once all registered loaders have finished their sequences.
    fn loaded(&mut self) {}

    /// Identifier used in verbose timing logs.
    fn name(&self) -> &str {
        "loader"
    }
}

/// A collaborator-defined group of loaders that can be registered as a batch.
///
/// Implementors walk whatever object graph they own and hand each
/// task-capable member to `visit`.
pub trait LoaderCollection {
    fn visit_loaders(&mut self, visit: &mut dyn FnMut(Box<dyn Loader + Send>));
}

/* ===================== Adapters ===================== */

/// Sequence built from a closure. Handy for small inline sequences in demos
/// and tests.
pub struct FnSequence<F> {
    step: F,
}

impl<F> Sequence for FnSequence<F>
where
    F: FnMut(&mut StepContext<'_>) -> Flow,
{
    fn resume(&mut self, cx: &mut StepContext<'_>) -> Flow {
        (self.step)(cx)
    }
}

/// Build a sequence from a closure invoked once per micro-step.
pub fn from_fn<F>(step: F) -> FnSequence<F>
where
    F: FnMut(&mut StepContext<'_>) -> Flow,
{
    FnSequence { step }
}

/// Wraps a bare sequence as a loader with a no-op `loaded` hook. Used when a
/// caller registers a raw sequence rather than a full loader.
pub(crate) struct SequenceLoader {
    sequence: Box<dyn Sequence + Send>,
}

impl SequenceLoader {
    pub(crate) fn new(sequence: Box<dyn Sequence + Send>) -> Self {
        Self { sequence }
    }
}

impl Sequence for SequenceLoader {
    fn resume(&mut self, cx: &mut StepContext<'_>) -> Flow {
        self.sequence.resume(cx)
    }
}

impl Loader for SequenceLoader {
    fn name(&self) -> &str {
        "sequence"
    }
}
