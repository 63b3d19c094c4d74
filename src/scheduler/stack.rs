//! The execution stack.
//!
//! Driving one task means driving its root sequence plus any sequences it
//! yields, depth-first: a yielded sequence is pushed on top and must exhaust
//! before the entry below resumes. The stack is seeded with the root entry
//! when a task begins and is never empty while the task is in flight; popping
//! the last entry means the task is complete.

use crate::progress::StepContext;
use crate::task::{Flow, Loader, Sequence};

enum Entry {
    /// The task's own sequence, owned by the session's task list.
    Root,
    /// A sequence yielded mid-drive, owned by the stack.
    Nested(Box<dyn Sequence + Send>),
}

pub(crate) struct ExecutionStack {
    entries: Vec<Entry>,
}

impl ExecutionStack {
    /// A stack seeded with the root entry of a task about to be driven.
    pub(crate) fn seeded() -> Self {
        Self {
            entries: vec![Entry::Root],
        }
    }

    /// Advance the top of the stack by one micro-step.
    pub(crate) fn resume_top(
        &mut self,
        root: &mut (dyn Loader + Send),
        cx: &mut StepContext<'_>,
    ) -> Flow {
        match self.entries.last_mut() {
            Some(Entry::Root) => root.resume(cx),
            Some(Entry::Nested(sequence)) => sequence.resume(cx),
            // The drive loop seeds the stack and stops at the final pop.
            None => panic!("execution stack drained mid-task"),
        }
    }

    /// Push a nested sequence; it becomes the new drive target.
    pub(crate) fn push(&mut self, sequence: Box<dyn Sequence + Send>) {
        self.entries.push(Entry::Nested(sequence));
    }

    /// Pop the exhausted top entry. Returns true when the stack is now empty,
    /// i.e. the task has completed.
    pub(crate) fn pop(&mut self) -> bool {
        self.entries.pop();
        self.entries.is_empty()
    }
}
