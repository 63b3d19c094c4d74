//! Nested sequences: a yielded sub-sequence is drained depth-first before
//! its parent resumes, to unbounded depth.

use std::sync::{Arc, Mutex};

use super::helpers::{drive_to_completion, generous_config, per_step_config};
use crate::progress::StepContext;
use crate::scheduler::Scheduler;
use crate::task::{Flow, Sequence};

type EventLog = Arc<Mutex<Vec<&'static str>>>;

fn record(events: &EventLog, event: &'static str) {
    events.lock().unwrap().push(event);
}

struct Leaf {
    events: EventLog,
    label: &'static str,
    done: bool,
}

impl Sequence for Leaf {
    fn resume(&mut self, _cx: &mut StepContext<'_>) -> Flow {
        if self.done {
            return Flow::Done;
        }
        self.done = true;
        record(&self.events, self.label);
        Flow::Continue
    }
}

struct Child {
    events: EventLog,
    stage: u32,
}

impl Sequence for Child {
    fn resume(&mut self, _cx: &mut StepContext<'_>) -> Flow {
        self.stage += 1;
        match self.stage {
            1 => {
                record(&self.events, "child:before");
                Flow::Nested(Box::new(Leaf {
                    events: self.events.clone(),
                    label: "grandchild:step",
                    done: false,
                }))
            }
            2 => {
                record(&self.events, "child:after");
                Flow::Continue
            }
            _ => Flow::Done,
        }
    }
}

struct Parent {
    events: EventLog,
    stage: u32,
}

impl Sequence for Parent {
    fn resume(&mut self, _cx: &mut StepContext<'_>) -> Flow {
        self.stage += 1;
        match self.stage {
            1 => {
                record(&self.events, "parent:before");
                Flow::Nested(Box::new(Child {
                    events: self.events.clone(),
                    stage: 0,
                }))
            }
            2 => {
                record(&self.events, "parent:after");
                Flow::Continue
            }
            _ => Flow::Done,
        }
    }
}

fn expected_order() -> Vec<&'static str> {
    vec![
        "parent:before",
        "child:before",
        "grandchild:step",
        "child:after",
        "parent:after",
    ]
}

#[test]
fn nested_sequences_run_depth_first() {
    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut scheduler = Scheduler::new(generous_config());
    scheduler
        .register_sequence(
            Parent {
                events: events.clone(),
                stage: 0,
            },
            0,
        )
        .unwrap();
    scheduler.start(|| {}).unwrap();
    drive_to_completion(&mut scheduler);

    assert_eq!(*events.lock().unwrap(), expected_order());
}

#[test]
fn nesting_order_survives_frame_breaks_at_every_step() {
    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut scheduler = Scheduler::new(per_step_config());
    scheduler
        .register_sequence(
            Parent {
                events: events.clone(),
                stage: 0,
            },
            0,
        )
        .unwrap();
    scheduler.start(|| {}).unwrap();

    // Every micro-step lands in its own frame; the drive order must not
    // change.
    let ticks = drive_to_completion(&mut scheduler);
    assert!(ticks > 5);
    assert_eq!(*events.lock().unwrap(), expected_order());
}
