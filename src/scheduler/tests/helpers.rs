//! Shared test utilities: scripted loaders, frame drivers, and a tracing
//! capture so tests can assert on emitted warnings.

use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::config::Config;
use crate::progress::StepContext;
use crate::scheduler::Scheduler;
use crate::task::{Flow, Loader, Sequence};

/* ===================== Configs ===================== */

/// A budget so large an entire session fits in one frame slice.
pub(crate) fn generous_config() -> Config {
    Config {
        seconds_per_frame: 100.0,
        ..Config::default()
    }
}

/// A zero budget: every micro-step ends the frame slice, giving tests
/// per-step frame control.
pub(crate) fn per_step_config() -> Config {
    Config {
        seconds_per_frame: 0.0,
        ..Config::default()
    }
}

/* ===================== Scripted loader ===================== */

/// Loader that advances the step counter a fixed number of times, one per
/// micro-step, optionally recording its activity into a shared event log.
pub(crate) struct StepLoader {
    name: String,
    advances_remaining: u32,
    events: Option<Arc<Mutex<Vec<String>>>>,
}

impl StepLoader {
    pub(crate) fn new(name: &str, advances: u32) -> Self {
        Self {
            name: name.to_string(),
            advances_remaining: advances,
            events: None,
        }
    }

    pub(crate) fn with_events(
        name: &str,
        advances: u32,
        events: Arc<Mutex<Vec<String>>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            advances_remaining: advances,
            events: Some(events),
        }
    }

    fn record(&self, event: &str) {
        if let Some(events) = &self.events {
            events.lock().unwrap().push(format!("{event}:{}", self.name));
        }
    }
}

impl Sequence for StepLoader {
    fn resume(&mut self, cx: &mut StepContext<'_>) -> Flow {
        if self.advances_remaining == 0 {
            return Flow::Done;
        }

        self.advances_remaining -= 1;
        cx.advance_step();
        self.record("load");
        Flow::Continue
    }
}

impl Loader for StepLoader {
    fn loaded(&mut self) {
        self.record("loaded");
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/* ===================== Frame driver ===================== */

/// Tick until the session completes, firing the completion callback.
/// Returns how many ticks (frames) it took.
pub(crate) fn drive_to_completion(scheduler: &mut Scheduler) -> u32 {
    for ticks in 1..=100_000 {
        if let Some(on_complete) = scheduler.tick() {
            on_complete();
            return ticks;
        }
    }
    panic!("session did not complete within 100000 ticks");
}

/* ===================== Warning capture ===================== */

#[derive(Clone, Default)]
pub(crate) struct CaptureLog {
    buffer: Arc<Mutex<Vec<u8>>>,
}

pub(crate) struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureLog {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buffer: self.buffer.clone(),
        }
    }
}

impl CaptureLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

/// Run `f` with warnings captured; returns its result and the captured log
/// text.
pub(crate) fn with_captured_warnings<R>(f: impl FnOnce() -> R) -> (R, String) {
    let log = CaptureLog::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .without_time()
        .with_writer(log.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, log.contents())
}
