//! Demo CLI.
//!
//! Drives synthetic load sessions from the command line so the scheduler's
//! frame-slicing behavior can be observed without embedding it in a real
//! render loop. Each "frame" of the demo loop prints the progress readout the
//! way a loading screen would render it.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::progress::StepContext;
use crate::scheduler::Scheduler;
use crate::task::{Flow, Loader, Sequence};

#[derive(Parser)]
#[command(name = "frameload")]
#[command(about = "Frameload - a cooperative, frame-budgeted load scheduler", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Per-frame budget in milliseconds (overrides config file and env vars)
    #[arg(long, global = true)]
    pub budget_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a session of synthetic registered loaders
    Run {
        /// Number of loaders to register
        #[arg(short = 'n', long = "tasks", default_value = "8")]
        tasks: u32,

        /// Steps each loader performs (and declares)
        #[arg(short = 's', long = "steps", default_value = "20")]
        steps: u32,

        /// Microseconds of simulated work per step
        #[arg(long, default_value = "500")]
        work_us: u64,
    },

    /// Drive a single raw sequence with a caller-declared step total
    Sequence {
        /// Steps the sequence performs
        #[arg(short = 's', long = "steps", default_value = "50")]
        steps: u32,

        /// Microseconds of simulated work per step
        #[arg(long, default_value = "500")]
        work_us: u64,
    },
}

/// A loader that spins for a fixed amount of time per step.
struct SyntheticLoader {
    name: String,
    remaining: u32,
    work_per_step: Duration,
}

impl Sequence for SyntheticLoader {
    fn resume(&mut self, cx: &mut StepContext<'_>) -> Flow {
        if self.remaining == 0 {
            return Flow::Done;
        }

        spin_for(self.work_per_step);
        cx.advance_step();
        self.remaining -= 1;
        Flow::Continue
    }
}

impl Loader for SyntheticLoader {
    fn loaded(&mut self) {
        tracing::debug!(loader = %self.name, "loaded hook");
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn spin_for(duration: Duration) {
    let until = Instant::now() + duration;
    while Instant::now() < until {
        std::hint::spin_loop();
    }
}

pub fn run_cli() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        std::env::set_var("FRAMELOAD_CONFIG_PATH", path);
    }

    let mut config = Config::load().context("Failed to load configuration")?;

    if let Some(budget_ms) = cli.budget_ms {
        config.seconds_per_frame = budget_ms as f32 / 1000.0;
    }

    match cli.command {
        Commands::Run {
            tasks,
            steps,
            work_us,
        } => {
            let mut scheduler = Scheduler::new(config);

            for i in 0..tasks {
                scheduler.register(
                    SyntheticLoader {
                        name: format!("synthetic-{i}"),
                        remaining: steps,
                        work_per_step: Duration::from_micros(work_us),
                    },
                    steps,
                )?;
            }

            scheduler.start(|| println!("\nload complete"))?;
            drive_frame_loop(&mut scheduler);
        }

        Commands::Sequence { steps, work_us } => {
            let mut scheduler = Scheduler::new(config);
            let work_per_step = Duration::from_micros(work_us);
            let mut remaining = steps;

            scheduler.run_sequence_now(
                crate::task::from_fn(move |cx| {
                    if remaining == 0 {
                        return Flow::Done;
                    }
                    spin_for(work_per_step);
                    cx.advance_step();
                    remaining -= 1;
                    Flow::Continue
                }),
                || println!("\nsequence complete"),
                steps,
            )?;
            drive_frame_loop(&mut scheduler);
        }
    }

    Ok(())
}

/// A stand-in render loop: tick, draw the progress bar, repeat.
fn drive_frame_loop(scheduler: &mut Scheduler) {
    use std::io::Write as _;

    let mut frames = 0u64;

    loop {
        let completed = scheduler.tick();
        frames += 1;
        print!(
            "\rprogress: {:>5.1}%  (frame {frames})",
            scheduler.progress() * 100.0
        );
        std::io::stdout().flush().ok();

        if let Some(on_complete) = completed {
            on_complete();
            break;
        }
    }
}
