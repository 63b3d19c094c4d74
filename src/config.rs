//! Scheduler configuration.
//!
//! Values can come from three layers, later layers winning: built-in defaults,
//! an optional `frameload.toml` file (path overridable with
//! `FRAMELOAD_CONFIG_PATH`), and `FRAMELOAD_*` environment variables.

use std::time::Duration;

use serde::Deserialize;

/// Default per-frame execution budget, in seconds. Tuned for a 30 fps host.
const DEFAULT_SECONDS_PER_FRAME: f32 = 1.0 / 30.0;

/// Default memory ceiling before a constrained host is forced to yield.
const DEFAULT_MEMORY_YIELD_THRESHOLD: u64 = 128_000_000;

/// The kind of host the scheduler is running inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// A regular desktop/server process.
    #[default]
    Native,
    /// A sandboxed host with tight memory limits (e.g. a browser build).
    Constrained,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The amount of time the drive loop may execute before yielding to a
    /// new frame.
    pub seconds_per_frame: f32,

    /// Memory usage (in bytes) a constrained host may reach before the drive
    /// loop is forced to yield, regardless of the time budget.
    pub memory_yield_threshold: u64,

    /// Print the timing of each loaded unit.
    pub verbose_logging: bool,

    /// What kind of host this process is.
    pub platform: Platform,

    /// Development/editor context. Bypasses the constrained-host and
    /// no-focus special cases so interactive work is never throttled.
    pub development: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seconds_per_frame: DEFAULT_SECONDS_PER_FRAME,
            memory_yield_threshold: DEFAULT_MEMORY_YIELD_THRESHOLD,
            verbose_logging: false,
            platform: Platform::Native,
            development: false,
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional config file, and
    /// environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path = std::env::var("FRAMELOAD_CONFIG_PATH")
            .unwrap_or_else(|_| "frameload.toml".to_string());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(config::Environment::with_prefix("FRAMELOAD"))
            .build()?;

        let mut loaded: Config = settings.try_deserialize()?;

        if !loaded.seconds_per_frame.is_finite() || loaded.seconds_per_frame < 0.0 {
            loaded.seconds_per_frame = DEFAULT_SECONDS_PER_FRAME;
        }

        Ok(loaded)
    }

    /// The per-frame budget as a [`Duration`].
    ///
    /// `seconds_per_frame` is a public field, so a hand-built config may
    /// carry a negative or non-finite value; those are treated as zero and
    /// the default budget respectively rather than panicking mid-frame.
    pub fn frame_budget(&self) -> Duration {
        let seconds = if self.seconds_per_frame.is_finite() {
            self.seconds_per_frame.max(0.0)
        } else {
            DEFAULT_SECONDS_PER_FRAME
        };
        Duration::from_secs_f32(seconds)
    }
}
