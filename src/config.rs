#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::TimeDelta;

/// Platform identity excluded by default: the account that seeds classroom
/// repositories from their template.
pub const DEFAULT_PLATFORM_AUTHOR: &str = "github-classroom[bot]";

/// Grading configuration shared across the crate, read from the environment.
#[derive(Debug, Clone)]
pub struct ConfigState {
    /// Lateness after which a late submission keeps no credit.
    penalty_window:     TimeDelta,
    /// Automated identities whose leading commits are ignored.
    platform_authors:   Vec<String>,
    /// Number of submissions graded at once in a batch.
    batch_concurrency:  usize,
    /// Time limit for one invocation of submitted code.
    invocation_timeout: Duration,
}

impl ConfigState {
    /// Construct a new configuration instance by reading the environment.
    fn new() -> Result<Self> {
        let window_secs = read_u64("GRADEBOOK_PENALTY_WINDOW_SECS", 300)?;
        let penalty_window = TimeDelta::try_seconds(i64::try_from(window_secs)?)
            .context("GRADEBOOK_PENALTY_WINDOW_SECS is out of range")?;

        let platform_authors = std::env::var("GRADEBOOK_PLATFORM_AUTHORS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_else(|_| vec![DEFAULT_PLATFORM_AUTHOR.to_string()]);

        let batch_concurrency = usize::try_from(read_u64("GRADEBOOK_BATCH_CONCURRENCY", 4)?)?;
        anyhow::ensure!(batch_concurrency > 0, "GRADEBOOK_BATCH_CONCURRENCY must be positive");

        let invocation_timeout =
            Duration::from_secs(read_u64("GRADEBOOK_INVOCATION_TIMEOUT_SECS", 60)?);

        Ok(Self {
            penalty_window,
            platform_authors,
            batch_concurrency,
            invocation_timeout,
        })
    }

    /// Returns the lateness after which no credit is left.
    pub fn penalty_window(&self) -> TimeDelta {
        self.penalty_window
    }

    /// Returns the automated identities whose leading commits are ignored.
    pub fn platform_authors(&self) -> &[String] {
        &self.platform_authors
    }

    /// Returns how many submissions a batch grades at once.
    pub fn batch_concurrency(&self) -> usize {
        self.batch_concurrency
    }

    /// Returns the time limit for one invocation of submitted code.
    pub fn invocation_timeout(&self) -> Duration {
        self.invocation_timeout
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone, Debug)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Ensure the global configuration has been initialized and return a handle.
pub fn ensure_initialized() -> Result<ConfigHandle> {
    let slot = slot();
    let mut guard = slot.lock().expect("config slot poisoned");
    if let Some(cfg) = guard.as_ref() {
        return Ok(ConfigHandle(Arc::clone(cfg)));
    }

    let cfg = Arc::new(ConfigState::new()?);
    *guard = Some(Arc::clone(&cfg));
    Ok(ConfigHandle(cfg))
}

/// Parses an environment variable as an unsigned integer, falling back to
/// `default` when it is missing. A present but malformed value is an error.
fn read_u64(env: &str, default: u64) -> Result<u64> {
    match std::env::var(env) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{env} must be an unsigned integer, got `{value}`")),
        Err(_) => Ok(default),
    }
}
