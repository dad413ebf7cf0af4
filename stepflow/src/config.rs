//! Engine configuration.
//!
//! Loaded from a JSON file, from `STEPFLOW_*` environment variables, or
//! built in code; every field has a default.

use crate::errors::StepflowError;
use crate::events::TracingLogSink;
use crate::pipeline::RunOptions;
use crate::pool::{WorkPool, DEFAULT_HARD_CAP};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Environment variable for the requested concurrency.
pub const ENV_CONCURRENCY: &str = "STEPFLOW_CONCURRENCY";
/// Environment variable for the concurrency hard cap.
pub const ENV_HARD_CAP: &str = "STEPFLOW_HARD_CAP";
/// Environment variable enabling dry-run mode.
pub const ENV_DRY_RUN: &str = "STEPFLOW_DRY_RUN";
/// Environment variable enabling verbose progress lines.
pub const ENV_VERBOSE: &str = "STEPFLOW_VERBOSE";

/// Settings shared by the runner and the work-pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Requested number of pipelines run at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Ceiling applied to `concurrency`.
    #[serde(default = "default_hard_cap")]
    pub hard_cap: usize,
    /// Resolve and report without invoking work.
    #[serde(default)]
    pub dry_run: bool,
    /// Emit detailed progress lines.
    #[serde(default)]
    pub verbose: bool,
}

const fn default_concurrency() -> usize {
    1
}

const fn default_hard_cap() -> usize {
    DEFAULT_HARD_CAP
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            hard_cap: default_hard_cap(),
            dry_run: false,
            verbose: false,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested concurrency.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the hard cap.
    #[must_use]
    pub const fn with_hard_cap(mut self, hard_cap: usize) -> Self {
        self.hard_cap = hard_cap;
        self
    }

    /// Sets dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets verbose mode.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Reads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StepflowError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self, StepflowError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Defaults overridden by any `STEPFLOW_*` variables that are set.
    pub fn from_env() -> Result<Self, StepflowError> {
        Self::default().with_env_overrides()
    }

    /// Applies any `STEPFLOW_*` variables that are set on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, StepflowError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, StepflowError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_CONCURRENCY) {
            self.concurrency = parse_var(ENV_CONCURRENCY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_HARD_CAP) {
            self.hard_cap = parse_var(ENV_HARD_CAP, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DRY_RUN) {
            self.dry_run = parse_flag(ENV_DRY_RUN, &raw)?;
        }
        if let Some(raw) = lookup(ENV_VERBOSE) {
            self.verbose = parse_flag(ENV_VERBOSE, &raw)?;
        }
        Ok(self)
    }

    /// Runner options for this configuration, logging progress through
    /// `tracing`.
    #[must_use]
    pub fn run_options(&self) -> RunOptions {
        RunOptions::new()
            .with_dry_run(self.dry_run)
            .with_verbose(self.verbose)
            .with_logger(Arc::new(TracingLogSink::default()))
    }

    /// Work-pool for this configuration.
    #[must_use]
    pub const fn work_pool(&self) -> WorkPool {
        WorkPool::new(self.concurrency).with_hard_cap(self.hard_cap)
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T, StepflowError> {
    raw.trim()
        .parse()
        .map_err(|_| StepflowError::Config(format!("{name}: invalid value '{raw}'")))
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, StepflowError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(StepflowError::Config(format!(
            "{name}: expected a boolean, got '{raw}'"
        ))),
    }
}
