//! Error types for the stepflow engine.
//!
//! Graph-definition problems are reported as [`ResolveError`]. Failures inside
//! a step never surface here: the runner converts them into step results.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The crate-level error type for fallible, non-run operations.
#[derive(Debug, Error)]
pub enum StepflowError {
    /// The step graph could not be resolved.
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StepflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Metadata about a contract error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "CONTRACT-004-CYCLE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when a list of steps cannot be put into execution order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Two steps share the same id.
    #[error("Duplicate step id '{id}'")]
    DuplicateStep {
        /// The repeated id.
        id: String,
    },

    /// A step depends on an id that is not part of the pipeline.
    #[error("Step '{step}' references unknown step '{dependency}'")]
    UnknownDependency {
        /// The step declaring the dependency.
        step: String,
        /// The id that could not be found.
        dependency: String,
    },

    /// The dependency graph contains at least one cycle.
    #[error("Circular dependency detected among steps: {}", steps.join(", "))]
    CircularDependency {
        /// Steps that could not be ordered, in input order.
        steps: Vec<String>,
    },
}

impl ResolveError {
    /// Returns true for a circular dependency.
    #[must_use]
    pub const fn is_cycle(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// Returns true for a reference to a missing step.
    #[must_use]
    pub const fn is_unknown_dependency(&self) -> bool {
        matches!(self, Self::UnknownDependency { .. })
    }

    /// Returns true for a repeated step id.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateStep { .. })
    }

    /// Returns the stable contract code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateStep { .. } => "CONTRACT-004-DUPLICATE",
            Self::UnknownDependency { .. } => "CONTRACT-004-MISSING_DEP",
            Self::CircularDependency { .. } => "CONTRACT-004-CYCLE",
        }
    }

    /// Builds diagnostic metadata for this error.
    #[must_use]
    pub fn error_info(&self) -> ContractErrorInfo {
        let info = ContractErrorInfo::new(self.code(), self.to_string());
        match self {
            Self::DuplicateStep { id } => info
                .with_fix_hint("Give every step in a pipeline a unique id.")
                .with_context_entry("step", id.clone()),
            Self::UnknownDependency { step, dependency } => info
                .with_fix_hint("Check for typos in dependency ids or add the missing step.")
                .with_context_entry("step", step.clone())
                .with_context_entry("dependency", dependency.clone()),
            Self::CircularDependency { steps } => info
                .with_fix_hint("Remove one of the dependencies in the cycle to break it.")
                .with_context_entry("steps", steps.join(",")),
        }
    }
}
