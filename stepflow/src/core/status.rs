//! Step and pipeline status enums.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The terminal status of a single step.
///
/// The engine only interprets `succeeded`, `failed` and `skipped`. Any other
/// string a step reports is carried through verbatim as [`StepStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum StepStatus {
    /// The step ran and succeeded.
    #[default]
    Succeeded,
    /// The step ran and failed, or its work function raised an error.
    Failed,
    /// The step did not run, or chose to report itself as skipped.
    Skipped,
    /// A custom terminal state reported by the step.
    Other(String),
}

impl StepStatus {
    /// Returns the wire string for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Other(s) => s,
        }
    }

    /// Returns true if dependents of a step with this status may run.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns true if this status fails the pipeline.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl From<&str> for StepStatus {
    fn from(s: &str) -> Self {
        match s {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "skipped" => Self::Skipped,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for StepStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "succeeded" | "failed" | "skipped" => Self::from(s.as_str()),
            _ => Self::Other(s),
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StepStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StepStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// The aggregate status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// No step failed.
    #[default]
    Succeeded,
    /// At least one step failed, or the graph was invalid.
    Failed,
}

impl PipelineStatus {
    /// Returns true if the run succeeded.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
