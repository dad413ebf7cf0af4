//! Step and pipeline definitions.

use super::resolver::resolve_order;
use crate::errors::ResolveError;
use crate::steps::StepWork;
use std::fmt;
use std::sync::Arc;

/// Descriptor for a single step in a pipeline.
///
/// Immutable once handed to a pipeline; cloning is cheap because the work is
/// shared behind an `Arc`.
#[derive(Clone)]
pub struct StepSpec {
    /// Unique id of the step within its pipeline.
    pub id: String,
    /// Human-readable label. Not interpreted by the engine.
    pub description: String,
    /// Ids of steps that must succeed before this one runs, without repeats.
    pub depends_on: Vec<String>,
    /// The step implementation.
    pub work: Arc<dyn StepWork>,
}

impl StepSpec {
    /// Creates a new step with no dependencies.
    #[must_use]
    pub fn new(id: impl Into<String>, work: Arc<dyn StepWork>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            depends_on: Vec::new(),
            work,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replaces the dependencies.
    #[must_use]
    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.depends_on.clear();
        for dep in deps {
            self = self.with_dependency(dep);
        }
        self
    }

    /// Adds a dependency. Repeated ids are ignored.
    #[must_use]
    pub fn with_dependency(mut self, dep: impl Into<String>) -> Self {
        let dep = dep.into();
        if !self.depends_on.contains(&dep) {
            self.depends_on.push(dep);
        }
        self
    }
}

impl fmt::Debug for StepSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepSpec")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

/// An identified collection of steps plus their dependency wiring.
#[derive(Debug, Clone)]
pub struct PipelineDefinition {
    /// The pipeline id.
    pub id: String,
    /// Human-readable label.
    pub description: String,
    /// The steps, in caller order.
    pub steps: Vec<StepSpec>,
}

impl PipelineDefinition {
    /// Creates a new pipeline definition. The graph is not validated here.
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>, steps: Vec<StepSpec>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            steps,
        }
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Looks up a step by id.
    #[must_use]
    pub fn step(&self, id: &str) -> Option<&StepSpec> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Resolves the execution order of the steps.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] for duplicate ids, unknown references or
    /// cycles.
    pub fn execution_order(&self) -> Result<Vec<String>, ResolveError> {
        Ok(resolve_order(&self.steps)?
            .into_iter()
            .map(|s| s.id.clone())
            .collect())
    }
}
