//! Pipeline builder with validation.

use super::{resolve_order, PipelineDefinition, StepSpec};
use crate::errors::ResolveError;
use crate::steps::StepWork;
use std::sync::Arc;

/// Fluent builder for pipeline definitions.
///
/// Steps keep the order they were added in; that order is what the resolver
/// uses to break ties between independent steps.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    /// The pipeline id.
    id: String,
    /// Human-readable label.
    description: String,
    /// The step specifications, in insertion order.
    steps: Vec<StepSpec>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            steps: Vec::new(),
        }
    }

    /// Sets the pipeline description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a step.
    #[must_use]
    pub fn step(
        mut self,
        id: impl Into<String>,
        description: impl Into<String>,
        dependencies: &[&str],
        work: Arc<dyn StepWork>,
    ) -> Self {
        let spec = StepSpec::new(id, work)
            .with_description(description)
            .with_dependencies(dependencies.iter().copied());
        self.steps.push(spec);
        self
    }

    /// Adds a step that depends on the previously added step, if any.
    #[must_use]
    pub fn then(
        self,
        id: impl Into<String>,
        description: impl Into<String>,
        work: Arc<dyn StepWork>,
    ) -> Self {
        let previous = self.steps.last().map(|s| s.id.clone());
        let mut spec = StepSpec::new(id, work).with_description(description);
        if let Some(previous) = previous {
            spec = spec.with_dependency(previous);
        }
        self.with_step(spec)
    }

    /// Adds a prepared step specification.
    #[must_use]
    pub fn with_step(mut self, spec: StepSpec) -> Self {
        self.steps.push(spec);
        self
    }

    /// Adds a prepared step specification in place.
    pub fn add_step(&mut self, spec: StepSpec) {
        self.steps.push(spec);
    }

    /// Returns the pipeline id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Builds the pipeline after checking that the graph resolves.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] for duplicate ids, unknown dependencies or
    /// cycles.
    pub fn build(self) -> Result<PipelineDefinition, ResolveError> {
        resolve_order(&self.steps)?;
        Ok(self.build_unchecked())
    }

    /// Builds the pipeline without validating the graph.
    ///
    /// The runner still reports an invalid graph as a failed result.
    #[must_use]
    pub fn build_unchecked(self) -> PipelineDefinition {
        PipelineDefinition::new(self.id, self.description, self.steps)
    }
}
