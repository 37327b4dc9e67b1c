//! Definition checks and scheduling, done before anything executes.

use crate::error::Result;
use crate::graph::{build_graph, schedule, ExecutionGraph, ExecutionOrder};
use crate::spec::{validate, RunSettings, SpecFile};

/// A validated spec with its graph and execution order.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Typed settings; callers may apply overrides before running.
    pub settings: RunSettings,
    pub graph: ExecutionGraph,
    pub order: ExecutionOrder,
}

impl RunPlan {
    /// Validate the spec, build its graph and schedule it.
    ///
    /// # Errors
    ///
    /// Returns the first definition error found.
    pub fn prepare(spec: &SpecFile) -> Result<Self> {
        let settings = validate(spec)?;
        let graph = build_graph(&spec.prompts, &spec.flow)?;
        let order = schedule(&graph)?;

        Ok(Self {
            settings,
            graph,
            order,
        })
    }

    /// Declared dependencies of a step.
    pub fn dependencies_of(&self, step: &str) -> &[String] {
        self.graph.dependencies_of(step)
    }
}
