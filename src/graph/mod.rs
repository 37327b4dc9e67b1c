//! Dependency graph for step execution ordering.
//!
//! [`build_graph`] turns the `prompts` table and the `flow` list into an
//! [`ExecutionGraph`]; [`schedule`] linearizes it.

pub mod schedule;

pub use schedule::{find_cycle, schedule, ExecutionOrder};

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{JitsError, Result};
use crate::spec::{FlowEntry, StepDeclaration};

/// Dependency relationships between declared steps.
///
/// Every declared step is a node, including steps that never appear in
/// `flow`. All orderings follow declaration order.
#[derive(Debug, Clone, Default)]
pub struct ExecutionGraph {
    /// Step ids in declaration order.
    steps: Vec<String>,
    /// Step id to its direct dependencies, in the order they were declared.
    dependencies: HashMap<String, Vec<String>>,
    /// Step id to the steps that depend on it, in edge order.
    dependents: HashMap<String, Vec<String>>,
}

impl ExecutionGraph {
    /// Create a new graph builder.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Direct dependencies of a step, in declared order.
    pub fn dependencies_of(&self, step: &str) -> &[String] {
        self.dependencies.get(step).map_or(&[], Vec::as_slice)
    }

    /// Steps that depend directly on the given step.
    pub fn dependents_of(&self, step: &str) -> &[String] {
        self.dependents.get(step).map_or(&[], Vec::as_slice)
    }

    /// Number of unresolved predecessors of a step before scheduling.
    pub fn in_degree(&self, step: &str) -> usize {
        self.dependencies_of(step).len()
    }

    /// Check if a step exists in the graph.
    pub fn contains(&self, step: &str) -> bool {
        self.dependencies.contains_key(step)
    }

    /// All step ids in declaration order.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Get the number of steps in the graph.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Builder for constructing an [`ExecutionGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    steps: Vec<String>,
    edges: Vec<(String, String)>,
}

impl GraphBuilder {
    /// Declare a step.
    pub fn add_step(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.steps.contains(&id) {
            self.steps.push(id);
        }
        self
    }

    /// Declare that `dependent` runs after `dependency`.
    pub fn add_edge(mut self, dependency: impl Into<String>, dependent: impl Into<String>) -> Self {
        self.edges.push((dependency.into(), dependent.into()));
        self
    }

    /// Build the graph.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedStep` if either end of an edge is not a declared
    /// step. The dependent end is checked first.
    pub fn build(self) -> Result<ExecutionGraph> {
        let mut dependencies: HashMap<String, Vec<String>> = self
            .steps
            .iter()
            .map(|s| (s.clone(), Vec::new()))
            .collect();
        let mut dependents: HashMap<String, Vec<String>> = dependencies.clone();

        for (dependency, dependent) in self.edges {
            for end in [&dependent, &dependency] {
                if !dependencies.contains_key(end.as_str()) {
                    return Err(JitsError::UndefinedStep { step: end.clone() });
                }
            }

            let deps = dependencies.entry(dependent.clone()).or_default();
            if deps.contains(&dependency) {
                continue;
            }
            deps.push(dependency.clone());
            dependents.entry(dependency).or_default().push(dependent);
        }

        Ok(ExecutionGraph {
            steps: self.steps,
            dependencies,
            dependents,
        })
    }
}

/// Build the graph for a spec's step table and flow list.
///
/// Repeated flow entries for the same id contribute the union of their
/// `after` lists.
pub fn build_graph(
    steps: &IndexMap<String, StepDeclaration>,
    flow: &[FlowEntry],
) -> Result<ExecutionGraph> {
    let mut builder = steps
        .keys()
        .fold(ExecutionGraph::builder(), |b, id| b.add_step(id.as_str()));

    for entry in flow {
        if !steps.contains_key(&entry.id) {
            return Err(JitsError::UndefinedStep {
                step: entry.id.clone(),
            });
        }
        for dependency in &entry.after {
            builder = builder.add_edge(dependency.as_str(), entry.id.as_str());
        }
    }

    let graph = builder.build()?;
    tracing::debug!("Built graph with {} steps", graph.len());
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(ids: &[&str]) -> IndexMap<String, StepDeclaration> {
        ids.iter()
            .map(|id| (id.to_string(), StepDeclaration::inline(*id, "p")))
            .collect()
    }

    #[test]
    fn builder_creates_empty_graph() {
        let graph = ExecutionGraph::builder().build().unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn steps_absent_from_flow_are_roots() {
        let graph = build_graph(&steps(&["a", "b"]), &[]).unwrap();
        assert_eq!(graph.steps(), &["a", "b"]);
        assert_eq!(graph.in_degree("a"), 0);
        assert_eq!(graph.in_degree("b"), 0);
    }

    #[test]
    fn edges_record_both_directions() {
        let flow = vec![FlowEntry::new("b", &["a"]), FlowEntry::new("c", &["a", "b"])];
        let graph = build_graph(&steps(&["a", "b", "c"]), &flow).unwrap();

        assert_eq!(graph.dependencies_of("c"), &["a", "b"]);
        assert_eq!(graph.dependents_of("a"), &["b", "c"]);
        assert_eq!(graph.in_degree("c"), 2);
    }

    #[test]
    fn undefined_dependent_is_rejected() {
        let flow = vec![FlowEntry::new("ghost", &["a"])];
        let err = build_graph(&steps(&["a"]), &flow).unwrap_err();
        assert!(matches!(err, JitsError::UndefinedStep { ref step } if step == "ghost"));
    }

    #[test]
    fn undefined_dependency_is_rejected() {
        let flow = vec![FlowEntry::new("a", &["ghost"])];
        let err = build_graph(&steps(&["a"]), &flow).unwrap_err();
        assert!(matches!(err, JitsError::UndefinedStep { ref step } if step == "ghost"));
    }

    #[test]
    fn repeated_flow_entries_union_their_dependencies() {
        let flow = vec![
            FlowEntry::new("c", &["a"]),
            FlowEntry::new("c", &["b", "a"]),
        ];
        let graph = build_graph(&steps(&["a", "b", "c"]), &flow).unwrap();
        assert_eq!(graph.dependencies_of("c"), &["a", "b"]);
        assert_eq!(graph.in_degree("c"), 2);
    }

    #[test]
    fn unknown_step_has_no_dependencies() {
        let graph = build_graph(&steps(&["a"]), &[]).unwrap();
        assert!(graph.dependencies_of("zzz").is_empty());
        assert!(!graph.contains("zzz"));
    }
}
