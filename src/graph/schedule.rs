//! Deterministic topological scheduling.

use std::collections::{HashMap, VecDeque};

use crate::error::{JitsError, Result};

use super::ExecutionGraph;

/// Step ids in the order they execute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionOrder(Vec<String>);

impl ExecutionOrder {
    /// Step ids as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate over step ids.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Position of a step in the order.
    pub fn position(&self, step: &str) -> Option<usize> {
        self.0.iter().position(|s| s == step)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ExecutionOrder {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Linearize the graph with Kahn's algorithm.
///
/// Roots are seeded in declaration order and dependents are released in
/// edge order, so the result is deterministic.
///
/// # Errors
///
/// Returns `CycleOrDisconnectedGraph` when some steps cannot be placed. No
/// partial order is returned.
pub fn schedule(graph: &ExecutionGraph) -> Result<ExecutionOrder> {
    // Count incoming edges for each node
    let mut in_degree: HashMap<&str, usize> = graph
        .steps()
        .iter()
        .map(|s| (s.as_str(), graph.in_degree(s)))
        .collect();

    let mut queue: VecDeque<&str> = graph
        .steps()
        .iter()
        .map(String::as_str)
        .filter(|s| in_degree.get(s) == Some(&0))
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(step) = queue.pop_front() {
        order.push(step.to_string());

        for dependent in graph.dependents_of(step) {
            if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dependent);
                }
            }
        }
    }

    if order.len() != graph.len() {
        let detail = match find_cycle(graph) {
            Some(cycle) => cycle.join(" -> "),
            None => {
                let remaining: Vec<_> = graph
                    .steps()
                    .iter()
                    .filter(|s| !order.contains(s))
                    .map(String::as_str)
                    .collect();
                format!("unresolved steps: {}", remaining.join(", "))
            }
        };
        return Err(JitsError::CycleOrDisconnectedGraph { detail });
    }

    tracing::debug!("Execution order: {}", order.join(", "));
    Ok(ExecutionOrder(order))
}

/// Find a cycle in the graph, returning the path if one exists.
///
/// The path starts and ends with the same step and follows dependency
/// edges.
pub fn find_cycle(graph: &ExecutionGraph) -> Option<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Unvisited,
        Visiting,
        Visited,
    }

    fn dfs<'a>(
        node: &'a str,
        graph: &'a ExecutionGraph,
        state: &mut HashMap<&'a str, State>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        state.insert(node, State::Visiting);
        path.push(node);

        for dep in graph.dependencies_of(node) {
            match state.get(dep.as_str()) {
                Some(State::Visiting) => {
                    let start = path.iter().position(|s| *s == dep.as_str())?;
                    let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                    cycle.push(dep.clone());
                    return Some(cycle);
                }
                Some(State::Unvisited) | None => {
                    if let Some(cycle) = dfs(dep, graph, state, path) {
                        return Some(cycle);
                    }
                }
                Some(State::Visited) => {}
            }
        }

        path.pop();
        state.insert(node, State::Visited);
        None
    }

    let mut state: HashMap<&str, State> = graph
        .steps()
        .iter()
        .map(|s| (s.as_str(), State::Unvisited))
        .collect();
    let mut path = Vec::new();

    for step in graph.steps() {
        if state.get(step.as_str()) == Some(&State::Unvisited) {
            if let Some(cycle) = dfs(step, graph, &mut state, &mut path) {
                return Some(cycle);
            }
        }
    }

    None
}
