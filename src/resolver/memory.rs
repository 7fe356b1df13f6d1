//! In-memory graph source for testing and embedding.

use std::collections::BTreeMap;

use super::{GraphSource, ResolutionError};
use crate::graph::DependencyGraph;
use crate::types::Artifact;

/// Graph source backed by prebuilt graphs, keyed by their root artifact.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphSource {
    /// Graphs by root artifact.
    graphs: BTreeMap<Artifact, DependencyGraph>,
    /// Simulated resolver failures by project.
    failures: BTreeMap<Artifact, String>,
}

impl InMemoryGraphSource {
    /// Create a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a graph under its root artifact, replacing any previous one.
    pub fn insert(&mut self, graph: DependencyGraph) {
        let root = Artifact::clone(graph.root());
        self.failures.remove(&root);
        self.graphs.insert(root, graph);
    }

    /// Make resolution of `project` fail with a mechanism error.
    pub fn fail_with(&mut self, project: Artifact, reason: impl Into<String>) {
        self.graphs.remove(&project);
        self.failures.insert(project, reason.into());
    }

    /// Get number of registered graphs.
    pub fn num_graphs(&self) -> usize {
        self.graphs.len()
    }
}

impl GraphSource for InMemoryGraphSource {
    fn resolve(&self, project: &Artifact) -> Result<DependencyGraph, ResolutionError> {
        if let Some(reason) = self.failures.get(project) {
            return Err(ResolutionError::failed(project, reason));
        }
        self.graphs
            .get(project)
            .cloned()
            .ok_or_else(|| ResolutionError::NotFound(project.to_string()))
    }
}
