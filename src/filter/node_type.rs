//! Node-type filter: keep only artifacts of the configured packaging types.

use std::collections::BTreeSet;

use tracing::trace;

use super::{FilterError, FilterSource, GraphFilter};
use crate::graph::DependencyGraph;
use crate::types::{Artifact, Edge};
use crate::visitor::GraphVisitor;

/// Keeps nodes whose type is in a set; every edge between kept nodes survives.
///
/// Artifacts without a type never match. The root is kept regardless.
#[derive(Debug, Default)]
pub struct NodeTypeFilter {
    types: BTreeSet<String>,
    source: FilterSource,
}

impl NodeTypeFilter {
    /// Stage name.
    pub const NAME: &'static str = "node_type";

    /// Create a filter accepting the given types.
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            source: FilterSource::Unset,
        }
    }

    /// The configured type set.
    pub fn types(&self) -> &BTreeSet<String> {
        &self.types
    }
}

impl GraphVisitor for NodeTypeFilter {
    fn visit_edge(&self, _edge: &Edge) -> bool {
        true
    }

    fn visit_node(&self, node: &Artifact) -> bool {
        node.artifact_type().is_some_and(|t| self.types.contains(t))
    }
}

impl GraphFilter for NodeTypeFilter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self) -> Result<DependencyGraph, FilterError> {
        let input = self.source.evaluate(Self::NAME)?;
        trace!(stage = Self::NAME, types = ?self.types, "applying filter");
        Ok(input.create_sub_graph(self))
    }

    fn with_source(mut self, source: FilterSource) -> Self {
        self.source = source;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::scope;

    #[test]
    fn test_keeps_only_matching_types() {
        let root = Artifact::new("org.example", "app", "1.0").with_type("war");
        let lib = Artifact::new("org.example", "lib", "1.0").with_type("jar");
        let bom = Artifact::new("org.example", "bom", "1.0").with_type("pom");
        let untyped = Artifact::new("org.example", "raw", "1.0");

        let mut builder = DependencyGraph::builder(root.clone());
        builder
            .add_dependency(root.clone(), lib.clone(), scope::COMPILE)
            .add_dependency(root.clone(), bom.clone(), scope::IMPORT)
            .add_dependency(lib.clone(), untyped.clone(), scope::COMPILE);
        let graph = builder.build().unwrap();

        let out = NodeTypeFilter::new(["jar"])
            .with_source(graph.into())
            .process()
            .unwrap();

        assert!(out.contains_node(&root));
        assert!(out.contains_node(&lib));
        assert!(!out.contains_node(&bom));
        assert!(!out.contains_node(&untyped));
        assert_eq!(out.num_edges(), 1);
    }
}
