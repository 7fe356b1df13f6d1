//! Reachability filter: drop everything the root can no longer reach.

use tracing::trace;

use super::{FilterError, FilterSource, GraphFilter};
use crate::graph::DependencyGraph;
use crate::visitor::NodeSetVisitor;

/// Keeps only nodes and edges reachable from the root.
///
/// Useful after a node-level stage: removing an artifact can strand the
/// subtree below it, which still has edges of its own.
#[derive(Debug, Default)]
pub struct ReachableFilter {
    source: FilterSource,
}

impl ReachableFilter {
    /// Stage name.
    pub const NAME: &'static str = "reachable";

    /// Create the filter with no input configured.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphFilter for ReachableFilter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self) -> Result<DependencyGraph, FilterError> {
        let input = self.source.evaluate(Self::NAME)?;
        let visitor = NodeSetVisitor::new(input.reachable_from_root());
        trace!(stage = Self::NAME, reachable = visitor.len(), "applying filter");
        Ok(input.create_sub_graph(&visitor))
    }

    fn with_source(mut self, source: FilterSource) -> Self {
        self.source = source;
        self
    }
}
