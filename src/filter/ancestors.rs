//! Ancestor filter: keep a node and every artifact that depends on it.

use tracing::trace;

use super::{FilterError, FilterSource, GraphFilter};
use crate::graph::DependencyGraph;
use crate::types::Artifact;
use crate::visitor::NodeSetVisitor;

/// Keeps `target` and everything that transitively depends on it, with the
/// edges among them: every path from the root down to `target`.
///
/// Fails with [`FilterError::UnknownNode`] if `target` is not in the input.
#[derive(Debug)]
pub struct AncestorFilter {
    target: Artifact,
    source: FilterSource,
}

impl AncestorFilter {
    /// Stage name.
    pub const NAME: &'static str = "ancestors";

    /// Create a filter keeping the ancestors of `target`.
    pub fn new(target: Artifact) -> Self {
        Self {
            target,
            source: FilterSource::Unset,
        }
    }

    /// The artifact whose ancestors are kept.
    pub fn target(&self) -> &Artifact {
        &self.target
    }
}

impl GraphFilter for AncestorFilter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self) -> Result<DependencyGraph, FilterError> {
        let input = self.source.evaluate(Self::NAME)?;
        if !input.contains_node(&self.target) {
            return Err(FilterError::UnknownNode {
                stage: Self::NAME,
                node: self.target.to_string(),
            });
        }

        let visitor = NodeSetVisitor::new(input.ancestors_of(&self.target));
        trace!(
            stage = Self::NAME,
            target = %self.target,
            ancestors = visitor.len(),
            "applying filter"
        );
        Ok(input.create_sub_graph(&visitor))
    }

    fn with_source(mut self, source: FilterSource) -> Self {
        self.source = source;
        self
    }
}
