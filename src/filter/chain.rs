//! Fluent construction of filter chains.

use std::sync::Arc;

use super::{FilterError, FilterSource, GraphFilter};
use crate::graph::DependencyGraph;
use crate::resolver::GraphSource;
use crate::types::Artifact;

/// Stacks filter stages on top of an input, innermost first.
///
/// ```rust,ignore
/// let runtime_paths_to_log4j = FilterChain::from_graph(graph)
///     .then(ScopeFilter::from_level("compile, runtime"))
///     .then(AncestorFilter::new(log4j))
///     .process()?;
/// ```
///
/// A chain with no stages returns a copy of its input.
#[derive(Debug)]
pub struct FilterChain {
    tail: FilterSource,
    depth: usize,
}

impl FilterChain {
    /// Start a chain from any input source.
    pub fn new(source: FilterSource) -> Self {
        Self {
            tail: source,
            depth: 0,
        }
    }

    /// Start a chain from a supplied graph.
    pub fn from_graph(graph: impl Into<Arc<DependencyGraph>>) -> Self {
        Self::new(FilterSource::Graph(graph.into()))
    }

    /// Start a chain that resolves `project` on every evaluation.
    pub fn from_resolver(source: Arc<dyn GraphSource>, project: Artifact) -> Self {
        Self::new(FilterSource::resolve(source, project))
    }

    /// Append a stage consuming the output of the current tail.
    #[must_use]
    pub fn then<F: GraphFilter + 'static>(self, filter: F) -> Self {
        Self {
            tail: FilterSource::upstream(filter.with_source(self.tail)),
            depth: self.depth + 1,
        }
    }

    /// Number of stages.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Evaluate every stage and return the final graph.
    pub fn process(&self) -> Result<DependencyGraph, FilterError> {
        self.tail.evaluate("chain").map(|graph| graph.into_owned())
    }

    /// Unwrap the terminal stage as a [`FilterSource`] for further composition.
    pub fn into_source(self) -> FilterSource {
        self.tail
    }
}
