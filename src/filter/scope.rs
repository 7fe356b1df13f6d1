//! Scope filter: keep only edges whose scope is in a configured set.

use std::collections::BTreeSet;

use tracing::trace;

use super::{FilterError, FilterSource, GraphFilter};
use crate::graph::DependencyGraph;
use crate::types::{Artifact, Edge};
use crate::visitor::GraphVisitor;

/// Split a delimiter-separated token string on commas and whitespace.
///
/// Tokens are trimmed and empty tokens dropped, so `"compile, runtime"`,
/// `"compile runtime"` and `" compile,,runtime "` are equivalent.
pub fn tokenize(level: &str) -> impl Iterator<Item = &str> {
    level
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Filters a [`DependencyGraph`] by only traversing edges of the given scopes.
///
/// Scope names match case-sensitively. Nodes are never rejected directly; a
/// node disappears only when none of its edges survive. An empty scope set
/// accepts no edges and leaves just the root.
#[derive(Debug, Default)]
pub struct ScopeFilter {
    scopes: BTreeSet<String>,
    source: FilterSource,
}

impl ScopeFilter {
    /// Stage name.
    pub const NAME: &'static str = "scope";

    /// Create a filter accepting the given scopes.
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
            source: FilterSource::Unset,
        }
    }

    /// Create a filter from a comma- or whitespace-separated scope list.
    pub fn from_level(level: &str) -> Self {
        Self::new(tokenize(level))
    }

    /// Add the scopes in a comma- or whitespace-separated list.
    pub fn add_level(&mut self, level: &str) {
        self.scopes.extend(tokenize(level).map(str::to_string));
    }

    /// The configured scope set.
    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }
}

impl GraphVisitor for ScopeFilter {
    fn visit_edge(&self, edge: &Edge) -> bool {
        self.scopes.contains(&edge.scope)
    }

    fn visit_node(&self, _node: &Artifact) -> bool {
        true
    }
}

impl GraphFilter for ScopeFilter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self) -> Result<DependencyGraph, FilterError> {
        let input = self.source.evaluate(Self::NAME)?;
        trace!(stage = Self::NAME, scopes = ?self.scopes, "applying filter");
        Ok(input.create_sub_graph(self))
    }

    fn with_source(mut self, source: FilterSource) -> Self {
        self.source = source;
        self
    }
}
