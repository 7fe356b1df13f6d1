//! Composable graph filter stages.
//!
//! Each stage consumes the graph produced by its [`FilterSource`] (an
//! upstream stage, a supplied graph, or a [`GraphSource`]) and yields a new
//! graph. Stages hold configuration only; every `process()` call re-evaluates
//! the whole chain and allocates fresh output.
//!
//! ```text
//! FilterSource → ScopeFilter → ReachableFilter → ... → DependencyGraph
//!   (graph | upstream | resolver)
//! ```

pub mod ancestors;
pub mod chain;
pub mod config;
pub mod node_type;
pub mod reachable;
pub mod scope;

use std::borrow::Cow;
use std::sync::Arc;

use tracing::trace;

use crate::graph::DependencyGraph;
use crate::resolver::{GraphSource, ResolutionError};
use crate::types::Artifact;

pub use ancestors::AncestorFilter;
pub use chain::FilterChain;
pub use config::{ChainConfig, ConfigError, FilterSpec, TokenList};
pub use node_type::NodeTypeFilter;
pub use reachable::ReachableFilter;
pub use scope::{tokenize, ScopeFilter};

/// Error type for filter evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// The stage has neither an upstream stage nor an input graph.
    #[error("Filter stage '{stage}' has neither an upstream stage nor an input graph")]
    NoInput {
        /// Stage name.
        stage: &'static str,
    },
    /// The resolver could not supply the root graph.
    #[error("No input graph available: {0}")]
    NoInputGraph(#[from] ResolutionError),
    /// A stage was configured with a node that is not in its input graph.
    #[error("Filter stage '{stage}' references node {node} which is not in its input graph")]
    UnknownNode {
        /// Stage name.
        stage: &'static str,
        /// Coordinates of the missing node.
        node: String,
    },
    /// The resolver returned a graph rooted somewhere other than the requested project.
    #[error("Filter stage '{stage}' requested the graph of {expected} but the resolver returned one rooted at {actual}")]
    RootMismatch {
        /// Stage name.
        stage: &'static str,
        /// Requested project coordinates.
        expected: String,
        /// Root of the returned graph.
        actual: String,
    },
}

/// A stage in a filter chain.
pub trait GraphFilter: Send + Sync {
    /// Short stage name for logs and errors.
    fn name(&self) -> &'static str;

    /// Evaluate this stage, pulling its input first.
    fn process(&self) -> Result<DependencyGraph, FilterError>;

    /// Replace this stage's input.
    fn with_source(self, source: FilterSource) -> Self
    where
        Self: Sized;
}

/// Where a stage gets its input graph from.
#[derive(Default)]
pub enum FilterSource {
    /// Not configured; `process()` fails with [`FilterError::NoInput`].
    #[default]
    Unset,
    /// An externally supplied graph.
    Graph(Arc<DependencyGraph>),
    /// The output of another stage.
    Upstream(Box<dyn GraphFilter>),
    /// Resolve the graph of `project` from a resolution service.
    Resolve {
        /// The resolution service.
        source: Arc<dyn GraphSource>,
        /// Root artifact to resolve.
        project: Artifact,
    },
}

impl FilterSource {
    /// Use the output of `filter` as input.
    pub fn upstream(filter: impl GraphFilter + 'static) -> Self {
        Self::Upstream(Box::new(filter))
    }

    /// Resolve `project` through `source` on every evaluation.
    pub fn resolve(source: Arc<dyn GraphSource>, project: Artifact) -> Self {
        Self::Resolve { source, project }
    }

    /// True if a graph can be obtained from this source.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Obtain the input graph for `stage`.
    pub fn evaluate(&self, stage: &'static str) -> Result<Cow<'_, DependencyGraph>, FilterError> {
        match self {
            Self::Unset => Err(FilterError::NoInput { stage }),
            Self::Graph(graph) => Ok(Cow::Borrowed(&**graph)),
            Self::Upstream(filter) => {
                trace!(stage, upstream = filter.name(), "evaluating upstream stage");
                Ok(Cow::Owned(filter.process()?))
            }
            Self::Resolve { source, project } => {
                trace!(stage, project = %project, "resolving input graph");
                let graph = source.resolve(project)?;
                if **graph.root() != *project {
                    return Err(FilterError::RootMismatch {
                        stage,
                        expected: project.to_string(),
                        actual: graph.root().to_string(),
                    });
                }
                Ok(Cow::Owned(graph))
            }
        }
    }
}

impl From<DependencyGraph> for FilterSource {
    fn from(graph: DependencyGraph) -> Self {
        Self::Graph(Arc::new(graph))
    }
}

impl From<Arc<DependencyGraph>> for FilterSource {
    fn from(graph: Arc<DependencyGraph>) -> Self {
        Self::Graph(graph)
    }
}

impl std::fmt::Debug for FilterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => write!(f, "Unset"),
            Self::Graph(graph) => write!(f, "Graph({})", graph.root()),
            Self::Upstream(filter) => write!(f, "Upstream({})", filter.name()),
            Self::Resolve { project, .. } => write!(f, "Resolve({project})"),
        }
    }
}

/// The built-in stages as a closed sum type.
///
/// This is what [`FilterSpec`] configuration produces.
#[derive(Debug)]
pub enum AnyFilter {
    /// Keep edges whose scope is in a set.
    Scope(ScopeFilter),
    /// Keep nodes whose type is in a set.
    NodeType(NodeTypeFilter),
    /// Keep a node and everything depending on it.
    Ancestors(AncestorFilter),
    /// Keep what is reachable from the root.
    Reachable(ReachableFilter),
}

impl GraphFilter for AnyFilter {
    fn name(&self) -> &'static str {
        match self {
            Self::Scope(f) => f.name(),
            Self::NodeType(f) => f.name(),
            Self::Ancestors(f) => f.name(),
            Self::Reachable(f) => f.name(),
        }
    }

    fn process(&self) -> Result<DependencyGraph, FilterError> {
        match self {
            Self::Scope(f) => f.process(),
            Self::NodeType(f) => f.process(),
            Self::Ancestors(f) => f.process(),
            Self::Reachable(f) => f.process(),
        }
    }

    fn with_source(self, source: FilterSource) -> Self {
        match self {
            Self::Scope(f) => Self::Scope(f.with_source(source)),
            Self::NodeType(f) => Self::NodeType(f.with_source(source)),
            Self::Ancestors(f) => Self::Ancestors(f.with_source(source)),
            Self::Reachable(f) => Self::Reachable(f.with_source(source)),
        }
    }
}
