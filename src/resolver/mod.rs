//! Boundary to the artifact-resolution service that supplies root graphs.
//!
//! The kernel never resolves dependencies itself. Whatever talks to the
//! build tool or remote repositories implements [`GraphSource`] and is passed
//! explicitly to the stages that need it.

pub mod memory;

use crate::filter::ScopeFilter;
use crate::graph::DependencyGraph;
use crate::types::{scope, Artifact};

/// Error type for resolution failures.
///
/// Distinguishes "the artifact does not exist" from "the resolution machinery
/// failed". Filter stages treat both as "no input graph available".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// The artifact could not be located.
    #[error("Unable to find artifact: {0}")]
    NotFound(String),
    /// The resolution mechanism itself failed.
    #[error("Unable to resolve artifact {coordinates}: {reason}")]
    Failed {
        /// Coordinates of the requested artifact.
        coordinates: String,
        /// Failure reported by the resolver.
        reason: String,
    },
}

impl ResolutionError {
    /// Create a mechanism failure from any error type.
    pub fn failed<E: std::fmt::Display>(project: &Artifact, e: E) -> Self {
        Self::Failed {
            coordinates: project.to_string(),
            reason: e.to_string(),
        }
    }
}

/// Trait for services that produce the initial dependency graph of a project.
///
/// Implementations must return graphs rooted at `project` that satisfy the
/// [`DependencyGraph`] invariants; the builder enforces the invariants and
/// filter stages reject a graph rooted elsewhere.
pub trait GraphSource: Send + Sync {
    /// Resolve the full dependency graph of `project`.
    fn resolve(&self, project: &Artifact) -> Result<DependencyGraph, ResolutionError>;

    /// Resolve only what `project` needs at runtime: its compile and runtime edges.
    fn resolve_runtime(&self, project: &Artifact) -> Result<DependencyGraph, ResolutionError> {
        let graph = self.resolve(project)?;
        Ok(graph.create_sub_graph(&ScopeFilter::new([scope::COMPILE, scope::RUNTIME])))
    }
}

pub use memory::InMemoryGraphSource;
