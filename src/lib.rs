//! # depgraph-kernel
//!
//! Scope-aware dependency graphs and composable sub-graph filters.
//!
//! The kernel answers one question:
//!
//! > Given a project's dependency graph, which artifacts and edges remain
//! > under a stack of filters such as "runtime scope only"?
//!
//! ## Core Contract
//!
//! 1. A [`DependencyGraph`] is built once, validated, and never mutated
//! 2. A [`GraphVisitor`] decides edge and node membership independently
//! 3. [`DependencyGraph::create_sub_graph`] derives a fresh graph that keeps
//!    the root, never contains dangling edges, and shares node identity
//! 4. Filter stages ([`GraphFilter`]) stack into chains; each `process()` call
//!    re-evaluates the chain from its input
//!
//! ## Architecture
//!
//! ```text
//! GraphSource → DependencyGraph → ScopeFilter → ... → DependencyGraph
//!  (resolver)                          ↓
//!                              create_sub_graph(visitor)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Node and edge iteration is insertion-order stable
//! - Same input graph + same chain → identical output and fingerprint

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod graph;
pub mod visitor;
pub mod filter;
pub mod resolver;
pub mod canonical;

// Re-exports
pub use types::{scope, Artifact, CoordinateError, Edge};
pub use graph::{DependencyGraph, GraphBuilder, GraphError};
pub use visitor::{AcceptAll, FnVisitor, GraphVisitor, NodeSetVisitor};
pub use filter::{
    AncestorFilter, AnyFilter, ChainConfig, ConfigError, FilterChain, FilterError, FilterSource,
    FilterSpec, GraphFilter, NodeTypeFilter, ReachableFilter, ScopeFilter, TokenList,
};
pub use resolver::{GraphSource, InMemoryGraphSource, ResolutionError};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};

/// Schema version for graph fingerprints.
/// Increment on changes to the canonical graph encoding.
pub const DEPGRAPH_SCHEMA_VERSION: &str = "1.0.0";

/// Default filter-chain configuration version identifier.
pub const DEFAULT_CHAIN_VERSION: &str = "filter_chain_v1";
