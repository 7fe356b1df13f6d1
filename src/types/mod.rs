//! Core types for the dependency graph.

pub mod artifact;
pub mod edge;

pub use artifact::{Artifact, CoordinateError};
pub use edge::{scope, Edge};
