//! Edge types for the dependency graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::artifact::Artifact;

/// Well-known dependency scope tokens.
///
/// Edges carry their scope as a plain string so build tools with other scope
/// vocabularies still fit; these are the tokens most graphs use.
pub mod scope {
    /// Needed to compile and run.
    pub const COMPILE: &str = "compile";
    /// Needed at runtime only.
    pub const RUNTIME: &str = "runtime";
    /// Needed by tests only.
    pub const TEST: &str = "test";
    /// Supplied by the container or JDK at runtime.
    pub const PROVIDED: &str = "provided";
    /// Supplied explicitly from the local system.
    pub const SYSTEM: &str = "system";
    /// Imported dependency management.
    pub const IMPORT: &str = "import";
}

/// Edge in the dependency graph.
///
/// Directed from the depending artifact (`parent`) to the dependency (`child`).
/// Endpoints are shared with the owning graph's node set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Depending artifact (source).
    pub parent: Arc<Artifact>,
    /// Dependency (target).
    pub child: Arc<Artifact>,
    /// Resolution scope, matched case-sensitively.
    pub scope: String,
}

impl Edge {
    /// Create a new edge.
    pub fn new(parent: Arc<Artifact>, child: Arc<Artifact>, scope: impl Into<String>) -> Self {
        Self {
            parent,
            child,
            scope: scope.into(),
        }
    }

    /// Check whether this edge connects `parent` to `child`, regardless of scope.
    pub fn connects(&self, parent: &Artifact, child: &Artifact) -> bool {
        *self.parent == *parent && *self.child == *child
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.parent, self.scope, self.child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_equality_includes_scope() {
        let app = Arc::new(Artifact::new("org.example", "app", "1.0"));
        let lib = Arc::new(Artifact::new("org.example", "lib", "1.0"));

        let compile = Edge::new(Arc::clone(&app), Arc::clone(&lib), scope::COMPILE);
        let test = Edge::new(Arc::clone(&app), Arc::clone(&lib), scope::TEST);

        assert_ne!(compile, test);
        assert!(compile.connects(&app, &lib));
        assert!(!compile.connects(&lib, &app));
    }

    #[test]
    fn test_deserialized_endpoints_are_normalized() {
        let json = r#"{
            "parent": {"group_id":"org.example","artifact_id":"app","version":"1.0","type":""},
            "child": {"group_id":"org.example","artifact_id":"lib","version":"1.0","classifier":""},
            "scope": "compile"
        }"#;
        let edge: Edge = serde_json::from_str(json).unwrap();

        assert!(edge.connects(
            &Artifact::new("org.example", "app", "1.0"),
            &Artifact::new("org.example", "lib", "1.0"),
        ));
    }

    #[test]
    fn test_edge_display() {
        let app = Arc::new(Artifact::new("org.example", "app", "1.0"));
        let lib = Arc::new(Artifact::new("org.example", "lib", "2.0"));
        let edge = Edge::new(app, lib, scope::RUNTIME);

        assert_eq!(
            edge.to_string(),
            "org.example:app:1.0 -[runtime]-> org.example:lib:2.0"
        );
    }
}
