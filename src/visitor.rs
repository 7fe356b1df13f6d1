//! Visitor contract used to decide sub-graph membership.
//!
//! Edge acceptance and node acceptance are independent questions. Most
//! filters vary only one of them: a scope filter keeps every artifact but
//! drops edges, a type filter keeps every edge kind but drops artifacts.

use std::collections::HashSet;

use crate::types::{Artifact, Edge};

/// Decides which edges and nodes survive `DependencyGraph::create_sub_graph`.
pub trait GraphVisitor {
    /// Should this edge be kept?
    fn visit_edge(&self, edge: &Edge) -> bool;

    /// Should this node be kept?
    fn visit_node(&self, node: &Artifact) -> bool;
}

impl<V: GraphVisitor + ?Sized> GraphVisitor for &V {
    fn visit_edge(&self, edge: &Edge) -> bool {
        (**self).visit_edge(edge)
    }

    fn visit_node(&self, node: &Artifact) -> bool {
        (**self).visit_node(node)
    }
}

/// Accepts everything. `create_sub_graph(&AcceptAll)` copies the graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl GraphVisitor for AcceptAll {
    fn visit_edge(&self, _edge: &Edge) -> bool {
        true
    }

    fn visit_node(&self, _node: &Artifact) -> bool {
        true
    }
}

/// Adapts a pair of closures to [`GraphVisitor`].
pub struct FnVisitor<E, N> {
    edge: E,
    node: N,
}

impl<E, N> FnVisitor<E, N>
where
    E: Fn(&Edge) -> bool,
    N: Fn(&Artifact) -> bool,
{
    /// Create a visitor from an edge predicate and a node predicate.
    pub fn new(edge: E, node: N) -> Self {
        Self { edge, node }
    }
}

impl<E, N> GraphVisitor for FnVisitor<E, N>
where
    E: Fn(&Edge) -> bool,
    N: Fn(&Artifact) -> bool,
{
    fn visit_edge(&self, edge: &Edge) -> bool {
        (self.edge)(edge)
    }

    fn visit_node(&self, node: &Artifact) -> bool {
        (self.node)(node)
    }
}

/// Keeps exactly the nodes in a precomputed set, and the edges between them.
///
/// Used by filters that first compute a node set on their input graph
/// (reachability, ancestry) and then cut the graph down to it.
#[derive(Debug, Clone)]
pub struct NodeSetVisitor<'g> {
    members: HashSet<&'g Artifact>,
}

impl<'g> NodeSetVisitor<'g> {
    /// Wrap a member set.
    pub fn new(members: HashSet<&'g Artifact>) -> Self {
        Self { members }
    }

    /// Number of member nodes.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the member set is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl GraphVisitor for NodeSetVisitor<'_> {
    fn visit_edge(&self, edge: &Edge) -> bool {
        self.members.contains(&*edge.parent) && self.members.contains(&*edge.child)
    }

    fn visit_node(&self, node: &Artifact) -> bool {
        self.members.contains(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::scope;
    use std::sync::Arc;

    fn edge(scope: &str) -> Edge {
        Edge::new(
            Arc::new(Artifact::new("g", "a", "1")),
            Arc::new(Artifact::new("g", "b", "1")),
            scope,
        )
    }

    #[test]
    fn test_fn_visitor_predicates_are_independent() {
        let visitor = FnVisitor::new(|e: &Edge| e.scope == scope::RUNTIME, |_: &Artifact| false);

        assert!(visitor.visit_edge(&edge(scope::RUNTIME)));
        assert!(!visitor.visit_edge(&edge(scope::TEST)));
        assert!(!visitor.visit_node(&Artifact::new("g", "a", "1")));
    }

    #[test]
    fn test_node_set_visitor() {
        let a = Artifact::new("g", "a", "1");
        let c = Artifact::new("g", "c", "1");
        let members: HashSet<&Artifact> = [&a].into_iter().collect();
        let visitor = NodeSetVisitor::new(members);

        assert!(visitor.visit_node(&a));
        assert!(!visitor.visit_node(&c));
        // b is not a member, so the edge a -> b is rejected
        assert!(!visitor.visit_edge(&edge(scope::COMPILE)));
    }
}
