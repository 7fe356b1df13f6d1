//! Dependency graph model and sub-graph construction.
//!
//! A [`DependencyGraph`] is built once through a [`GraphBuilder`], which
//! checks every invariant before handing the graph out:
//!
//! - every edge's endpoints are nodes of the graph
//! - no artifact transitively depends on itself
//! - node identity is the coordinate tuple, so duplicates collapse
//!
//! After construction the graph is read-only. Filtering never mutates it;
//! [`DependencyGraph::create_sub_graph`] allocates a fresh graph that shares
//! the same `Arc<Artifact>` nodes.
//!
//! ## Ordering
//!
//! Nodes and edges iterate in insertion order. Sub-graphs keep the root first,
//! then endpoints in the order their first surviving edge was seen, so the same
//! input and visitor always yield the same output.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::canonical::canonical_hash_hex;
use crate::types::{Artifact, Edge};
use crate::visitor::GraphVisitor;
use crate::DEPGRAPH_SCHEMA_VERSION;

/// Error type for graph construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge references an artifact that is not in the node set.
    #[error("Edge {parent} -[{scope}]-> {child} references unknown node {missing}")]
    DanglingEdge {
        /// Edge source.
        parent: String,
        /// Edge target.
        child: String,
        /// Edge scope.
        scope: String,
        /// The endpoint that is not a node of the graph.
        missing: String,
    },
    /// The "depends on" relation contains a cycle.
    #[error("Dependency cycle detected: {}", .path.join(" -> "))]
    CycleDetected {
        /// Coordinates along the cycle; the first entry is repeated at the end.
        path: Vec<String>,
    },
}

/// Incrementally collects nodes and edges, then validates them in [`build`](Self::build).
///
/// Edges may be added before their endpoints; endpoints are only looked up
/// when the graph is built.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    root: Arc<Artifact>,
    nodes: Vec<Arc<Artifact>>,
    node_index: HashMap<Arc<Artifact>, usize>,
    edges: Vec<(Artifact, Artifact, String)>,
}

impl GraphBuilder {
    /// Start a graph rooted at `root`. The root is the first node.
    pub fn new(root: Artifact) -> Self {
        let root = Arc::new(root);
        let mut node_index = HashMap::new();
        node_index.insert(Arc::clone(&root), 0);
        Self {
            nodes: vec![Arc::clone(&root)],
            root,
            node_index,
            edges: Vec::new(),
        }
    }

    /// Add a node. Adding an artifact already present is a no-op.
    pub fn add_node(&mut self, artifact: Artifact) -> &mut Self {
        if !self.node_index.contains_key(&artifact) {
            let node = Arc::new(artifact);
            self.node_index.insert(Arc::clone(&node), self.nodes.len());
            self.nodes.push(node);
        }
        self
    }

    /// Add a `parent -> child` edge with the given scope.
    pub fn add_edge(
        &mut self,
        parent: Artifact,
        child: Artifact,
        scope: impl Into<String>,
    ) -> &mut Self {
        self.edges.push((parent, child, scope.into()));
        self
    }

    /// Add both endpoints as nodes, then the edge between them.
    pub fn add_dependency(
        &mut self,
        parent: Artifact,
        child: Artifact,
        scope: impl Into<String>,
    ) -> &mut Self {
        self.add_node(parent.clone());
        self.add_node(child.clone());
        self.add_edge(parent, child, scope)
    }

    /// Validate the collected nodes and edges and produce the graph.
    ///
    /// Fails with [`GraphError::DanglingEdge`] if an edge endpoint was never
    /// added, or [`GraphError::CycleDetected`] if the edges form a cycle.
    /// Repeated identical edges collapse to one.
    pub fn build(self) -> Result<DependencyGraph, GraphError> {
        let mut edges = Vec::with_capacity(self.edges.len());
        let mut seen: HashSet<(usize, usize, String)> = HashSet::new();

        for (parent, child, scope) in self.edges {
            let lookup = |endpoint: &Artifact| {
                self.node_index.get(endpoint).copied().ok_or_else(|| GraphError::DanglingEdge {
                    parent: parent.to_string(),
                    child: child.to_string(),
                    scope: scope.clone(),
                    missing: endpoint.to_string(),
                })
            };
            let p = lookup(&parent)?;
            let c = lookup(&child)?;

            if seen.insert((p, c, scope.clone())) {
                edges.push(Edge::new(
                    Arc::clone(&self.nodes[p]),
                    Arc::clone(&self.nodes[c]),
                    scope,
                ));
            }
        }

        let graph = DependencyGraph::assemble(self.root, self.nodes, edges);
        if let Some(cycle) = graph.find_cycle() {
            return Err(GraphError::CycleDetected {
                path: cycle.iter().map(|&i| graph.nodes[i].to_string()).collect(),
            });
        }

        debug!(
            root = %graph.root,
            nodes = graph.num_nodes(),
            edges = graph.num_edges(),
            "built dependency graph"
        );
        Ok(graph)
    }
}

/// An immutable, rooted, acyclic dependency graph.
///
/// Equality compares the root and the node and edge sequences, so two graphs
/// are equal when they hold the same artifacts and edges in the same order.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    root: Arc<Artifact>,
    nodes: Vec<Arc<Artifact>>,
    node_index: HashMap<Arc<Artifact>, usize>,
    edges: Vec<Edge>,
    edge_set: HashSet<Edge>,
    /// Outgoing edge indices per node.
    outgoing: Vec<Vec<usize>>,
    /// Incoming edge indices per node.
    incoming: Vec<Vec<usize>>,
}

#[derive(Clone, Copy)]
enum Direction {
    Dependencies,
    Dependents,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// Hash input for [`DependencyGraph::fingerprint`].
#[derive(Serialize)]
struct CanonicalGraph<'a> {
    schema_version: &'a str,
    root: &'a Artifact,
    nodes: Vec<&'a Artifact>,
    edges: Vec<(&'a Artifact, &'a Artifact, &'a str)>,
}

impl DependencyGraph {
    /// Start building a graph rooted at `root`.
    pub fn builder(root: Artifact) -> GraphBuilder {
        GraphBuilder::new(root)
    }

    /// Assemble a graph from parts that already satisfy the node-membership invariant.
    fn assemble(root: Arc<Artifact>, nodes: Vec<Arc<Artifact>>, edges: Vec<Edge>) -> Self {
        let node_index: HashMap<Arc<Artifact>, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (Arc::clone(n), i))
            .collect();

        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for (i, edge) in edges.iter().enumerate() {
            let (Some(&p), Some(&c)) = (
                node_index.get(&*edge.parent),
                node_index.get(&*edge.child),
            ) else {
                debug_assert!(false, "edge {edge} has an endpoint outside the node set");
                continue;
            };
            outgoing[p].push(i);
            incoming[c].push(i);
        }

        let edge_set = edges.iter().cloned().collect();
        Self {
            root,
            nodes,
            node_index,
            edges,
            edge_set,
            outgoing,
            incoming,
        }
    }

    /// The designated root artifact (the project being described).
    pub fn root(&self) -> &Arc<Artifact> {
        &self.root
    }

    /// All nodes in insertion order. The root is always first.
    pub fn nodes(&self) -> &[Arc<Artifact>] {
        &self.nodes
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Get number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Look up the shared node for an artifact.
    pub fn node(&self, artifact: &Artifact) -> Option<&Arc<Artifact>> {
        self.node_index.get(artifact).map(|&i| &self.nodes[i])
    }

    /// Check whether an artifact is a node of this graph.
    pub fn contains_node(&self, artifact: &Artifact) -> bool {
        self.node_index.contains_key(artifact)
    }

    /// Check whether an edge (including its scope) is part of this graph.
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edge_set.contains(edge)
    }

    /// Outgoing edges of `artifact` (its direct dependencies), in insertion order.
    pub fn edges_from<'a>(&'a self, artifact: &Artifact) -> impl Iterator<Item = &'a Edge> + 'a {
        self.adjacent(artifact, &self.outgoing)
    }

    /// Incoming edges of `artifact` (its direct dependents), in insertion order.
    pub fn edges_to<'a>(&'a self, artifact: &Artifact) -> impl Iterator<Item = &'a Edge> + 'a {
        self.adjacent(artifact, &self.incoming)
    }

    fn adjacent<'a>(
        &'a self,
        artifact: &Artifact,
        index: &'a [Vec<usize>],
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        self.node_index
            .get(artifact)
            .map(|&i| index[i].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&e| &self.edges[e])
    }

    /// Direct dependencies of `artifact`. A child reached by several scopes appears once per edge.
    pub fn children_of<'a>(&'a self, artifact: &Artifact) -> Vec<&'a Arc<Artifact>> {
        self.edges_from(artifact).map(|e| &e.child).collect()
    }

    /// Direct dependents of `artifact`.
    pub fn parents_of<'a>(&'a self, artifact: &Artifact) -> Vec<&'a Arc<Artifact>> {
        self.edges_to(artifact).map(|e| &e.parent).collect()
    }

    /// Nodes reachable from the root along edge direction, including the root.
    pub fn reachable_from_root(&self) -> HashSet<&Artifact> {
        self.closure(0, Direction::Dependencies)
    }

    /// `artifact` plus every node that transitively depends on it.
    ///
    /// Empty if `artifact` is not in the graph.
    pub fn ancestors_of(&self, artifact: &Artifact) -> HashSet<&Artifact> {
        match self.node_index.get(artifact) {
            Some(&start) => self.closure(start, Direction::Dependents),
            None => HashSet::new(),
        }
    }

    /// Breadth-first closure from `start`.
    fn closure(&self, start: usize, direction: Direction) -> HashSet<&Artifact> {
        let index = match direction {
            Direction::Dependencies => &self.outgoing,
            Direction::Dependents => &self.incoming,
        };
        let mut visited: HashSet<usize> = HashSet::from([start]);
        let mut queue: VecDeque<usize> = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for &e in &index[current] {
                let edge = &self.edges[e];
                let next = match direction {
                    Direction::Dependencies => &edge.child,
                    Direction::Dependents => &edge.parent,
                };
                let idx = self.index_of(next);
                if visited.insert(idx) {
                    queue.push_back(idx);
                }
            }
        }

        visited.into_iter().map(|i| &*self.nodes[i]).collect()
    }

    /// Nodes ordered so that every dependency precedes its dependents.
    ///
    /// Ties are broken by insertion order, so the result is deterministic.
    pub fn topological_order(&self) -> Vec<&Arc<Artifact>> {
        let mut state = vec![Visit::Unvisited; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());

        for start in 0..self.nodes.len() {
            if state[start] != Visit::Unvisited {
                continue;
            }
            state[start] = Visit::InProgress;
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                if let Some(&e) = self.outgoing[node].get(frame.1) {
                    frame.1 += 1;
                    let child = self.index_of(&self.edges[e].child);
                    if state[child] == Visit::Unvisited {
                        state[child] = Visit::InProgress;
                        stack.push((child, 0));
                    }
                } else {
                    state[node] = Visit::Done;
                    order.push(&self.nodes[node]);
                    stack.pop();
                }
            }
        }

        order
    }

    /// Returns node indices along a cycle (first index repeated at the end), if any.
    fn find_cycle(&self) -> Option<Vec<usize>> {
        let mut state = vec![Visit::Unvisited; self.nodes.len()];

        for start in 0..self.nodes.len() {
            if state[start] != Visit::Unvisited {
                continue;
            }
            state[start] = Visit::InProgress;
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                if let Some(&e) = self.outgoing[node].get(frame.1) {
                    frame.1 += 1;
                    let child = self.index_of(&self.edges[e].child);
                    match state[child] {
                        Visit::Unvisited => {
                            state[child] = Visit::InProgress;
                            stack.push((child, 0));
                        }
                        Visit::InProgress => {
                            let pos = stack.iter().position(|&(n, _)| n == child).unwrap_or(0);
                            let mut path: Vec<usize> = stack[pos..].iter().map(|&(n, _)| n).collect();
                            path.push(child);
                            return Some(path);
                        }
                        Visit::Done => {}
                    }
                } else {
                    state[node] = Visit::Done;
                    stack.pop();
                }
            }
        }

        None
    }

    fn index_of(&self, artifact: &Artifact) -> usize {
        // Every edge endpoint is a node; assemble() guarantees it.
        self.node_index.get(artifact).copied().unwrap_or_default()
    }

    /// Create the sub-graph of nodes and edges accepted by `visitor`.
    ///
    /// ## Algorithm
    ///
    /// 1. Seed the output with the root
    /// 2. For each edge, in order:
    ///    - skip it unless `visit_edge` accepts it
    ///    - each endpoint must already be in the output or be accepted by `visit_node`
    ///    - if both endpoints pass, add them (once) and the edge
    /// 3. Return a graph with the same root
    ///
    /// The root is kept even if the visitor rejects it; that rejection is
    /// logged as a misconfiguration. Nodes with no surviving edge are dropped,
    /// except the root.
    pub fn create_sub_graph<V: GraphVisitor + ?Sized>(&self, visitor: &V) -> DependencyGraph {
        if !visitor.visit_node(&self.root) {
            warn!(root = %self.root, "visitor rejected the root node; keeping it");
        }

        let mut nodes: Vec<Arc<Artifact>> = vec![Arc::clone(&self.root)];
        let mut included: HashSet<&Artifact> = HashSet::from([&*self.root]);
        let mut edges: Vec<Edge> = Vec::new();

        for edge in &self.edges {
            if !visitor.visit_edge(edge) {
                continue;
            }
            let accepts = |node: &Arc<Artifact>| {
                included.contains(&**node) || visitor.visit_node(node)
            };
            if !(accepts(&edge.parent) && accepts(&edge.child)) {
                continue;
            }
            for endpoint in [&edge.parent, &edge.child] {
                if included.insert(&**endpoint) {
                    nodes.push(Arc::clone(endpoint));
                }
            }
            edges.push(edge.clone());
        }

        debug!(
            root = %self.root,
            nodes_in = self.num_nodes(),
            edges_in = self.num_edges(),
            nodes_out = nodes.len(),
            edges_out = edges.len(),
            "created sub-graph"
        );

        Self::assemble(Arc::clone(&self.root), nodes, edges)
    }

    /// Deterministic fingerprint of root, nodes and edges (xxh64, hex).
    pub fn fingerprint(&self) -> String {
        let canonical = CanonicalGraph {
            schema_version: DEPGRAPH_SCHEMA_VERSION,
            root: &self.root,
            nodes: self.nodes.iter().map(|n| &**n).collect(),
            edges: self
                .edges
                .iter()
                .map(|e| (&*e.parent, &*e.child, e.scope.as_str()))
                .collect(),
        };
        canonical_hash_hex(&canonical)
    }
}

impl PartialEq for DependencyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.nodes == other.nodes && self.edges == other.edges
    }
}

impl Eq for DependencyGraph {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::scope;
    use crate::visitor::{AcceptAll, FnVisitor};

    fn artifact(id: &str) -> Artifact {
        Artifact::new("org.example", id, "1.0")
    }

    /// r -> a (compile), r -> b (runtime), a -> c (test)
    fn sample_graph() -> DependencyGraph {
        let mut builder = DependencyGraph::builder(artifact("r"));
        builder
            .add_dependency(artifact("r"), artifact("a"), scope::COMPILE)
            .add_dependency(artifact("r"), artifact("b"), scope::RUNTIME)
            .add_dependency(artifact("a"), artifact("c"), scope::TEST);
        builder.build().unwrap()
    }

    #[test]
    fn test_build_preserves_insertion_order() {
        let graph = sample_graph();

        let ids: Vec<_> = graph.nodes().iter().map(|n| n.artifact_id().unwrap()).collect();
        assert_eq!(ids, vec!["r", "a", "b", "c"]);
        assert_eq!(graph.edges()[2].scope, scope::TEST);
        assert_eq!(**graph.root(), artifact("r"));
    }

    #[test]
    fn test_dangling_edge_fails_at_build() {
        let mut builder = DependencyGraph::builder(artifact("r"));
        builder.add_edge(artifact("r"), artifact("missing"), scope::COMPILE);

        let err = builder.build().unwrap_err();
        assert!(matches!(
            err,
            GraphError::DanglingEdge { ref missing, .. } if missing == "org.example:missing:1.0"
        ));
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut builder = DependencyGraph::builder(artifact("r"));
        builder
            .add_dependency(artifact("r"), artifact("a"), scope::COMPILE)
            .add_dependency(artifact("a"), artifact("b"), scope::COMPILE)
            .add_dependency(artifact("b"), artifact("a"), scope::RUNTIME);

        match builder.build() {
            Err(GraphError::CycleDetected { path }) => {
                assert_eq!(path.first(), path.last());
                assert_eq!(path.len(), 3);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let mut builder = DependencyGraph::builder(artifact("r"));
        builder.add_edge(artifact("r"), artifact("r"), scope::COMPILE);

        assert!(matches!(builder.build(), Err(GraphError::CycleDetected { .. })));
    }

    #[test]
    fn test_duplicate_nodes_and_edges_collapse() {
        let mut builder = DependencyGraph::builder(artifact("r"));
        builder
            .add_dependency(artifact("r"), artifact("a"), scope::COMPILE)
            .add_dependency(artifact("r"), artifact("a"), scope::COMPILE)
            .add_dependency(artifact("r"), artifact("a"), scope::TEST);
        let graph = builder.build().unwrap();

        assert_eq!(graph.num_nodes(), 2);
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.children_of(&artifact("r")).len(), 2);
    }

    #[test]
    fn test_deserialized_empty_type_is_same_node() {
        let typed_empty: Artifact = serde_json::from_str(
            r#"{"group_id":"org.example","artifact_id":"a","version":"1.0","type":""}"#,
        )
        .unwrap();

        let mut builder = DependencyGraph::builder(artifact("r"));
        builder
            .add_dependency(artifact("r"), artifact("a"), scope::COMPILE)
            .add_dependency(artifact("r"), typed_empty, scope::RUNTIME);
        let graph = builder.build().unwrap();

        assert_eq!(graph.num_nodes(), 2);
        assert_eq!(graph.num_edges(), 2);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut builder = DependencyGraph::builder(artifact("r"));
        builder
            .add_dependency(artifact("r"), artifact("a"), scope::COMPILE)
            .add_dependency(artifact("r"), artifact("b"), scope::COMPILE)
            .add_dependency(artifact("a"), artifact("d"), scope::COMPILE)
            .add_dependency(artifact("b"), artifact("d"), scope::COMPILE);

        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_topological_order_puts_dependencies_first() {
        let graph = sample_graph();
        let order: Vec<_> = graph
            .topological_order()
            .into_iter()
            .map(|n| n.artifact_id().unwrap())
            .collect();

        assert_eq!(order, vec!["c", "a", "b", "r"]);
    }

    #[test]
    fn test_reachability_and_ancestors() {
        let mut builder = DependencyGraph::builder(artifact("r"));
        builder
            .add_dependency(artifact("r"), artifact("a"), scope::COMPILE)
            .add_dependency(artifact("a"), artifact("c"), scope::COMPILE)
            .add_dependency(artifact("x"), artifact("c"), scope::COMPILE);
        let graph = builder.build().unwrap();

        let reachable = graph.reachable_from_root();
        assert_eq!(reachable.len(), 3);
        assert!(!reachable.contains(&artifact("x")));

        let ancestors = graph.ancestors_of(&artifact("c"));
        assert_eq!(ancestors.len(), 4);
        assert!(graph.ancestors_of(&artifact("nope")).is_empty());
    }

    #[test]
    fn test_accept_all_copies_graph() {
        let graph = sample_graph();
        let copy = graph.create_sub_graph(&AcceptAll);

        assert_eq!(copy, graph);
        assert_eq!(copy.fingerprint(), graph.fingerprint());
    }

    #[test]
    fn test_sub_graph_shares_node_identity() {
        let graph = sample_graph();
        let sub = graph.create_sub_graph(&AcceptAll);

        assert!(Arc::ptr_eq(sub.root(), graph.root()));
        for node in sub.nodes() {
            assert!(Arc::ptr_eq(node, graph.node(node).unwrap()));
        }
    }

    #[test]
    fn test_root_kept_when_visitor_rejects_everything() {
        let graph = sample_graph();
        let sub = graph.create_sub_graph(&FnVisitor::new(|_: &Edge| false, |_: &Artifact| false));

        assert_eq!(sub.num_nodes(), 1);
        assert_eq!(sub.num_edges(), 0);
        assert_eq!(sub.root(), graph.root());
    }

    #[test]
    fn test_root_kept_when_node_visitor_rejects_root() {
        let graph = sample_graph();
        let not_root = |n: &Artifact| n.artifact_id() != Some("r");
        let sub = graph.create_sub_graph(&FnVisitor::new(|_: &Edge| true, not_root));

        // The root is already included, so its edges survive on endpoint acceptance.
        assert_eq!(sub, graph);
    }

    #[test]
    fn test_rejected_endpoint_drops_edge() {
        let graph = sample_graph();
        let no_c = |n: &Artifact| n.artifact_id() != Some("c");
        let sub = graph.create_sub_graph(&FnVisitor::new(|_: &Edge| true, no_c));

        assert!(!sub.contains_node(&artifact("c")));
        assert_eq!(sub.num_edges(), 2);
        for edge in sub.edges() {
            assert!(sub.contains_node(&edge.parent));
            assert!(sub.contains_node(&edge.child));
        }
    }

    #[test]
    fn test_input_graph_untouched_by_filtering() {
        let graph = sample_graph();
        let before = graph.fingerprint();
        let _ = graph.create_sub_graph(&FnVisitor::new(|_: &Edge| false, |_: &Artifact| true));

        assert_eq!(graph.fingerprint(), before);
        assert_eq!(graph.num_edges(), 3);
    }

    #[test]
    fn test_contains_edge_checks_scope() {
        let graph = sample_graph();
        let r = graph.node(&artifact("r")).unwrap();
        let a = graph.node(&artifact("a")).unwrap();

        assert!(graph.contains_edge(&Edge::new(Arc::clone(r), Arc::clone(a), scope::COMPILE)));
        assert!(!graph.contains_edge(&Edge::new(Arc::clone(r), Arc::clone(a), scope::RUNTIME)));
    }
}
