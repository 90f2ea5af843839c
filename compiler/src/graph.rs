//! Directed graph with topological ordering and cycle extraction.
//!
//! Node ids are allocated monotonically and never reused. Every destructive
//! algorithm (`topo_sorted*`, `get_cycled`) peels a cloned working copy, the
//! original graph is never touched.
//!
//! Misuse (unknown node, duplicate edge, double deletion) is a bug in the
//! caller and panics. A cycle is an expected outcome and is returned as a
//! [`CycleError`].

use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

fn join_ids(nodes: &BTreeSet<NodeId>) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returned when the remaining graph has no root; `nodes` are the ones lying
/// on at least one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("nodes [{}] involved in a cycle(s)", join_ids(.nodes))]
pub struct CycleError {
    pub nodes: BTreeSet<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    next_id: usize,
    nodes:   BTreeSet<NodeId>,
    edges:   Vec<(NodeId, NodeId)>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let inserted = self.nodes.insert(id);
        assert!(inserted, "node {} already exists", id);
        id
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn delete_node(&mut self, id: NodeId) {
        self.expect_node(id);
        self.nodes.remove(&id);
        self.edges.retain(|&(src, dst)| src != id && dst != id);
    }

    pub fn add_edge(&mut self, src: NodeId, dst: NodeId) {
        if self.has_edge(src, dst) {
            panic!("edge {} -> {} already exists", src, dst);
        }
        self.edges.push((src, dst));
    }

    pub fn has_edge(&self, src: NodeId, dst: NodeId) -> bool {
        self.expect_node(src);
        self.expect_node(dst);
        let count = self
            .edges
            .iter()
            .filter(|&&edge| edge == (src, dst))
            .count();
        assert!(count <= 1, "found {} edges {} -> {}", count, src, dst);
        count == 1
    }

    pub fn invert_edges(&mut self) {
        for edge in &mut self.edges {
            *edge = (edge.1, edge.0);
        }
    }

    /// Nodes without incoming edges. Isolated nodes are roots too.
    pub fn roots(&self) -> BTreeSet<NodeId> {
        let destinations: BTreeSet<NodeId> = self.edges.iter().map(|&(_, dst)| dst).collect();
        self.nodes
            .iter()
            .copied()
            .filter(|node| !destinations.contains(node))
            .collect()
    }

    /// Kahn layering: each layer is the set of roots left after removing the
    /// previous layers.
    pub fn topo_sorted_grouped(&self) -> Result<Vec<BTreeSet<NodeId>>, CycleError> {
        let mut work = self.clone();
        let mut layers = Vec::new();
        while !work.nodes.is_empty() {
            let roots = work.roots();
            if roots.is_empty() {
                return Err(CycleError { nodes: work.get_cycled() });
            }
            for &root in &roots {
                work.delete_node(root);
            }
            layers.push(roots);
        }
        Ok(layers)
    }

    /// Flattened [`Graph::topo_sorted_grouped`]; within a layer nodes come in
    /// ascending id order.
    pub fn topo_sorted(&self) -> Result<Vec<NodeId>, CycleError> {
        Ok(self.topo_sorted_grouped()?.into_iter().flatten().collect())
    }

    /// Strips sources, then (with edges inverted) sinks. What survives lies
    /// on a cycle.
    pub fn get_cycled(&self) -> BTreeSet<NodeId> {
        let mut work = self.clone();
        work.strip_roots();
        work.invert_edges();
        work.strip_roots();
        work.nodes
    }

    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    fn strip_roots(&mut self) {
        loop {
            let roots = self.roots();
            if roots.is_empty() {
                break;
            }
            for root in roots {
                self.delete_node(root);
            }
        }
    }

    fn expect_node(&self, id: NodeId) {
        if !self.has_node(id) {
            panic!("no such node {}", id);
        }
    }
}
