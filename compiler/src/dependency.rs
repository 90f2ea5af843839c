//! Name-keyed wrapper around [`Graph`].
//!
//! `add_dependency(provider, dependent)` inserts the edge
//! `dependent -> provider`, so [`DependencyGraph::topo_sorted`] lists
//! dependents before their providers. Emitting providers first means
//! reversing that order.

use std::collections::HashMap;
use std::fmt::Write;

use crate::graph::{Graph, NodeId};

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: Graph,
    names: HashMap<NodeId, String>,
    ids:   HashMap<String, Vec<NodeId>>,
}

/// Names of the nodes lying on a cycle, sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCycle(pub Vec<String>);

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    pub fn add_node(&mut self, name: &str) {
        let id = self.graph.add_node();
        self.names.insert(id, name.to_string());
        self.ids.entry(name.to_string()).or_default().push(id);
    }

    /// Whether `name` owns at least one node.
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    pub fn add_dependency(&mut self, provider: &str, dependent: &str) {
        let providers = self.node_ids(provider).to_vec();
        let dependents = self.node_ids(dependent).to_vec();
        for &provider_id in &providers {
            for &dependent_id in &dependents {
                if !self.graph.has_edge(dependent_id, provider_id) {
                    self.graph.add_edge(dependent_id, provider_id);
                }
            }
        }
    }

    /// Root-first order: every dependent comes before its providers.
    pub fn topo_sorted(&self) -> Result<Vec<String>, DependencyCycle> {
        match self.graph.topo_sorted() {
            Ok(ids) => Ok(ids.into_iter().map(|id| self.names[&id].clone()).collect()),
            Err(_) => Err(DependencyCycle(self.cycled())),
        }
    }

    pub fn cycled(&self) -> Vec<String> {
        self.names_of(self.graph.get_cycled())
    }

    /// Graphviz rendering, one `"name(id)"` vertex per node.
    pub fn dump(&self) -> String {
        let label = |id: &NodeId| format!("\"{}({})\"", self.names[id], id.index());
        let mut out = String::from("digraph {\n");
        for id in self.graph.nodes() {
            let _ = writeln!(out, "{}", label(id));
        }
        for (src, dst) in self.graph.edges() {
            let _ = writeln!(out, "{} -> {}", label(src), label(dst));
        }
        out.push_str("}\n");
        out
    }

    fn node_ids(&self, name: &str) -> &[NodeId] {
        match self.ids.get(name) {
            Some(ids) => ids,
            None => panic!("no node named [{}]", name),
        }
    }

    fn names_of(&self, ids: impl IntoIterator<Item = NodeId>) -> Vec<String> {
        let mut names: Vec<String> = ids.into_iter().map(|id| self.names[&id].clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}
