use crate::types::RelationshipKind;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Directed graph of reconstructed CALLS / REFERENCES edges keyed by FQN
#[derive(Debug, Default)]
pub struct RelationGraph {
    graph: DiGraph<String, RelationshipKind>,
    index: HashMap<String, NodeIndex>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, fqn: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(fqn) {
            return idx;
        }
        let idx = self.graph.add_node(fqn.to_string());
        self.index.insert(fqn.to_string(), idx);
        idx
    }

    /// Add an edge; parallel edges are kept, one per occurrence
    pub fn add_edge(&mut self, from: &str, to: &str, kind: RelationshipKind) {
        let from = self.node(from);
        let to = self.node(to);
        self.graph.add_edge(from, to, kind);
    }

    /// Distinct targets of outgoing `kind` edges, in first-seen order
    pub fn targets(&self, fqn: &str, kind: RelationshipKind) -> Vec<&str> {
        self.neighbors(fqn, kind, Direction::Outgoing)
    }

    /// Distinct sources of incoming `kind` edges, in first-seen order
    pub fn sources(&self, fqn: &str, kind: RelationshipKind) -> Vec<&str> {
        self.neighbors(fqn, kind, Direction::Incoming)
    }

    fn neighbors(&self, fqn: &str, kind: RelationshipKind, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.index.get(fqn) else {
            return Vec::new();
        };

        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, direction)
            .filter(|edge| *edge.weight() == kind)
            .collect();
        // petgraph walks adjacency lists newest first
        edges.sort_by_key(|edge| edge.id());

        let mut out: Vec<&str> = Vec::new();
        for edge in edges {
            let other = match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            };
            let name = self.graph[other].as_str();
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }

    pub fn edge_count(&self, kind: RelationshipKind) -> usize {
        self.graph
            .edge_references()
            .filter(|edge| *edge.weight() == kind)
            .count()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}
