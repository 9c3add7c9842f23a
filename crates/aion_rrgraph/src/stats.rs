//! Summary statistics of a finished graph.

use crate::graph::{RrGraph, RrType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Node and edge counts of a graph, plus its fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Total nodes.
    pub num_nodes: usize,
    /// Total edges.
    pub num_edges: usize,
    /// Nodes per kind, by kind name.
    pub nodes_by_type: BTreeMap<String, usize>,
    /// Edges per switch, by switch name.
    pub edges_by_switch: BTreeMap<String, usize>,
    /// Nodes no edge reaches and that reach nothing, SOURCE and SINK excluded.
    pub isolated_nodes: usize,
    /// Hex fingerprint of the node and edge tables.
    pub fingerprint: String,
}

impl GraphStats {
    /// Collects the statistics of `graph`.
    pub fn collect(graph: &RrGraph) -> Self {
        let mut nodes_by_type: BTreeMap<String, usize> =
            RrType::ALL.iter().map(|k| (k.to_string(), 0)).collect();
        for node in &graph.nodes {
            *nodes_by_type.entry(node.kind.to_string()).or_default() += 1;
        }
        let mut edges_by_switch = BTreeMap::new();
        for edge in &graph.edges {
            let name = graph
                .switches
                .get(edge.switch.index())
                .map_or_else(|| edge.switch.index().to_string(), |s| s.name.clone());
            *edges_by_switch.entry(name).or_default() += 1;
        }
        let isolated_nodes = graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !matches!(n.kind, RrType::Source | RrType::Sink))
            .filter(|&(i, _)| graph.fan_in[i] == 0 && graph.first_edge[i] == graph.first_edge[i + 1])
            .count();
        Self {
            num_nodes: graph.num_nodes(),
            num_edges: graph.num_edges(),
            nodes_by_type,
            edges_by_switch,
            isolated_nodes,
            fingerprint: graph.fingerprint().to_string(),
        }
    }
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes: {}", self.num_nodes)?;
        for (kind, count) in self.nodes_by_type.iter().filter(|(_, &c)| c > 0) {
            writeln!(f, "  {kind:<7} {count}")?;
        }
        writeln!(f, "edges: {}", self.num_edges)?;
        for (switch, count) in &self.edges_by_switch {
            writeln!(f, "  {switch:<16} {count}")?;
        }
        if self.isolated_nodes > 0 {
            writeln!(f, "isolated nodes: {}", self.isolated_nodes)?;
        }
        write!(f, "fingerprint: {}", self.fingerprint)
    }
}
