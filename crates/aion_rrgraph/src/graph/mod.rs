//! The finished routing resource graph and its construction API.
//!
//! Edges are stored compressed by driving node: the outgoing edges of node
//! `n` occupy `edges[first_edge[n]..first_edge[n + 1]]`, configurable edges
//! before non-configurable ones.

pub mod builder;
pub mod lookup;
pub mod node;

pub use builder::GraphBuilder;
pub use lookup::NodeLookup;
pub use node::{CostIndexInfo, NodeRc, RrEdge, RrNode, RrType, CHAN_COST_INDEX_START};

use crate::ids::{RrEdgeId, RrNodeId};
use aion_arch::ArchSwitch;
use aion_common::{ContentHash, ContentHasher};
use serde::{Deserialize, Serialize};

/// A routing resource graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RrGraph {
    /// Node table.
    pub nodes: Vec<RrNode>,
    /// Edge table, grouped by driving node.
    pub edges: Vec<RrEdge>,
    /// Start of each node's edges; one extra trailing entry.
    pub first_edge: Vec<usize>,
    /// Start of each node's non-configurable edges.
    pub first_non_configurable: Vec<usize>,
    /// Number of edges driving each node.
    pub fan_in: Vec<u32>,
    /// Deduplicated node RC values.
    pub rc_table: Vec<NodeRc>,
    /// Meaning of each cost index.
    pub cost_indices: Vec<CostIndexInfo>,
    /// Switch table the edges refer to.
    pub switches: Vec<ArchSwitch>,
    #[serde(skip)]
    lookup: NodeLookup,
}

impl RrGraph {
    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Returns a node by id.
    pub fn node(&self, id: RrNodeId) -> &RrNode {
        &self.nodes[id.index()]
    }

    /// Returns an edge by id.
    pub fn edge(&self, id: RrEdgeId) -> &RrEdge {
        &self.edges[id.index()]
    }

    /// All edges leaving a node.
    pub fn edges_from(&self, id: RrNodeId) -> &[RrEdge] {
        &self.edges[self.first_edge[id.index()]..self.first_edge[id.index() + 1]]
    }

    /// Configurable edges leaving a node.
    pub fn configurable_edges(&self, id: RrNodeId) -> &[RrEdge] {
        &self.edges[self.first_edge[id.index()]..self.first_non_configurable[id.index()]]
    }

    /// Non-configurable edges leaving a node.
    pub fn non_configurable_edges(&self, id: RrNodeId) -> &[RrEdge] {
        &self.edges[self.first_non_configurable[id.index()]..self.first_edge[id.index() + 1]]
    }

    /// Number of edges driving a node.
    pub fn fan_in(&self, id: RrNodeId) -> u32 {
        self.fan_in[id.index()]
    }

    /// RC values of a node.
    pub fn node_rc(&self, id: RrNodeId) -> NodeRc {
        self.rc_table[self.node(id).rc.index()]
    }

    /// The spatial lookup. Empty on a graph loaded from JSON.
    pub fn lookup(&self) -> &NodeLookup {
        &self.lookup
    }

    /// Hashes the node and edge tables.
    ///
    /// Two builds with equal fingerprints have identical node and edge tables.
    pub fn fingerprint(&self) -> ContentHash {
        let mut h = ContentHasher::new();
        h.write_u32(self.nodes.len() as u32);
        for node in &self.nodes {
            h.write_u32(node.kind.index() as u32);
            for v in [
                node.layer_low,
                node.layer_high,
                node.x_low,
                node.y_low,
                node.x_high,
                node.y_high,
                node.ptc,
                node.cost_index,
            ] {
                h.write_u32(v as u32);
            }
            h.write_u32(node.sides.iter().fold(0, |acc, s| acc | 1 << s.index()));
            h.write_u32(node.direction as u32);
            h.write_u32(node.capacity);
            let rc = self.rc_table[node.rc.index()];
            h.write_f32(rc.r);
            h.write_f32(rc.c);
        }
        h.write_u32(self.edges.len() as u32);
        for edge in &self.edges {
            h.write_u32(edge.from.as_raw());
            h.write_u32(edge.to.as_raw());
            h.write_u32(edge.switch.as_raw());
            h.write_u32(u32::from(edge.configurable));
        }
        h.finish()
    }

    /// Serializes the graph as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RcIndex;
    use aion_arch::{SwitchId, SwitchKind};
    use aion_common::{Direction, SideSet};

    fn small_graph(ptc: usize) -> RrGraph {
        let switches = vec![ArchSwitch {
            name: "mux".into(),
            kind: SwitchKind::Mux,
            r: 100.0,
            cin: 0.0,
            cout: 0.0,
            tdel: 0.0,
        }];
        let mut b = GraphBuilder::new(1, 3, 3, &switches);
        let a = b.alloc_node();
        let z = b.alloc_node();
        let rc = b.rc_index(5.0, 1e-15);
        for (id, p) in [(a, ptc), (z, ptc + 1)] {
            b.init_node(
                id,
                RrNode {
                    kind: RrType::ChanY,
                    layer_low: 0,
                    layer_high: 0,
                    x_low: 1,
                    y_low: 1,
                    x_high: 1,
                    y_high: 1,
                    ptc: p,
                    sides: SideSet::EMPTY,
                    direction: Direction::Inc,
                    capacity: 1,
                    cost_index: 5,
                    rc,
                },
            )
            .unwrap();
        }
        b.propose_edge(a, z, SwitchId::from_raw(0));
        b.commit_edges();
        b.finish(Vec::new()).unwrap()
    }

    #[test]
    fn accessors() {
        let g = small_graph(0);
        let a = RrNodeId::from_raw(0);
        assert_eq!(g.num_nodes(), 2);
        assert_eq!(g.edge(RrEdgeId::from_raw(0)).from, a);
        assert_eq!(g.node_rc(a).r, 5.0);
        assert_eq!(g.node(a).rc, RcIndex::from_raw(0));
        assert_eq!(g.first_edge, vec![0, 1, 1]);
    }

    #[test]
    fn fingerprint_tracks_content() {
        assert_eq!(small_graph(0).fingerprint(), small_graph(0).fingerprint());
        assert_ne!(small_graph(0).fingerprint(), small_graph(2).fingerprint());
    }

    #[test]
    fn json_round_trip_keeps_tables() {
        let g = small_graph(0);
        let back: RrGraph = serde_json::from_str(&g.to_json().unwrap()).unwrap();
        assert_eq!(back.nodes, g.nodes);
        assert_eq!(back.edges, g.edges);
        assert_eq!(back.fingerprint(), g.fingerprint());
    }
}
