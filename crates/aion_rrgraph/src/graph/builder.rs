//! Two-phase graph construction: allocate nodes, propose edges, commit.
//!
//! Node ids are allocated up front by the index stage, so every stage can
//! refer to any node before its attributes exist. Each node is initialized
//! exactly once with [`GraphBuilder::init_node`]. Edges are proposed into a
//! pending buffer, which [`GraphBuilder::commit_edges`] sorts and
//! deduplicates before moving it into the committed set.

use crate::graph::lookup::NodeLookup;
use crate::graph::node::{CostIndexInfo, NodeRc, RrEdge, RrNode};
use crate::graph::RrGraph;
use crate::ids::{RcIndex, RrNodeId};
use aion_arch::{ArchSwitch, SwitchId};
use aion_common::{AionResult, InternalError};
use std::collections::HashMap;

/// The single mutable write target of a build.
pub struct GraphBuilder {
    nodes: Vec<Option<RrNode>>,
    lookup: NodeLookup,
    pending: Vec<RrEdge>,
    edges: Vec<RrEdge>,
    rc_table: Vec<NodeRc>,
    rc_ids: HashMap<(u32, u32), RcIndex>,
    switches: Vec<ArchSwitch>,
}

impl GraphBuilder {
    /// Creates an empty builder for a grid, using `switches` as the edge switch table.
    pub fn new(layers: usize, width: usize, height: usize, switches: &[ArchSwitch]) -> Self {
        Self {
            nodes: Vec::new(),
            lookup: NodeLookup::new(layers, width, height),
            pending: Vec::new(),
            edges: Vec::new(),
            rc_table: Vec::new(),
            rc_ids: HashMap::new(),
            switches: switches.to_vec(),
        }
    }

    /// Allocates an uninitialized node.
    pub fn alloc_node(&mut self) -> RrNodeId {
        let id = RrNodeId::from_index(self.nodes.len());
        self.nodes.push(None);
        id
    }

    /// Number of nodes allocated so far.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The spatial lookup.
    pub fn lookup(&self) -> &NodeLookup {
        &self.lookup
    }

    /// The spatial lookup, for the index stage.
    pub fn lookup_mut(&mut self) -> &mut NodeLookup {
        &mut self.lookup
    }

    /// Returns the attributes of an initialized node.
    pub fn node(&self, id: RrNodeId) -> Option<&RrNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Sets the attributes of a node. Fails if the node is unknown or
    /// already initialized.
    pub fn init_node(&mut self, id: RrNodeId, node: RrNode) -> AionResult<()> {
        let slot = self
            .nodes
            .get_mut(id.index())
            .ok_or_else(|| InternalError::new(format!("node {id} was never allocated")))?;
        if slot.is_some() {
            return Err(InternalError::new(format!("node {id} initialized twice")));
        }
        *slot = Some(node);
        Ok(())
    }

    /// Returns the RC table index for a resistance/capacitance pair.
    pub fn rc_index(&mut self, r: f32, c: f32) -> RcIndex {
        let key = (r.to_bits(), c.to_bits());
        if let Some(&id) = self.rc_ids.get(&key) {
            return id;
        }
        let id = RcIndex::from_index(self.rc_table.len());
        self.rc_table.push(NodeRc { r, c });
        self.rc_ids.insert(key, id);
        id
    }

    /// Proposes an edge. Nothing is stored until [`commit_edges`](Self::commit_edges).
    pub fn propose_edge(&mut self, from: RrNodeId, to: RrNodeId, switch: SwitchId) {
        let configurable = self
            .switches
            .get(switch.index())
            .is_some_and(ArchSwitch::is_configurable);
        self.pending.push(RrEdge {
            from,
            to,
            switch,
            configurable,
        });
    }

    /// Number of proposed edges not yet committed.
    pub fn num_pending(&self) -> usize {
        self.pending.len()
    }

    /// Deduplicates the pending edges and commits them. Returns the number
    /// of edges committed.
    pub fn commit_edges(&mut self) -> usize {
        self.pending.sort_unstable();
        self.pending.dedup();
        let count = self.pending.len();
        self.edges.append(&mut self.pending);
        count
    }

    /// Finishes the graph: checks every node was initialized, removes
    /// duplicates across commits, and partitions each node's edges so the
    /// configurable ones come first.
    pub fn finish(mut self, cost_indices: Vec<CostIndexInfo>) -> AionResult<RrGraph> {
        if !self.pending.is_empty() {
            return Err(InternalError::new(format!(
                "{} proposed edges were never committed",
                self.pending.len()
            )));
        }
        let nodes = self
            .nodes
            .into_iter()
            .enumerate()
            .map(|(i, n)| n.ok_or_else(|| InternalError::new(format!("node {i} never initialized"))))
            .collect::<AionResult<Vec<_>>>()?;

        self.edges
            .sort_unstable_by_key(|e| (e.from, !e.configurable, e.to, e.switch));
        self.edges
            .dedup_by_key(|e| (e.from, e.to, e.switch));
        if let Some(bad) = self.edges.iter().find(|e| e.to.index() >= nodes.len()) {
            return Err(InternalError::new(format!("edge to unknown node {}", bad.to)));
        }

        let mut first_edge = vec![0; nodes.len() + 1];
        let mut first_non_configurable = vec![0; nodes.len()];
        let mut fan_in = vec![0u32; nodes.len()];
        for edge in &self.edges {
            first_edge[edge.from.index() + 1] += 1;
            fan_in[edge.to.index()] += 1;
        }
        for i in 0..nodes.len() {
            first_edge[i + 1] += first_edge[i];
        }
        for (i, slot) in first_non_configurable.iter_mut().enumerate() {
            let out = &self.edges[first_edge[i]..first_edge[i + 1]];
            *slot = first_edge[i] + out.iter().take_while(|e| e.configurable).count();
        }

        Ok(RrGraph {
            nodes,
            edges: self.edges,
            first_edge,
            first_non_configurable,
            fan_in,
            rc_table: self.rc_table,
            cost_indices,
            switches: self.switches,
            lookup: self.lookup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::RrType;
    use aion_arch::SwitchKind;
    use aion_common::{Direction, SideSet};

    fn switches() -> Vec<ArchSwitch> {
        let sw = |name: &str, kind| ArchSwitch {
            name: name.into(),
            kind,
            r: 0.0,
            cin: 0.0,
            cout: 0.0,
            tdel: 0.0,
        };
        vec![sw("mux", SwitchKind::Mux), sw("short", SwitchKind::Short)]
    }

    fn node(kind: RrType, rc: RcIndex) -> RrNode {
        RrNode {
            kind,
            layer_low: 0,
            layer_high: 0,
            x_low: 1,
            y_low: 1,
            x_high: 1,
            y_high: 1,
            ptc: 0,
            sides: SideSet::EMPTY,
            direction: Direction::None,
            capacity: 1,
            cost_index: 0,
            rc,
        }
    }

    fn three_nodes() -> (GraphBuilder, [RrNodeId; 3]) {
        let mut b = GraphBuilder::new(1, 3, 3, &switches());
        let ids = [b.alloc_node(), b.alloc_node(), b.alloc_node()];
        let rc = b.rc_index(0.0, 0.0);
        for id in ids {
            b.init_node(id, node(RrType::ChanX, rc)).unwrap();
        }
        (b, ids)
    }

    #[test]
    fn double_init_rejected() {
        let mut b = GraphBuilder::new(1, 3, 3, &switches());
        let id = b.alloc_node();
        let rc = b.rc_index(1.0, 2.0);
        b.init_node(id, node(RrType::Source, rc)).unwrap();
        assert!(b.init_node(id, node(RrType::Source, rc)).is_err());
        assert!(b.init_node(RrNodeId::from_raw(9), node(RrType::Sink, rc)).is_err());
    }

    #[test]
    fn uninitialized_node_fails_finish() {
        let mut b = GraphBuilder::new(1, 3, 3, &switches());
        b.alloc_node();
        assert!(b.finish(Vec::new()).is_err());
    }

    #[test]
    fn rc_table_deduplicates() {
        let mut b = GraphBuilder::new(1, 3, 3, &switches());
        let a = b.rc_index(10.0, 1e-15);
        let c = b.rc_index(20.0, 1e-15);
        assert_eq!(b.rc_index(10.0, 1e-15), a);
        assert_ne!(a, c);
    }

    #[test]
    fn commit_deduplicates_pending() {
        let (mut b, [n0, n1, _]) = three_nodes();
        let mux = SwitchId::from_raw(0);
        b.propose_edge(n0, n1, mux);
        b.propose_edge(n0, n1, mux);
        assert_eq!(b.num_pending(), 2);
        assert_eq!(b.commit_edges(), 1);
        assert_eq!(b.num_pending(), 0);
        b.propose_edge(n0, n1, mux);
        b.commit_edges();
        let graph = b.finish(Vec::new()).unwrap();
        assert_eq!(graph.num_edges(), 1);
    }

    #[test]
    fn configurable_edges_first() {
        let (mut b, [n0, n1, n2]) = three_nodes();
        b.propose_edge(n0, n1, SwitchId::from_raw(1));
        b.propose_edge(n0, n2, SwitchId::from_raw(0));
        b.commit_edges();
        let graph = b.finish(Vec::new()).unwrap();
        let out = graph.edges_from(n0);
        assert_eq!(out.len(), 2);
        assert!(out[0].configurable);
        assert_eq!(out[0].to, n2);
        assert_eq!(graph.configurable_edges(n0).len(), 1);
        assert_eq!(graph.non_configurable_edges(n0)[0].to, n1);
        assert_eq!(graph.fan_in(n1), 1);
        assert_eq!(graph.fan_in(n0), 0);
    }

    #[test]
    fn uncommitted_edges_fail_finish() {
        let (mut b, [n0, n1, _]) = three_nodes();
        b.propose_edge(n0, n1, SwitchId::from_raw(0));
        assert!(b.finish(Vec::new()).is_err());
    }
}
