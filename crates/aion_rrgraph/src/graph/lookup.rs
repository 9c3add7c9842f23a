//! Spatial node lookup keyed on `(layer, x, y, type, ptc[, side])`.
//!
//! The table is dense over the grid: each cell holds one growable slot list
//! per node kind. Pin kinds are indexed per side, so their slot for pin `p`
//! on side `s` is `p * 4 + s`. Queries outside the grid or past the end of a
//! slot list return `None`; callers treat that as "no such connection".

use crate::graph::node::RrType;
use crate::ids::RrNodeId;
use aion_common::Side;

const NUM_KINDS: usize = RrType::ALL.len();

/// Maps grid positions to routing-graph nodes.
#[derive(Clone, Debug, Default)]
pub struct NodeLookup {
    layers: usize,
    width: usize,
    height: usize,
    slots: Vec<Vec<Option<RrNodeId>>>,
}

impl NodeLookup {
    /// Creates an empty lookup for a `layers x width x height` grid.
    pub fn new(layers: usize, width: usize, height: usize) -> Self {
        Self {
            layers,
            width,
            height,
            slots: vec![Vec::new(); layers * width * height * NUM_KINDS],
        }
    }

    fn cell(&self, layer: usize, x: usize, y: usize, kind: RrType) -> Option<usize> {
        if layer >= self.layers || x >= self.width || y >= self.height {
            return None;
        }
        Some(((layer * self.width + x) * self.height + y) * NUM_KINDS + kind.index())
    }

    fn slot(kind: RrType, ptc: usize, side: Option<Side>) -> usize {
        if kind.is_pin() {
            ptc * 4 + side.map_or(0, Side::index)
        } else {
            ptc
        }
    }

    /// Records `node` at a position. Out-of-grid positions are ignored.
    ///
    /// Pin kinds need a planar side; other kinds ignore `side`.
    pub fn insert(
        &mut self,
        layer: usize,
        x: usize,
        y: usize,
        kind: RrType,
        ptc: usize,
        side: Option<Side>,
        node: RrNodeId,
    ) {
        let Some(cell) = self.cell(layer, x, y, kind) else {
            return;
        };
        let slot = Self::slot(kind, ptc, side);
        let list = &mut self.slots[cell];
        if list.len() <= slot {
            list.resize(slot + 1, None);
        }
        list[slot] = Some(node);
    }

    /// Finds the node at a position.
    ///
    /// For pin kinds `side = None` returns the node on the first side it
    /// appears on.
    pub fn find(
        &self,
        layer: usize,
        x: usize,
        y: usize,
        kind: RrType,
        ptc: usize,
        side: Option<Side>,
    ) -> Option<RrNodeId> {
        let list = &self.slots[self.cell(layer, x, y, kind)?];
        if kind.is_pin() && side.is_none() {
            return Side::PLANAR
                .iter()
                .find_map(|s| list.get(ptc * 4 + s.index()).copied().flatten());
        }
        list.get(Self::slot(kind, ptc, side)).copied().flatten()
    }

    /// Finds a wire node by track number.
    pub fn find_track(
        &self,
        layer: usize,
        x: usize,
        y: usize,
        kind: RrType,
        track: usize,
    ) -> Option<RrNodeId> {
        self.find(layer, x, y, kind, track, None)
    }

    /// Returns every node recorded at a position for one kind, in slot order.
    pub fn nodes_at(&self, layer: usize, x: usize, y: usize, kind: RrType) -> Vec<RrNodeId> {
        self.cell(layer, x, y, kind)
            .map(|cell| self.slots[cell].iter().flatten().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_find_track() {
        let mut lookup = NodeLookup::new(1, 4, 4);
        let id = RrNodeId::from_raw(7);
        lookup.insert(0, 2, 1, RrType::ChanX, 3, None, id);
        assert_eq!(lookup.find_track(0, 2, 1, RrType::ChanX, 3), Some(id));
        assert_eq!(lookup.find_track(0, 2, 1, RrType::ChanX, 2), None);
        assert_eq!(lookup.find_track(0, 2, 1, RrType::ChanY, 3), None);
    }

    #[test]
    fn pins_are_per_side() {
        let mut lookup = NodeLookup::new(1, 3, 3);
        let id = RrNodeId::from_raw(1);
        lookup.insert(0, 1, 1, RrType::Ipin, 2, Some(Side::Left), id);
        assert_eq!(lookup.find(0, 1, 1, RrType::Ipin, 2, Some(Side::Left)), Some(id));
        assert_eq!(lookup.find(0, 1, 1, RrType::Ipin, 2, Some(Side::Top)), None);
        assert_eq!(lookup.find(0, 1, 1, RrType::Ipin, 2, None), Some(id));
    }

    #[test]
    fn out_of_grid_is_absent() {
        let mut lookup = NodeLookup::new(1, 3, 3);
        lookup.insert(0, 5, 5, RrType::ChanY, 0, None, RrNodeId::from_raw(0));
        assert_eq!(lookup.find_track(0, 5, 5, RrType::ChanY, 0), None);
        assert_eq!(lookup.find_track(2, 0, 0, RrType::ChanY, 0), None);
        assert!(lookup.nodes_at(0, 9, 0, RrType::Source).is_empty());
    }

    #[test]
    fn nodes_at_in_slot_order() {
        let mut lookup = NodeLookup::new(1, 3, 3);
        lookup.insert(0, 0, 0, RrType::Source, 2, None, RrNodeId::from_raw(5));
        lookup.insert(0, 0, 0, RrType::Source, 0, None, RrNodeId::from_raw(4));
        assert_eq!(
            lookup.nodes_at(0, 0, 0, RrType::Source),
            vec![RrNodeId::from_raw(4), RrNodeId::from_raw(5)]
        );
    }
}
