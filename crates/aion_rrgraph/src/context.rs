//! Per-build state shared by the node and edge stages.
//!
//! A [`BuildContext`] is created once per build from the architecture and
//! the resolved options, read by every stage, and dropped with the build.
//! The graph builder is the only thing the stages write to.

use crate::bridge::BridgePlan;
use crate::channel::{ChanDetails, ChanSegDetails};
use crate::conn_block::PinLocTable;
use crate::fc::FcTable;
use crate::graph::{CostIndexInfo, RrType, CHAN_COST_INDEX_START};
use crate::scatter_gather::ScatterGatherLinks;
use crate::segments::SegmentMap;
use crate::switchblock::{CustomSbMap, SblockPattern, SwitchBlockConn};
use aion_arch::{Architecture, Directionality, SwitchId};
use aion_common::Axis;
use aion_config::ChannelWidths;

/// How track-to-track connections are decided.
pub(crate) enum SwitchBlocks {
    /// Closed-form bidirectional topology.
    Bidir(SwitchBlockConn),
    /// Precomputed unidirectional mux pattern.
    Unidir(SblockPattern),
    /// Architect-specified switch blocks.
    Custom(CustomSbMap),
}

/// Connection-block maps of one tile type, indexed `[x, y]` by channel axis.
pub(crate) struct TilePinMaps {
    /// Input pins reached from each physical track.
    pub track_to_ipin: [PinLocTable; 2],
    /// Tracks driven by each output pin; bidirectional graphs only.
    pub opin_to_track: [PinLocTable; 2],
}

/// Layout of the cost-index table.
///
/// SOURCE, SINK, OPIN, and IPIN take indices 0 to 3, then come the
/// segment types of the X axis, of the Y axis, of the Z axis, and finally
/// one entry for inter-die bridges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CostLayout {
    pub num_x: usize,
    pub num_y: usize,
    pub num_z: usize,
}

impl CostLayout {
    pub fn chan(&self, axis: Axis, local: usize) -> usize {
        CHAN_COST_INDEX_START
            + match axis {
                Axis::X => local,
                Axis::Y => self.num_x + local,
                Axis::Z => self.num_x + self.num_y + local,
            }
    }

    pub fn bridge(&self) -> usize {
        CHAN_COST_INDEX_START + self.num_x + self.num_y + self.num_z
    }

    /// The cost-index table, naming wire entries after their segment types.
    pub fn infos(&self, x: &[String], y: &[String], z: &[String]) -> Vec<CostIndexInfo> {
        let fixed = [RrType::Source, RrType::Sink, RrType::Opin, RrType::Ipin]
            .into_iter()
            .map(|kind| CostIndexInfo { kind, segment: None });
        let wires = [(RrType::ChanX, x), (RrType::ChanY, y), (RrType::ChanZ, z)]
            .into_iter()
            .flat_map(|(kind, names)| {
                names.iter().map(move |name| CostIndexInfo {
                    kind,
                    segment: Some(name.clone()),
                })
            });
        let bridge = CostIndexInfo {
            kind: RrType::ChanZ,
            segment: None,
        };
        fixed.chain(wires).chain(std::iter::once(bridge)).collect()
    }
}

/// Everything the stages of one build read.
pub(crate) struct BuildContext<'a> {
    pub arch: &'a Architecture,
    pub directionality: Directionality,
    pub is_global: bool,
    pub widths: ChannelWidths,
    pub segments: SegmentMap,
    pub chan_x: ChanDetails,
    pub chan_y: ChanDetails,
    pub fc_out: FcTable,
    pub pin_maps: Vec<TilePinMaps>,
    pub switch_blocks: SwitchBlocks,
    pub sg_links: ScatterGatherLinks,
    pub bridges: BridgePlan,
    pub costs: CostLayout,
    /// Requested widths of a global graph, whose single wire per channel
    /// carries the whole channel.
    pub global_widths: Option<ChannelWidths>,
    pub wire_to_ipin_switch: SwitchId,
    pub delayless_switch: SwitchId,
}

impl BuildContext<'_> {
    /// Capacity of a wire in channel `chan` of `axis`.
    pub fn wire_capacity(&self, axis: Axis, chan: usize) -> u32 {
        let Some(widths) = &self.global_widths else {
            return 1;
        };
        let list = match axis {
            Axis::Y => &widths.y_list,
            _ => &widths.x_list,
        };
        list.get(chan).map_or(1, |&w| w as u32)
    }

    pub fn width(&self) -> usize {
        self.arch.grid.width()
    }

    pub fn height(&self) -> usize {
        self.arch.grid.height()
    }

    pub fn layers(&self) -> usize {
        self.arch.grid.layers()
    }

    /// Returns `true` if `layer` carries routing channels.
    pub fn routed(&self, layer: usize) -> bool {
        self.arch.grid.has_inter_cluster_routing(layer)
    }

    /// Layers with routing channels, in order.
    pub fn routed_layers(&self) -> Vec<usize> {
        (0..self.layers()).filter(|&l| self.routed(l)).collect()
    }

    /// Channel layers whose wires serve the pins of a tile on `layer`.
    ///
    /// A die without routing borrows the channels of every routed die.
    pub fn pin_layers(&self, layer: usize) -> Vec<usize> {
        if self.routed(layer) {
            vec![layer]
        } else {
            self.routed_layers()
        }
    }

    pub fn chan(&self, axis: Axis) -> &ChanDetails {
        match axis {
            Axis::Y => &self.chan_y,
            _ => &self.chan_x,
        }
    }

    /// Tracks of the channel segment at node position `(x, y)`.
    pub fn tracks_at(&self, axis: Axis, x: usize, y: usize) -> &[ChanSegDetails] {
        self.chan(axis).at(x, y)
    }

    /// Largest channel width of an axis.
    pub fn max_width(&self, axis: Axis) -> usize {
        match axis {
            Axis::Y => self.widths.y_max,
            _ => self.widths.x_max,
        }
    }

    /// Switch connecting a wire to an input pin on `pin_layer`.
    pub fn ipin_switch(&self, wire_layer: usize, pin_layer: usize) -> SwitchId {
        if wire_layer == pin_layer {
            self.wire_to_ipin_switch
        } else {
            self.arch
                .routing
                .wire_to_ipin_switch_between_dice
                .unwrap_or(self.wire_to_ipin_switch)
        }
    }
}

/// Channel axis and node kind of a channel side.
pub(crate) fn chan_kind(axis: Axis) -> RrType {
    match axis {
        Axis::X => RrType::ChanX,
        Axis::Y => RrType::ChanY,
        Axis::Z => RrType::ChanZ,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_layout_orders_axes() {
        let costs = CostLayout {
            num_x: 2,
            num_y: 1,
            num_z: 1,
        };
        assert_eq!(costs.chan(Axis::X, 1), 5);
        assert_eq!(costs.chan(Axis::Y, 0), 6);
        assert_eq!(costs.chan(Axis::Z, 0), 7);
        assert_eq!(costs.bridge(), 8);
        let names = |n: &[&str]| n.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let infos = costs.infos(&names(&["L1", "L4"]), &names(&["L1"]), &names(&["V"]));
        assert_eq!(infos.len(), 9);
        assert_eq!(infos[2].kind, RrType::Opin);
        assert_eq!(infos[5].segment.as_deref(), Some("L4"));
        assert_eq!(infos[6].kind, RrType::ChanY);
        assert_eq!(infos[8], CostIndexInfo { kind: RrType::ChanZ, segment: None });
    }
}
