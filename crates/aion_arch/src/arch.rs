//! The resolved routing architecture.

use crate::direct::DirectInf;
use crate::grid::DeviceGrid;
use crate::ids::{SegmentId, SwitchId, TileTypeId};
use crate::scatter_gather::ScatterGatherPattern;
use crate::segment::{Directionality, SegmentInf};
use crate::switch::ArchSwitch;
use crate::switchblock::{SwitchBlockInf, SwitchBlockType};
use crate::tile::PhysicalTileType;
use serde::{Deserialize, Serialize};

/// Device-wide routing parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutingParams {
    /// Wire directionality of the routing fabric.
    pub directionality: Directionality,
    /// Switch-block topology.
    pub sb_type: SwitchBlockType,
    /// Switch-block flexibility: tracks each incoming track connects to.
    pub fs: u32,
    /// Switch from tracks to input pins.
    pub wire_to_ipin_switch: SwitchId,
    /// Switch from tracks to input pins on another die, if any.
    pub wire_to_ipin_switch_between_dice: Option<SwitchId>,
    /// Zero-delay switch for SOURCE/SINK hookups.
    pub delayless_switch: SwitchId,
}

/// A complete, name-resolved routing architecture.
///
/// All cross references are typed ids into the tables of this struct. The
/// empty tile type is always present at [`TileTypeId::EMPTY`], and the
/// delayless switch is always the last switch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    /// Device-wide routing parameters.
    pub routing: RoutingParams,
    /// Switch table.
    pub switches: Vec<ArchSwitch>,
    /// Segment types in declaration order (the unified segment list).
    pub segments: Vec<SegmentInf>,
    /// Physical tile types.
    pub tile_types: Vec<PhysicalTileType>,
    /// The device grid.
    pub grid: DeviceGrid,
    /// Custom switch blocks.
    pub switchblocks: Vec<SwitchBlockInf>,
    /// Scatter-gather patterns.
    pub scatter_gather: Vec<ScatterGatherPattern>,
    /// Direct connections.
    pub directs: Vec<DirectInf>,
}

impl Architecture {
    /// Returns a switch by id.
    pub fn switch(&self, id: SwitchId) -> &ArchSwitch {
        &self.switches[id.index()]
    }

    /// Returns a segment type by id.
    pub fn segment(&self, id: SegmentId) -> &SegmentInf {
        &self.segments[id.index()]
    }

    /// Returns a tile type by id.
    pub fn tile_type(&self, id: TileTypeId) -> &PhysicalTileType {
        &self.tile_types[id.index()]
    }

    /// Looks up a switch by name.
    pub fn find_switch(&self, name: &str) -> Option<SwitchId> {
        self.switches
            .iter()
            .position(|s| s.name == name)
            .map(SwitchId::from_index)
    }

    /// Looks up a segment type by name.
    pub fn find_segment(&self, name: &str) -> Option<SegmentId> {
        self.segments
            .iter()
            .position(|s| s.name == name)
            .map(SegmentId::from_index)
    }

    /// Looks up a tile type by name.
    pub fn find_tile_type(&self, name: &str) -> Option<TileTypeId> {
        self.tile_types
            .iter()
            .position(|t| t.name == name)
            .map(TileTypeId::from_index)
    }
}
