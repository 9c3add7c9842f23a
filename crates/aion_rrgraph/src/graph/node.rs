//! Routing-graph nodes and edges.

use crate::ids::{RcIndex, RrNodeId};
use aion_arch::SwitchId;
use aion_common::{Direction, SideSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a routing resource.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RrType {
    /// Logical source of a driver pin class.
    Source,
    /// Logical sink of a receiver pin class.
    Sink,
    /// Output pin.
    Opin,
    /// Input pin.
    Ipin,
    /// Horizontal wire.
    ChanX,
    /// Vertical wire.
    ChanY,
    /// Zero-length bridge between die layers.
    ChanZ,
}

impl RrType {
    /// All node kinds in index order.
    pub const ALL: [RrType; 7] = [
        RrType::Source,
        RrType::Sink,
        RrType::Opin,
        RrType::Ipin,
        RrType::ChanX,
        RrType::ChanY,
        RrType::ChanZ,
    ];

    /// Returns the dense index of this kind.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for wire nodes.
    pub fn is_channel(self) -> bool {
        matches!(self, RrType::ChanX | RrType::ChanY | RrType::ChanZ)
    }

    /// Returns `true` for pin nodes, which are indexed per side.
    pub fn is_pin(self) -> bool {
        matches!(self, RrType::Opin | RrType::Ipin)
    }
}

impl fmt::Display for RrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RrType::Source => "SOURCE",
            RrType::Sink => "SINK",
            RrType::Opin => "OPIN",
            RrType::Ipin => "IPIN",
            RrType::ChanX => "CHANX",
            RrType::ChanY => "CHANY",
            RrType::ChanZ => "CHANZ",
        })
    }
}

/// A routing resource.
///
/// Wires span `x_low..=x_high` and `y_low..=y_high`; everything else covers
/// the tile it belongs to. Only CHANZ nodes have `layer_high > layer_low`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RrNode {
    /// Node kind.
    pub kind: RrType,
    /// Lowest die layer.
    pub layer_low: usize,
    /// Highest die layer.
    pub layer_high: usize,
    /// Lowest column.
    pub x_low: usize,
    /// Lowest row.
    pub y_low: usize,
    /// Highest column.
    pub x_high: usize,
    /// Highest row.
    pub y_high: usize,
    /// Track, pin, or class number.
    pub ptc: usize,
    /// Tile sides a pin is reachable from; empty for other kinds.
    pub sides: SideSet,
    /// Signal direction of a wire.
    pub direction: Direction,
    /// Number of nets the node can carry.
    pub capacity: u32,
    /// Index into the graph's cost-index table.
    pub cost_index: usize,
    /// Index into the graph's RC table.
    pub rc: RcIndex,
}

impl RrNode {
    /// Returns the number of tiles a wire spans.
    pub fn length(&self) -> usize {
        (self.x_high - self.x_low) + (self.y_high - self.y_low) + 1
    }
}

/// A directed edge between two nodes through an architectural switch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct RrEdge {
    /// Driving node.
    pub from: RrNodeId,
    /// Driven node.
    pub to: RrNodeId,
    /// Switch realizing the connection.
    pub switch: SwitchId,
    /// Whether the switch can be turned off.
    pub configurable: bool,
}

/// Distributed resistance and capacitance of a node.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct NodeRc {
    /// Resistance in ohms.
    pub r: f32,
    /// Capacitance in farads.
    pub c: f32,
}

/// What a cost index stands for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostIndexInfo {
    /// Node kind using the index.
    pub kind: RrType,
    /// Segment type name for wire indices.
    pub segment: Option<String>,
}

/// First cost index of wire nodes; SOURCE, SINK, OPIN, and IPIN use 0 to 3.
pub const CHAN_COST_INDEX_START: usize = 4;
