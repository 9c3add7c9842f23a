//! Switch-block descriptions: the architecture-level topology choice and
//! fully custom switch blocks built from permutation functions and wireconns.

use crate::ids::SegmentId;
use crate::segment::Directionality;
use crate::switch::SwitchOverride;
use aion_common::{Side, SideSet};
use serde::{Deserialize, Serialize};

/// The switch-block topology used across the device.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchBlockType {
    /// Track `t` connects to track `t` on every side (disjoint).
    Subset,
    /// Wilton's rotating pattern.
    #[default]
    Wilton,
    /// Universal pattern.
    Universal,
    /// Every track to every track.
    Full,
    /// Custom switch blocks from [`SwitchBlockInf`] descriptions.
    Custom,
}

/// Which switch-block locations a custom description applies to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SbLocation {
    /// Every switch block.
    Everywhere,
    /// Switch blocks on the outer ring.
    Perimeter,
    /// The four corner switch blocks.
    Corner,
    /// Perimeter switch blocks that are not corners.
    Fringe,
    /// Switch blocks not on the perimeter.
    Core,
    /// Switch blocks at explicitly listed coordinates.
    XySpecified(XySpec),
}

impl SbLocation {
    /// Returns `true` if the switch block at `(x, y)` matches this location
    /// class on a grid of `width x height` tiles.
    ///
    /// Switch blocks are indexed like tiles and the last switch-block column
    /// is `width - 2`, the last row `height - 2`.
    pub fn matches(&self, x: usize, y: usize, width: usize, height: usize) -> bool {
        let x_max = width.saturating_sub(2);
        let y_max = height.saturating_sub(2);
        let on_x_edge = x == 0 || x == x_max;
        let on_y_edge = y == 0 || y == y_max;
        match self {
            SbLocation::Everywhere => true,
            SbLocation::Perimeter => on_x_edge || on_y_edge,
            SbLocation::Corner => on_x_edge && on_y_edge,
            SbLocation::Fringe => (on_x_edge || on_y_edge) && !(on_x_edge && on_y_edge),
            SbLocation::Core => !on_x_edge && !on_y_edge,
            SbLocation::XySpecified(spec) => spec.x.matches(x, x_max) && spec.y.matches(y, y_max),
        }
    }
}

/// Explicit switch-block coordinates, one spec per axis.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct XySpec {
    /// Column selection.
    #[serde(default)]
    pub x: AxisSpec,
    /// Row selection.
    #[serde(default)]
    pub y: AxisSpec,
}

/// Coordinate selection along one axis.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSpec {
    /// Every coordinate.
    #[default]
    Any,
    /// Exactly one coordinate.
    Exact(usize),
    /// A region `[start, end]`, optionally repeating every `repeat`
    /// coordinates, selecting every `incr`-th coordinate of each repetition.
    Region {
        /// First coordinate.
        start: usize,
        /// Last coordinate; clipped to the last switch block.
        end: Option<usize>,
        /// Period of the region; 0 for no repetition.
        repeat: usize,
        /// Step inside each period; at least 1.
        incr: usize,
    },
}

impl AxisSpec {
    /// Returns `true` if `coord` is selected, with `max` the last valid coordinate.
    pub fn matches(&self, coord: usize, max: usize) -> bool {
        match *self {
            AxisSpec::Any => true,
            AxisSpec::Exact(v) => coord == v,
            AxisSpec::Region {
                start,
                end,
                repeat,
                incr,
            } => {
                let end = end.map_or(max, |e| e.min(max));
                if coord < start || coord > end {
                    return false;
                }
                let mut offset = coord - start;
                if repeat > 0 {
                    offset %= repeat;
                }
                offset % incr.max(1) == 0
            }
        }
    }
}

/// Wires of one segment type at the listed switchpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireSwitchpoints {
    /// Segment type.
    pub segment: SegmentId,
    /// Switchpoints along the wire (0 is the starting end).
    pub switchpoints: Vec<usize>,
}

/// The order in which candidate wires are visited.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireOrder {
    /// Channel order.
    #[default]
    Fixed,
    /// Shuffled with the build's seeded generator.
    Shuffled,
}

/// One group of connections between two sets of wires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireconnInf {
    /// Source wires.
    pub from: Vec<WireSwitchpoints>,
    /// Destination wires.
    pub to: Vec<WireSwitchpoints>,
    /// Connection-count formula over `from` and `to` (the set sizes).
    pub num_conns: String,
    /// Visiting order of the source wires.
    pub from_order: WireOrder,
    /// Visiting order of the destination wires.
    pub to_order: WireOrder,
    /// Switch for every edge of the group.
    pub switch_override: SwitchOverride,
    /// Sides considered by scatter-gather patterns; empty means all planar sides.
    pub sides: SideSet,
}

/// Permutation functions for one (from-side, to-side) pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SidePermutation {
    /// Side the connection leaves from.
    pub from: Side,
    /// Side the connection arrives at.
    pub to: Side,
    /// Formulas over `W` and `t` producing destination track indices.
    pub functions: Vec<String>,
}

/// A custom switch-block description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwitchBlockInf {
    /// Name for messages.
    pub name: String,
    /// Where the switch block is instantiated.
    pub location: SbLocation,
    /// Directionality the description is written for.
    pub directionality: Directionality,
    /// Permutation functions per side pair.
    pub permutations: Vec<SidePermutation>,
    /// Wire groups to connect.
    pub wireconns: Vec<WireconnInf>,
}

impl SwitchBlockInf {
    /// Returns the permutation functions for a side pair; empty if none.
    pub fn permutations_for(&self, from: Side, to: Side) -> &[String] {
        self.permutations
            .iter()
            .find(|p| p.from == from && p.to == to)
            .map(|p| p.functions.as_slice())
            .unwrap_or(&[])
    }
}
