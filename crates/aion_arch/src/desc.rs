//! The architecture file schema, as written in TOML.
//!
//! Everything here refers to switches, segments, tiles, and ports by name.
//! [`Architecture::resolve`](crate::Architecture::resolve) turns an
//! [`ArchDescription`] into the id-based model.

use crate::segment::{Directionality, ParallelAxis};
use crate::switch::ArchSwitch;
use crate::switchblock::{SwitchBlockType, WireOrder};
use crate::tile::{SbPattern, SbType};
use aion_common::{Side, SideSet};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Root of an architecture file.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchDescription {
    /// `[routing]` table.
    pub routing: RoutingDesc,
    /// `[[switch]]` entries.
    #[serde(default, rename = "switch")]
    pub switches: Vec<ArchSwitch>,
    /// `[[segment]]` entries.
    #[serde(default, rename = "segment")]
    pub segments: Vec<SegmentDesc>,
    /// `[[tile]]` entries.
    #[serde(default, rename = "tile")]
    pub tiles: Vec<TileDesc>,
    /// `[grid]` table.
    pub grid: GridDesc,
    /// `[[switchblock]]` entries.
    #[serde(default, rename = "switchblock")]
    pub switchblocks: Vec<SwitchBlockDesc>,
    /// `[[scatter_gather]]` entries.
    #[serde(default)]
    pub scatter_gather: Vec<ScatterGatherDesc>,
    /// `[[direct]]` entries.
    #[serde(default, rename = "direct")]
    pub directs: Vec<DirectDesc>,
}

/// `[routing]`: device-wide routing parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingDesc {
    /// `"unidir"` or `"bidir"`.
    #[serde(default)]
    pub directionality: Directionality,
    /// Switch-block topology.
    #[serde(default)]
    pub switch_block_type: SwitchBlockType,
    /// Switch-block flexibility.
    #[serde(default = "default_fs")]
    pub fs: u32,
    /// Switch name used from tracks to input pins.
    pub wire_to_ipin_switch: String,
    /// Switch name used from tracks to input pins on another die.
    #[serde(default)]
    pub wire_to_ipin_switch_between_dice: Option<String>,
}

fn default_fs() -> u32 {
    3
}

/// `[[segment]]`: a segment type.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentDesc {
    /// Segment name.
    pub name: String,
    /// Tiles spanned.
    #[serde(default = "default_length")]
    pub length: usize,
    /// Relative track share.
    #[serde(default = "default_freq")]
    pub freq: u32,
    /// Spans the whole channel.
    #[serde(default)]
    pub longline: bool,
    /// Channel axes.
    #[serde(default)]
    pub axis: ParallelAxis,
    /// Driver style; defaults to the routing directionality.
    #[serde(default)]
    pub directionality: Option<Directionality>,
    /// Resistance per tile.
    #[serde(default)]
    pub r_metal: f32,
    /// Capacitance per tile.
    #[serde(default)]
    pub c_metal: f32,
    /// Unidirectional driving mux; sets both wire and opin switches.
    #[serde(default)]
    pub mux: Option<String>,
    /// Unidirectional mux for DEC wires.
    #[serde(default)]
    pub mux_dec: Option<String>,
    /// Bidirectional wire-to-wire switch.
    #[serde(default)]
    pub wire_switch: Option<String>,
    /// Bidirectional pin-to-wire switch.
    #[serde(default)]
    pub opin_switch: Option<String>,
    /// Switch crossing dice.
    #[serde(default)]
    pub inter_die_switch: Option<String>,
    /// Connection-block population, `length` entries of 0/1.
    #[serde(default)]
    pub cb: Option<Vec<u8>>,
    /// Switch-block population, `length + 1` entries of 0/1.
    #[serde(default)]
    pub sb: Option<Vec<u8>>,
}

fn default_length() -> usize {
    1
}

fn default_freq() -> u32 {
    1
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    /// Input pins.
    Input,
    /// Output pins.
    Output,
    /// Clock input pins.
    Clock,
}

/// `[[tile.port]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct PortDesc {
    /// Port name.
    pub name: String,
    /// Direction.
    pub kind: PortKind,
    /// Number of pins.
    #[serde(default = "default_length")]
    pub count: usize,
    /// All pins are logically equivalent and share one class.
    #[serde(default)]
    pub equivalent: bool,
    /// Routed on a dedicated global network.
    #[serde(default)]
    pub global: bool,
}

/// An Fc value as written: `{ type = "frac", value = 0.15 }`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FcValueDesc {
    /// `"frac"` or `"abs"`.
    #[serde(rename = "type")]
    pub value_type: FcValueKind,
    /// The value.
    pub value: f32,
}

/// How an Fc value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FcValueKind {
    /// Absolute track count.
    Abs,
    /// Fraction of the tracks.
    Frac,
}

/// `[tile.fc]`: default Fc plus overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct FcDesc {
    /// Default for input and clock ports.
    #[serde(rename = "in")]
    pub fc_in: FcValueDesc,
    /// Default for output ports.
    #[serde(rename = "out")]
    pub fc_out: FcValueDesc,
    /// Overrides for specific ports and/or segments.
    #[serde(default, rename = "override")]
    pub overrides: Vec<FcOverrideDesc>,
}

/// `[[tile.fc.override]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct FcOverrideDesc {
    /// Port the override applies to; all ports when absent.
    #[serde(default)]
    pub port: Option<String>,
    /// Segment the override applies to; all segments when absent.
    #[serde(default)]
    pub segment: Option<String>,
    /// `"frac"` or `"abs"`.
    #[serde(rename = "type")]
    pub value_type: FcValueKind,
    /// The overriding value.
    pub value: f32,
}

impl FcOverrideDesc {
    /// The override as a plain Fc value.
    pub fn fc(&self) -> FcValueDesc {
        FcValueDesc {
            value_type: self.value_type,
            value: self.value,
        }
    }
}

/// Automatic pin placement styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinPattern {
    /// Even blocks of consecutive pins on every side of every cell.
    #[default]
    Spread,
    /// Even blocks of consecutive pins on the tile boundary only.
    Perimeter,
}

/// `[[tile.pin_loc]]`: explicit pin placement.
#[derive(Debug, Clone, Deserialize)]
pub struct PinLocDesc {
    /// Side of the cell.
    pub side: Side,
    /// Column offset of the cell.
    #[serde(default)]
    pub x_offset: usize,
    /// Row offset of the cell.
    #[serde(default)]
    pub y_offset: usize,
    /// Pin references, e.g. `"I[3:0]"`.
    pub pins: Vec<String>,
}

/// `[[tile.sb_loc]]`: switch-block override at one cell.
#[derive(Debug, Clone, Deserialize)]
pub struct SbLocDesc {
    /// Column offset of the cell.
    #[serde(default)]
    pub x_offset: usize,
    /// Row offset of the cell.
    #[serde(default)]
    pub y_offset: usize,
    /// Switch block at that cell.
    #[serde(rename = "type")]
    pub sb_type: SbType,
}

/// `[[tile]]`: a physical tile type.
#[derive(Debug, Clone, Deserialize)]
pub struct TileDesc {
    /// Tile name.
    pub name: String,
    /// Width in cells.
    #[serde(default = "default_length")]
    pub width: usize,
    /// Height in cells.
    #[serde(default = "default_length")]
    pub height: usize,
    /// Number of sub-tile instances.
    #[serde(default = "default_length")]
    pub capacity: usize,
    /// Ports of one sub-tile.
    #[serde(default, rename = "port")]
    pub ports: Vec<PortDesc>,
    /// Automatic pin placement when no `pin_loc` is given.
    #[serde(default)]
    pub pin_pattern: PinPattern,
    /// Explicit pin placement.
    #[serde(default)]
    pub pin_loc: Vec<PinLocDesc>,
    /// Fc; required when the tile has routable pins.
    #[serde(default)]
    pub fc: Option<FcDesc>,
    /// Switch-block pattern.
    #[serde(default)]
    pub switchblock_pattern: SbPattern,
    /// Per-cell switch-block overrides.
    #[serde(default)]
    pub sb_loc: Vec<SbLocDesc>,
}

/// `[grid]`: layout of the device.
#[derive(Debug, Clone, Deserialize)]
pub struct GridDesc {
    /// Width in cells.
    pub width: usize,
    /// Height in cells.
    pub height: usize,
    /// Number of dice.
    #[serde(default = "default_length")]
    pub layers: usize,
    /// Tile filling the whole grid first.
    #[serde(default)]
    pub fill: Option<String>,
    /// Tile placed on the outer ring.
    #[serde(default)]
    pub perimeter: Option<String>,
    /// Tile placed on the four corners.
    #[serde(default = "default_corners")]
    pub corners: String,
    /// Column placements.
    #[serde(default, rename = "column")]
    pub columns: Vec<ColumnDesc>,
    /// Single placements.
    #[serde(default, rename = "single")]
    pub singles: Vec<SingleDesc>,
    /// Per-layer routing enable; every layer routed when absent.
    #[serde(default)]
    pub inter_cluster_routing: Option<Vec<bool>>,
}

fn default_corners() -> String {
    "EMPTY".to_string()
}

/// `[[grid.column]]`: a column of tiles.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDesc {
    /// Tile name.
    pub tile: String,
    /// Column of the first instance.
    pub x: usize,
    /// Column period; 0 places a single column.
    #[serde(default)]
    pub repeat_x: usize,
    /// First row.
    #[serde(default = "default_length")]
    pub start_y: usize,
    /// Row step; defaults to the tile height.
    #[serde(default)]
    pub incr_y: Option<usize>,
    /// Layer; every layer when absent.
    #[serde(default)]
    pub layer: Option<usize>,
}

/// `[[grid.single]]`: one tile.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleDesc {
    /// Tile name.
    pub tile: String,
    /// Root column.
    pub x: usize,
    /// Root row.
    pub y: usize,
    /// Layer; every layer when absent.
    #[serde(default)]
    pub layer: Option<usize>,
}

/// A location class as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// Every switch block.
    Everywhere,
    /// Outer ring.
    Perimeter,
    /// Four corners.
    Corner,
    /// Outer ring minus corners.
    Fringe,
    /// Interior.
    Core,
    /// Explicit coordinates from `x`/`y` fields.
    XySpecified,
}

/// Coordinate fields accompanying [`LocationKind::XySpecified`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XyDesc {
    /// Exact column.
    #[serde(default)]
    pub x: Option<usize>,
    /// Exact row.
    #[serde(default)]
    pub y: Option<usize>,
    /// Column region start.
    #[serde(default)]
    pub x_start: Option<usize>,
    /// Column region end.
    #[serde(default)]
    pub x_end: Option<usize>,
    /// Column region period.
    #[serde(default)]
    pub x_repeat: usize,
    /// Column step.
    #[serde(default)]
    pub x_incr: Option<usize>,
    /// Row region start.
    #[serde(default)]
    pub y_start: Option<usize>,
    /// Row region end.
    #[serde(default)]
    pub y_end: Option<usize>,
    /// Row region period.
    #[serde(default)]
    pub y_repeat: usize,
    /// Row step.
    #[serde(default)]
    pub y_incr: Option<usize>,
}

/// Wires of one segment type at some switchpoints, as written.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchpointDesc {
    /// Segment name.
    #[serde(rename = "type")]
    pub segment: String,
    /// Switchpoints along the wire.
    pub switchpoints: Vec<usize>,
}

/// `[[switchblock.wireconn]]` and the scatter-gather `gather`/`scatter` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct WireconnDesc {
    /// Source wires.
    #[serde(default)]
    pub from: Vec<SwitchpointDesc>,
    /// Destination wires.
    #[serde(default)]
    pub to: Vec<SwitchpointDesc>,
    /// Connection-count formula.
    #[serde(default = "default_num_conns")]
    pub num_conns: String,
    /// Order of source wires.
    #[serde(default)]
    pub from_order: WireOrder,
    /// Order of destination wires.
    #[serde(default)]
    pub to_order: WireOrder,
    /// `"default"`, `"none"`, or a switch name.
    #[serde(default)]
    pub switch_override: Option<String>,
    /// Sides considered (scatter-gather only).
    #[serde(default)]
    pub sides: SideSet,
}

fn default_num_conns() -> String {
    "min(from, to)".to_string()
}

/// `[[switchblock]]`: a custom switch block.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchBlockDesc {
    /// Name.
    pub name: String,
    /// Location class.
    #[serde(default = "default_location")]
    pub location: LocationKind,
    /// Coordinates for `xy_specified`.
    #[serde(default)]
    pub xy: XyDesc,
    /// Directionality; defaults to the routing directionality.
    #[serde(default)]
    pub directionality: Option<Directionality>,
    /// Side pair (`"lr"`, `"left-right"`, ...) to permutation formulas.
    #[serde(default)]
    pub permutations: BTreeMap<String, Vec<String>>,
    /// Wire groups.
    #[serde(default, rename = "wireconn")]
    pub wireconns: Vec<WireconnDesc>,
}

fn default_location() -> LocationKind {
    LocationKind::Everywhere
}

/// `[[scatter_gather.link]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct SgLinkDesc {
    /// Link name.
    pub name: String,
    /// Switch name.
    pub switch: String,
    /// Segment name of the bottleneck node.
    pub segment: String,
    /// Column offset.
    #[serde(default)]
    pub x_offset: i32,
    /// Row offset.
    #[serde(default)]
    pub y_offset: i32,
    /// Layer offset.
    #[serde(default)]
    pub z_offset: i32,
}

/// `[[scatter_gather.location]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct SgLocationDesc {
    /// Location class.
    #[serde(rename = "type")]
    pub location: LocationKind,
    /// Coordinates for `xy_specified`.
    #[serde(default)]
    pub xy: XyDesc,
    /// Instances per location.
    #[serde(default = "default_length")]
    pub num: usize,
    /// Link name.
    pub link: String,
}

/// `[[scatter_gather]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScatterGatherDesc {
    /// Name.
    pub name: String,
    /// Directionality; defaults to the routing directionality.
    #[serde(default)]
    pub directionality: Option<Directionality>,
    /// Gather side.
    pub gather: WireconnDesc,
    /// Scatter side.
    pub scatter: WireconnDesc,
    /// Links.
    #[serde(default, rename = "link")]
    pub links: Vec<SgLinkDesc>,
    /// Instantiations.
    #[serde(default, rename = "location")]
    pub locations: Vec<SgLocationDesc>,
}

/// `[[direct]]`: a direct connection.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectDesc {
    /// Name.
    pub name: String,
    /// Driving pins, `tile.port[msb:lsb]`.
    pub from_pin: String,
    /// Receiving pins, `tile.port[msb:lsb]`.
    pub to_pin: String,
    /// Column offset.
    #[serde(default)]
    pub x_offset: i32,
    /// Row offset.
    #[serde(default)]
    pub y_offset: i32,
    /// Sub-tile offset.
    #[serde(default)]
    pub z_offset: i32,
    /// Switch name; the delayless switch when absent.
    #[serde(default)]
    pub switch: Option<String>,
    /// Side of the driving pin.
    #[serde(default)]
    pub from_side: Option<Side>,
    /// Side of the receiving pin.
    #[serde(default)]
    pub to_side: Option<Side>,
}
