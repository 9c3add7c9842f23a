//! Physical tile types: pins, pin classes, pin placement, Fc, and
//! switch-block population.

use crate::ids::SegmentId;
use aion_common::Side;
use serde::{Deserialize, Serialize};

/// Whether a pin drives or receives a net.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinType {
    /// Output pin; the class becomes a SOURCE.
    Driver,
    /// Input pin; the class becomes a SINK.
    Receiver,
}

/// A set of logically equivalent pins sharing one SOURCE or SINK.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinClass {
    /// Driver or receiver.
    pub kind: PinType,
    /// Pin indices belonging to the class.
    pub pins: Vec<usize>,
}

/// Where a pin sits on a tile: cell offset from the root plus side.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct PinLoc {
    /// Column offset from the tile root.
    pub width_offset: usize,
    /// Row offset from the tile root.
    pub height_offset: usize,
    /// Side of that cell.
    pub side: Side,
}

/// Whether an Fc spec applies to input or output pins.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FcType {
    /// Track-to-pin connectivity.
    In,
    /// Pin-to-track connectivity.
    Out,
}

/// How an Fc value is interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FcValueType {
    /// Number of tracks.
    Absolute,
    /// Fraction of the tracks of the segment type.
    Fractional,
}

/// Connectivity of a group of pins to one segment type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FcSpec {
    /// In or out.
    pub fc_type: FcType,
    /// Absolute or fractional.
    pub value_type: FcValueType,
    /// The Fc value.
    pub value: f32,
    /// Segment type the override applies to.
    pub segment: SegmentId,
    /// Pins covered by the override.
    pub pins: Vec<usize>,
}

/// The switch block present at one cell of a tile.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SbType {
    /// No switch block.
    None,
    /// All turns and straight-through connections.
    Full,
    /// Straight-through connections only.
    Straight,
    /// Turning connections only.
    Turns,
    /// Horizontal straight-through only.
    Horizontal,
    /// Vertical straight-through only.
    Vertical,
}

/// Named switch-block population patterns for multi-cell tiles.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SbPattern {
    /// Full switch blocks on the tile boundary, straight-through inside.
    #[default]
    ExternalFullInternalStraight,
    /// Full switch blocks on the tile boundary, none inside.
    External,
    /// Full switch blocks inside, none on the boundary.
    Internal,
    /// Full switch blocks everywhere.
    All,
    /// No switch blocks.
    None,
}

impl SbPattern {
    /// Expands the pattern into a `width * height` matrix indexed by
    /// `height_offset * width + width_offset`.
    ///
    /// The switch block of cell `(w, h)` sits at its top-right corner, so it
    /// is on the tile boundary when `w == width - 1` or `h == height - 1`.
    pub fn expand(self, width: usize, height: usize) -> Vec<SbType> {
        let mut out = Vec::with_capacity(width * height);
        for h in 0..height {
            for w in 0..width {
                let external = w + 1 == width || h + 1 == height;
                out.push(match (self, external) {
                    (SbPattern::All, _) => SbType::Full,
                    (SbPattern::None, _) => SbType::None,
                    (SbPattern::External, true) | (SbPattern::Internal, false) => SbType::Full,
                    (SbPattern::External, false) | (SbPattern::Internal, true) => SbType::None,
                    (SbPattern::ExternalFullInternalStraight, true) => SbType::Full,
                    (SbPattern::ExternalFullInternalStraight, false) => SbType::Straight,
                });
            }
        }
        out
    }
}

/// A resolved physical tile type.
///
/// Pins are numbered sub-tile by sub-tile: pin `p` of instance `z` has index
/// `z * pins_per_sub_tile() + p`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicalTileType {
    /// Tile type name.
    pub name: String,
    /// Width in grid cells.
    pub width: usize,
    /// Height in grid cells.
    pub height: usize,
    /// Number of identical sub-tile instances.
    pub capacity: usize,
    /// Human-readable pin names.
    pub pin_names: Vec<String>,
    /// Class index of every pin.
    pub pin_class: Vec<usize>,
    /// Pin classes.
    pub classes: Vec<PinClass>,
    /// Pins routed on a dedicated global network instead of general routing.
    pub is_ignored_pin: Vec<bool>,
    /// Physical locations of every pin (possibly several).
    pub pin_locs: Vec<Vec<PinLoc>>,
    /// Fc specifications.
    pub fc_specs: Vec<FcSpec>,
    /// Switch-block population, see [`SbPattern::expand`].
    pub switchblock_locations: Vec<SbType>,
}

impl PhysicalTileType {
    /// Creates the 1x1, pinless empty tile type.
    pub fn empty() -> Self {
        Self {
            name: "EMPTY".to_string(),
            width: 1,
            height: 1,
            capacity: 0,
            pin_names: Vec::new(),
            pin_class: Vec::new(),
            classes: Vec::new(),
            is_ignored_pin: Vec::new(),
            pin_locs: Vec::new(),
            fc_specs: Vec::new(),
            switchblock_locations: vec![SbType::Full],
        }
    }

    /// Total number of pins across all sub-tiles.
    pub fn num_pins(&self) -> usize {
        self.pin_class.len()
    }

    /// Number of pins in one sub-tile instance.
    pub fn pins_per_sub_tile(&self) -> usize {
        if self.capacity == 0 {
            0
        } else {
            self.num_pins() / self.capacity
        }
    }

    /// Returns whether a pin drives or receives.
    pub fn pin_type(&self, pin: usize) -> PinType {
        self.classes[self.pin_class[pin]].kind
    }

    /// Returns `true` if `pin` is physically present at `(w, h, side)`.
    pub fn pin_on(&self, pin: usize, width_offset: usize, height_offset: usize, side: Side) -> bool {
        self.pin_locs[pin].iter().any(|loc| {
            loc.width_offset == width_offset && loc.height_offset == height_offset && loc.side == side
        })
    }

    /// Returns the switch-block type at a cell offset of this tile.
    pub fn switchblock_at(&self, width_offset: usize, height_offset: usize) -> SbType {
        self.switchblock_locations
            .get(height_offset * self.width + width_offset)
            .copied()
            .unwrap_or(SbType::None)
    }
}
