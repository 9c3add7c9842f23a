//! Switch-block connectivity.
//!
//! Switch block `(x, y)` sits at the top-right corner of tile `(x, y)`;
//! blocks run from `(0, 0)` to `(W - 2, H - 2)`. Its four planar sides
//! face these channel segments:
//!
//! | Side   | Channel | Node position  |
//! |--------|---------|----------------|
//! | TOP    | CHANY   | `(x, y + 1)`   |
//! | RIGHT  | CHANX   | `(x + 1, y)`   |
//! | BOTTOM | CHANY   | `(x, y)`       |
//! | LEFT   | CHANX   | `(x, y)`       |
//!
//! The simple topologies ([`simple`]) are closed-form track mappings; the
//! unidirectional mux pattern ([`pattern`]) is precomputed per block so
//! that every mux receives a balanced number of inputs; custom switch
//! blocks ([`custom`]) are expanded once into a sparse map.

pub mod custom;
pub mod pattern;
pub mod simple;

pub use custom::{CustomSbMap, SbEdge, SbKey};
pub use pattern::{SbTarget, SblockPattern};
pub use simple::{simple_switch_block_track, SwitchBlockConn};

use crate::channel::{ChanDetails, ChanSegDetails};
use aion_arch::{Architecture, Directionality, SbType, WireSwitchpoints};
use aion_common::{Axis, Direction, Side};

/// The channel segment on one side of a switch block.
#[derive(Clone, Copy, Debug)]
pub struct SideChannel<'a> {
    /// Tracks at the segment.
    pub tracks: &'a [ChanSegDetails],
    /// Channel axis.
    pub axis: Axis,
    /// Channel coordinate: the row of a CHANX, the column of a CHANY.
    pub chan: usize,
    /// Coordinate along the channel of the segment.
    pub seg: usize,
    /// Coordinate along the channel of the switch block.
    pub sb_seg: usize,
}

impl SideChannel<'_> {
    /// Node position `(x, y)` of the segment.
    pub fn node_xy(&self) -> (usize, usize) {
        match self.axis {
            Axis::X => (self.seg, self.chan),
            _ => (self.chan, self.seg),
        }
    }

    /// Number of tracks actually present.
    pub fn width(&self) -> usize {
        self.tracks.iter().take_while(|t| t.length > 0).count()
    }
}

/// Returns the channel segment on `side` of switch block `(x, y)`, or
/// `None` at the device edge or where the channel has no tracks.
pub fn side_channel<'a>(
    chan_x: &'a ChanDetails,
    chan_y: &'a ChanDetails,
    x: usize,
    y: usize,
    side: Side,
    grid_width: usize,
    grid_height: usize,
) -> Option<SideChannel<'a>> {
    let exists = match side {
        Side::Top => y + 2 < grid_height,
        Side::Right => x + 2 < grid_width,
        Side::Bottom => y > 0,
        Side::Left => x > 0,
        Side::Above | Side::Under => false,
    };
    if !exists {
        return None;
    }
    let vertical = side.is_vertical();
    let pos_dir = matches!(side, Side::Top | Side::Right);
    let (chan, sb_seg) = if vertical { (x, y) } else { (y, x) };
    let seg = if pos_dir { sb_seg + 1 } else { sb_seg };
    let (details, axis) = if vertical {
        (chan_y.at(chan, seg), Axis::Y)
    } else {
        (chan_x.at(seg, chan), Axis::X)
    };
    if details.first().map_or(true, |d| d.length == 0) {
        return None;
    }
    Some(SideChannel {
        tracks: details,
        axis,
        chan,
        seg,
        sb_seg,
    })
}

/// Returns `true` if the tile under switch block `(x, y)` allows a
/// connection from a `from` channel to a `to` channel.
///
/// `from_chan` and `from_seg` locate the switch block along the source
/// channel, like a channel node position.
pub fn should_create_switchblock(
    arch: &Architecture,
    layer: usize,
    from_chan: usize,
    from_seg: usize,
    from: Axis,
    to: Axis,
) -> bool {
    let (x, y) = match from {
        Axis::X => (from_seg, from_chan),
        _ => (from_chan, from_seg),
    };
    let grid = &arch.grid;
    if x >= grid.width() || y >= grid.height() || layer >= grid.layers() {
        return false;
    }
    let cell = grid.tile(layer, x, y);
    let tile = arch.tile_type(cell.tile_type);
    match tile.switchblock_at(cell.width_offset, cell.height_offset) {
        SbType::Full => true,
        SbType::Straight => from == to,
        SbType::Turns => from != to,
        SbType::Horizontal => from == Axis::X && to == Axis::X,
        SbType::Vertical => from == Axis::Y && to == Axis::Y,
        SbType::None => false,
    }
}

/// Role of a wire relative to a switch block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WireRole {
    /// The wire drives into the switch block.
    Source,
    /// The wire is driven by the switch block.
    Dest,
}

/// A wire selected at a switch block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SbWire {
    pub side: Side,
    pub track: usize,
    pub axis: Axis,
    /// Node position of the wire segment facing the switch block.
    pub x: usize,
    pub y: usize,
}

/// Channel geometry shared by the wire queries of one build.
pub(crate) struct SbChannels<'a> {
    pub chan_x: &'a ChanDetails,
    pub chan_y: &'a ChanDetails,
    pub width: usize,
    pub height: usize,
    pub directionality: Directionality,
}

impl SbChannels<'_> {
    /// Wires on `side` of switch block `(x, y)` whose segment type and
    /// switchpoint match one of `sets`, set by set and in track order within
    /// each set. ABOVE and UNDER stand for all four planar sides.
    pub fn collect_wires(
        &self,
        x: usize,
        y: usize,
        side: Side,
        sets: &[WireSwitchpoints],
        role: WireRole,
    ) -> Vec<SbWire> {
        let sides: &[Side] = if side.is_planar() {
            std::slice::from_ref(&side)
        } else {
            &Side::PLANAR
        };
        let mut wires = Vec::new();
        for set in sets {
            for &wire_side in sides {
                let chan = side_channel(self.chan_x, self.chan_y, x, y, wire_side, self.width, self.height);
                let Some(chan) = chan else {
                    continue;
                };
                let (node_x, node_y) = chan.node_xy();
                for (track, t) in chan.tracks[..chan.width()].iter().enumerate() {
                    if t.detail.abs_index != set.segment.index()
                        || !polarity_matches(t.detail.direction, wire_side, role, self.directionality)
                    {
                        continue;
                    }
                    if switchpoint(t, chan.sb_seg).is_some_and(|sp| set.switchpoints.contains(&sp)) {
                        wires.push(SbWire {
                            side: wire_side,
                            track,
                            axis: chan.axis,
                            x: node_x,
                            y: node_y,
                        });
                    }
                }
            }
        }
        wires
    }
}

/// Returns `true` if a wire of direction `dir` on `side` can play `role`.
///
/// A unidirectional source wire heads into the switch block: DEC on the
/// TOP and RIGHT sides, INC on BOTTOM and LEFT. Destinations head away.
pub(crate) fn polarity_matches(
    dir: Direction,
    side: Side,
    role: WireRole,
    directionality: Directionality,
) -> bool {
    if directionality == Directionality::Bidir || matches!(dir, Direction::Bidir | Direction::None) {
        return true;
    }
    let positive = matches!(side, Side::Top | Side::Right);
    let want = match (role, positive) {
        (WireRole::Source, true) | (WireRole::Dest, false) => Direction::Dec,
        (WireRole::Source, false) | (WireRole::Dest, true) => Direction::Inc,
    };
    dir == want
}

/// Switchpoint of a wire at the switch block `sb_seg` along its channel.
///
/// The block where an INC wire starts is switchpoint 0 and the block where
/// it ends is switchpoint `length`; DEC wires count from the other end. A
/// wire clipped at the low edge of the device keeps the switchpoints of the
/// full-length wire it was cut from.
pub(crate) fn switchpoint(track: &ChanSegDetails, sb_seg: usize) -> Option<usize> {
    let length = track.length as i64;
    if length == 0 {
        return None;
    }
    let span = (track.seg_end + 1 - track.seg_start) as i64;
    let logical_start = if track.seg_start == 1 && span < length && !track.detail.longline {
        track.seg_end as i64 + 1 - length
    } else {
        track.seg_start as i64
    };
    let sp_inc = sb_seg as i64 + 1 - logical_start;
    let sp = match track.detail.direction {
        Direction::Dec => length - sp_inc,
        _ => sp_inc,
    };
    (0..=length).contains(&sp).then_some(sp as usize)
}
