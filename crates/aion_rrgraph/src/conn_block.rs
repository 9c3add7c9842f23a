//! Connection blocks: which tracks each pin of a tile type touches.
//!
//! Pins of one type (all inputs, or all outputs) are first put into a
//! spreading order that walks clockwise around the tile, one pin per
//! (cell, side) per round. Each pin in that order then gets `Fc` tracks of
//! every segment type from a uniform or perturbed pattern. The result is a
//! [`PinLocTable`] keyed by `(pin, width offset, height offset, side)`.

use aion_arch::{Directionality, PhysicalTileType, PinType};
use aion_common::Side;

use crate::fc::{max_fc, TileFc};

/// Lists of values keyed by `(index, width offset, height offset, side)`.
///
/// Used both as the pin-to-track map (index = pin, values = tracks) and the
/// inverse track-to-pin lookup (index = track, values = pins).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PinLocTable {
    width: usize,
    height: usize,
    lists: Vec<Vec<usize>>,
}

impl PinLocTable {
    /// Creates a table of empty lists for `count` indices on a tile of the given size.
    pub fn new(count: usize, width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            lists: vec![Vec::new(); count * width * height * 4],
        }
    }

    fn slot(&self, index: usize, w: usize, h: usize, side: Side) -> Option<usize> {
        if !side.is_planar() || w >= self.width || h >= self.height {
            return None;
        }
        let slot = ((index * self.width + w) * self.height + h) * 4 + side.index();
        (slot < self.lists.len()).then_some(slot)
    }

    /// The values at one key; empty when the key is out of range.
    pub fn get(&self, index: usize, w: usize, h: usize, side: Side) -> &[usize] {
        match self.slot(index, w, h, side) {
            Some(slot) => &self.lists[slot],
            None => &[],
        }
    }

    fn push(&mut self, index: usize, w: usize, h: usize, side: Side, value: usize) {
        if let Some(slot) = self.slot(index, w, h, side) {
            self.lists[slot].push(value);
        }
    }

    /// Number of indices the table was sized for.
    pub fn count(&self) -> usize {
        self.lists.len() / (self.width * self.height * 4).max(1)
    }
}

/// One physical pin position in the spreading order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderedPin {
    /// Pin index within the tile type.
    pub pin: usize,
    /// Column offset of the cell.
    pub w: usize,
    /// Row offset of the cell.
    pub h: usize,
    /// Side of the cell.
    pub side: Side,
}

/// Position of the walk around a tile's boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SideWalk {
    side: Side,
    w: usize,
    h: usize,
}

impl SideWalk {
    const START: SideWalk = SideWalk {
        side: Side::Left,
        w: 0,
        h: 0,
    };

    /// Next (cell, side) position: up the LEFT columns, along the TOP rows
    /// left to right, down the RIGHT columns, back along the BOTTOM rows.
    fn advance(self, width: usize, height: usize) -> Self {
        let (last_w, last_h) = (width - 1, height - 1);
        let SideWalk { side, w, h } = self;
        let (side, w, h) = match side {
            Side::Left if h == last_h && w == last_w => (Side::Top, 0, last_h),
            Side::Left if h == last_h => (Side::Left, w + 1, 0),
            Side::Left => (Side::Left, w, h + 1),
            Side::Top if h == 0 && w == last_w => (Side::Right, last_w, last_h),
            Side::Top if w == last_w => (Side::Top, 0, h - 1),
            Side::Top => (Side::Top, w + 1, h),
            Side::Right if h == 0 && w == 0 => (Side::Bottom, last_w, 0),
            Side::Right if h == 0 => (Side::Right, w - 1, last_h),
            Side::Right => (Side::Right, w, h - 1),
            Side::Bottom if h == last_h && w == 0 => (Side::Left, 0, 0),
            Side::Bottom if w == 0 => (Side::Bottom, last_w, h + 1),
            _ => (Side::Bottom, w - 1, h),
        };
        SideWalk { side, w, h }
    }
}

/// Orders the physical pins of `pin_type` so consecutive pins sit on
/// different cells and sides.
///
/// Ignored pins (routed on global networks) are left out. A pin placed on
/// several sides appears once per placement.
pub fn pin_order(tile: &PhysicalTileType, pin_type: PinType) -> Vec<OrderedPin> {
    let (width, height) = (tile.width, tile.height);
    let cell = |w: usize, h: usize, side: Side| (w * height + h) * 4 + side.index();
    let mut lists: Vec<Vec<usize>> = vec![Vec::new(); width * height * 4];
    for pin in 0..tile.num_pins() {
        if tile.pin_type(pin) != pin_type || tile.is_ignored_pin[pin] {
            continue;
        }
        for loc in &tile.pin_locs[pin] {
            if loc.side.is_planar() && loc.width_offset < width && loc.height_offset < height {
                lists[cell(loc.width_offset, loc.height_offset, loc.side)].push(pin);
            }
        }
    }
    let total: usize = lists.iter().map(Vec::len).sum();

    let mut order = Vec::with_capacity(total);
    let mut walk = SideWalk::START;
    let mut round = 0;
    let mut first = true;
    while order.len() < total {
        if walk == SideWalk::START {
            if !first {
                round += 1;
            }
            first = false;
        }
        walk = walk.advance(width, height);
        if let Some(&pin) = lists[cell(walk.w, walk.h, walk.side)].get(round) {
            order.push(OrderedPin {
                pin,
                w: walk.w,
                h: walk.h,
                side: walk.side,
            });
        }
    }
    order
}

/// `a mod b`, snapping results outside `[0, b)` from rounding to 0.
fn pattern_fmod(a: f32, b: f32) -> f32 {
    let r = a - (a / b).trunc() * b;
    if r < 0.0 || r >= b {
        0.0
    } else {
        r
    }
}

/// Evenly spaced tracks per pin, shifting the start point away from tracks
/// that nearby pins on the same (cell, side) already took.
///
/// `fcs[i]` is the Fc of `order[i]`. Unidirectional patterns hand out
/// tracks in INC/DEC pairs.
fn uniform_pattern(
    order: &[OrderedPin],
    fcs: &[usize],
    tracks: usize,
    group: usize,
    width: usize,
    height: usize,
) -> Vec<Vec<usize>> {
    let n = order.len();
    let mut out = vec![Vec::new(); n];
    if tracks == 0 {
        return out;
    }
    let mut excess = vec![vec![0usize; tracks]; width * height * 4];
    let mut offset = 0;

    for (i, op) in order.iter().enumerate() {
        let fc = fcs[i];
        if fc == 0 {
            continue;
        }
        let loc = (op.side.index() * width + op.w) * height + op.h;
        let step = tracks as f32 / (fc * n) as f32;
        let fc_step = tracks as f32 / fc as f32;
        let track_at =
            |k: usize, j: usize| (pattern_fmod(k as f32 * step, fc_step) + j as f32 * fc_step) as usize * group;

        for j in 0..fc / group {
            let mut itrack = track_at(i + offset, j);
            if j == 0 {
                loop {
                    let mut best = 0;
                    let mut best_inc = 0;
                    for inc in 0..n {
                        let unassigned = (0..fc / group)
                            .flat_map(|j2| {
                                let t = track_at(i + offset + inc, j2);
                                (0..group).map(move |k| (t + k) % tracks)
                            })
                            .filter(|&t| excess[loc][t] == 0)
                            .count();
                        if unassigned > best {
                            best = unassigned;
                            best_inc = inc;
                        }
                        if unassigned == fc / group * group {
                            break;
                        }
                    }
                    if best > 0 {
                        offset += best_inc;
                        itrack = track_at(i + offset, 0);
                        break;
                    }
                    for count in excess[loc].iter_mut() {
                        *count = count.saturating_sub(1);
                    }
                }
            }
            for k in 0..group {
                let t = (itrack + k) % tracks;
                out[i].push(t);
                excess[loc][t] += 1;
            }
        }
    }
    out
}

/// Uneven spacing for bidirectional input pins: `Fc/2 + 1` connections
/// packed into one half of the channel and the rest spread over the other,
/// alternating which half is dense from pin to pin.
fn perturbed_pattern(order: &[OrderedPin], fcs: &[usize], tracks: usize) -> Vec<Vec<usize>> {
    let n = order.len();
    let mut out = vec![Vec::new(); n];
    if tracks == 0 {
        return out;
    }
    for (i, &fc) in fcs.iter().enumerate() {
        if fc == 0 {
            continue;
        }
        let dense = fc / 2 + 1;
        let sparse = fc.saturating_sub(dense);
        let spacing = |count: usize| {
            if count == 0 {
                0.0
            } else {
                tracks as f32 / (2 * count) as f32
            }
        };
        let halves = if i % 2 == 0 {
            [(dense, spacing(dense)), (sparse, spacing(sparse))]
        } else {
            [(sparse, spacing(sparse)), (dense, spacing(dense))]
        };
        let mut ftrack = i as f32 * tracks as f32 / (fc * n) as f32;
        for (count, space) in halves {
            for _ in 0..count {
                if out[i].len() >= fc {
                    break;
                }
                out[i].push(ftrack as usize % tracks);
                ftrack += space;
            }
        }
    }
    out
}

/// Tracks of one segment type in a channel, as seen by the connection block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegTracks {
    /// Unified segment index, for Fc lookup.
    pub unified: usize,
    /// Tracks of this type in the channel.
    pub tracks: usize,
    /// Use the perturbed pattern.
    pub perturb: bool,
}

/// Builds the pin-to-track map of one tile type for one pin type.
///
/// Segment types occupy consecutive track ranges in `segs` order; each pin
/// gets `fc[pin][unified]` tracks from every range.
pub fn pin_to_track_map(
    tile: &PhysicalTileType,
    fc: &TileFc,
    pin_type: PinType,
    segs: &[SegTracks],
    directionality: Directionality,
) -> PinLocTable {
    let mut result = PinLocTable::new(tile.num_pins(), tile.width, tile.height);
    let group = directionality.pairing_factor();
    let order = pin_order(tile, pin_type);
    let fc_of = |pin: usize, seg: usize| fc.get(pin).and_then(|row| row.get(seg)).copied().unwrap_or(0);

    let mut start_track = 0;
    for seg in segs {
        if max_fc(tile, fc, pin_type, seg.unified) > 0 {
            let fcs: Vec<usize> = order.iter().map(|op| fc_of(op.pin, seg.unified)).collect();
            let pattern = if seg.perturb {
                perturbed_pattern(&order, &fcs, seg.tracks)
            } else {
                uniform_pattern(&order, &fcs, seg.tracks, group, tile.width, tile.height)
            };
            for (op, tracks) in order.iter().zip(pattern) {
                for t in tracks.into_iter().take(fc_of(op.pin, seg.unified)) {
                    result.push(op.pin, op.w, op.h, op.side, t + start_track);
                }
            }
        }
        start_track += seg.tracks;
    }
    result
}

/// Inverts a pin-to-track map into `[track][w][h][side] -> pins`.
///
/// Tracks at or beyond `max_chan_width` are dropped.
pub fn track_to_pin_lookup(
    tile: &PhysicalTileType,
    pin_to_track: &PinLocTable,
    max_chan_width: usize,
) -> PinLocTable {
    let mut result = PinLocTable::new(max_chan_width, tile.width, tile.height);
    for pin in 0..tile.num_pins() {
        for w in 0..tile.width {
            for h in 0..tile.height {
                for side in Side::PLANAR {
                    for &track in pin_to_track.get(pin, w, h, side) {
                        if track < max_chan_width {
                            result.push(track, w, h, side, pin);
                        }
                    }
                }
            }
        }
    }
    result
}

/// Tracks below `num_tracks` that no pin of the map connects to.
pub fn unreachable_tracks(
    tile: &PhysicalTileType,
    pin_to_track: &PinLocTable,
    num_tracks: usize,
) -> Vec<usize> {
    let mut reached = vec![false; num_tracks];
    for pin in 0..tile.num_pins() {
        for w in 0..tile.width {
            for h in 0..tile.height {
                for side in Side::PLANAR {
                    for &t in pin_to_track.get(pin, w, h, side) {
                        if let Some(r) = reached.get_mut(t) {
                            *r = true;
                        }
                    }
                }
            }
        }
    }
    reached
        .iter()
        .enumerate()
        .filter(|(_, &r)| !r)
        .map(|(t, _)| t)
        .collect()
}
