//! Unidirectional switch-block pattern.
//!
//! In a unidirectional fabric every wire is driven by a mux at its start.
//! At each switch block the incoming wires of every side are labelled
//! (ending wires first, then passing wires that have a switch here) and the
//! muxes of every side are labelled in track order. Each incoming label is
//! then mapped onto a mux label of the three other sides:
//!
//! - from the two turning sides through the simple topology, with the mux
//!   count of the destination side as the width, which staggers passing
//!   wires and keeps mux fan-in balanced to within one;
//! - from the opposite side only for ending wires, straight onto the mux at
//!   the same track.
//!
//! A wire may be assigned two muxes on one destination side; the second is
//! the alternate slot.

use crate::channel::{is_sblock, ChanDetails, ChanSegDetails};
use crate::switchblock::simple::simple_switch_block_track;
use crate::switchblock::{side_channel, SideChannel};
use aion_arch::{Directionality, SwitchBlockType};
use aion_common::{Direction, Side};

/// Tracks of a channel segment that start (are driven by a mux) at `seg`.
///
/// Returns the tracks in track order and, separately, how many of them have
/// a connection block at their first tile. With `check_cb` only those are
/// returned. `seg_type` restricts the result to one axis-local segment type.
pub fn label_wire_muxes(
    tracks: &[ChanSegDetails],
    seg: usize,
    seg_type: Option<usize>,
    dir: Direction,
    check_cb: bool,
) -> (Vec<usize>, usize) {
    let mut labels = Vec::new();
    let mut cb_restricted = 0;
    for (itrack, d) in tracks.iter().enumerate() {
        if d.length == 0 || d.detail.direction != dir {
            continue;
        }
        if seg_type.is_some_and(|s| s != d.detail.index) {
            continue;
        }
        let is_start = match dir {
            Direction::Dec => seg == d.seg_end,
            _ => seg == d.seg_start,
        };
        if !is_start {
            continue;
        }
        let has_cb = d.detail.cb.first().copied().unwrap_or(false);
        if !check_cb || has_cb {
            labels.push(itrack);
        }
        if has_cb {
            cb_restricted += 1;
        }
    }
    (labels, cb_restricted)
}

/// Labels of the wires entering a switch block from one side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncomingLabels {
    /// Label of every track; `None` for tracks that do not connect here.
    pub labels: Vec<Option<usize>>,
    /// Number of ending wires; they hold labels `0..num_ending`.
    pub num_ending: usize,
}

impl IncomingLabels {
    /// Number of labelled wires.
    pub fn len(&self) -> usize {
        self.labels.iter().flatten().count()
    }

    /// Returns `true` if no wire is labelled.
    pub fn is_empty(&self) -> bool {
        self.labels.iter().all(Option::is_none)
    }
}

/// Labels the wires heading in `dir` at `seg` that can connect at switch
/// block `sb_seg`: wires ending there first, then passing wires with a
/// switch there, each group in track order.
pub fn label_incoming_wires(
    tracks: &[ChanSegDetails],
    seg: usize,
    sb_seg: usize,
    dir: Direction,
) -> IncomingLabels {
    let mut labels = vec![None; tracks.len()];
    let is_end = |d: &ChanSegDetails| match dir {
        Direction::Dec => seg == d.seg_start,
        _ => seg == d.seg_end,
    };
    let candidates = || {
        tracks
            .iter()
            .enumerate()
            .filter(|(_, d)| d.length > 0 && d.detail.direction == dir)
    };

    let mut next = 0;
    for (itrack, d) in candidates() {
        if is_end(d) {
            labels[itrack] = Some(next);
            next += 1;
        }
    }
    let num_ending = next;
    for (itrack, d) in candidates() {
        if !is_end(d) && is_sblock(tracks, sb_seg, itrack, Directionality::Unidir) {
            labels[itrack] = Some(next);
            next += 1;
        }
    }
    IncomingLabels { labels, num_ending }
}

/// Index of `track` in `muxes`, or of the largest track if it is absent.
pub fn find_label_of_track(muxes: &[usize], track: usize) -> Option<usize> {
    if let Some(i) = muxes.iter().position(|&t| t == track) {
        return Some(i);
    }
    muxes
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, usize)>, (i, &t)| match best {
            Some((_, bt)) if bt >= t => best,
            _ => Some((i, t)),
        })
        .map(|(i, _)| i)
}

/// A mux assigned to an incoming wire: its label and the track it drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SbTarget {
    /// Mux label on the destination side.
    pub mux: usize,
    /// Track the mux drives.
    pub track: usize,
}

/// Primary and alternate targets of one incoming wire.
pub type SbTargets = [Option<SbTarget>; 2];

/// The unidirectional pattern of every switch block,
/// `[x][y][from side][to side][track] -> targets`.
#[derive(Clone, Debug)]
pub struct SblockPattern {
    sb_height: usize,
    blocks: Vec<Vec<Vec<SbTargets>>>,
}

impl SblockPattern {
    /// Computes the pattern of every switch block of a
    /// `grid_width x grid_height` device.
    pub fn build(
        chan_x: &ChanDetails,
        chan_y: &ChanDetails,
        grid_width: usize,
        grid_height: usize,
        sb_type: SwitchBlockType,
    ) -> Self {
        let sb_width = grid_width.saturating_sub(1);
        let sb_height = grid_height.saturating_sub(1);
        let mut blocks = Vec::with_capacity(sb_width * sb_height);
        for x in 0..sb_width {
            for y in 0..sb_height {
                blocks.push(load_block(
                    chan_x,
                    chan_y,
                    x,
                    y,
                    grid_width,
                    grid_height,
                    sb_type,
                ));
            }
        }
        Self { sb_height, blocks }
    }

    /// Targets of `track` entering switch block `(x, y)` from `from` and
    /// leaving on `to`.
    pub fn targets(&self, x: usize, y: usize, from: Side, to: Side, track: usize) -> SbTargets {
        if !from.is_planar() || !to.is_planar() {
            return [None, None];
        }
        self.blocks
            .get(x * self.sb_height + y)
            .and_then(|b| b.get(from.index() * 4 + to.index()))
            .and_then(|t| t.get(track))
            .copied()
            .unwrap_or([None, None])
    }
}

fn load_block(
    chan_x: &ChanDetails,
    chan_y: &ChanDetails,
    x: usize,
    y: usize,
    grid_width: usize,
    grid_height: usize,
    sb_type: SwitchBlockType,
) -> Vec<Vec<SbTargets>> {
    let mut incoming: [IncomingLabels; 4] = Default::default();
    let mut muxes: [Vec<usize>; 4] = Default::default();
    let mut widths = [0usize; 4];
    for side in Side::PLANAR {
        let Some(sc) = side_channel(chan_x, chan_y, x, y, side, grid_width, grid_height) else {
            continue;
        };
        let SideChannel { tracks, seg, sb_seg, .. } = sc;
        let pos_dir = matches!(side, Side::Top | Side::Right);
        let (end_dir, start_dir) = if pos_dir {
            (Direction::Dec, Direction::Inc)
        } else {
            (Direction::Inc, Direction::Dec)
        };
        let s = side.index();
        widths[s] = tracks.len();
        incoming[s] = label_incoming_wires(tracks, seg, sb_seg, end_dir);
        muxes[s] = label_wire_muxes(tracks, seg, None, start_dir, false).0;
    }

    let mut block: Vec<Vec<SbTargets>> = (0..16)
        .map(|i| vec![[None, None]; widths[i / 4]])
        .collect();
    for to in Side::PLANAR {
        let to_muxes = &muxes[to.index()];
        let num_muxes = to_muxes.len();
        if num_muxes == 0 {
            continue;
        }
        let target = |mux: usize| SbTarget {
            mux,
            track: to_muxes[mux % num_muxes],
        };

        for from in [to.clockwise(), to.counter_clockwise()] {
            let slots = &mut block[from.index() * 4 + to.index()];
            for (itrack, label) in incoming[from.index()].labels.iter().enumerate() {
                let Some(label) = *label else {
                    continue;
                };
                let Some(mux) = simple_switch_block_track(from, to, label, sb_type, num_muxes) else {
                    continue;
                };
                let slot = &mut slots[itrack];
                if slot[0].is_none() {
                    slot[0] = Some(target(mux));
                } else if slot[1].is_none() {
                    slot[1] = Some(target(mux));
                }
            }
        }

        let from = to.opposite();
        let opp = &incoming[from.index()];
        let slots = &mut block[from.index() * 4 + to.index()];
        for (itrack, label) in opp.labels.iter().enumerate() {
            match label {
                Some(l) if *l < opp.num_ending => {
                    if let Some(mux) = find_label_of_track(to_muxes, itrack) {
                        slots[itrack][0] = Some(target(mux));
                    }
                }
                // passing wires do not connect straight through here
                _ => {}
            }
        }
    }
    block
}
