//! Track layout of the routing channels.
//!
//! [`SegDetails`] describes one track of a channel: which segment type it
//! carries, its direction, its connection-block and switch-block masks, and
//! the phase at which its wires start. [`ChanDetails`] instantiates those
//! tracks for every channel position; each entry shares its [`SegDetails`]
//! and only stores where the wire passing through that position starts and
//! ends.
//!
//! Wire start points are staggered by channel coordinate so adjacent
//! channels do not break their wires at the same switch blocks.

use crate::error::RrGraphError;
use crate::segments::{seg_track_counts, AxisSegments};
use aion_arch::{Directionality, SwitchId};
use aion_common::{Axis, Direction};
use aion_config::ChannelWidths;
use std::rc::Rc;

/// One track of a channel, identical in every channel of an axis.
#[derive(Clone, Debug, PartialEq)]
pub struct SegDetails {
    /// Segment type name.
    pub name: String,
    /// Wire length in tiles.
    pub length: usize,
    /// Wire spans the whole channel.
    pub longline: bool,
    /// Phase of the wire start, in `1..=length`.
    pub start: usize,
    /// First track of the group this track belongs to.
    pub group_start: usize,
    /// Number of tracks in the group.
    pub group_size: usize,
    /// Connection-block mask, `length` entries.
    pub cb: Vec<bool>,
    /// Switch-block mask, `length + 1` entries.
    pub sb: Vec<bool>,
    /// Signal direction.
    pub direction: Direction,
    /// Switch driving this track from other wires.
    pub wire_switch: SwitchId,
    /// Switch driving this track from output pins.
    pub opin_switch: SwitchId,
    /// Switch used to cross dice.
    pub inter_die_switch: Option<SwitchId>,
    /// Metal resistance per tile.
    pub r_metal: f32,
    /// Metal capacitance per tile.
    pub c_metal: f32,
    /// Axis-local segment index.
    pub index: usize,
    /// Unified segment index.
    pub abs_index: usize,
}

/// A track at one channel position: the shared details plus the extent of
/// the wire passing through.
///
/// `length` is 0 for tracks beyond the width of a narrower channel.
#[derive(Clone, Debug)]
pub struct ChanSegDetails {
    /// Wire length, or 0 if the track does not exist here.
    pub length: usize,
    /// First channel coordinate covered by the wire.
    pub seg_start: usize,
    /// Last channel coordinate covered by the wire.
    pub seg_end: usize,
    /// Shared track details.
    pub detail: Rc<SegDetails>,
}

/// Builds the track details of one axis.
///
/// Returns the details and the actual channel width, which differs from
/// `width` when the segment distribution rounds it.
pub fn alloc_seg_details(
    width: usize,
    max_len: usize,
    segments: &AxisSegments,
    directionality: Directionality,
    use_full_seg_groups: bool,
) -> Result<(Vec<SegDetails>, usize), RrGraphError> {
    let fac = directionality.pairing_factor();
    if width % fac != 0 {
        return Err(RrGraphError::ChannelWidthNotDivisible { width, fac });
    }
    let sets = seg_track_counts(width / fac, &segments.segments, use_full_seg_groups);
    let actual = sets.iter().sum::<usize>() * fac;

    let mut details = Vec::with_capacity(actual);
    let mut cur_track = 0;
    for (i, seg) in segments.segments.iter().enumerate() {
        let first_track = cur_track;
        let ntracks = fac * sets[i];
        if ntracks == 0 {
            continue;
        }
        let length = if seg.longline {
            max_len.max(1)
        } else {
            seg.length.max(1)
        };
        if directionality == Directionality::Unidir
            && (seg.wire_switch != seg.opin_switch || seg.wire_switch_dec != seg.opin_switch_dec)
        {
            return Err(RrGraphError::UnidirSwitchMismatch {
                segment: seg.name.clone(),
            });
        }

        let mut group_start = cur_track;
        for itrack in 0..ntracks {
            if (itrack / fac) % length == 0 && itrack % fac == 0 {
                group_start = cur_track;
            }
            let group_size = match (ntracks + first_track - group_start).min(length * fac) {
                0 => length * fac,
                n => n,
            };
            let cb = (0..length)
                .map(|j| seg.longline || seg.cb.get(j % seg.cb.len().max(1)).copied().unwrap_or(true))
                .collect();
            let sb = (0..=length)
                .map(|j| seg.sb.get(j % seg.sb.len().max(1)).copied().unwrap_or(true))
                .collect();
            let direction = match directionality {
                Directionality::Bidir => Direction::Bidir,
                Directionality::Unidir if itrack % 2 == 1 => Direction::Dec,
                Directionality::Unidir => Direction::Inc,
            };
            let (wire_switch, opin_switch) = match direction {
                Direction::Dec => (
                    seg.wire_switch_dec.unwrap_or(seg.wire_switch),
                    seg.opin_switch_dec.unwrap_or(seg.opin_switch),
                ),
                _ => (seg.wire_switch, seg.opin_switch),
            };
            details.push(SegDetails {
                name: seg.name.clone(),
                length,
                longline: seg.longline,
                start: (cur_track / fac) % length + 1,
                group_start,
                group_size,
                cb,
                sb,
                direction,
                wire_switch,
                opin_switch,
                inter_die_switch: seg.inter_die_switch,
                r_metal: seg.r_metal,
                c_metal: seg.c_metal,
                index: i,
                abs_index: segments.unified[i],
            });
            cur_track += 1;
        }
    }
    Ok((details, actual))
}

/// The single track of a global-routing graph.
pub fn global_seg_details(switch: SwitchId) -> Vec<SegDetails> {
    vec![SegDetails {
        name: "global".to_string(),
        length: 1,
        longline: false,
        start: 1,
        group_start: 0,
        group_size: 1,
        cb: vec![true],
        sb: vec![true, true],
        direction: Direction::Bidir,
        wire_switch: switch,
        opin_switch: switch,
        inter_die_switch: None,
        r_metal: 0.0,
        c_metal: 0.0,
        index: 0,
        abs_index: 0,
    }]
}

/// Tracks at every position of one channel axis, indexed `[x][y][track]`.
#[derive(Clone, Debug)]
pub struct ChanDetails {
    axis: Axis,
    width: usize,
    height: usize,
    cells: Vec<Vec<ChanSegDetails>>,
}

impl ChanDetails {
    /// The channel axis.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Tracks at a position; empty outside the grid.
    pub fn at(&self, x: usize, y: usize) -> &[ChanSegDetails] {
        if x >= self.width || y >= self.height {
            return &[];
        }
        &self.cells[x * self.height + y]
    }

    /// Returns `true` if the first track exists at a position.
    pub fn has_tracks(&self, x: usize, y: usize) -> bool {
        self.at(x, y).first().is_some_and(|d| d.length > 0)
    }

    fn track_mut(&mut self, x: usize, y: usize, track: usize) -> Option<&mut ChanSegDetails> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[x * self.height + y].get_mut(track)
    }

    fn track_length(&self, x: usize, y: usize, track: usize) -> usize {
        self.at(x, y).get(track).map_or(0, |d| d.length)
    }
}

/// Staggered start of the wire covering `seg` in channel `chan`.
fn seg_start_of(detail: &SegDetails, chan: usize, seg: usize) -> usize {
    if detail.longline {
        return 1;
    }
    let len = detail.length as i64;
    let seg = seg as i64;
    let start = seg - (seg + len + chan as i64 - detail.start as i64).rem_euclid(len);
    start.max(1) as usize
}

/// End of the wire starting at `start`, clipped to `seg_max`.
fn seg_end_of(detail: &SegDetails, start: usize, chan: usize, seg_max: usize) -> usize {
    if detail.longline {
        return seg_max;
    }
    let len = detail.length;
    let mut end = start + len - 1;
    if start == 1 {
        // A wire clipped at the low edge ends where the first full wire starts.
        let first_full = (len - chan % len + detail.start - 1) % len + 1;
        if first_full > 1 {
            end = first_full - 1;
        }
    }
    end.min(seg_max)
}

fn init_chan_details(
    axis: Axis,
    width: usize,
    height: usize,
    widths: &[usize],
    details: &[SegDetails],
) -> ChanDetails {
    let shared: Vec<Rc<SegDetails>> = details.iter().cloned().map(Rc::new).collect();
    let mut cells = Vec::with_capacity(width * height);
    for x in 0..width {
        for y in 0..height {
            let (chan, seg, seg_max, chan_width) = match axis {
                Axis::X => (y, x, width.saturating_sub(2), widths.get(y).copied().unwrap_or(0)),
                _ => (x, y, height.saturating_sub(2), widths.get(x).copied().unwrap_or(0)),
            };
            let tracks = shared
                .iter()
                .enumerate()
                .map(|(i, detail)| {
                    let seg_start = seg_start_of(detail, chan, seg);
                    let seg_end = seg_end_of(detail, seg_start, chan, seg_max);
                    ChanSegDetails {
                        length: if i < chan_width { detail.length } else { 0 },
                        seg_start,
                        seg_end,
                        detail: Rc::clone(detail),
                    }
                })
                .collect();
            cells.push(tracks);
        }
    }
    ChanDetails {
        axis,
        width,
        height,
        cells,
    }
}

/// Builds the horizontal and vertical channel details of a grid.
pub fn alloc_chan_details(
    width: usize,
    height: usize,
    widths: &ChannelWidths,
    seg_x: &[SegDetails],
    seg_y: &[SegDetails],
) -> (ChanDetails, ChanDetails) {
    let mut chan_x = init_chan_details(Axis::X, width, height, &widths.x_list, seg_x);
    let mut chan_y = init_chan_details(Axis::Y, width, height, &widths.y_list, seg_y);
    for y in 0..height.saturating_sub(1) {
        for x in 0..width.saturating_sub(1) {
            if !chan_x.has_tracks(x, y) {
                adjust_around_obstruction(&mut chan_x, x, y, widths.max);
            }
        }
    }
    for x in 0..width.saturating_sub(1) {
        for y in 0..height.saturating_sub(1) {
            if !chan_y.has_tracks(x, y) {
                adjust_around_obstruction(&mut chan_y, x, y, widths.max);
            }
        }
    }
    (chan_x, chan_y)
}

/// Clips the wires on both sides of a channel position that has no tracks.
fn adjust_around_obstruction(chan: &mut ChanDetails, x: usize, y: usize, max_width: usize) {
    let along_x = chan.axis == Axis::X;
    let seg_index = if along_x { x } else { y };
    let (x_max, y_max) = (chan.width.saturating_sub(2), chan.height.saturating_sub(2));
    let step_back = |(lx, ly): (usize, usize)| -> Option<(usize, usize)> {
        if along_x {
            Some((lx.checked_sub(1)?, ly))
        } else {
            Some((lx, ly.checked_sub(1)?))
        }
    };
    let step_fwd = |(lx, ly): (usize, usize)| -> Option<(usize, usize)> {
        let next = if along_x { (lx + 1, ly) } else { (lx, ly + 1) };
        (next.0 <= x_max && next.1 <= y_max).then_some(next)
    };

    for track in 0..max_width {
        let mut pos = step_back((x, y));
        while let Some((lx, ly)) = pos {
            if chan.track_length(lx, ly, track) == 0 {
                break;
            }
            let Some(d) = chan.track_mut(lx, ly, track) else {
                break;
            };
            if d.seg_end < seg_index {
                break;
            }
            d.seg_end = seg_index.saturating_sub(1);
            pos = step_back((lx, ly));
        }
    }
    for track in 0..max_width {
        let mut pos = step_fwd((x, y));
        while let Some((lx, ly)) = pos {
            if chan.track_length(lx, ly, track) == 0 {
                break;
            }
            let Some(d) = chan.track_mut(lx, ly, track) else {
                break;
            };
            if d.seg_start > seg_index {
                break;
            }
            d.seg_start = seg_index + 1;
            pos = step_fwd((lx, ly));
        }
    }
}

/// Returns `true` if `track` has a connection block at `seg`.
pub fn is_cblock(details: &[ChanSegDetails], seg: usize, track: usize) -> bool {
    let Some(d) = details.get(track) else {
        return false;
    };
    let length = d.detail.length;
    let Some(mut ofs) = seg.checked_sub(d.seg_start) else {
        return false;
    };
    if ofs >= length {
        return false;
    }
    if d.detail.direction == Direction::Dec {
        ofs = length - 1 - ofs;
    }
    d.detail.cb.get(ofs).copied().unwrap_or(false)
}

/// Returns `true` if `track` has a switch at switch block `sb_seg`.
///
/// Offset 0 is the switch block just before the wire's first tile.
pub fn is_sblock(
    details: &[ChanSegDetails],
    sb_seg: usize,
    track: usize,
    directionality: Directionality,
) -> bool {
    let Some(d) = details.get(track) else {
        return false;
    };
    let length = d.detail.length;
    let Some(mut offset) = (sb_seg + 1).checked_sub(d.seg_start) else {
        return false;
    };
    if offset > length {
        return false;
    }
    if offset % directionality.pairing_factor() > 0 {
        offset = length - offset;
    }
    d.detail.sb.get(offset).copied().unwrap_or(false)
}

/// Physical track of logical `track` at position `seg` of channel `chan`.
///
/// Within each group of tracks the logical-to-physical mapping rotates by
/// one set per channel position, so connection blocks that always pick the
/// same physical tracks still reach every logical track along a channel.
/// Unidirectional tracks rotate in INC/DEC pairs.
pub fn physical_track(
    details: &[ChanSegDetails],
    track: usize,
    chan: usize,
    seg: usize,
    directionality: Directionality,
) -> usize {
    let Some(d) = details.get(track) else {
        return track;
    };
    let fac = directionality.pairing_factor();
    let sets = d.detail.group_size / fac;
    if sets == 0 || track < d.detail.group_start {
        return track;
    }
    let rel = track - d.detail.group_start;
    let first = (chan + seg).saturating_sub(1) % sets;
    let phy_set = (first + rel / fac) % sets;
    d.detail.group_start + fac * phy_set + rel % fac
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_arch::{ParallelAxis, SegmentInf};

    fn axis_segments(length: usize, longline: bool) -> AxisSegments {
        let seg = SegmentInf {
            name: format!("L{length}"),
            length,
            frequency: 1,
            longline,
            parallel_axis: ParallelAxis::Both,
            directionality: Directionality::Unidir,
            r_metal: 10.0,
            c_metal: 1e-15,
            wire_switch: SwitchId::from_raw(0),
            opin_switch: SwitchId::from_raw(0),
            wire_switch_dec: None,
            opin_switch_dec: None,
            inter_die_switch: None,
            cb: vec![true, false, true, false][..length.min(4)].to_vec(),
            sb: vec![true; length + 1],
        };
        AxisSegments::for_axis(&[seg], Axis::X)
    }

    #[test]
    fn odd_unidir_width_rejected() {
        let segs = axis_segments(1, false);
        let err = alloc_seg_details(3, 4, &segs, Directionality::Unidir, false).unwrap_err();
        assert!(matches!(err, RrGraphError::ChannelWidthNotDivisible { width: 3, fac: 2 }));
    }

    #[test]
    fn unidir_tracks_alternate_direction() {
        let segs = axis_segments(4, false);
        let (details, width) = alloc_seg_details(8, 6, &segs, Directionality::Unidir, false).unwrap();
        assert_eq!(width, 8);
        assert_eq!(details[0].direction, Direction::Inc);
        assert_eq!(details[1].direction, Direction::Dec);
        // pairs share a start phase that steps by one per pair
        let starts: Vec<usize> = details.iter().map(|d| d.start).collect();
        assert_eq!(starts, vec![1, 1, 2, 2, 3, 3, 4, 4]);
        assert!(details.iter().all(|d| d.group_start == 0 && d.group_size == 8));
    }

    #[test]
    fn mismatched_unidir_switches_rejected() {
        let mut segs = axis_segments(1, false);
        segs.segments[0].opin_switch = SwitchId::from_raw(1);
        let err = alloc_seg_details(2, 4, &segs, Directionality::Unidir, false).unwrap_err();
        assert!(matches!(err, RrGraphError::UnidirSwitchMismatch { ref segment } if segment == "L1"));
    }

    #[test]
    fn longline_spans_channel() {
        let segs = axis_segments(1, true);
        let (details, _) = alloc_seg_details(2, 5, &segs, Directionality::Bidir, false).unwrap();
        assert_eq!(details[0].length, 5);
        assert!(details[0].cb.iter().all(|&c| c));
        let widths = ChannelWidths::uniform(2, 2, 7, 7);
        let (chan_x, _) = alloc_chan_details(7, 7, &widths, &details, &details);
        let d = &chan_x.at(3, 2)[0];
        assert_eq!((d.seg_start, d.seg_end), (1, 5));
    }

    #[test]
    fn staggered_starts_and_clipped_ends() {
        let segs = axis_segments(4, false);
        let (details, _) = alloc_seg_details(8, 8, &segs, Directionality::Unidir, false).unwrap();
        let widths = ChannelWidths::uniform(8, 8, 10, 10);
        let (chan_x, _) = alloc_chan_details(10, 10, &widths, &details, &details);
        for y in 0..9 {
            for x in 1..9 {
                for d in chan_x.at(x, y) {
                    assert!(d.seg_start <= x && x <= d.seg_end, "track covers its position");
                    assert!(d.seg_end <= 8);
                    assert!(d.seg_end + 1 - d.seg_start <= 4);
                }
            }
        }
        // track 0 in channel 0: start phase 1 gives wires 1..4, 5..8
        let d = &chan_x.at(6, 0)[0];
        assert_eq!((d.seg_start, d.seg_end), (5, 8));
        // channel 1 staggers the start backwards by one
        let d = &chan_x.at(6, 1)[0];
        assert_eq!((d.seg_start, d.seg_end), (4, 7));
    }

    #[test]
    fn narrow_channels_zero_extra_tracks() {
        let segs = axis_segments(1, false);
        let (details, _) = alloc_seg_details(4, 4, &segs, Directionality::Unidir, false).unwrap();
        let mut widths = ChannelWidths::uniform(4, 4, 6, 6);
        widths.x_list[2] = 2;
        let (chan_x, chan_y) = alloc_chan_details(6, 6, &widths, &details, &details);
        assert_eq!(chan_x.at(3, 2)[1].length, 1);
        assert_eq!(chan_x.at(3, 2)[2].length, 0);
        assert_eq!(chan_y.at(3, 2)[3].length, 1);
        assert!(chan_x.at(9, 9).is_empty());
    }

    #[test]
    fn cblock_flips_for_dec_wires() {
        let segs = axis_segments(4, false);
        let (details, _) = alloc_seg_details(2, 8, &segs, Directionality::Unidir, false).unwrap();
        let widths = ChannelWidths::uniform(2, 2, 10, 10);
        let (chan_x, _) = alloc_chan_details(10, 10, &widths, &details, &details);
        // channel 0 track 0 (INC) covers 5..8 with cb = [1, 0, 1, 0]
        let tracks = chan_x.at(5, 0);
        assert!(is_cblock(tracks, 5, 0));
        assert!(!is_cblock(tracks, 6, 0));
        // track 1 (DEC) reads the mask from its far end
        let d = &tracks[1];
        assert_eq!(d.seg_start, 5);
        assert!(!is_cblock(tracks, 5, 1));
        assert!(is_cblock(tracks, 6, 1));
        assert!(!is_cblock(tracks, 2, 0));
    }

    #[test]
    fn sblock_offsets() {
        let segs = axis_segments(4, false);
        let (details, _) = alloc_seg_details(2, 8, &segs, Directionality::Bidir, false).unwrap();
        let widths = ChannelWidths::uniform(2, 2, 10, 10);
        let (chan_x, _) = alloc_chan_details(10, 10, &widths, &details, &details);
        let tracks = chan_x.at(5, 0);
        assert!(is_sblock(tracks, 4, 0, Directionality::Bidir));
        assert!(is_sblock(tracks, 8, 0, Directionality::Bidir));
        assert!(!is_sblock(tracks, 2, 0, Directionality::Bidir));
    }

    #[test]
    fn physical_track_rotates_by_position() {
        let segs = axis_segments(2, false);
        let (details, _) = alloc_seg_details(4, 8, &segs, Directionality::Unidir, false).unwrap();
        let widths = ChannelWidths::uniform(4, 4, 10, 10);
        let (chan_x, _) = alloc_chan_details(10, 10, &widths, &details, &details);
        let tracks = chan_x.at(1, 0);
        assert_eq!(physical_track(tracks, 0, 0, 1, Directionality::Unidir), 0);
        assert_eq!(physical_track(tracks, 1, 0, 1, Directionality::Unidir), 1);
        // one position further the pairs swap
        assert_eq!(physical_track(tracks, 0, 1, 1, Directionality::Unidir), 2);
        assert_eq!(physical_track(tracks, 3, 1, 1, Directionality::Unidir), 1);
        let mut seen: Vec<usize> = (0..4)
            .map(|t| physical_track(tracks, t, 3, 5, Directionality::Unidir))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }
}
