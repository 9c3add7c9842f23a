//! Channel wires: track -> IPIN and track -> track edges, and the wire nodes.
//!
//! Each wire is handled once, at the channel position where it starts. Its
//! input-pin connections come from the connection blocks it passes, using
//! the twisted physical track at each position. Without custom switch
//! blocks, its switch-block connections go to the perpendicular channels
//! at every switch block it touches, and straight on to the wires just
//! before its start and just after its end.

use crate::channel::{is_cblock, is_sblock, physical_track, ChanSegDetails};
use crate::context::{chan_kind, BuildContext, SwitchBlocks};
use crate::edges::opin::axis_slot;
use crate::edges::propose_switch_edge;
use crate::error::RrGraphError;
use crate::graph::{GraphBuilder, RrNode, RrType};
use crate::ids::RrNodeId;
use crate::switchblock::should_create_switchblock;
use aion_arch::{ArchSwitch, Directionality, SwitchId, TileTypeId};
use aion_common::{Axis, Direction, Side, SideSet};

/// Node position of segment `seg` of channel `chan`.
fn node_xy(axis: Axis, chan: usize, seg: usize) -> (usize, usize) {
    match axis {
        Axis::Y => (chan, seg),
        _ => (seg, chan),
    }
}

fn other(axis: Axis) -> Axis {
    match axis {
        Axis::X => Axis::Y,
        _ => Axis::X,
    }
}

/// Switches joining two bidirectional wires at a switch block.
///
/// The forward switch is the destination's own switch and exists if the
/// source has a switch block here. The backward one is the source's switch
/// and exists if the destination has a switch block here and that switch
/// conducts both ways. Two switches of the same kind collapse into the
/// one with lower resistance, the lower index on a tie.
pub(crate) fn switch_types(
    switches: &[ArchSwitch],
    from_is_sblock: bool,
    to_is_sblock: bool,
    from_switch: SwitchId,
    to_switch: SwitchId,
) -> [Option<SwitchId>; 2] {
    let sw = |id: SwitchId| switches.get(id.index());
    let mut out = [None, None];
    let mut used = 0;
    if from_is_sblock {
        out[used] = Some(to_switch);
        used += 1;
    }
    let backward = to_is_sblock && sw(from_switch).is_some_and(ArchSwitch::is_bidirectional);
    if backward {
        out[used] = Some(from_switch);
    }
    if let (true, true, Some(f), Some(t)) = (from_is_sblock, backward, sw(from_switch), sw(to_switch)) {
        if f.kind == t.kind {
            let (first, second) = if from_switch < to_switch {
                (from_switch, to_switch)
            } else {
                (to_switch, from_switch)
            };
            let chosen = match (sw(first), sw(second)) {
                (Some(a), Some(b)) if b.r < a.r => second,
                _ => first,
            };
            out = [Some(chosen), Some(chosen)];
        }
    }
    out
}

/// Proposes the edges leaving every channel wire and initializes the wire nodes.
pub(crate) fn add_chan_edges(ctx: &BuildContext<'_>, builder: &mut GraphBuilder) -> Result<usize, RrGraphError> {
    let (width, height) = (ctx.width(), ctx.height());
    let mut count = 0;
    for layer in ctx.routed_layers() {
        for chan in 0..height.saturating_sub(1) {
            for seg in 1..width.saturating_sub(1) {
                count += build_chan(ctx, builder, layer, Axis::X, chan, seg)?;
            }
        }
        for chan in 0..width.saturating_sub(1) {
            for seg in 1..height.saturating_sub(1) {
                count += build_chan(ctx, builder, layer, Axis::Y, chan, seg)?;
            }
        }
    }
    Ok(count)
}

/// Last segment coordinate and last channel coordinate of an axis.
fn dims(ctx: &BuildContext<'_>, axis: Axis) -> (usize, usize) {
    let (w, h) = (ctx.width().saturating_sub(2), ctx.height().saturating_sub(2));
    match axis {
        Axis::Y => (h, w),
        _ => (w, h),
    }
}

fn build_chan(
    ctx: &BuildContext<'_>,
    builder: &mut GraphBuilder,
    layer: usize,
    axis: Axis,
    chan: usize,
    seg: usize,
) -> Result<usize, RrGraphError> {
    let (x, y) = node_xy(axis, chan, seg);
    let kind = chan_kind(axis);
    let (seg_dim, _) = dims(ctx, axis);
    let tracks = ctx.tracks_at(axis, x, y);
    let mut count = 0;
    for (track, d) in tracks.iter().enumerate() {
        if d.length == 0 || d.seg_start.max(1) != seg {
            continue;
        }
        let Some(node) = builder.lookup().find_track(layer, x, y, kind, track) else {
            continue;
        };
        let wire = Wire {
            layer,
            axis,
            chan,
            start: seg,
            end: d.seg_end.min(seg_dim),
            track,
            node,
            tracks,
        };
        count += track_to_ipins(ctx, builder, &wire);
        if !matches!(ctx.switch_blocks, SwitchBlocks::Custom(_)) {
            count += track_to_tracks(ctx, builder, &wire);
        }

        let len = (wire.end - wire.start + 1) as f32;
        let rc = builder.rc_index(len * d.detail.r_metal, len * d.detail.c_metal);
        let (x_high, y_high) = node_xy(axis, chan, wire.end);
        builder.init_node(
            node,
            RrNode {
                kind,
                layer_low: layer,
                layer_high: layer,
                x_low: x,
                y_low: y,
                x_high,
                y_high,
                ptc: track,
                sides: SideSet::EMPTY,
                direction: d.detail.direction,
                capacity: ctx.wire_capacity(axis, chan),
                cost_index: ctx.costs.chan(axis, d.detail.index),
                rc,
            },
        )?;
    }
    Ok(count)
}

/// A wire being connected, seen from its starting position.
struct Wire<'a> {
    layer: usize,
    axis: Axis,
    chan: usize,
    start: usize,
    end: usize,
    track: usize,
    node: RrNodeId,
    /// Tracks at the starting position.
    tracks: &'a [ChanSegDetails],
}

fn track_to_ipins(ctx: &BuildContext<'_>, builder: &mut GraphBuilder, wire: &Wire<'_>) -> usize {
    let grid = &ctx.arch.grid;
    let max_width = ctx.max_width(wire.axis).max(1);
    let pin_layers: Vec<usize> = std::iter::once(wire.layer)
        .chain((0..ctx.layers()).filter(|&l| !ctx.routed(l)))
        .collect();
    let mut count = 0;
    for j in wire.start..=wire.end {
        if !is_cblock(wire.tracks, j, wire.track) {
            continue;
        }
        let phy = physical_track(wire.tracks, wire.track, wire.chan, j, ctx.directionality) % max_width;
        for pass in 0..2 {
            let (x, y, side) = match (wire.axis, pass) {
                (Axis::Y, 0) => (wire.chan, j, Side::Right),
                (Axis::Y, _) => (wire.chan + 1, j, Side::Left),
                (_, 0) => (j, wire.chan, Side::Top),
                (_, _) => (j, wire.chan + 1, Side::Bottom),
            };
            if x >= ctx.width() || y >= ctx.height() {
                continue;
            }
            for &pin_layer in &pin_layers {
                let cell = grid.tile(pin_layer, x, y);
                if cell.tile_type == TileTypeId::EMPTY {
                    continue;
                }
                let Some(maps) = ctx.pin_maps.get(cell.tile_type.index()) else {
                    continue;
                };
                let switch = ctx.ipin_switch(wire.layer, pin_layer);
                for &pin in maps.track_to_ipin[axis_slot(wire.axis)].get(phy, cell.width_offset, cell.height_offset, side) {
                    if let Some(to) = builder.lookup().find(pin_layer, x, y, RrType::Ipin, pin, Some(side)) {
                        builder.propose_edge(wire.node, to, switch);
                        count += 1;
                    }
                }
            }
        }
    }
    count
}

fn track_to_tracks(ctx: &BuildContext<'_>, builder: &mut GraphBuilder, wire: &Wire<'_>) -> usize {
    let (seg_dim, chan_dim) = dims(ctx, wire.axis);
    let cross = other(wire.axis);
    let mut targets = Vec::with_capacity(4);
    if wire.chan > 0 {
        targets.push((cross, wire.chan));
    }
    if wire.chan < chan_dim {
        targets.push((cross, wire.chan + 1));
    }
    if wire.start > 1 {
        targets.push((wire.axis, wire.start - 1));
    }
    if wire.end < seg_dim {
        targets.push((wire.axis, wire.end + 1));
    }
    targets
        .into_iter()
        .map(|(to_axis, to_seg)| track_to_chan(ctx, builder, wire, to_axis, to_seg))
        .sum()
}

/// Connections from `wire` into segment `to_seg` of every channel of
/// `to_axis` it meets.
fn track_to_chan(
    ctx: &BuildContext<'_>,
    builder: &mut GraphBuilder,
    wire: &Wire<'_>,
    to_axis: Axis,
    to_seg: usize,
) -> usize {
    let start_sb = wire.start - 1;
    let end_sb = wire.end;
    let same_axis = to_axis == wire.axis;
    let (lo, hi) = if same_axis { (to_seg - 1, to_seg) } else { (start_sb, end_sb) };
    let from_detail = &wire.tracks[wire.track];
    let (side_a, side_b) = match wire.axis {
        Axis::Y => (Side::Top, Side::Bottom),
        _ => (Side::Right, Side::Left),
    };

    let mut count = 0;
    for sb_seg in lo.max(start_sb)..=hi.min(end_sb) {
        let from_is_sblock = sb_seg == start_sb
            || sb_seg == end_sb
            || is_sblock(wire.tracks, sb_seg, wire.track, ctx.directionality);
        if !should_create_switchblock(ctx.arch, wire.layer, wire.chan, sb_seg, wire.axis, to_axis) {
            continue;
        }
        let (to_chan, to_sb) = if same_axis { (wire.chan, sb_seg) } else { (sb_seg, wire.chan) };
        let (to_x, to_y) = node_xy(to_axis, to_chan, to_seg);
        let to_tracks = ctx.tracks_at(to_axis, to_x, to_y);
        if to_tracks.first().map_or(true, |d| d.length == 0) {
            continue;
        }
        let behind = if same_axis { sb_seg == lo } else { to_seg > wire.chan };
        let to_side = match (to_axis, behind) {
            (Axis::Y, true) => Side::Top,
            (Axis::Y, false) => Side::Bottom,
            (_, true) => Side::Right,
            (_, false) => Side::Left,
        };
        let (sb_x, sb_y) = node_xy(wire.axis, wire.chan, sb_seg);
        let target = Target {
            x: to_x,
            y: to_y,
            kind: chan_kind(to_axis),
            sb: to_sb,
            side: to_side,
            tracks: to_tracks,
        };

        // A DEC wire drives out of the RIGHT or TOP of a switch block, an
        // INC wire out of the LEFT or BOTTOM.
        let sides = [(sb_seg < end_sb, side_a, Direction::Dec), (sb_seg > start_sb, side_b, Direction::Inc)];
        for (present, from_side, unidir_dir) in sides {
            if !present {
                continue;
            }
            count += match &ctx.switch_blocks {
                SwitchBlocks::Bidir(conn) => {
                    let to_tracks = conn.get(from_side, to_side, wire.track);
                    bidir_to_chan(ctx, builder, wire, &target, to_tracks, from_is_sblock)
                }
                SwitchBlocks::Unidir(pattern) => {
                    if !from_is_sblock || from_detail.detail.direction != unidir_dir {
                        continue;
                    }
                    let mut n = 0;
                    for t in pattern.targets(sb_x, sb_y, from_side, to_side, wire.track).into_iter().flatten() {
                        let Some((to, detail)) = target.node(builder, wire.layer, t.track) else {
                            continue;
                        };
                        n += propose_switch_edge(ctx.arch, builder, wire.node, to, detail.detail.wire_switch);
                    }
                    n
                }
                SwitchBlocks::Custom(_) => 0,
            };
        }
    }
    count
}

/// The destination channel segment at one switch block.
struct Target<'a> {
    x: usize,
    y: usize,
    kind: RrType,
    /// Coordinate of the switch block along the destination channel.
    sb: usize,
    side: Side,
    tracks: &'a [ChanSegDetails],
}

impl<'a> Target<'a> {
    fn node(&self, builder: &GraphBuilder, layer: usize, track: usize) -> Option<(RrNodeId, &'a ChanSegDetails)> {
        let detail = self.tracks.get(track).filter(|d| d.length > 0)?;
        let node = builder.lookup().find_track(layer, self.x, self.y, self.kind, track)?;
        Some((node, detail))
    }
}

fn bidir_to_chan(
    ctx: &BuildContext<'_>,
    builder: &mut GraphBuilder,
    wire: &Wire<'_>,
    target: &Target<'_>,
    to_tracks: &[usize],
    from_is_sblock: bool,
) -> usize {
    let from_switch = wire.tracks[wire.track].detail.wire_switch;
    let mut count = 0;
    for &to_track in to_tracks {
        let Some((to, detail)) = target.node(builder, wire.layer, to_track) else {
            continue;
        };
        let to_is_sblock = is_sblock(target.tracks, target.sb, to_track, Directionality::Bidir);
        let switches = switch_types(
            &ctx.arch.switches,
            from_is_sblock,
            to_is_sblock,
            from_switch,
            detail.detail.wire_switch,
        );
        for switch in switches.into_iter().flatten() {
            builder.propose_edge(wire.node, to, switch);
            count += 1;
        }
    }
    tracing::trace!(side = %target.side, count, "bidir switch-block edges");
    count
}
