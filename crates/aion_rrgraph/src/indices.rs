//! Node allocation and the spatial index.
//!
//! Every node is allocated before any edge is proposed, so each edge stage
//! can find both ends of a connection through the lookup. Attributes are
//! set later, by the stage that owns the node.
//!
//! - SOURCE and SINK: one node per pin class of every tile, recorded at
//!   every cell the tile covers.
//! - OPIN and IPIN: one node per pin, recorded on each (cell, side) the pin
//!   is placed on, except sides facing off the device.
//! - CHANX and CHANY: one node per wire, recorded at every channel
//!   position it covers.
//! - Bottleneck wires of scatter-gather links and inter-die bridges: one
//!   node each, numbered after the regular tracks of their channel.

use crate::context::{chan_kind, BuildContext};
use crate::graph::{GraphBuilder, NodeLookup, RrType};
use crate::ids::RrNodeId;
use aion_arch::{PhysicalTileType, PinType};
use aion_common::{Axis, Side, SideSet};
use std::collections::HashMap;

/// A node outside the regular tracks, with the track number it was given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ExtraNode {
    pub id: RrNodeId,
    pub ptc: usize,
}

/// Nodes the edge stages cannot find through the lookup alone.
#[derive(Debug, Default)]
pub(crate) struct NodeIndex {
    /// One per planar bottleneck link, in link order.
    pub sg_planar: Vec<ExtraNode>,
    /// One per inter-die bottleneck link, in link order.
    pub sg_interdie: Vec<ExtraNode>,
    /// Bridges of every bridge group.
    pub bridges: Vec<Vec<ExtraNode>>,
}

/// Hands out track numbers past the regular tracks of a channel.
#[derive(Default)]
struct ExtraPtc {
    next: HashMap<(usize, Axis, usize, usize), usize>,
}

impl ExtraPtc {
    fn take(&mut self, layer: usize, axis: Axis, a: usize, b: usize, first: usize) -> usize {
        let slot = self.next.entry((layer, axis, a, b)).or_insert(first);
        let ptc = *slot;
        *slot += 1;
        ptc
    }
}

/// Allocates every node of the graph and fills the lookup.
pub(crate) fn alloc_nodes(ctx: &BuildContext<'_>, builder: &mut GraphBuilder) -> NodeIndex {
    alloc_tile_nodes(ctx, builder);
    let tiles = builder.num_nodes();
    alloc_chan_nodes(ctx, builder);
    let wires = builder.num_nodes() - tiles;

    let mut ptc = ExtraPtc::default();
    let mut index = NodeIndex::default();
    for link in ctx.sg_links.planar() {
        let id = builder.alloc_node();
        let (chan, lo, hi) = link.span();
        let layer = link.gather_loc.layer;
        let p = ptc.take(layer, link.axis, chan, 0, ctx.max_width(link.axis));
        for seg in lo..=hi {
            let (x, y) = match link.axis {
                Axis::Y => (chan, seg),
                _ => (seg, chan),
            };
            builder
                .lookup_mut()
                .insert(layer, x, y, chan_kind(link.axis), p, None, id);
        }
        index.sg_planar.push(ExtraNode { id, ptc: p });
    }
    for link in ctx.sg_links.interdie() {
        let (x, y) = (link.gather_loc.x, link.gather_loc.y);
        let id = builder.alloc_node();
        let p = ptc.take(0, Axis::Z, x, y, 0);
        let (lo, hi) = ordered(link.gather_loc.layer, link.scatter_loc.layer);
        for layer in lo..=hi {
            builder.lookup_mut().insert(layer, x, y, RrType::ChanZ, p, None, id);
        }
        index.sg_interdie.push(ExtraNode { id, ptc: p });
    }
    for group in ctx.bridges.groups() {
        let site = group.site;
        let (lo, hi) = ordered(site.from_layer, site.to_layer);
        let nodes = (0..group.num_bridges(ctx.bridges.fanin_fanout()))
            .map(|_| {
                let id = builder.alloc_node();
                let p = ptc.take(0, Axis::Z, site.x, site.y, 0);
                for layer in lo..=hi {
                    builder
                        .lookup_mut()
                        .insert(layer, site.x, site.y, RrType::ChanZ, p, None, id);
                }
                ExtraNode { id, ptc: p }
            })
            .collect();
        index.bridges.push(nodes);
    }

    tracing::debug!(
        tile_nodes = tiles,
        wire_nodes = wires,
        extra_nodes = builder.num_nodes() - tiles - wires,
        "allocated node indices"
    );
    index
}

/// Number of nodes the grid, the channel layout, the scatter-gather links
/// and the bridge plan call for, counted without the lookup.
pub(crate) fn expected_num_nodes(ctx: &BuildContext<'_>) -> usize {
    let grid = &ctx.arch.grid;
    let (width, height) = (grid.width(), grid.height());
    let mut count = 0;
    for (layer, x, y) in grid.roots() {
        let tile = ctx.arch.tile_type(grid.tile_type(layer, x, y));
        count += tile.classes.len();
        count += tile
            .pin_locs
            .iter()
            .filter(|locs| {
                locs.iter()
                    .any(|loc| side_faces_device(loc.side, x + loc.width_offset, y + loc.height_offset, width, height))
            })
            .count();
    }

    // a wire is counted at the first position of the channel it covers
    let starts = |axis: Axis, x: usize, y: usize, seg: usize| {
        ctx.tracks_at(axis, x, y)
            .iter()
            .filter(|d| d.length > 0 && d.seg_start.max(1) == seg)
            .count()
    };
    let wires_per_layer: usize = (0..height.saturating_sub(1))
        .flat_map(|y| (1..width.saturating_sub(1)).map(move |x| (x, y)))
        .map(|(x, y)| starts(Axis::X, x, y, x))
        .chain(
            (0..width.saturating_sub(1))
                .flat_map(|x| (1..height.saturating_sub(1)).map(move |y| (x, y)))
                .map(|(x, y)| starts(Axis::Y, x, y, y)),
        )
        .sum();
    count += wires_per_layer * ctx.routed_layers().len();

    count + ctx.sg_links.planar().len() + ctx.sg_links.interdie().count() + ctx.bridges.num_bridges()
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Returns `true` if a pin on `side` of cell `(x, y)` faces into the device.
pub(crate) fn side_faces_device(side: Side, x: usize, y: usize, width: usize, height: usize) -> bool {
    match side {
        Side::Top => y + 1 < height,
        Side::Right => x + 1 < width,
        Side::Bottom => y > 0,
        Side::Left => x > 0,
        Side::Above | Side::Under => false,
    }
}

fn pin_kind(pin_type: PinType) -> RrType {
    match pin_type {
        PinType::Driver => RrType::Opin,
        PinType::Receiver => RrType::Ipin,
    }
}

fn class_kind(pin_type: PinType) -> RrType {
    match pin_type {
        PinType::Driver => RrType::Source,
        PinType::Receiver => RrType::Sink,
    }
}

fn alloc_tile_nodes(ctx: &BuildContext<'_>, builder: &mut GraphBuilder) {
    let grid = &ctx.arch.grid;
    let (width, height) = (grid.width(), grid.height());
    for (layer, x, y) in grid.roots() {
        let tile = ctx.arch.tile_type(grid.tile_type(layer, x, y));
        for (class, info) in tile.classes.iter().enumerate() {
            let id = builder.alloc_node();
            for dx in 0..tile.width {
                for dy in 0..tile.height {
                    builder
                        .lookup_mut()
                        .insert(layer, x + dx, y + dy, class_kind(info.kind), class, None, id);
                }
            }
        }
        for pin in 0..tile.num_pins() {
            let kind = pin_kind(tile.pin_type(pin));
            let locs: Vec<_> = tile.pin_locs[pin]
                .iter()
                .filter(|loc| {
                    side_faces_device(loc.side, x + loc.width_offset, y + loc.height_offset, width, height)
                })
                .collect();
            if locs.is_empty() {
                continue;
            }
            let id = builder.alloc_node();
            for loc in locs {
                builder.lookup_mut().insert(
                    layer,
                    x + loc.width_offset,
                    y + loc.height_offset,
                    kind,
                    pin,
                    Some(loc.side),
                    id,
                );
            }
        }
    }
}

fn alloc_chan_nodes(ctx: &BuildContext<'_>, builder: &mut GraphBuilder) {
    let (width, height) = (ctx.width(), ctx.height());
    for layer in ctx.routed_layers() {
        for y in 0..height.saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                alloc_wires_at(ctx, builder, layer, Axis::X, x, y);
            }
        }
        for x in 0..width.saturating_sub(1) {
            for y in 1..height.saturating_sub(1) {
                alloc_wires_at(ctx, builder, layer, Axis::Y, x, y);
            }
        }
    }
}

/// Allocates the wires of channel position `(x, y)` not yet indexed from
/// an earlier position.
fn alloc_wires_at(
    ctx: &BuildContext<'_>,
    builder: &mut GraphBuilder,
    layer: usize,
    axis: Axis,
    x: usize,
    y: usize,
) {
    let kind = chan_kind(axis);
    for (track, d) in ctx.tracks_at(axis, x, y).iter().enumerate() {
        if d.length == 0 || builder.lookup().find_track(layer, x, y, kind, track).is_some() {
            continue;
        }
        let id = builder.alloc_node();
        for seg in d.seg_start..=d.seg_end {
            let (nx, ny) = match axis {
                Axis::Y => (x, seg),
                _ => (seg, y),
            };
            builder.lookup_mut().insert(layer, nx, ny, kind, track, None, id);
        }
    }
}

/// The node of `pin` of the tile rooted at `(x, y)`, the cell it sits on
/// first, and every side it is recorded on.
pub(crate) fn pin_node(
    lookup: &NodeLookup,
    tile: &PhysicalTileType,
    layer: usize,
    x: usize,
    y: usize,
    pin: usize,
) -> Option<(RrNodeId, (usize, usize), SideSet)> {
    let kind = pin_kind(tile.pin_type(pin));
    let mut found: Option<(RrNodeId, (usize, usize), SideSet)> = None;
    for loc in &tile.pin_locs[pin] {
        let (cx, cy) = (x + loc.width_offset, y + loc.height_offset);
        let Some(id) = lookup.find(layer, cx, cy, kind, pin, Some(loc.side)) else {
            continue;
        };
        if let Some((_, _, sides)) = found.as_mut() {
            sides.insert(loc.side);
        } else {
            found = Some((id, (cx, cy), SideSet::single(loc.side)));
        }
    }
    found
}
