//! Scatter-gather edges: gathered wires -> bottleneck wire -> scattered wires.

use crate::context::{chan_kind, BuildContext};
use crate::error::RrGraphError;
use crate::graph::{GraphBuilder, RrNode, RrType};
use crate::ids::RrNodeId;
use crate::indices::{ExtraNode, NodeIndex};
use crate::scatter_gather::{BottleneckLink, LinkWire};
use aion_common::{Axis, SideSet};

fn wire_node(builder: &GraphBuilder, wire: &LinkWire) -> Option<RrNodeId> {
    builder
        .lookup()
        .find_track(wire.layer, wire.x, wire.y, chan_kind(wire.axis), wire.track)
}

/// Proposes the edges of every bottleneck link and initializes the
/// bottleneck nodes.
pub(crate) fn add_sg_edges(
    ctx: &BuildContext<'_>,
    index: &NodeIndex,
    builder: &mut GraphBuilder,
) -> Result<usize, RrGraphError> {
    let mut count = 0;
    for (link, node) in ctx.sg_links.planar().iter().zip(&index.sg_planar) {
        count += link_edges(builder, link, node.id);
        init_planar(ctx, builder, link, node)?;
    }
    for (link, node) in ctx.sg_links.interdie().zip(&index.sg_interdie) {
        count += link_edges(builder, link, node.id);
        init_interdie(ctx, builder, link, node)?;
    }
    Ok(count)
}

fn link_edges(builder: &mut GraphBuilder, link: &BottleneckLink, node: RrNodeId) -> usize {
    let mut count = 0;
    for wire in &link.gather {
        if let Some(from) = wire_node(builder, wire) {
            builder.propose_edge(from, node, link.switch);
            count += 1;
        }
    }
    for wire in &link.scatter {
        if let Some(to) = wire_node(builder, wire) {
            builder.propose_edge(node, to, link.switch);
            count += 1;
        }
    }
    count
}

fn cost_index(ctx: &BuildContext<'_>, link: &BottleneckLink) -> usize {
    match ctx.segments.axis_index(link.segment, link.axis) {
        Some(local) => ctx.costs.chan(link.axis, local),
        None => ctx.costs.bridge(),
    }
}

fn init_planar(
    ctx: &BuildContext<'_>,
    builder: &mut GraphBuilder,
    link: &BottleneckLink,
    node: &ExtraNode,
) -> Result<(), RrGraphError> {
    let (chan, lo, hi) = link.span();
    let len = (hi - lo + 1) as f32;
    let seg = ctx.arch.segments.get(link.segment);
    let rc = builder.rc_index(
        seg.map_or(0.0, |s| len * s.r_metal),
        seg.map_or(0.0, |s| len * s.c_metal),
    );
    let (x_low, y_low, x_high, y_high) = match link.axis {
        Axis::Y => (chan, lo, chan, hi),
        _ => (lo, chan, hi, chan),
    };
    let layer = link.gather_loc.layer;
    builder.init_node(
        node.id,
        RrNode {
            kind: chan_kind(link.axis),
            layer_low: layer,
            layer_high: layer,
            x_low,
            y_low,
            x_high,
            y_high,
            ptc: node.ptc,
            sides: SideSet::EMPTY,
            direction: link.direction(),
            capacity: 1,
            cost_index: cost_index(ctx, link),
            rc,
        },
    )?;
    Ok(())
}

fn init_interdie(
    ctx: &BuildContext<'_>,
    builder: &mut GraphBuilder,
    link: &BottleneckLink,
    node: &ExtraNode,
) -> Result<(), RrGraphError> {
    let seg = ctx.arch.segments.get(link.segment);
    let rc = builder.rc_index(seg.map_or(0.0, |s| s.r_metal), seg.map_or(0.0, |s| s.c_metal));
    let (a, b) = (link.gather_loc.layer, link.scatter_loc.layer);
    builder.init_node(
        node.id,
        RrNode {
            kind: RrType::ChanZ,
            layer_low: a.min(b),
            layer_high: a.max(b),
            x_low: link.gather_loc.x,
            y_low: link.gather_loc.y,
            x_high: link.gather_loc.x,
            y_high: link.gather_loc.y,
            ptc: node.ptc,
            sides: SideSet::EMPTY,
            direction: link.direction(),
            capacity: 1,
            cost_index: cost_index(ctx, link),
            rc,
        },
    )?;
    Ok(())
}
