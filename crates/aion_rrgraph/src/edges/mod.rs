//! Edge assembly.
//!
//! Each stage proposes the edges of one kind of connection into the graph
//! builder and initializes the nodes it owns once their connections are
//! known. The build commits the pending edges after every stage.

pub mod chan;
pub mod custom;
pub mod direct;
pub mod opin;
pub mod pins;
pub mod sg;

use crate::channel::ChanSegDetails;
use crate::context::{chan_kind, BuildContext};
use crate::graph::GraphBuilder;
use crate::ids::RrNodeId;
use crate::switchblock::side_channel;
use aion_arch::{Architecture, SwitchId};
use aion_common::Side;

/// Proposes `from -> to`, and `to -> from` as well if the switch conducts
/// both ways.
pub(crate) fn propose_switch_edge(
    arch: &Architecture,
    builder: &mut GraphBuilder,
    from: RrNodeId,
    to: RrNodeId,
    switch: SwitchId,
) -> usize {
    builder.propose_edge(from, to, switch);
    if arch.switch(switch).is_bidirectional() {
        builder.propose_edge(to, from, switch);
        2
    } else {
        1
    }
}

/// The wire node of `track` on planar `side` of switch block `(x, y)`.
pub(crate) fn sb_wire<'c>(
    ctx: &'c BuildContext<'_>,
    builder: &GraphBuilder,
    layer: usize,
    x: usize,
    y: usize,
    side: Side,
    track: usize,
) -> Option<(RrNodeId, &'c ChanSegDetails)> {
    let chan = side_channel(&ctx.chan_x, &ctx.chan_y, x, y, side, ctx.width(), ctx.height())?;
    let detail = chan.tracks.get(track).filter(|d| d.length > 0)?;
    let (nx, ny) = chan.node_xy();
    let node = builder
        .lookup()
        .find_track(layer, nx, ny, chan_kind(chan.axis), track)?;
    Some((node, detail))
}
