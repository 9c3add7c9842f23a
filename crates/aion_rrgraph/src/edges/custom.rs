//! Track -> track edges of custom switch blocks within one die.

use crate::context::{BuildContext, SwitchBlocks};
use crate::edges::{propose_switch_edge, sb_wire};
use crate::graph::GraphBuilder;
use crate::switchblock::should_create_switchblock;
use aion_common::{Axis, Side};

fn wire_axis(side: Side) -> Axis {
    if side.is_vertical() {
        Axis::Y
    } else {
        Axis::X
    }
}

/// Proposes the planar connections of the custom switch-block map.
///
/// Cross-die pairs go through bridges instead.
pub(crate) fn add_custom_sb_edges(ctx: &BuildContext<'_>, builder: &mut GraphBuilder) -> usize {
    let SwitchBlocks::Custom(map) = &ctx.switch_blocks else {
        return 0;
    };
    let mut count = 0;
    for (key, edges) in map.iter() {
        if key.is_cross_die() {
            continue;
        }
        for edge in edges {
            let from_axis = wire_axis(edge.from_wire_side);
            let to_axis = wire_axis(edge.to_wire_side);
            let (chan, seg) = match from_axis {
                Axis::Y => (key.x, key.y),
                _ => (key.y, key.x),
            };
            if !should_create_switchblock(ctx.arch, key.layer, chan, seg, from_axis, to_axis) {
                continue;
            }
            let from = sb_wire(ctx, builder, key.layer, key.x, key.y, edge.from_wire_side, edge.from_track);
            let to = sb_wire(ctx, builder, key.layer, key.x, key.y, edge.to_wire_side, edge.to_track);
            let (Some((from, _)), Some((to, to_detail))) = (from, to) else {
                continue;
            };
            let Some(switch) = edge.switch_override.resolve(to_detail.detail.wire_switch) else {
                continue;
            };
            count += propose_switch_edge(ctx.arch, builder, from, to, switch);
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wires_follow_their_side() {
        assert_eq!(wire_axis(Side::Top), Axis::Y);
        assert_eq!(wire_axis(Side::Bottom), Axis::Y);
        assert_eq!(wire_axis(Side::Left), Axis::X);
        assert_eq!(wire_axis(Side::Right), Axis::X);
    }
}
