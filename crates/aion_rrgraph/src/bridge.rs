//! Inter-die bridges for cross-die custom switch-block connections.
//!
//! Cross-die connections do not join two wires directly. Each connection
//! passes through a short CHANZ bridge node at the switch block; up to
//! `custom_3d_sb_fanin_fanout` connections share one bridge, so the
//! number of vertical resources per site stays bounded.

use crate::context::BuildContext;
use crate::edges::sb_wire;
use crate::error::RrGraphError;
use crate::graph::{GraphBuilder, RrNode, RrType};
use crate::indices::NodeIndex;
use crate::switchblock::{side_channel, CustomSbMap, SbEdge};
use aion_arch::SwitchId;
use aion_common::{Direction, Side, SideSet};
use std::collections::HashMap;

/// A switch block and the pair of dice a group of bridges joins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BridgeSite {
    /// Switch-block column.
    pub x: usize,
    /// Switch-block row.
    pub y: usize,
    /// Die of the source wires.
    pub from_layer: usize,
    /// Die of the destination wires.
    pub to_layer: usize,
}

/// The cross-die connections of one site, in expansion order.
#[derive(Clone, Debug, PartialEq)]
pub struct BridgeGroup {
    /// Where the bridges sit.
    pub site: BridgeSite,
    /// Connections through the bridges; connection `i` uses bridge `i / fanin_fanout`.
    pub conns: Vec<SbEdge>,
}

impl BridgeGroup {
    /// Number of bridges the group needs.
    pub fn num_bridges(&self, fanin_fanout: usize) -> usize {
        self.conns.len().div_ceil(fanin_fanout.max(1))
    }
}

/// Every bridge group of a device.
#[derive(Clone, Debug, Default)]
pub struct BridgePlan {
    groups: Vec<BridgeGroup>,
    fanin_fanout: usize,
}

impl BridgePlan {
    /// Groups the cross-die connections of `sb` by site.
    pub fn new(sb: &CustomSbMap, fanin_fanout: usize) -> Self {
        let mut groups: Vec<BridgeGroup> = Vec::new();
        let mut by_site = HashMap::new();
        for key in sb.cross_die_keys() {
            let site = BridgeSite {
                x: key.x,
                y: key.y,
                from_layer: key.layer_of(key.from_side),
                to_layer: key.layer_of(key.to_side),
            };
            if site.from_layer == site.to_layer {
                continue;
            }
            let slot = *by_site.entry(site).or_insert_with(|| {
                groups.push(BridgeGroup {
                    site,
                    conns: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].conns.extend_from_slice(sb.get(key));
        }
        Self {
            groups,
            fanin_fanout: fanin_fanout.max(1),
        }
    }

    /// Groups in site order of first appearance.
    pub fn groups(&self) -> &[BridgeGroup] {
        &self.groups
    }

    /// Connections sharing one bridge.
    pub fn fanin_fanout(&self) -> usize {
        self.fanin_fanout
    }

    /// Drops the connections `keep` rejects, then the groups left empty.
    pub fn retain(&mut self, mut keep: impl FnMut(BridgeSite, &SbEdge) -> bool) {
        for group in &mut self.groups {
            let site = group.site;
            group.conns.retain(|conn| keep(site, conn));
        }
        self.groups.retain(|group| !group.conns.is_empty());
    }

    /// Total number of bridges.
    pub fn num_bridges(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.num_bridges(self.fanin_fanout))
            .sum()
    }
}

/// The switch into the bridge of `conn`, or `None` if either wire is
/// missing or the connection has no switch.
pub(crate) fn bridge_switch(ctx: &BuildContext<'_>, site: BridgeSite, conn: &SbEdge) -> Option<SwitchId> {
    let wire = |layer: usize, side: Side, track: usize| {
        if !ctx.routed(layer) {
            return None;
        }
        let chan = side_channel(&ctx.chan_x, &ctx.chan_y, site.x, site.y, side, ctx.width(), ctx.height())?;
        chan.tracks.get(track).filter(|d| d.length > 0)
    };
    wire(site.from_layer, conn.from_wire_side, conn.from_track)?;
    let to = wire(site.to_layer, conn.to_wire_side, conn.to_track)?;
    let implied = to.detail.inter_die_switch.unwrap_or(to.detail.wire_switch);
    conn.switch_override.resolve(implied)
}

/// Proposes `wire -> bridge -> wire` for every cross-die connection and
/// initializes the bridge nodes.
pub(crate) fn add_bridge_edges(
    ctx: &BuildContext<'_>,
    index: &NodeIndex,
    builder: &mut GraphBuilder,
) -> Result<usize, RrGraphError> {
    let fanin_fanout = ctx.bridges.fanin_fanout();
    let rc = builder.rc_index(0.0, 0.0);
    let mut count = 0;
    for (group, bridges) in ctx.bridges.groups().iter().zip(&index.bridges) {
        let site = group.site;
        for (i, conn) in group.conns.iter().enumerate() {
            let Some(bridge) = bridges.get(i / fanin_fanout) else {
                continue;
            };
            let from = sb_wire(ctx, builder, site.from_layer, site.x, site.y, conn.from_wire_side, conn.from_track);
            let to = sb_wire(ctx, builder, site.to_layer, site.x, site.y, conn.to_wire_side, conn.to_track);
            let (Some((from, _)), Some((to, _)), Some(switch)) = (from, to, bridge_switch(ctx, site, conn)) else {
                continue;
            };
            builder.propose_edge(from, bridge.id, switch);
            builder.propose_edge(bridge.id, to, ctx.delayless_switch);
            count += 2;
        }

        let direction = if site.to_layer > site.from_layer {
            Direction::Inc
        } else {
            Direction::Dec
        };
        for bridge in bridges {
            builder.init_node(
                bridge.id,
                RrNode {
                    kind: RrType::ChanZ,
                    layer_low: site.from_layer.min(site.to_layer),
                    layer_high: site.from_layer.max(site.to_layer),
                    x_low: site.x,
                    y_low: site.y,
                    x_high: site.x,
                    y_high: site.y,
                    ptc: bridge.ptc,
                    sides: SideSet::EMPTY,
                    direction,
                    capacity: 1,
                    cost_index: ctx.costs.bridge(),
                    rc,
                },
            )?;
        }
    }
    Ok(count)
}
