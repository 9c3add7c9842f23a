//! The routing-graph build: options and architecture in, graph out.
//!
//! The build resolves the channel layout first (track details, channel
//! widths, Fc, connection-block maps, switch blocks, scatter-gather links,
//! bridges), then allocates every node, then runs the edge stages in a
//! fixed order, committing the proposed edges after each stage. Warnings go
//! to the diagnostic sink and are summarized in a bitmask; errors abort the
//! build.

use crate::bridge::{add_bridge_edges, bridge_switch, BridgePlan};
use crate::channel::{alloc_chan_details, alloc_seg_details, global_seg_details, SegDetails};
use crate::conn_block::{pin_to_track_map, track_to_pin_lookup, unreachable_tracks, PinLocTable, SegTracks};
use crate::context::{BuildContext, CostLayout, SwitchBlocks, TilePinMaps};
use crate::edges::{chan, custom, direct, opin, pins, sg};
use crate::error::RrGraphError;
use crate::fc::{alloc_actual_fc, perturb_ipins, perturb_opins};
use crate::graph::{GraphBuilder, RrGraph};
use crate::indices::{alloc_nodes, expected_num_nodes};
use crate::scatter_gather::{alloc_scatter_gather_links, ScatterGatherLinks};
use crate::segments::SegmentMap;
use crate::stats::GraphStats;
use crate::switchblock::{CustomSbMap, SblockPattern, SwitchBlockConn};
use crate::warnings::{self, RrGraphWarnings};
use aion_arch::{Architecture, Directionality, FcType, PinType, SwitchBlockType, TileTypeId};
use aion_common::Axis;
use aion_config::{resolve_channel_widths, ChannelWidths, ClockModeling, GraphType, RrGraphConfig};
use aion_diagnostics::DiagnosticSink;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Everything a build produces.
#[derive(Debug)]
pub struct BuildResult {
    /// The routing resource graph.
    pub graph: RrGraph,
    /// Warnings raised, as a bitmask.
    pub warnings: RrGraphWarnings,
    /// Node and edge counts.
    pub stats: GraphStats,
    /// Channel widths actually used.
    pub channel_widths: ChannelWidths,
}

/// Builds the routing resource graph of `arch` with the options of `config`.
///
/// Warnings are emitted to `sink`; the returned bitmask records which kinds
/// were raised.
pub fn build_rr_graph(
    arch: &Architecture,
    config: &RrGraphConfig,
    sink: &DiagnosticSink,
) -> Result<BuildResult, RrGraphError> {
    let (is_global, directionality) = match config.build.graph_type {
        Some(GraphType::Global) => (true, Directionality::Bidir),
        Some(GraphType::Bidir) => (false, Directionality::Bidir),
        Some(GraphType::Unidir) => (false, Directionality::Unidir),
        None => (false, arch.routing.directionality),
    };
    let custom_sb = !is_global && arch.routing.sb_type == SwitchBlockType::Custom;
    if !is_global && !custom_sb {
        let fs = arch.routing.fs;
        let supported = match directionality {
            Directionality::Unidir => fs == 3,
            Directionality::Bidir => fs > 0 && fs % 3 == 0,
        };
        if !supported {
            return Err(RrGraphError::UnsupportedFs { fs });
        }
    }

    let grid = &arch.grid;
    let (width, height) = (grid.width(), grid.height());
    let mut result_warnings = RrGraphWarnings::NONE;
    let segments = SegmentMap::new(&arch.segments);

    // track details per axis
    let (widths, seg_x, seg_y) = if is_global {
        (
            ChannelWidths::uniform(1, 1, width, height),
            global_seg_details(arch.routing.delayless_switch),
            global_seg_details(arch.routing.delayless_switch),
        )
    } else {
        let mut widths = resolve_channel_widths(&config.channel, width, height)?;
        let full = config.channel.use_full_seg_groups;
        let (seg_x, actual_x) = alloc_seg_details(
            widths.x_max,
            width.saturating_sub(2),
            &segments.x,
            directionality,
            full,
        )?;
        let (seg_y, actual_y) = alloc_seg_details(
            widths.y_max,
            height.saturating_sub(2),
            &segments.y,
            directionality,
            full,
        )?;
        if actual_x != widths.x_max {
            warnings::width_changed(sink, "horizontal", widths.x_max, actual_x);
            result_warnings.insert(RrGraphWarnings::CHAN_X_WIDTH_CHANGED);
            adjust_widths(&mut widths.x_list, widths.x_max, actual_x);
            widths.x_max = actual_x;
        }
        if actual_y != widths.y_max {
            warnings::width_changed(sink, "vertical", widths.y_max, actual_y);
            result_warnings.insert(RrGraphWarnings::CHAN_Y_WIDTH_CHANGED);
            adjust_widths(&mut widths.y_list, widths.y_max, actual_y);
            widths.y_max = actual_y;
        }
        widths.refresh_max();
        (widths, seg_x, seg_y)
    };
    let global_widths = if is_global {
        Some(resolve_channel_widths(&config.channel, width, height)?)
    } else {
        None
    };
    let (chan_x, chan_y) = alloc_chan_details(width, height, &widths, &seg_x, &seg_y);
    tracing::debug!(
        x_max = widths.x_max,
        y_max = widths.y_max,
        x_tracks = seg_x.len(),
        y_tracks = seg_y.len(),
        "channel details allocated"
    );

    // Fc and connection blocks
    let fac = directionality.pairing_factor();
    let num_unified = arch.segments.len().max(1);
    let sets_per_seg: Vec<usize> = if is_global {
        vec![1; num_unified]
    } else {
        (0..num_unified)
            .map(|u| {
                let count = |details: &[SegDetails]| details.iter().filter(|d| d.abs_index == u).count();
                count(&seg_x).max(count(&seg_y)) / fac
            })
            .collect()
    };
    let fc_in = alloc_actual_fc(arch, &sets_per_seg, directionality, FcType::In, is_global)?;
    let fc_out = alloc_actual_fc(arch, &sets_per_seg, directionality, FcType::Out, is_global)?;
    let mut clipped: Vec<&String> = fc_in.clipped.iter().chain(&fc_out.clipped).collect();
    clipped.sort();
    clipped.dedup();
    for block in clipped {
        warnings::fc_clipped(sink, block, widths.max);
        result_warnings.insert(RrGraphWarnings::FC_CLIPPED);
    }

    let perturb_in = perturb_ipins(arch, &sets_per_seg, &fc_in, &fc_out, directionality);
    let lengths: Vec<usize> = arch.segments.iter().map(|s| s.length).collect();
    let perturb_out: Vec<Vec<bool>> = arch
        .tile_types
        .iter()
        .enumerate()
        .map(|(t, tile)| match directionality {
            Directionality::Bidir if !is_global => perturb_opins(tile, &fc_out.values[t], &lengths, widths.max),
            _ => vec![false; num_unified],
        })
        .collect();
    let perturbed = perturb_in.iter().chain(&perturb_out).flatten().any(|&p| p);
    if directionality == Directionality::Unidir && perturbed {
        return Err(RrGraphError::PerturbedPatternUnidir);
    }

    let axis_tracks = |axis: Axis, details: &[SegDetails], perturb: &[bool]| -> Vec<SegTracks> {
        if is_global {
            return vec![SegTracks {
                unified: 0,
                tracks: 1,
                perturb: false,
            }];
        }
        segments
            .axis(axis)
            .unified
            .iter()
            .enumerate()
            .map(|(local, &unified)| SegTracks {
                unified,
                tracks: details.iter().filter(|d| d.index == local).count(),
                perturb: perturb.get(unified).copied().unwrap_or(false),
            })
            .collect()
    };
    let mut pin_maps = Vec::with_capacity(arch.tile_types.len());
    for (t, tile) in arch.tile_types.iter().enumerate() {
        let segs_in = [
            axis_tracks(Axis::X, &seg_x, &perturb_in[t]),
            axis_tracks(Axis::Y, &seg_y, &perturb_in[t]),
        ];
        let segs_out = [
            axis_tracks(Axis::X, &seg_x, &perturb_out[t]),
            axis_tracks(Axis::Y, &seg_y, &perturb_out[t]),
        ];
        let max = [widths.x_max, widths.y_max];
        let ipin_maps = [0, 1].map(|a| pin_to_track_map(tile, &fc_in.values[t], PinType::Receiver, &segs_in[a], directionality));

        if config.build.check_unreachable_tracks && t != TileTypeId::EMPTY.index() {
            let has_inputs = (0..tile.num_pins()).any(|p| tile.pin_type(p) == PinType::Receiver);
            for (a, axis) in ["horizontal", "vertical"].into_iter().enumerate() {
                if !has_inputs {
                    continue;
                }
                for track in unreachable_tracks(tile, &ipin_maps[a], max[a]) {
                    warnings::track_unreachable(sink, &tile.name, axis, track);
                }
            }
        }

        let track_to_ipin = [0, 1].map(|a| track_to_pin_lookup(tile, &ipin_maps[a], max[a]));
        let opin_to_track = [0, 1].map(|a| match directionality {
            Directionality::Bidir => {
                pin_to_track_map(tile, &fc_out.values[t], PinType::Driver, &segs_out[a], directionality)
            }
            Directionality::Unidir => PinLocTable::default(),
        });
        pin_maps.push(TilePinMaps {
            track_to_ipin,
            opin_to_track,
        });
    }

    // switch blocks, scatter-gather, bridges
    let mut rng = StdRng::seed_from_u64(config.build.seed);
    let switch_blocks = if custom_sb {
        SwitchBlocks::Custom(CustomSbMap::build(arch, &chan_x, &chan_y, directionality, &mut rng)?)
    } else {
        let sb_type = match arch.routing.sb_type {
            SwitchBlockType::Custom => SwitchBlockType::Wilton,
            other => other,
        };
        match directionality {
            Directionality::Bidir => SwitchBlocks::Bidir(SwitchBlockConn::new(&widths, sb_type)),
            Directionality::Unidir => {
                SwitchBlocks::Unidir(SblockPattern::build(&chan_x, &chan_y, width, height, sb_type))
            }
        }
    };
    let sg_links = if is_global {
        ScatterGatherLinks::default()
    } else {
        alloc_scatter_gather_links(arch, &chan_x, &chan_y, directionality, &mut rng, sink)?
    };
    let bridges = match &switch_blocks {
        SwitchBlocks::Custom(map) => BridgePlan::new(map, config.build.custom_3d_sb_fanin_fanout as usize),
        _ => BridgePlan::default(),
    };

    let (costs, names) = if is_global {
        let global = vec!["global".to_string()];
        (
            CostLayout {
                num_x: 1,
                num_y: 1,
                num_z: 0,
            },
            [global.clone(), global, Vec::new()],
        )
    } else {
        let names = |axis: Axis| -> Vec<String> {
            segments.axis(axis).segments.iter().map(|s| s.name.clone()).collect()
        };
        (
            CostLayout {
                num_x: segments.x.len(),
                num_y: segments.y.len(),
                num_z: segments.z.len(),
            },
            [names(Axis::X), names(Axis::Y), names(Axis::Z)],
        )
    };

    let mut ctx = BuildContext {
        arch,
        directionality,
        is_global,
        widths,
        segments,
        chan_x,
        chan_y,
        fc_out,
        pin_maps,
        switch_blocks,
        sg_links,
        bridges,
        costs,
        global_widths,
        wire_to_ipin_switch: arch.routing.wire_to_ipin_switch,
        delayless_switch: arch.routing.delayless_switch,
    };

    let mut bridges = std::mem::take(&mut ctx.bridges);
    bridges.retain(|site, conn| bridge_switch(&ctx, site, conn).is_some());
    ctx.bridges = bridges;

    // nodes, then edges stage by stage
    let expected_nodes = expected_num_nodes(&ctx);
    let mut builder = GraphBuilder::new(grid.layers(), width, height, &arch.switches);
    let index = alloc_nodes(&ctx, &mut builder);
    let verbose = config.build.verbosity > 0;

    let n = pins::add_pin_edges(&ctx, &mut builder)?;
    commit_stage(&mut builder, "pins", n, verbose);
    let mut opin_clipped = vec![false; arch.tile_types.len()];
    let n = opin::add_opin_edges(&ctx, &mut builder, &mut opin_clipped);
    commit_stage(&mut builder, "opin", n, verbose);
    for (tile, _) in arch.tile_types.iter().zip(&opin_clipped).filter(|(_, &c)| c) {
        warnings::opin_fc_clipped(sink, &tile.name);
        result_warnings.insert(RrGraphWarnings::FC_CLIPPED);
    }
    let n = direct::add_direct_edges(&ctx, &mut builder);
    commit_stage(&mut builder, "direct", n, verbose);
    let n = chan::add_chan_edges(&ctx, &mut builder)?;
    commit_stage(&mut builder, "channel", n, verbose);
    let n = custom::add_custom_sb_edges(&ctx, &mut builder);
    commit_stage(&mut builder, "custom switch blocks", n, verbose);
    let n = add_bridge_edges(&ctx, &index, &mut builder)?;
    commit_stage(&mut builder, "bridges", n, verbose);
    let n = sg::add_sg_edges(&ctx, &index, &mut builder)?;
    commit_stage(&mut builder, "scatter-gather", n, verbose);

    let [x_names, y_names, z_names] = names;
    let graph = builder.finish(ctx.costs.infos(&x_names, &y_names, &z_names))?;
    check_node_count(expected_nodes, graph.num_nodes(), config.build.clock_modeling)?;

    let stats = GraphStats::collect(&graph);
    tracing::info!(
        nodes = stats.num_nodes,
        edges = stats.num_edges,
        fingerprint = %stats.fingerprint,
        "routing graph built"
    );
    Ok(BuildResult {
        graph,
        warnings: result_warnings,
        stats,
        channel_widths: ctx.widths,
    })
}

/// Rewrites per-channel widths after the axis maximum moved from
/// `requested` to `actual`.
fn adjust_widths(list: &mut [usize], requested: usize, actual: usize) {
    for w in list {
        *w = if *w == requested { actual } else { (*w).min(actual) };
    }
}

/// Fails if the graph grew past the expected node count. A dedicated clock
/// network adds nodes the count does not cover, so it is not checked.
fn check_node_count(expected: usize, actual: usize, clock_modeling: ClockModeling) -> Result<(), RrGraphError> {
    if actual > expected && clock_modeling != ClockModeling::DedicatedNetwork {
        return Err(RrGraphError::NodeCountOverrun { expected, actual });
    }
    Ok(())
}

fn commit_stage(builder: &mut GraphBuilder, stage: &str, proposed: usize, verbose: bool) {
    let committed = builder.commit_edges();
    if verbose {
        tracing::info!(stage, proposed, committed, "edge stage committed");
    } else {
        tracing::debug!(stage, proposed, committed, "edge stage committed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_follow_the_new_maximum() {
        let mut list = vec![4, 6, 6, 3];
        adjust_widths(&mut list, 6, 8);
        assert_eq!(list, vec![4, 8, 8, 3]);
        adjust_widths(&mut list, 8, 4);
        assert_eq!(list, vec![4, 4, 4, 3]);
    }

    #[test]
    fn node_count_overrun_is_an_error() {
        let err = check_node_count(10, 11, ClockModeling::Ideal).unwrap_err();
        assert!(matches!(
            err,
            RrGraphError::NodeCountOverrun {
                expected: 10,
                actual: 11
            }
        ));
        assert_eq!(err.code().to_string(), "E506");
        assert!(check_node_count(10, 11, ClockModeling::Route).is_err());
        assert!(check_node_count(11, 11, ClockModeling::Ideal).is_ok());
        assert!(check_node_count(12, 11, ClockModeling::Ideal).is_ok());
        assert!(check_node_count(10, 11, ClockModeling::DedicatedNetwork).is_ok());
    }
}
