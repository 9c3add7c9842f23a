//! End-to-end builds over small fabrics: graph shape, warnings, and errors.

mod common;

use aion_common::Direction;
use aion_rrgraph::warnings::{W_CHAN_WIDTH_CHANGED, W_FC_CLIPPED, W_TRACK_UNREACHABLE};
use aion_rrgraph::{RrGraph, RrGraphError, RrGraphWarnings, RrNodeId, RrType};
use common::*;
use std::collections::HashSet;

const WIDTH_4: &str = "[channel]\nwidth = 4\n";

fn nodes_of(graph: &RrGraph, kind: RrType) -> impl Iterator<Item = (RrNodeId, &aion_rrgraph::RrNode)> {
    graph
        .nodes
        .iter()
        .enumerate()
        .filter(move |(_, n)| n.kind == kind)
        .map(|(i, n)| (RrNodeId::from_index(i), n))
}

// ---------------------------------------------------------------------------
// Graph shape
// ---------------------------------------------------------------------------

#[test]
fn rebuilding_gives_the_same_graph() {
    let arch = unidir_arch();
    let cfg = config(WIDTH_4);
    let (a, _) = build(&arch, &cfg);
    let (b, _) = build(&arch, &cfg);
    assert_eq!(a.graph.fingerprint(), b.graph.fingerprint());
    assert_eq!(a.graph.nodes, b.graph.nodes);
    assert_eq!(a.graph.edges, b.graph.edges);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn edges_are_unique() {
    let (result, _) = build(&unidir_arch(), &config(WIDTH_4));
    let graph = &result.graph;
    let unique: HashSet<_> = graph.edges.iter().map(|e| (e.from, e.to, e.switch)).collect();
    assert_eq!(unique.len(), graph.num_edges());
    assert!(graph.num_edges() > 0);
}

#[test]
fn stats_add_up() {
    let (result, _) = build(&unidir_arch(), &config(WIDTH_4));
    let stats = &result.stats;
    assert_eq!(stats.num_nodes, result.graph.num_nodes());
    assert_eq!(stats.nodes_by_type.values().sum::<usize>(), stats.num_nodes);
    assert_eq!(stats.edges_by_switch.values().sum::<usize>(), stats.num_edges);
    assert_eq!(stats.nodes_by_type["CHANZ"], 0);
    assert_eq!(stats.fingerprint, result.graph.fingerprint().to_string());
    assert!(stats.to_string().contains("fingerprint"));
}

#[test]
fn pins_connect_to_their_classes() {
    let (result, _) = build(&unidir_arch(), &config(WIDTH_4));
    let graph = &result.graph;

    for (id, _) in nodes_of(graph, RrType::Ipin) {
        let out = graph.edges_from(id);
        assert_eq!(out.len(), 1);
        assert_eq!(graph.node(out[0].to).kind, RrType::Sink);
    }

    let driven: HashSet<RrNodeId> = nodes_of(graph, RrType::Source)
        .flat_map(|(id, _)| graph.edges_from(id).iter().map(|e| e.to))
        .collect();
    let opins: HashSet<RrNodeId> = nodes_of(graph, RrType::Opin).map(|(id, _)| id).collect();
    assert!(!opins.is_empty());
    assert_eq!(driven, opins);
}

#[test]
fn wires_stay_inside_their_channels() {
    let (result, _) = build(&unidir_arch(), &config(WIDTH_4));
    let graph = &result.graph;
    // 5x5 grid: segments 1..=3, channels 0..=3
    for (_, n) in nodes_of(graph, RrType::ChanX) {
        assert!(n.x_low >= 1 && n.x_low <= n.x_high && n.x_high <= 3);
        assert!(n.y_low == n.y_high && n.y_low <= 3);
        assert!(n.ptc < result.channel_widths.x_max);
    }
    for (_, n) in nodes_of(graph, RrType::ChanY) {
        assert!(n.y_low >= 1 && n.y_low <= n.y_high && n.y_high <= 3);
        assert!(n.x_low == n.x_high && n.x_low <= 3);
        assert!(n.ptc < result.channel_widths.y_max);
    }
    // 3 segments x 4 channels x 4 tracks per axis
    assert_eq!(result.stats.nodes_by_type["CHANX"], 48);
    assert_eq!(result.stats.nodes_by_type["CHANY"], 48);
}

#[test]
fn unidirectional_wires_come_in_pairs() {
    let (result, _) = build(&unidir_arch(), &config(WIDTH_4));
    for kind in [RrType::ChanX, RrType::ChanY] {
        let dirs: Vec<Direction> = nodes_of(&result.graph, kind).map(|(_, n)| n.direction).collect();
        let inc = dirs.iter().filter(|&&d| d == Direction::Inc).count();
        let dec = dirs.iter().filter(|&&d| d == Direction::Dec).count();
        assert_eq!(inc, dec);
        assert_eq!(inc + dec, dirs.len());
    }
}

#[test]
fn inputs_are_fed_through_the_ipin_switch() {
    let arch = unidir_arch();
    let ipin = arch.find_switch("ipin").unwrap();
    let (result, _) = build(&arch, &config(WIDTH_4));
    let graph = &result.graph;
    let into_ipins: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| graph.node(e.to).kind == RrType::Ipin)
        .collect();
    assert!(!into_ipins.is_empty());
    for edge in into_ipins {
        let (from, _) = ends(graph, edge);
        assert!(from.kind.is_channel());
        assert_eq!(edge.switch, ipin);
    }
}

#[test]
fn two_tracks_form_one_unidirectional_set() {
    let (result, sink) = build(&unidir_arch(), &config("[channel]\nwidth = 2\n"));
    assert_eq!(result.channel_widths.x_max, 2);
    assert_eq!(result.channel_widths.y_max, 2);
    assert!(result.warnings.is_empty());
    assert_eq!(sink.warning_count(), 0);
    let at_origin = nodes_of(&result.graph, RrType::ChanX)
        .filter(|(_, n)| n.x_low == 1 && n.y_low == 0)
        .count();
    assert_eq!(at_origin, 2);
}

// ---------------------------------------------------------------------------
// Fc
// ---------------------------------------------------------------------------

#[test]
fn zero_fc_leaves_inputs_unconnected() {
    let arch = load(&[
        &routing("unidir", ""),
        &segment("L1", 1, ""),
        &clb(&frac(0.0), &frac(0.5)),
        &clb_grid(5),
    ]);
    let (result, sink) = build(&arch, &config(WIDTH_4));
    let graph = &result.graph;
    for (id, _) in nodes_of(graph, RrType::Ipin) {
        assert_eq!(graph.fan_in(id), 0);
    }
    assert!(result.warnings.is_empty());
    assert_eq!(sink.warning_count(), 0);
}

#[test]
fn unreachable_tracks_are_reported_on_request() {
    let arch = load(&[
        &routing("unidir", ""),
        &segment("L1", 1, ""),
        &clb(&frac(0.0), &frac(0.5)),
        &clb_grid(5),
    ]);
    let (result, sink) = build(&arch, &config("[channel]\nwidth = 4\n[build]\ncheck_unreachable_tracks = true\n"));
    let diags = sink.take_all();
    // every track of both axes, for the one tile type with inputs
    assert_eq!(diags.len(), 8);
    assert!(diags.iter().all(|d| d.code == W_TRACK_UNREACHABLE));
    assert!(result.warnings.is_empty());
}

#[test]
fn oversized_absolute_fc_is_clipped() {
    let arch = load(&[
        &routing("unidir", ""),
        &segment("L1", 1, ""),
        &clb(r#"{ type = "abs", value = 12 }"#, r#"{ type = "abs", value = 2 }"#),
        &clb_grid(5),
    ]);
    let (result, sink) = build(&arch, &config(WIDTH_4));
    assert!(result.warnings.contains(RrGraphWarnings::FC_CLIPPED));
    let diags = sink.take_all();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, W_FC_CLIPPED);
}

#[test]
fn output_fc_is_clipped_to_the_muxes_starting_nearby() {
    // two staggered sets of length-4 wires: at most one INC and one DEC
    // wire starts next to any pin
    let arch = load(&[
        &routing("unidir", ""),
        &segment("L4", 4, ""),
        &clb(&frac(0.5), r#"{ type = "abs", value = 4 }"#),
        &clb_grid(8),
    ]);
    let (result, sink) = build(&arch, &config(WIDTH_4));
    assert!(result.warnings.contains(RrGraphWarnings::FC_CLIPPED));
    let clipped: Vec<_> = sink
        .take_all()
        .into_iter()
        .filter(|d| d.code == W_FC_CLIPPED)
        .collect();
    assert_eq!(clipped.len(), 1);
    assert!(clipped[0].message.contains("'clb'"));
    assert!(clipped[0].message.contains("output pins"));
}

#[test]
fn odd_absolute_fc_is_rejected_for_unidirectional_wires() {
    let arch = load(&[
        &routing("unidir", ""),
        &segment("L1", 1, ""),
        &clb(r#"{ type = "abs", value = 3 }"#, r#"{ type = "abs", value = 2 }"#),
        &clb_grid(5),
    ]);
    let (result, _) = try_build(&arch, &config(WIDTH_4));
    assert!(matches!(result, Err(RrGraphError::AbsoluteFcNotMultiple { fac: 2, .. })));
}

// ---------------------------------------------------------------------------
// Channel widths
// ---------------------------------------------------------------------------

#[test]
fn odd_width_is_rejected_for_unidirectional_wires() {
    let (result, _) = try_build(&unidir_arch(), &config("[channel]\nwidth = 5\n"));
    assert!(matches!(
        result,
        Err(RrGraphError::ChannelWidthNotDivisible { width: 5, fac: 2 })
    ));
}

#[test]
fn whole_segment_groups_widen_the_channels() {
    let arch = load(&[
        &routing("unidir", ""),
        &segment("L4", 4, ""),
        &clb(&frac(0.5), r#"{ type = "abs", value = 2 }"#),
        &clb_grid(8),
    ]);
    let (result, sink) = build(&arch, &config("[channel]\nwidth = 6\nuse_full_seg_groups = true\n"));
    // three sets round up to one group of four
    assert_eq!(result.channel_widths.x_max, 8);
    assert_eq!(result.channel_widths.y_max, 8);
    assert!(result.warnings.contains(RrGraphWarnings::CHAN_X_WIDTH_CHANGED));
    assert!(result.warnings.contains(RrGraphWarnings::CHAN_Y_WIDTH_CHANGED));
    assert!(!result.warnings.contains(RrGraphWarnings::FC_CLIPPED));
    let changed = sink
        .take_all()
        .into_iter()
        .filter(|d| d.code == W_CHAN_WIDTH_CHANGED)
        .count();
    assert_eq!(changed, 2);
    assert!(nodes_of(&result.graph, RrType::ChanX).any(|(_, n)| n.ptc == 7));
}

// ---------------------------------------------------------------------------
// Switch blocks and graph types
// ---------------------------------------------------------------------------

#[test]
fn unsupported_fs_is_rejected() {
    let bidir = load(&[
        &routing("bidir", "fs = 4"),
        &segment("L1", 1, ""),
        &clb(&frac(0.5), &frac(0.5)),
        &clb_grid(5),
    ]);
    let (result, _) = try_build(&bidir, &config(WIDTH_4));
    assert!(matches!(result, Err(RrGraphError::UnsupportedFs { fs: 4 })));

    let unidir = load(&[
        &routing("unidir", "fs = 6"),
        &segment("L1", 1, ""),
        &clb(&frac(0.5), &frac(0.5)),
        &clb_grid(5),
    ]);
    let (result, _) = try_build(&unidir, &config(WIDTH_4));
    assert!(matches!(result, Err(RrGraphError::UnsupportedFs { fs: 6 })));

    // Fs = 6 is fine for bidirectional wires
    let bidir6 = load(&[
        &routing("bidir", "fs = 6"),
        &segment("L1", 1, ""),
        &clb(&frac(0.5), &frac(0.25)),
        &clb_grid(5),
    ]);
    assert!(try_build(&bidir6, &config(WIDTH_4)).0.is_ok());
}

#[test]
fn subset_switch_blocks_connect_both_ways() {
    let arch = load(&[
        &routing("bidir", r#"switch_block_type = "subset""#),
        &segment("L1", 1, ""),
        &clb(&frac(0.5), &frac(0.25)),
        &clb_grid(5),
    ]);
    let (result, _) = build(&arch, &config(WIDTH_4));
    let graph = &result.graph;
    let edges = wire_edges(graph);
    assert!(!edges.is_empty());
    let pairs: HashSet<_> = edges.iter().map(|e| (e.from, e.to)).collect();
    for edge in &edges {
        assert!(pairs.contains(&(edge.to, edge.from)), "{} -> {} has no reverse", edge.from, edge.to);
        // subset keeps the track number
        let (from, to) = ends(graph, edge);
        assert_eq!(from.ptc, to.ptc);
    }
    for (_, n) in nodes_of(graph, RrType::ChanX).chain(nodes_of(graph, RrType::ChanY)) {
        assert_eq!(n.direction, Direction::Bidir);
    }
}

#[test]
fn forced_graph_type_overrides_the_architecture() {
    let cfg = config("[channel]\nwidth = 4\n[build]\ngraph_type = \"bidir\"\n");
    let (result, _) = build(&unidir_arch(), &cfg);
    assert!(nodes_of(&result.graph, RrType::ChanX).all(|(_, n)| n.direction == Direction::Bidir));
}

#[test]
fn global_graph_has_one_wide_track_per_channel() {
    let cfg = config("[channel]\nwidth = 3\n[build]\ngraph_type = \"global\"\n");
    let (result, _) = build(&unidir_arch(), &cfg);
    assert_eq!(result.channel_widths.x_max, 1);
    assert_eq!(result.channel_widths.y_max, 1);
    let graph = &result.graph;
    for (_, n) in nodes_of(graph, RrType::ChanX).chain(nodes_of(graph, RrType::ChanY)) {
        assert_eq!(n.ptc, 0);
        assert_eq!(n.capacity, 3);
    }
    assert_eq!(result.stats.nodes_by_type["CHANX"], 12);
    let names: Vec<_> = graph.cost_indices.iter().filter_map(|c| c.segment.as_deref()).collect();
    assert!(names.iter().all(|&n| n == "global"));
}

#[test]
fn global_wires_carry_the_width_of_their_own_channel() {
    let cfg = config(
        r#"
[channel]
width = 10
[channel.x_dist]
kind = "pulse"
peak = 1.0
width = 0.3
xpeak = 0.5
dc = 0.5
[build]
graph_type = "global"
"#,
    );
    let (result, _) = build(&unidir_arch(), &cfg);
    let graph = &result.graph;
    let x_list = [5, 5, 10, 5, 5];
    let mut widths = HashSet::new();
    for (_, n) in nodes_of(graph, RrType::ChanX) {
        assert_eq!(n.capacity, x_list[n.y_low]);
        widths.insert(n.capacity);
    }
    assert_eq!(widths, HashSet::from([5, 10]));
    assert!(nodes_of(graph, RrType::ChanY).all(|(_, n)| n.capacity == 10));
}
