//! Architecture fixtures shared by the integration tests.

#![allow(dead_code)]

use aion_arch::{load_architecture_from_str, Architecture};
use aion_config::{load_config_from_str, RrGraphConfig};
use aion_diagnostics::DiagnosticSink;
use aion_rrgraph::{build_rr_graph, BuildResult, RrEdge, RrGraph, RrGraphError, RrNode};

/// `[routing]` plus a fast mux, a slower pin mux, and a direct-link mux.
pub fn routing(directionality: &str, extra: &str) -> String {
    format!(
        r#"
[routing]
directionality = "{directionality}"
wire_to_ipin_switch = "ipin"
{extra}

[[switch]]
name = "mux"
kind = "mux"
r = 500.0
cin = 1e-15
tdel = 60e-12

[[switch]]
name = "ipin"
kind = "mux"
r = 1000.0
tdel = 80e-12

[[switch]]
name = "carry"
kind = "mux"
r = 100.0
"#
    )
}

/// A segment usable in both directionalities.
pub fn segment(name: &str, length: usize, extra: &str) -> String {
    format!(
        r#"
[[segment]]
name = "{name}"
length = {length}
mux = "mux"
wire_switch = "mux"
opin_switch = "mux"
r_metal = 100.0
c_metal = 20e-15
{extra}
"#
    )
}

/// A logic tile with four inputs `I` and two outputs `O` spread on every side.
pub fn clb(fc_in: &str, fc_out: &str) -> String {
    format!(
        r#"
[[tile]]
name = "clb"
[[tile.port]]
name = "I"
kind = "input"
count = 4
[[tile.port]]
name = "O"
kind = "output"
count = 2
[tile.fc]
in = {fc_in}
out = {fc_out}
"#
    )
}

/// Frac Fc shorthand.
pub fn frac(value: f32) -> String {
    format!(r#"{{ type = "frac", value = {value} }}"#)
}

/// A square grid filled with `clb`, corners left empty.
pub fn clb_grid(size: usize) -> String {
    format!(
        r#"
[grid]
width = {size}
height = {size}
fill = "clb"
"#
    )
}

/// Loads the concatenation of fixture parts.
pub fn load(parts: &[&str]) -> Architecture {
    load_architecture_from_str(&parts.concat()).unwrap()
}

/// The default unidirectional fabric: length-1 wires over a 5x5 logic grid.
pub fn unidir_arch() -> Architecture {
    load(&[
        &routing("unidir", ""),
        &segment("L1", 1, ""),
        &clb(&frac(0.5), &frac(0.5)),
        &clb_grid(5),
    ])
}

/// Parses a build configuration.
pub fn config(text: &str) -> RrGraphConfig {
    load_config_from_str(text).unwrap()
}

/// Builds a graph, returning the sink with the diagnostics of the build.
pub fn try_build(arch: &Architecture, config: &RrGraphConfig) -> (Result<BuildResult, RrGraphError>, DiagnosticSink) {
    let sink = DiagnosticSink::new();
    let result = build_rr_graph(arch, config, &sink);
    (result, sink)
}

/// Builds a graph that must succeed.
pub fn build(arch: &Architecture, config: &RrGraphConfig) -> (BuildResult, DiagnosticSink) {
    let (result, sink) = try_build(arch, config);
    (result.unwrap(), sink)
}

/// Endpoints of an edge.
pub fn ends<'g>(graph: &'g RrGraph, edge: &RrEdge) -> (&'g RrNode, &'g RrNode) {
    (graph.node(edge.from), graph.node(edge.to))
}

/// Edges joining two channel wires.
pub fn wire_edges(graph: &RrGraph) -> Vec<&RrEdge> {
    graph
        .edges
        .iter()
        .filter(|e| {
            let (from, to) = ends(graph, e);
            from.kind.is_channel() && to.kind.is_channel()
        })
        .collect()
}
