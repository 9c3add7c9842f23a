//! Scatter-gather bottleneck links.
//!
//! A scatter-gather pattern funnels wires arriving at one switch block (the
//! gather location) into a single bottleneck wire, which fans back out to
//! wires leaving another switch block (the scatter location). The two
//! locations differ along exactly one axis; links along Z cross dice and
//! are realized as CHANZ nodes, the others as CHANX or CHANY wires.
//!
//! Candidate wires are chosen the same way as for custom switch blocks:
//! the gather table's `from` sets select the wires heading into the gather
//! switch block, the scatter table's `to` sets select the wires leaving the
//! scatter switch block, both restricted to the table's `sides`.

use crate::channel::ChanDetails;
use crate::error::RrGraphError;
use crate::formula::{Formula, FormulaVars};
use crate::switchblock::{SbChannels, SbWire, WireRole};
use crate::warnings;
use aion_arch::{
    Architecture, Directionality, ScatterGatherPattern, SgLink, SwitchId, WireconnInf,
};
use aion_common::{Axis, Direction, GridLoc, Side, SideSet};
use aion_diagnostics::DiagnosticSink;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

/// A channel wire taking part in a bottleneck link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LinkWire {
    /// Die layer.
    pub layer: usize,
    /// Channel axis: X or Y.
    pub axis: Axis,
    /// Node column of the wire segment.
    pub x: usize,
    /// Node row of the wire segment.
    pub y: usize,
    /// Track number.
    pub track: usize,
}

/// One instance of a scatter-gather link.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BottleneckLink {
    /// Pattern name.
    pub pattern: String,
    /// Link name.
    pub link: String,
    /// Switch block where wires are gathered.
    pub gather_loc: GridLoc,
    /// Switch block where wires are scattered.
    pub scatter_loc: GridLoc,
    /// Axis of the bottleneck wire.
    pub axis: Axis,
    /// Unified segment index of the bottleneck wire.
    pub segment: usize,
    /// Switch on both sides of the bottleneck.
    pub switch: SwitchId,
    /// Wires driving the bottleneck.
    pub gather: Vec<LinkWire>,
    /// Wires driven by the bottleneck.
    pub scatter: Vec<LinkWire>,
}

impl BottleneckLink {
    /// Returns `true` if the link crosses dice.
    pub fn is_cross_die(&self) -> bool {
        self.axis == Axis::Z
    }

    /// Signal direction of the bottleneck wire.
    pub fn direction(&self) -> Direction {
        let (from, to) = match self.axis {
            Axis::X => (self.gather_loc.x, self.scatter_loc.x),
            Axis::Y => (self.gather_loc.y, self.scatter_loc.y),
            Axis::Z => (self.gather_loc.layer, self.scatter_loc.layer),
        };
        if to > from {
            Direction::Inc
        } else {
            Direction::Dec
        }
    }

    /// Channel coordinate and covered segment range of a planar link:
    /// `(chan, seg_low, seg_high)`.
    ///
    /// The wire runs through the channel segments between the two switch
    /// blocks: switch block `s` sits between segments `s` and `s + 1`.
    pub fn span(&self) -> (usize, usize, usize) {
        let (chan, a, b) = match self.axis {
            Axis::Y => (self.gather_loc.x, self.gather_loc.y, self.scatter_loc.y),
            _ => (self.gather_loc.y, self.gather_loc.x, self.scatter_loc.x),
        };
        (chan, a.min(b) + 1, a.max(b))
    }
}

/// All bottleneck links of a device.
#[derive(Clone, Debug, Default)]
pub struct ScatterGatherLinks {
    planar: Vec<BottleneckLink>,
    interdie: Vec<Vec<BottleneckLink>>,
}

impl ScatterGatherLinks {
    /// Links within one die.
    pub fn planar(&self) -> &[BottleneckLink] {
        &self.planar
    }

    /// Every die-crossing link, location by location.
    pub fn interdie(&self) -> impl Iterator<Item = &BottleneckLink> {
        self.interdie.iter().flatten()
    }

    /// Total number of links.
    pub fn len(&self) -> usize {
        self.planar.len() + self.interdie.iter().map(Vec::len).sum::<usize>()
    }

    /// Returns `true` if there are no links.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Checks that every link of every pattern moves along exactly one axis.
pub fn check_link_offsets(patterns: &[ScatterGatherPattern]) -> Result<(), RrGraphError> {
    for pattern in patterns {
        if let Some(bad) = pattern.links.iter().find(|l| l.nonzero_offsets() != 1) {
            return Err(RrGraphError::ScatterGatherOffset {
                pattern: pattern.name.clone(),
                link: bad.name.clone(),
            });
        }
    }
    Ok(())
}

fn link_axis(link: &SgLink) -> Axis {
    if link.x_offset != 0 {
        Axis::X
    } else if link.y_offset != 0 {
        Axis::Y
    } else {
        Axis::Z
    }
}

fn offset(base: usize, delta: i32, limit: usize) -> Option<usize> {
    let v = base as i64 + i64::from(delta);
    (0..limit as i64).contains(&v).then_some(v as usize)
}

/// Builds every bottleneck link of the architecture.
///
/// Candidate lists are shuffled with `rng` once per location; link
/// instances then take consecutive windows of the shuffled lists so that
/// the wires are spread round-robin. A link whose fan-in or fan-out comes
/// out as zero is skipped and reported as `W503`.
pub fn alloc_scatter_gather_links(
    arch: &Architecture,
    chan_x: &ChanDetails,
    chan_y: &ChanDetails,
    directionality: Directionality,
    rng: &mut StdRng,
    sink: &DiagnosticSink,
) -> Result<ScatterGatherLinks, RrGraphError> {
    check_link_offsets(&arch.scatter_gather)?;
    let grid = &arch.grid;
    let (sb_width, sb_height) = (grid.width().saturating_sub(1), grid.height().saturating_sub(1));
    let channels = SbChannels {
        chan_x,
        chan_y,
        width: grid.width(),
        height: grid.height(),
        directionality,
    };
    let mut out = ScatterGatherLinks {
        planar: Vec::new(),
        interdie: vec![Vec::new(); sb_width * sb_height],
    };
    let routed = |layer: usize| grid.has_inter_cluster_routing(layer);

    for pattern in &arch.scatter_gather {
        let fanin_formula = Formula::parse(&pattern.gather.num_conns)?;
        let fanout_formula = Formula::parse(&pattern.scatter.num_conns)?;
        for loc in &pattern.locations {
            let Some(link) = pattern.links.get(loc.link) else {
                continue;
            };
            let axis = link_axis(link);
            for layer in (0..grid.layers()).filter(|&l| routed(l)) {
                for x in 0..sb_width {
                    for y in 0..sb_height {
                        if !loc.location.matches(x, y, grid.width(), grid.height()) {
                            continue;
                        }
                        let (Some(sx), Some(sy), Some(sl)) = (
                            offset(x, link.x_offset, sb_width),
                            offset(y, link.y_offset, sb_height),
                            offset(layer, link.z_offset, grid.layers()),
                        ) else {
                            continue;
                        };
                        if !routed(sl) {
                            continue;
                        }
                        let gather_loc = GridLoc::new(layer, x, y);
                        let scatter_loc = GridLoc::new(sl, sx, sy);
                        let mut gather =
                            link_wires(&channels, gather_loc, &pattern.gather, WireRole::Source);
                        let mut scatter =
                            link_wires(&channels, scatter_loc, &pattern.scatter, WireRole::Dest);
                        gather.shuffle(rng);
                        scatter.shuffle(rng);

                        let vars = FormulaVars {
                            from: gather.len() as i64,
                            to: scatter.len() as i64,
                            ..FormulaVars::default()
                        };
                        let fanin = clamp(fanin_formula.eval(vars)?, gather.len());
                        let fanout = clamp(fanout_formula.eval(vars)?, scatter.len());
                        if fanin == 0 || fanout == 0 {
                            warnings::sg_link_skipped(sink, &pattern.name, &link.name, gather_loc, fanin, fanout);
                            continue;
                        }
                        for instance in 0..loc.num {
                            let bottleneck = BottleneckLink {
                                pattern: pattern.name.clone(),
                                link: link.name.clone(),
                                gather_loc,
                                scatter_loc,
                                axis,
                                segment: link.segment.index(),
                                switch: link.switch,
                                gather: window(&gather, instance * fanin, fanin),
                                scatter: window(&scatter, instance * fanout, fanout),
                            };
                            if axis == Axis::Z {
                                out.interdie[x * sb_height + y].push(bottleneck);
                            } else {
                                out.planar.push(bottleneck);
                            }
                        }
                    }
                }
            }
        }
    }
    tracing::debug!(
        planar = out.planar.len(),
        interdie = out.len() - out.planar.len(),
        "allocated scatter-gather links"
    );
    Ok(out)
}

fn clamp(value: i64, available: usize) -> usize {
    (value.max(0) as usize).min(available)
}

fn window<T: Copy>(list: &[T], start: usize, len: usize) -> Vec<T> {
    (0..len).map(|i| list[(start + i) % list.len()]).collect()
}

fn link_wires(channels: &SbChannels<'_>, loc: GridLoc, wc: &WireconnInf, role: WireRole) -> Vec<LinkWire> {
    let sets = match role {
        WireRole::Source => &wc.from,
        WireRole::Dest => &wc.to,
    };
    let sides = if wc.sides.is_empty() { SideSet::PLANAR } else { wc.sides };
    sides
        .iter()
        .filter(|s| s.is_planar())
        .flat_map(|side: Side| channels.collect_wires(loc.x, loc.y, side, sets, role))
        .map(|w: SbWire| LinkWire {
            layer: loc.layer,
            axis: w.axis,
            x: w.x,
            y: w.y,
            track: w.track,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{alloc_chan_details, alloc_seg_details};
    use crate::segments::SegmentMap;
    use aion_arch::load_architecture_from_str;
    use aion_config::ChannelWidths;
    use rand::SeedableRng;

    fn arch(link: &str, num_conns: &str) -> Architecture {
        load_architecture_from_str(&format!(
            r#"
[routing]
directionality = "unidir"
wire_to_ipin_switch = "mux"

[[switch]]
name = "mux"
kind = "mux"

[[segment]]
name = "L1"
mux = "mux"

[grid]
width = 6
height = 6

[[scatter_gather]]
name = "sg"
[scatter_gather.gather]
from = [{{ type = "L1", switchpoints = [1] }}]
num_conns = "{num_conns}"
sides = ["left"]
[scatter_gather.scatter]
to = [{{ type = "L1", switchpoints = [0] }}]
num_conns = "to"
sides = ["right"]
[[scatter_gather.link]]
name = "hop"
switch = "mux"
segment = "L1"
{link}
[[scatter_gather.location]]
type = "core"
num = 1
link = "hop"
"#
        ))
        .unwrap()
    }

    fn build(arch: &Architecture) -> (Result<ScatterGatherLinks, RrGraphError>, DiagnosticSink) {
        let segs = SegmentMap::new(&arch.segments);
        let (sx, _) = alloc_seg_details(4, 6, &segs.x, Directionality::Unidir, false).unwrap();
        let (sy, _) = alloc_seg_details(4, 6, &segs.y, Directionality::Unidir, false).unwrap();
        let widths = ChannelWidths::uniform(4, 4, 6, 6);
        let (cx, cy) = alloc_chan_details(6, 6, &widths, &sx, &sy);
        let mut rng = StdRng::seed_from_u64(1);
        let sink = DiagnosticSink::new();
        let links = alloc_scatter_gather_links(arch, &cx, &cy, Directionality::Unidir, &mut rng, &sink);
        (links, sink)
    }

    #[test]
    fn fanin_from_is_the_candidate_count() {
        let (links, sink) = build(&arch("x_offset = 1", "from"));
        let links = links.unwrap();
        // core switch blocks 1..=3 in both axes, skipping those whose target
        // switch block is outside the grid
        assert!(!links.is_empty());
        for link in links.planar() {
            // two INC tracks arrive from the left of every core switch block
            assert_eq!(link.gather.len(), 2);
            assert_eq!(link.scatter.len(), 2);
            assert_eq!(link.axis, Axis::X);
            assert_eq!(link.direction(), Direction::Inc);
            assert!(link.gather.iter().all(|w| w.axis == Axis::X && w.x == link.gather_loc.x));
        }
        assert!(!sink.has_errors());
    }

    #[test]
    fn span_covers_the_segments_between_switch_blocks() {
        let (links, _) = build(&arch("x_offset = -2", "from"));
        let links = links.unwrap();
        let link = links
            .planar()
            .iter()
            .find(|l| l.gather_loc.x == 3 && l.gather_loc.y == 2)
            .unwrap();
        assert_eq!(link.scatter_loc.x, 1);
        assert_eq!(link.direction(), Direction::Dec);
        assert_eq!(link.span(), (2, 2, 3));
    }

    #[test]
    fn two_offsets_are_rejected() {
        let (links, _) = build(&arch("x_offset = 1\ny_offset = 1", "from"));
        assert!(matches!(
            links,
            Err(RrGraphError::ScatterGatherOffset { ref pattern, ref link }) if pattern == "sg" && link == "hop"
        ));
        let (links, _) = build(&arch("", "from"));
        assert!(links.is_err());
    }

    #[test]
    fn zero_fanin_skips_with_warning() {
        let (links, sink) = build(&arch("x_offset = 1", "0"));
        assert!(links.unwrap().is_empty());
        let diags = sink.take_all();
        assert!(!diags.is_empty());
        assert!(diags.iter().all(|d| d.code == warnings::W_SG_LINK_SKIPPED));
    }

    #[test]
    fn cross_die_links_need_a_second_layer() {
        let (links, _) = build(&arch("z_offset = 1", "from"));
        // single-layer grid: the scatter layer does not exist
        assert!(links.unwrap().is_empty());
    }
}
