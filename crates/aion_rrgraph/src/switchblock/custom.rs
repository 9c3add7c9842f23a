//! Custom switch blocks expanded into a sparse connection map.
//!
//! Every `[[switchblock]]` description is instantiated at the switch-block
//! locations its location class selects. For each side pair with
//! permutation functions, and each wireconn of the description, the
//! candidate source and destination wires are collected by segment type
//! and switchpoint, and connection `k` joins source `k mod |from|` to the
//! destinations picked by the permutation functions.
//!
//! A wire's switchpoint at a switch block counts from its starting end:
//! the block where an INC wire starts is switchpoint 0, the block where it
//! ends is switchpoint `length`. DEC wires count from the other end.
//!
//! Pairs that involve ABOVE or UNDER connect across dice. Their wires on
//! the neighbouring layer are taken from all four planar sides, and the
//! edges record the planar side of each wire.

use crate::channel::ChanDetails;
use crate::error::RrGraphError;
use crate::formula::{Formula, FormulaVars};
use crate::switchblock::{SbChannels, WireRole};
use aion_arch::{
    Architecture, Directionality, SwitchBlockInf, SwitchOverride, WireOrder, WireconnInf,
};
use aion_common::Side;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};

/// Key of the sparse map: one side pair of one switch block.
///
/// `layer` is the die of the switch block; for an ABOVE or UNDER side the
/// wires of that side sit on the neighbouring die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SbKey {
    /// Switch-block column.
    pub x: usize,
    /// Switch-block row.
    pub y: usize,
    /// Die of the switch block.
    pub layer: usize,
    /// Side the connection leaves from.
    pub from_side: Side,
    /// Side the connection arrives at.
    pub to_side: Side,
}

impl SbKey {
    /// Returns `true` if the pair crosses to another die.
    pub fn is_cross_die(&self) -> bool {
        !self.from_side.is_planar() || !self.to_side.is_planar()
    }

    /// Die of the wire on `side`.
    pub fn layer_of(&self, side: Side) -> usize {
        match side {
            Side::Above => self.layer + 1,
            Side::Under => self.layer.saturating_sub(1),
            _ => self.layer,
        }
    }
}

/// One track-to-track connection of a custom switch block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SbEdge {
    /// Planar side of the source wire.
    pub from_wire_side: Side,
    /// Source track.
    pub from_track: usize,
    /// Planar side of the destination wire.
    pub to_wire_side: Side,
    /// Destination track.
    pub to_track: usize,
    /// Switch of the connection.
    pub switch_override: SwitchOverride,
}

/// All connections of the custom switch blocks of a device.
#[derive(Clone, Debug, Default)]
pub struct CustomSbMap {
    map: HashMap<SbKey, Vec<SbEdge>>,
    cross_die: Vec<SbKey>,
    num_edges: usize,
}

/// A candidate wire: its planar side and track.
type Wire = (Side, usize);

struct ParsedSwitchBlock<'a> {
    inf: &'a SwitchBlockInf,
    permutations: Vec<(Side, Side, Vec<Formula>)>,
    num_conns: Vec<Formula>,
}

impl<'a> ParsedSwitchBlock<'a> {
    fn parse(inf: &'a SwitchBlockInf) -> Result<Self, RrGraphError> {
        let permutations = inf
            .permutations
            .iter()
            .map(|p| {
                let funcs = p
                    .functions
                    .iter()
                    .map(|f| Formula::parse(f))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((p.from, p.to, funcs))
            })
            .collect::<Result<Vec<_>, RrGraphError>>()?;
        let num_conns = inf
            .wireconns
            .iter()
            .map(|wc| Formula::parse(&wc.num_conns))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            inf,
            permutations,
            num_conns,
        })
    }
}

impl CustomSbMap {
    /// Expands the architecture's custom switch blocks.
    ///
    /// Shuffled wire orders draw from `rng`, so the result depends only on
    /// the architecture, the channel layout, and the seed.
    pub fn build(
        arch: &Architecture,
        chan_x: &ChanDetails,
        chan_y: &ChanDetails,
        directionality: Directionality,
        rng: &mut StdRng,
    ) -> Result<Self, RrGraphError> {
        let parsed = arch
            .switchblocks
            .iter()
            .map(ParsedSwitchBlock::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let grid = &arch.grid;
        let channels = SbChannels {
            chan_x,
            chan_y,
            width: grid.width(),
            height: grid.height(),
            directionality,
        };

        let mut out = CustomSbMap::default();
        let mut seen = HashSet::new();
        for layer in 0..grid.layers() {
            if !grid.has_inter_cluster_routing(layer) {
                continue;
            }
            for x in 0..grid.width().saturating_sub(1) {
                for y in 0..grid.height().saturating_sub(1) {
                    for sb in &parsed {
                        if !sb.inf.location.matches(x, y, grid.width(), grid.height()) {
                            continue;
                        }
                        for (from_side, to_side, funcs) in &sb.permutations {
                            if from_side == to_side || funcs.is_empty() {
                                continue;
                            }
                            let key = SbKey {
                                x,
                                y,
                                layer,
                                from_side: *from_side,
                                to_side: *to_side,
                            };
                            if !layer_has_routing(arch, key.layer_of(*from_side), *from_side, layer)
                                || !layer_has_routing(arch, key.layer_of(*to_side), *to_side, layer)
                            {
                                continue;
                            }
                            for (wc, num_conns) in sb.inf.wireconns.iter().zip(&sb.num_conns) {
                                let edges = wireconn_edges(&channels, &key, wc, num_conns, funcs, rng)?;
                                out.insert(key, edges, &mut seen);
                            }
                        }
                    }
                }
            }
        }
        tracing::debug!(
            switch_blocks = out.map.len(),
            edges = out.num_edges,
            "expanded custom switch blocks"
        );
        Ok(out)
    }

    fn insert(&mut self, key: SbKey, edges: Vec<SbEdge>, seen: &mut HashSet<(SbKey, Wire, Wire)>) {
        for edge in edges {
            let from = (edge.from_wire_side, edge.from_track);
            let to = (edge.to_wire_side, edge.to_track);
            if !seen.insert((key, from, to)) {
                continue;
            }
            let list = self.map.entry(key).or_default();
            if list.is_empty() && key.is_cross_die() {
                self.cross_die.push(key);
            }
            list.push(edge);
            self.num_edges += 1;
        }
    }

    /// Connections of a side pair; empty if there are none.
    pub fn get(&self, key: &SbKey) -> &[SbEdge] {
        self.map.get(key).map_or(&[], Vec::as_slice)
    }

    /// Connections of a side pair leaving `from_track`.
    pub fn edges_from<'a>(&'a self, key: &SbKey, from_track: usize) -> impl Iterator<Item = &'a SbEdge> + 'a {
        self.get(key).iter().filter(move |e| e.from_track == from_track)
    }

    /// Cross-die side pairs, in the order they were expanded.
    pub fn cross_die_keys(&self) -> &[SbKey] {
        &self.cross_die
    }

    /// Number of side pairs with at least one connection.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no custom connection exists.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total number of connections.
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Iterates every side pair; the order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&SbKey, &[SbEdge])> {
        self.map.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

fn layer_has_routing(arch: &Architecture, wire_layer: usize, side: Side, sb_layer: usize) -> bool {
    let grid = &arch.grid;
    match side {
        Side::Under if sb_layer == 0 => false,
        _ => wire_layer < grid.layers() && grid.has_inter_cluster_routing(wire_layer),
    }
}

fn wireconn_edges(
    channels: &SbChannels<'_>,
    key: &SbKey,
    wc: &WireconnInf,
    num_conns: &Formula,
    funcs: &[Formula],
    rng: &mut StdRng,
) -> Result<Vec<SbEdge>, RrGraphError> {
    let mut from = channels.collect_wires(key.x, key.y, key.from_side, &wc.from, WireRole::Source);
    let mut to = channels.collect_wires(key.x, key.y, key.to_side, &wc.to, WireRole::Dest);
    if from.is_empty() || to.is_empty() {
        return Ok(Vec::new());
    }
    if wc.from_order == WireOrder::Shuffled {
        from.shuffle(rng);
    }
    if wc.to_order == WireOrder::Shuffled {
        to.shuffle(rng);
    }

    let conns = num_conns.eval(FormulaVars {
        from: from.len() as i64,
        to: to.len() as i64,
        ..FormulaVars::default()
    })?;
    let conns = conns.max(0) as usize;
    let (n_from, n_to) = (from.len(), to.len());
    let mut edges = Vec::with_capacity(conns * funcs.len());
    for k in 0..conns {
        let src_idx = k % n_from;
        let src = from[src_idx];
        for func in funcs {
            let raw = func.eval(FormulaVars {
                w: n_to as i64,
                t: src_idx as i64,
                ..FormulaVars::default()
            })?;
            let dest_idx = (raw.rem_euclid(n_to as i64) as usize + k / n_from) % n_to;
            let dest = to[dest_idx];
            edges.push(SbEdge {
                from_wire_side: src.side,
                from_track: src.track,
                to_wire_side: dest.side,
                to_track: dest.track,
                switch_override: wc.switch_override,
            });
        }
    }
    Ok(edges)
}
