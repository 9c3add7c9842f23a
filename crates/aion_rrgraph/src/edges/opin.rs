//! OPIN -> track edges.
//!
//! Bidirectional graphs take the tracks of every output pin from the
//! connection-block map. Unidirectional tracks can only be driven where
//! they start, so each pin instead connects to `Fc / 2` INC and `Fc / 2`
//! DEC wires starting at the adjacent channel position. A rotating offset
//! per channel position and segment type spreads consecutive pins over
//! different muxes. Where fewer muxes start than `Fc / 2`, the pin's Fc is
//! clipped to the muxes available and the tile type is reported.

use crate::channel::ChanSegDetails;
use crate::context::{chan_kind, BuildContext};
use crate::graph::{GraphBuilder, RrType};
use crate::switchblock::pattern::label_wire_muxes;
use aion_arch::{Directionality, PinType, SwitchId};
use aion_common::{Axis, Direction, Side};
use std::collections::HashMap;

/// Channel next to `side` of cell `(x, y)`: axis and node position.
pub(crate) fn adjacent_channel(side: Side, x: usize, y: usize) -> Option<(Axis, usize, usize)> {
    match side {
        Side::Top => Some((Axis::X, x, y)),
        Side::Bottom => Some((Axis::X, x, y.checked_sub(1)?)),
        Side::Right => Some((Axis::Y, x, y)),
        Side::Left => Some((Axis::Y, x.checked_sub(1)?, y)),
        Side::Above | Side::Under => None,
    }
}

fn opin_switch(detail: &ChanSegDetails, same_layer: bool) -> SwitchId {
    if same_layer {
        detail.detail.opin_switch
    } else {
        detail.detail.inter_die_switch.unwrap_or(detail.detail.opin_switch)
    }
}

/// Rotating mux offset per `(layer, axis, chan, seg, segment type)`.
#[derive(Default)]
struct MuxOffsets(HashMap<(usize, Axis, usize, usize, usize), usize>);

impl MuxOffsets {
    fn next(&mut self, key: (usize, Axis, usize, usize, usize)) -> usize {
        let slot = self.0.entry(key).or_insert(0);
        let ofs = *slot;
        *slot += 1;
        ofs
    }
}

/// Connects every output pin to the tracks of its adjacent channels.
///
/// `clipped[t]` is set when a unidirectional pin of tile type `t` found
/// fewer muxes than its Fc asks for.
pub(crate) fn add_opin_edges(ctx: &BuildContext<'_>, builder: &mut GraphBuilder, clipped: &mut [bool]) -> usize {
    let grid = &ctx.arch.grid;
    let mut offsets = MuxOffsets::default();
    let mut count = 0;
    for (layer, x, y) in grid.roots() {
        let tile_id = grid.tile_type(layer, x, y);
        let tile = ctx.arch.tile_type(tile_id);
        for pin in 0..tile.num_pins() {
            if tile.pin_type(pin) != PinType::Driver || tile.is_ignored_pin[pin] {
                continue;
            }
            for loc in &tile.pin_locs[pin] {
                let (cx, cy) = (x + loc.width_offset, y + loc.height_offset);
                let Some(from) = builder.lookup().find(layer, cx, cy, RrType::Opin, pin, Some(loc.side)) else {
                    continue;
                };
                let Some((axis, nx, ny)) = adjacent_channel(loc.side, cx, cy) else {
                    continue;
                };
                for wire_layer in ctx.pin_layers(layer) {
                    let same_layer = wire_layer == layer;
                    let tracks = ctx.tracks_at(axis, nx, ny);
                    let targets: Vec<usize> = match ctx.directionality {
                        Directionality::Bidir => ctx.pin_maps[tile_id.index()].opin_to_track[axis_slot(axis)]
                            .get(pin, loc.width_offset, loc.height_offset, loc.side)
                            .to_vec(),
                        Directionality::Unidir => {
                            let (targets, short) =
                                unidir_targets(ctx, &mut offsets, wire_layer, axis, nx, ny, tile_id.index(), pin);
                            if short {
                                clipped[tile_id.index()] = true;
                            }
                            targets
                        }
                    };
                    for track in targets {
                        let Some(detail) = tracks.get(track).filter(|d| d.length > 0) else {
                            continue;
                        };
                        let Some(to) = builder
                            .lookup()
                            .find_track(wire_layer, nx, ny, chan_kind(axis), track)
                        else {
                            continue;
                        };
                        builder.propose_edge(from, to, opin_switch(detail, same_layer));
                        count += 1;
                    }
                }
            }
        }
    }
    count
}

pub(crate) fn axis_slot(axis: Axis) -> usize {
    match axis {
        Axis::Y => 1,
        _ => 0,
    }
}

/// INC and DEC muxes a unidirectional output pin drives at one channel
/// position, `Fc / 2` of each per segment type, and whether any segment
/// type had fewer muxes than that.
#[allow(clippy::too_many_arguments)]
fn unidir_targets(
    ctx: &BuildContext<'_>,
    offsets: &mut MuxOffsets,
    layer: usize,
    axis: Axis,
    x: usize,
    y: usize,
    tile: usize,
    pin: usize,
) -> (Vec<usize>, bool) {
    let tracks = ctx.tracks_at(axis, x, y);
    let (chan, seg) = match axis {
        Axis::Y => (x, y),
        _ => (y, x),
    };
    let mut targets = Vec::new();
    let mut clipped = false;
    for (local, &unified) in ctx.segments.axis(axis).unified.iter().enumerate() {
        let fc = ctx.fc_out.get(tile, pin, unified);
        if fc == 0 {
            continue;
        }
        let (inc, _) = label_wire_muxes(tracks, seg, Some(local), Direction::Inc, true);
        let (dec, _) = label_wire_muxes(tracks, seg, Some(local), Direction::Dec, true);
        let muxes = inc.len().min(dec.len());
        if fc / 2 > muxes {
            clipped = true;
        }
        if muxes == 0 {
            continue;
        }
        let pairs = (fc / 2).min(muxes);
        for _ in 0..pairs {
            let ofs = offsets.next((layer, axis, chan, seg, local));
            targets.push(inc[ofs % inc.len()]);
            targets.push(dec[ofs % dec.len()]);
        }
    }
    (targets, clipped)
}
