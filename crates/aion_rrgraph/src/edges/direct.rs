//! Direct pin-to-pin connections between neighbouring tiles.
//!
//! A direct joins output pins of one tile type to input pins of a tile at
//! a fixed offset without passing through the channels. When a pin is
//! placed on several sides, the pair of placements closest to each other
//! realizes the connection; placements that face away from each other are
//! penalized.

use crate::context::BuildContext;
use crate::graph::{GraphBuilder, RrType};
use aion_arch::{DirectInf, PinLoc, PinType};
use aion_common::Side;

const SIDE_PENALTY: f32 = 0.5;

fn side_point(loc: &PinLoc, dx: i32, dy: i32) -> (f32, f32) {
    let (ux, uy) = match loc.side {
        Side::Top => (0.0, 0.5),
        Side::Right => (0.5, 0.0),
        Side::Bottom => (0.0, -0.5),
        Side::Left => (-0.5, 0.0),
        Side::Above | Side::Under => (0.0, 0.0),
    };
    (
        dx as f32 + loc.width_offset as f32 + 0.5 + ux,
        dy as f32 + loc.height_offset as f32 + 0.5 + uy,
    )
}

/// Picks the placements of a driving and a receiving pin that are closest
/// in Manhattan distance, the receiving tile sitting at `(dx, dy)` from
/// the driving one. Ties keep the first pair in placement order.
pub(crate) fn best_side_pair(
    from_locs: &[PinLoc],
    to_locs: &[PinLoc],
    dx: i32,
    dy: i32,
) -> Option<(PinLoc, PinLoc)> {
    let mut best: Option<(f32, PinLoc, PinLoc)> = None;
    for from in from_locs {
        let (fx, fy) = side_point(from, 0, 0);
        for to in to_locs {
            let (tx, ty) = side_point(to, dx, dy);
            let mut dist = (fx - tx).abs() + (fy - ty).abs();
            if from.side.opposite() != to.side {
                dist += SIDE_PENALTY;
            }
            if best.as_ref().map_or(true, |(d, _, _)| dist < *d) {
                best = Some((dist, *from, *to));
            }
        }
    }
    best.map(|(_, from, to)| (from, to))
}

/// Placements of `pin` of the tile rooted at `(x, y)` that are present in
/// the graph, optionally restricted to one side.
fn indexed_locs(
    builder: &GraphBuilder,
    locs: &[PinLoc],
    kind: RrType,
    layer: usize,
    x: usize,
    y: usize,
    pin: usize,
    side: Option<Side>,
) -> Vec<PinLoc> {
    locs.iter()
        .filter(|loc| side.map_or(true, |s| s == loc.side))
        .filter(|loc| {
            builder
                .lookup()
                .find(layer, x + loc.width_offset, y + loc.height_offset, kind, pin, Some(loc.side))
                .is_some()
        })
        .copied()
        .collect()
}

/// Proposes the edges of every direct connection of the architecture.
pub(crate) fn add_direct_edges(ctx: &BuildContext<'_>, builder: &mut GraphBuilder) -> usize {
    let mut count = 0;
    for direct in &ctx.arch.directs {
        count += add_one_direct(ctx, builder, direct);
    }
    count
}

fn add_one_direct(ctx: &BuildContext<'_>, builder: &mut GraphBuilder, direct: &DirectInf) -> usize {
    let grid = &ctx.arch.grid;
    let from_tile = ctx.arch.tile_type(direct.from_tile);
    let to_tile = ctx.arch.tile_type(direct.to_tile);
    let (from_pps, to_pps) = (from_tile.pins_per_sub_tile(), to_tile.pins_per_sub_tile());
    let roots: Vec<_> = grid
        .roots()
        .filter(|&(l, x, y)| grid.tile_type(l, x, y) == direct.from_tile)
        .collect();

    let mut count = 0;
    for (layer, x, y) in roots {
        let (Some(tx), Some(ty)) = (shift(x, direct.x_offset, grid.width()), shift(y, direct.y_offset, grid.height())) else {
            continue;
        };
        let target = grid.tile(layer, tx, ty);
        if target.tile_type != direct.to_tile || !target.is_root() {
            continue;
        }
        for sub in 0..from_tile.capacity {
            let Some(to_sub) = shift(sub, direct.sub_tile_offset, to_tile.capacity) else {
                continue;
            };
            for rel in 0..from_pps {
                if !direct.covers_from_pin(rel) {
                    continue;
                }
                let Some(to_rel) = direct.map_pin(rel).filter(|&p| p < to_pps) else {
                    continue;
                };
                let from_pin = sub * from_pps + rel;
                let to_pin = to_sub * to_pps + to_rel;
                if from_tile.pin_type(from_pin) != PinType::Driver || to_tile.pin_type(to_pin) != PinType::Receiver {
                    continue;
                }
                let from_locs = indexed_locs(
                    builder,
                    &from_tile.pin_locs[from_pin],
                    RrType::Opin,
                    layer,
                    x,
                    y,
                    from_pin,
                    direct.from_side,
                );
                let to_locs = indexed_locs(
                    builder,
                    &to_tile.pin_locs[to_pin],
                    RrType::Ipin,
                    layer,
                    tx,
                    ty,
                    to_pin,
                    direct.to_side,
                );
                let Some((from_loc, to_loc)) =
                    best_side_pair(&from_locs, &to_locs, direct.x_offset, direct.y_offset)
                else {
                    continue;
                };
                let lookup = builder.lookup();
                let from = lookup.find(
                    layer,
                    x + from_loc.width_offset,
                    y + from_loc.height_offset,
                    RrType::Opin,
                    from_pin,
                    Some(from_loc.side),
                );
                let to = lookup.find(
                    layer,
                    tx + to_loc.width_offset,
                    ty + to_loc.height_offset,
                    RrType::Ipin,
                    to_pin,
                    Some(to_loc.side),
                );
                if let (Some(from), Some(to)) = (from, to) {
                    tracing::trace!(direct = %direct.name, from_pin, to_pin, from_side = %from_loc.side, to_side = %to_loc.side, "direct connection");
                    builder.propose_edge(from, to, direct.switch);
                    count += 1;
                }
            }
        }
    }
    count
}

fn shift(base: usize, delta: i32, limit: usize) -> Option<usize> {
    let v = base as i64 + i64::from(delta);
    (0..limit as i64).contains(&v).then_some(v as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(w: usize, h: usize, side: Side) -> PinLoc {
        PinLoc {
            width_offset: w,
            height_offset: h,
            side,
        }
    }

    #[test]
    fn facing_sides_win() {
        // receiving tile directly above: TOP of the driver faces BOTTOM of the receiver
        let from = [loc(0, 0, Side::Left), loc(0, 0, Side::Top)];
        let to = [loc(0, 0, Side::Right), loc(0, 0, Side::Bottom)];
        let (f, t) = best_side_pair(&from, &to, 0, 1).unwrap();
        assert_eq!((f.side, t.side), (Side::Top, Side::Bottom));
    }

    #[test]
    fn penalty_breaks_equal_distances() {
        // same cell, both pairs at distance 1 before the penalty
        let from = [loc(0, 0, Side::Right)];
        let to = [loc(0, 0, Side::Top), loc(0, 0, Side::Left)];
        let (_, t) = best_side_pair(&from, &to, 1, 0).unwrap();
        assert_eq!(t.side, Side::Left);
    }

    #[test]
    fn no_placement_no_pair() {
        assert!(best_side_pair(&[], &[loc(0, 0, Side::Top)], 0, 1).is_none());
    }

    #[test]
    fn shifts_stay_in_range() {
        assert_eq!(shift(2, -1, 5), Some(1));
        assert_eq!(shift(0, -1, 5), None);
        assert_eq!(shift(4, 1, 5), None);
    }
}
