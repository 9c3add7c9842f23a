//! Closed-form switch-block topologies: subset, Wilton, universal, full.

use aion_arch::SwitchBlockType;
use aion_common::Side;
use aion_config::ChannelWidths;

/// Maps `from_track` on `from_side` to a track on `to_side` with `width`
/// tracks, following one of the simple topologies.
///
/// Returns `None` for a side pair the topology does not connect, for a
/// zero-width destination, and for [`SwitchBlockType::Custom`].
pub fn simple_switch_block_track(
    from_side: Side,
    to_side: Side,
    from_track: usize,
    sb_type: SwitchBlockType,
    width: usize,
) -> Option<usize> {
    if width == 0 || from_side == to_side || !from_side.is_planar() || !to_side.is_planar() {
        return None;
    }
    let w = width as i64;
    let t = from_track as i64;
    let to_track = match sb_type {
        SwitchBlockType::Subset | SwitchBlockType::Full => t,
        SwitchBlockType::Wilton => match (from_side, to_side) {
            (Side::Left, Side::Right) | (Side::Right, Side::Left) => t,
            (Side::Bottom, Side::Top) | (Side::Top, Side::Bottom) => t,
            (Side::Left, Side::Top) => (w - t % w) % w,
            (Side::Left, Side::Bottom) => (w + t % w - 1) % w,
            (Side::Right, Side::Top) => (w + t % w - 1) % w,
            (Side::Right, Side::Bottom) => (2 * w - 2 - t % w) % w,
            (Side::Bottom, Side::Left) => (t + 1) % w,
            (Side::Bottom, Side::Right) => (2 * w - 2 - t) % w,
            (Side::Top, Side::Left) => (w - t) % w,
            (Side::Top, Side::Right) => (t + 1) % w,
            _ => return None,
        },
        SwitchBlockType::Universal => {
            if from_side.opposite() == to_side {
                t
            } else {
                w - 1 - t
            }
        }
        SwitchBlockType::Custom => return None,
    };
    // Tracks of a wider source channel can map below zero.
    if to_track < 0 {
        return None;
    }
    Some(to_track as usize % width)
}

/// Track connections of a bidirectional switch block,
/// `[from side][to side][from track] -> to tracks`.
///
/// Every switch block of the device shares one table; the channel widths
/// used are the maximum of each axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchBlockConn {
    conns: Vec<Vec<Vec<usize>>>,
}

impl SwitchBlockConn {
    /// Builds the table for `sb_type`.
    pub fn new(widths: &ChannelWidths, sb_type: SwitchBlockType) -> Self {
        let side_width = |side: Side| {
            if side.is_vertical() {
                widths.y_max
            } else {
                widths.x_max
            }
        };
        let mut conns = Vec::with_capacity(16);
        for from in Side::PLANAR {
            for to in Side::PLANAR {
                let from_width = side_width(from);
                let to_width = side_width(to);
                let per_track = (0..from_width)
                    .map(|track| {
                        simple_switch_block_track(from, to, track, sb_type, to_width)
                            .map(|t| vec![t])
                            .unwrap_or_default()
                    })
                    .collect();
                conns.push(per_track);
            }
        }
        Self { conns }
    }

    /// Destination tracks of `from_track`.
    pub fn get(&self, from: Side, to: Side, from_track: usize) -> &[usize] {
        if !from.is_planar() || !to.is_planar() {
            return &[];
        }
        self.conns[from.index() * 4 + to.index()]
            .get(from_track)
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_is_identity() {
        for side in Side::PLANAR {
            let to = side.clockwise();
            assert_eq!(simple_switch_block_track(side, to, 3, SwitchBlockType::Subset, 8), Some(3));
        }
        assert_eq!(simple_switch_block_track(Side::Left, Side::Left, 3, SwitchBlockType::Subset, 8), None);
    }

    #[test]
    fn wilton_rotates_turns() {
        let w = 8;
        let track = |from, to, t| simple_switch_block_track(from, to, t, SwitchBlockType::Wilton, w);
        assert_eq!(track(Side::Left, Side::Right, 5), Some(5));
        assert_eq!(track(Side::Left, Side::Top, 0), Some(0));
        assert_eq!(track(Side::Left, Side::Top, 3), Some(5));
        assert_eq!(track(Side::Left, Side::Bottom, 0), Some(7));
        assert_eq!(track(Side::Right, Side::Bottom, 1), Some(5));
        assert_eq!(track(Side::Bottom, Side::Left, 7), Some(0));
        assert_eq!(track(Side::Top, Side::Right, 2), Some(3));
        assert_eq!(track(Side::Top, Side::Left, 2), Some(6));
    }

    #[test]
    fn wilton_turns_are_permutations() {
        let w = 6;
        for from in Side::PLANAR {
            for to in Side::PLANAR.into_iter().filter(|&s| s != from) {
                let mut hit: Vec<usize> = (0..w)
                    .filter_map(|t| simple_switch_block_track(from, to, t, SwitchBlockType::Wilton, w))
                    .collect();
                hit.sort_unstable();
                assert_eq!(hit, (0..w).collect::<Vec<_>>(), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn universal_mirrors_turns() {
        let track = |from, to, t| simple_switch_block_track(from, to, t, SwitchBlockType::Universal, 4);
        assert_eq!(track(Side::Bottom, Side::Top, 1), Some(1));
        assert_eq!(track(Side::Bottom, Side::Left, 1), Some(2));
        assert_eq!(track(Side::Left, Side::Top, 0), Some(3));
    }

    #[test]
    fn narrow_destination_wraps_or_drops() {
        // a wider source channel wraps onto the narrower destination
        assert_eq!(simple_switch_block_track(Side::Left, Side::Right, 5, SwitchBlockType::Subset, 4), Some(1));
        // universal turns from tracks beyond the width go negative
        assert_eq!(simple_switch_block_track(Side::Left, Side::Top, 6, SwitchBlockType::Universal, 4), None);
        assert_eq!(simple_switch_block_track(Side::Left, Side::Top, 0, SwitchBlockType::Wilton, 0), None);
    }

    #[test]
    fn bidir_table_shape() {
        let widths = ChannelWidths::uniform(4, 4, 6, 6);
        let conn = SwitchBlockConn::new(&widths, SwitchBlockType::Wilton);
        assert_eq!(conn.get(Side::Left, Side::Top, 3), &[1]);
        assert!(conn.get(Side::Left, Side::Left, 3).is_empty());
        assert!(conn.get(Side::Left, Side::Top, 9).is_empty());
        assert!(conn.get(Side::Above, Side::Top, 0).is_empty());
    }
}
