//! Direct tile-to-tile connections that bypass general routing.

use crate::ids::{SwitchId, TileTypeId};
use aion_common::Side;
use serde::{Deserialize, Serialize};

/// A resolved direct connection.
///
/// Pin ranges are relative to one sub-tile. `start > end` denotes a reversed
/// range: the pins are paired from opposite ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectInf {
    /// Name for messages.
    pub name: String,
    /// Tile type of the driving pins.
    pub from_tile: TileTypeId,
    /// First driving pin of the range.
    pub from_pin_start: usize,
    /// Last driving pin of the range.
    pub from_pin_end: usize,
    /// Tile type of the receiving pins.
    pub to_tile: TileTypeId,
    /// First receiving pin of the range.
    pub to_pin_start: usize,
    /// Last receiving pin of the range.
    pub to_pin_end: usize,
    /// Column offset of the receiving tile.
    pub x_offset: i32,
    /// Row offset of the receiving tile.
    pub y_offset: i32,
    /// Sub-tile offset of the receiving instance.
    pub sub_tile_offset: i32,
    /// Switch used by the connection.
    pub switch: SwitchId,
    /// Restrict the driving pin to this side.
    pub from_side: Option<Side>,
    /// Restrict the receiving pin to this side.
    pub to_side: Option<Side>,
}

impl DirectInf {
    /// Returns `true` if the relative pin lies in the driving range.
    pub fn covers_from_pin(&self, pin: usize) -> bool {
        let (lo, hi) = ordered(self.from_pin_start, self.from_pin_end);
        (lo..=hi).contains(&pin)
    }

    /// Maps a relative driving pin to its relative receiving pin.
    ///
    /// The caller must ensure [`covers_from_pin`](Self::covers_from_pin).
    /// Returns `None` if the mapping falls outside the receiving range.
    pub fn map_pin(&self, from_pin: usize) -> Option<usize> {
        let swap = self.from_pin_start > self.from_pin_end;
        let (lo, _) = ordered(self.from_pin_start, self.from_pin_end);
        let offset = from_pin.checked_sub(lo)?;
        if self.to_pin_start > self.to_pin_end {
            if swap {
                self.to_pin_end.checked_add(offset)
            } else {
                self.to_pin_start.checked_sub(offset)
            }
        } else if swap {
            self.to_pin_end.checked_sub(offset)
        } else {
            self.to_pin_start.checked_add(offset)
        }
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct(from: (usize, usize), to: (usize, usize)) -> DirectInf {
        DirectInf {
            name: "carry".into(),
            from_tile: TileTypeId::from_raw(1),
            from_pin_start: from.0,
            from_pin_end: from.1,
            to_tile: TileTypeId::from_raw(1),
            to_pin_start: to.0,
            to_pin_end: to.1,
            x_offset: 0,
            y_offset: -1,
            sub_tile_offset: 0,
            switch: SwitchId::from_raw(0),
            from_side: None,
            to_side: None,
        }
    }

    #[test]
    fn forward_ranges_pair_in_order() {
        let d = direct((10, 13), (2, 5));
        assert!(d.covers_from_pin(12));
        assert!(!d.covers_from_pin(14));
        assert_eq!(d.map_pin(10), Some(2));
        assert_eq!(d.map_pin(13), Some(5));
    }

    #[test]
    fn reversed_destination_pairs_backwards() {
        let d = direct((10, 13), (5, 2));
        assert_eq!(d.map_pin(10), Some(5));
        assert_eq!(d.map_pin(13), Some(2));
    }

    #[test]
    fn reversed_source_pairs_backwards() {
        let d = direct((13, 10), (2, 5));
        assert!(d.covers_from_pin(11));
        assert_eq!(d.map_pin(10), Some(5));
        assert_eq!(d.map_pin(13), Some(2));
    }

    #[test]
    fn both_reversed_pair_in_order() {
        let d = direct((13, 10), (5, 2));
        assert_eq!(d.map_pin(10), Some(2));
        assert_eq!(d.map_pin(13), Some(5));
    }
}
