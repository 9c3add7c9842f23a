//! Device geometry: tile sides, side sets, wire axes and directions, and
//! grid locations.
//!
//! The four planar sides are numbered clockwise starting at [`Side::Top`]
//! (`TOP = 0`, `RIGHT = 1`, `BOTTOM = 2`, `LEFT = 3`), so rotating a side
//! clockwise is `(index + 1) % 4` and the opposite side is `(index + 2) % 4`.
//! [`Side::Above`] and [`Side::Under`] address the neighbouring die layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A side of a tile or switch block.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The top side (towards increasing y).
    Top,
    /// The right side (towards increasing x).
    Right,
    /// The bottom side (towards decreasing y).
    Bottom,
    /// The left side (towards decreasing x).
    Left,
    /// The layer above (towards increasing layer number).
    Above,
    /// The layer below (towards decreasing layer number).
    Under,
}

impl Side {
    /// The four in-plane sides in index order.
    pub const PLANAR: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// All six sides in index order.
    pub const ALL: [Side; 6] = [
        Side::Top,
        Side::Right,
        Side::Bottom,
        Side::Left,
        Side::Above,
        Side::Under,
    ];

    /// Returns the dense index of this side.
    pub fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
            Side::Above => 4,
            Side::Under => 5,
        }
    }

    /// Returns the side with the given dense index, if any.
    pub fn from_index(index: usize) -> Option<Side> {
        Side::ALL.get(index).copied()
    }

    /// Returns `true` for the four in-plane sides.
    pub fn is_planar(self) -> bool {
        self.index() < 4
    }

    /// Returns `true` for [`Side::Top`] and [`Side::Bottom`].
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    /// Returns `true` for [`Side::Left`] and [`Side::Right`].
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    /// Returns the opposite side.
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Above => Side::Under,
            Side::Under => Side::Above,
        }
    }

    /// Rotates a planar side clockwise. Layer sides are returned unchanged.
    pub fn clockwise(self) -> Side {
        match self {
            Side::Top => Side::Right,
            Side::Right => Side::Bottom,
            Side::Bottom => Side::Left,
            Side::Left => Side::Top,
            other => other,
        }
    }

    /// Rotates a planar side counter-clockwise. Layer sides are returned unchanged.
    pub fn counter_clockwise(self) -> Side {
        match self {
            Side::Top => Side::Left,
            Side::Left => Side::Bottom,
            Side::Bottom => Side::Right,
            Side::Right => Side::Top,
            other => other,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Top => "TOP",
            Side::Right => "RIGHT",
            Side::Bottom => "BOTTOM",
            Side::Left => "LEFT",
            Side::Above => "ABOVE",
            Side::Under => "UNDER",
        };
        f.write_str(name)
    }
}

/// A compact set of [`Side`]s stored as a bitmask.
///
/// Serializes as a list of side names so architecture files can write
/// `sides = ["top", "right"]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Side>", into = "Vec<Side>")]
pub struct SideSet(u8);

impl SideSet {
    /// The empty set.
    pub const EMPTY: SideSet = SideSet(0);

    /// The four planar sides.
    pub const PLANAR: SideSet = SideSet(0b0000_1111);

    /// Creates a set containing a single side.
    pub fn single(side: Side) -> Self {
        Self(1 << side.index())
    }

    /// Adds a side to the set.
    pub fn insert(&mut self, side: Side) {
        self.0 |= 1 << side.index();
    }

    /// Returns `true` if the set contains `side`.
    pub fn contains(self, side: Side) -> bool {
        self.0 & (1 << side.index()) != 0
    }

    /// Returns `true` if the set has no sides.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of sides in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the sides of the set in index order.
    pub fn iter(self) -> impl Iterator<Item = Side> {
        Side::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl FromIterator<Side> for SideSet {
    fn from_iter<I: IntoIterator<Item = Side>>(iter: I) -> Self {
        let mut set = SideSet::EMPTY;
        for side in iter {
            set.insert(side);
        }
        set
    }
}

impl From<Vec<Side>> for SideSet {
    fn from(sides: Vec<Side>) -> Self {
        sides.into_iter().collect()
    }
}

impl From<SideSet> for Vec<Side> {
    fn from(set: SideSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for SideSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// The axis a routing wire runs along.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal channels (`CHANX`).
    X,
    /// Vertical channels (`CHANY`).
    Y,
    /// Inter-die channels (`CHANZ`).
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        })
    }
}

/// The signal direction of a routing wire.
///
/// Unidirectional wires are either `Inc` (driven from the low-coordinate end)
/// or `Dec` (driven from the high-coordinate end).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Driven at the low end, travels towards increasing coordinates.
    Inc,
    /// Driven at the high end, travels towards decreasing coordinates.
    Dec,
    /// Can be driven from either end.
    Bidir,
    /// Not a wire (pins, sources, sinks).
    #[default]
    None,
}

impl Direction {
    /// Returns the direction a unidirectional wire takes when reversed.
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Inc => Direction::Dec,
            Direction::Dec => Direction::Inc,
            other => other,
        }
    }
}

/// A tile location in a (possibly multi-die) device grid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct GridLoc {
    /// The die layer.
    pub layer: usize,
    /// The column.
    pub x: usize,
    /// The row.
    pub y: usize,
}

impl GridLoc {
    /// Creates a new grid location.
    pub fn new(layer: usize, x: usize, y: usize) -> Self {
        Self { layer, x, y }
    }
}

impl fmt::Display for GridLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.layer, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_index_order() {
        let idx: Vec<usize> = Side::PLANAR.iter().map(|s| s.index()).collect();
        assert_eq!(idx, vec![0, 1, 2, 3]);
        for side in Side::ALL {
            assert_eq!(Side::from_index(side.index()), Some(side));
        }
        assert_eq!(Side::from_index(6), None);
    }

    #[test]
    fn rotations_match_index_arithmetic() {
        for side in Side::PLANAR {
            assert_eq!(side.clockwise().index(), (side.index() + 1) % 4);
            assert_eq!(side.opposite().index(), (side.index() + 2) % 4);
            assert_eq!(side.counter_clockwise().index(), (side.index() + 3) % 4);
        }
        assert_eq!(Side::Above.opposite(), Side::Under);
        assert_eq!(Side::Above.clockwise(), Side::Above);
    }

    #[test]
    fn side_set_ops() {
        let mut set = SideSet::EMPTY;
        assert!(set.is_empty());
        set.insert(Side::Left);
        set.insert(Side::Top);
        set.insert(Side::Left);
        assert_eq!(set.len(), 2);
        assert!(set.contains(Side::Top));
        assert!(!set.contains(Side::Bottom));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Side::Top, Side::Left]);
        assert_eq!(SideSet::PLANAR.len(), 4);
        assert!(!SideSet::PLANAR.contains(Side::Above));
    }

    #[test]
    fn side_set_serde_as_list() {
        let set: SideSet = [Side::Right, Side::Under].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["right","under"]"#);
        let back: SideSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn direction_reverse() {
        assert_eq!(Direction::Inc.reversed(), Direction::Dec);
        assert_eq!(Direction::Dec.reversed(), Direction::Inc);
        assert_eq!(Direction::Bidir.reversed(), Direction::Bidir);
        assert_eq!(Direction::default(), Direction::None);
    }

    #[test]
    fn axis_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Axis::Z).unwrap(), r#""z""#);
        assert_eq!(Axis::X.to_string(), "X");
    }

    #[test]
    fn grid_loc_display() {
        assert_eq!(format!("{}", GridLoc::new(0, 3, 4)), "(0, 3, 4)");
    }
}
