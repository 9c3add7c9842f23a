//! Routing wire segment types.

use crate::ids::SwitchId;
use aion_common::Axis;
use serde::{Deserialize, Serialize};

/// Whether routing wires are driven from one end or both.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directionality {
    /// Each wire is driven by a multiplexer at its starting end.
    #[default]
    Unidir,
    /// Wires are driven through bidirectional switches at either end.
    Bidir,
}

impl Directionality {
    /// The number of tracks that form one logical track set: 2 for
    /// unidirectional wires (an INC/DEC pair), 1 otherwise.
    pub fn pairing_factor(self) -> usize {
        match self {
            Directionality::Unidir => 2,
            Directionality::Bidir => 1,
        }
    }
}

/// The channel axes a segment type may be used on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParallelAxis {
    /// Horizontal channels only.
    X,
    /// Vertical channels only.
    Y,
    /// Inter-die channels only.
    Z,
    /// Both horizontal and vertical channels.
    #[default]
    Both,
}

impl ParallelAxis {
    /// Returns `true` if a segment with this axis belongs on channels of `axis`.
    pub fn allows(self, axis: Axis) -> bool {
        match (self, axis) {
            (ParallelAxis::Both, Axis::X | Axis::Y) => true,
            (ParallelAxis::X, Axis::X) | (ParallelAxis::Y, Axis::Y) | (ParallelAxis::Z, Axis::Z) => {
                true
            }
            _ => false,
        }
    }
}

/// A resolved segment type.
///
/// `cb` has one entry per tile spanned (`length` entries) and says whether
/// the wire has a connection block there; `sb` has `length + 1` entries, one
/// per switch-block position from the wire's start to its end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentInf {
    /// Segment type name.
    pub name: String,
    /// Number of tiles spanned by one wire.
    pub length: usize,
    /// Relative share of channel tracks given to this type.
    pub frequency: u32,
    /// Wire spans the whole channel.
    pub longline: bool,
    /// Channel axes the type may occupy.
    pub parallel_axis: ParallelAxis,
    /// Driver style of the wires.
    pub directionality: Directionality,
    /// Metal resistance per tile, in ohms.
    pub r_metal: f32,
    /// Metal capacitance per tile, in farads.
    pub c_metal: f32,
    /// Switch used between wires (INC wires when unidirectional).
    pub wire_switch: SwitchId,
    /// Switch used from output pins onto wires (INC wires when unidirectional).
    pub opin_switch: SwitchId,
    /// Switch used between wires for DEC wires, if different.
    pub wire_switch_dec: Option<SwitchId>,
    /// Switch used from output pins onto DEC wires, if different.
    pub opin_switch_dec: Option<SwitchId>,
    /// Switch used to cross between dice.
    pub inter_die_switch: Option<SwitchId>,
    /// Connection-block population along the wire.
    pub cb: Vec<bool>,
    /// Switch-block population along the wire.
    pub sb: Vec<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_filter() {
        assert!(ParallelAxis::Both.allows(Axis::X));
        assert!(ParallelAxis::Both.allows(Axis::Y));
        assert!(!ParallelAxis::Both.allows(Axis::Z));
        assert!(ParallelAxis::X.allows(Axis::X));
        assert!(!ParallelAxis::X.allows(Axis::Y));
        assert!(ParallelAxis::Z.allows(Axis::Z));
    }

    #[test]
    fn pairing_factor() {
        assert_eq!(Directionality::Unidir.pairing_factor(), 2);
        assert_eq!(Directionality::Bidir.pairing_factor(), 1);
    }
}
