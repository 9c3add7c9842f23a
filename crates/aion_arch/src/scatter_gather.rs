//! Scatter-gather patterns: many-to-few-to-many bottleneck links.

use crate::ids::{SegmentId, SwitchId};
use crate::segment::Directionality;
use crate::switchblock::{SbLocation, WireconnInf};
use serde::{Deserialize, Serialize};

/// A named link from the gather location to the scatter location.
///
/// Exactly one of the three offsets is expected to be nonzero; the graph
/// builder rejects links that violate this.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SgLink {
    /// Link name, referenced by [`SgLocation::link`].
    pub name: String,
    /// Switch used on both sides of the bottleneck node.
    pub switch: SwitchId,
    /// Segment type of the bottleneck node.
    pub segment: SegmentId,
    /// Column offset of the scatter location.
    pub x_offset: i32,
    /// Row offset of the scatter location.
    pub y_offset: i32,
    /// Layer offset of the scatter location.
    pub z_offset: i32,
}

/// Instantiation of one link at a class of locations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SgLocation {
    /// Where the link is instantiated.
    pub location: SbLocation,
    /// Number of link instances per location.
    pub num: usize,
    /// Index into [`ScatterGatherPattern::links`].
    pub link: usize,
}

/// A resolved scatter-gather pattern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterGatherPattern {
    /// Pattern name.
    pub name: String,
    /// Directionality of the wires involved; only unidirectional is supported.
    pub directionality: Directionality,
    /// Source wires funnelled into the bottleneck, with the fan-in formula.
    pub gather: WireconnInf,
    /// Destination wires fed from the bottleneck, with the fan-out formula.
    pub scatter: WireconnInf,
    /// Declared links.
    pub links: Vec<SgLink>,
    /// Where links are instantiated.
    pub locations: Vec<SgLocation>,
}

impl SgLink {
    /// Returns the number of nonzero offsets.
    pub fn nonzero_offsets(&self) -> usize {
        [self.x_offset, self.y_offset, self.z_offset]
            .iter()
            .filter(|&&o| o != 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_counted() {
        let mut link = SgLink {
            name: "up".into(),
            switch: SwitchId::from_raw(0),
            segment: SegmentId::from_raw(0),
            x_offset: 0,
            y_offset: 0,
            z_offset: 1,
        };
        assert_eq!(link.nonzero_offsets(), 1);
        link.x_offset = -2;
        assert_eq!(link.nonzero_offsets(), 2);
        link.x_offset = 0;
        link.z_offset = 0;
        assert_eq!(link.nonzero_offsets(), 0);
    }
}
