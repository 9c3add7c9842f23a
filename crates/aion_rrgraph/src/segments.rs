//! Per-axis segment lists and track-count distribution.
//!
//! The architecture declares one unified list of segment types. Each channel
//! axis only carries the types whose parallel axis allows it, so a build
//! works with three axis-local lists plus a map between unified and
//! axis-local indices.

use aion_arch::SegmentInf;
use aion_common::Axis;

/// The segment types usable on one axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisSegments {
    /// The axis.
    pub axis: Axis,
    /// Segment types in unified order.
    pub segments: Vec<SegmentInf>,
    /// Unified index of every axis-local segment.
    pub unified: Vec<usize>,
}

impl AxisSegments {
    /// Filters the unified list down to the types allowed on `axis`.
    pub fn for_axis(unified: &[SegmentInf], axis: Axis) -> Self {
        let (unified, segments) = unified
            .iter()
            .enumerate()
            .filter(|(_, seg)| seg.parallel_axis.allows(axis))
            .map(|(i, seg)| (i, seg.clone()))
            .unzip();
        Self {
            axis,
            segments,
            unified,
        }
    }

    /// Number of segment types on the axis.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the axis carries no segment type.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Bidirectional map between unified and axis-local segment indices.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentMap {
    /// Horizontal segment types.
    pub x: AxisSegments,
    /// Vertical segment types.
    pub y: AxisSegments,
    /// Inter-die segment types.
    pub z: AxisSegments,
    axis_index: Vec<[Option<usize>; 3]>,
}

fn axis_slot(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    }
}

impl SegmentMap {
    /// Splits the unified list over the three axes.
    pub fn new(unified: &[SegmentInf]) -> Self {
        let x = AxisSegments::for_axis(unified, Axis::X);
        let y = AxisSegments::for_axis(unified, Axis::Y);
        let z = AxisSegments::for_axis(unified, Axis::Z);
        let mut axis_index = vec![[None; 3]; unified.len()];
        for list in [&x, &y, &z] {
            for (local, &u) in list.unified.iter().enumerate() {
                axis_index[u][axis_slot(list.axis)] = Some(local);
            }
        }
        Self {
            x,
            y,
            z,
            axis_index,
        }
    }

    /// Returns the list for an axis.
    pub fn axis(&self, axis: Axis) -> &AxisSegments {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Axis-local index of a unified segment type, if the axis carries it.
    pub fn axis_index(&self, unified: usize, axis: Axis) -> Option<usize> {
        self.axis_index.get(unified)?[axis_slot(axis)]
    }

    /// Unified index of an axis-local segment type.
    pub fn unified_index(&self, axis: Axis, local: usize) -> Option<usize> {
        self.axis(axis).unified.get(local).copied()
    }
}

/// Distributes `num_sets` track sets over segment types by demand.
///
/// Demand is proportional to frequency, and with `use_full_seg_groups` the
/// types receive whole groups of `length` sets. Each step gives the next
/// set (or group) to the type with the highest remaining demand. If the
/// last group overshoots the target by more than half a group it is taken
/// back, so the returned total may differ from `num_sets`.
pub fn seg_track_counts(
    num_sets: usize,
    segments: &[SegmentInf],
    use_full_seg_groups: bool,
) -> Vec<usize> {
    let mut result = vec![0usize; segments.len()];
    if segments.is_empty() || num_sets == 0 {
        return result;
    }

    // Common multiple of the lengths keeps demands integral.
    let scale: f64 = segments.iter().map(|s| s.length.max(1) as f64).product();
    let freq_sum: f64 = segments.iter().map(|s| f64::from(s.frequency)).sum();
    if freq_sum <= 0.0 {
        return result;
    }
    let reduce = scale * freq_sum;

    let mut demand: Vec<f64> = segments
        .iter()
        .map(|s| {
            let d = scale * num_sets as f64 * f64::from(s.frequency);
            if use_full_seg_groups {
                d / s.length.max(1) as f64
            } else {
                d
            }
        })
        .collect();

    let mut assigned = 0;
    let mut imax = 0;
    let mut size = 0;
    while assigned < num_sets {
        let mut max = 0.0;
        for (i, &d) in demand.iter().enumerate() {
            if d > max {
                imax = i;
                max = d;
            }
        }
        size = if use_full_seg_groups {
            segments[imax].length.max(1)
        } else {
            1
        };
        demand[imax] -= reduce;
        result[imax] += size;
        assigned += size;
    }

    if assigned - num_sets > size / 2 {
        result[imax] -= size;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_arch::{Directionality, ParallelAxis, SwitchId};

    fn segment(name: &str, length: usize, frequency: u32, axis: ParallelAxis) -> SegmentInf {
        SegmentInf {
            name: name.into(),
            length,
            frequency,
            longline: false,
            parallel_axis: axis,
            directionality: Directionality::Unidir,
            r_metal: 0.0,
            c_metal: 0.0,
            wire_switch: SwitchId::from_raw(0),
            opin_switch: SwitchId::from_raw(0),
            wire_switch_dec: None,
            opin_switch_dec: None,
            inter_die_switch: None,
            cb: vec![true; length],
            sb: vec![true; length + 1],
        }
    }

    #[test]
    fn single_length_one_segment() {
        let segs = [segment("L1", 1, 1, ParallelAxis::X)];
        assert_eq!(seg_track_counts(1, &segs, false), vec![1]);
    }

    #[test]
    fn frequency_split() {
        let segs = [
            segment("L1", 1, 1, ParallelAxis::Both),
            segment("L4", 4, 3, ParallelAxis::Both),
        ];
        let counts = seg_track_counts(8, &segs, false);
        assert_eq!(counts.iter().sum::<usize>(), 8);
        assert_eq!(counts, vec![2, 6]);
    }

    #[test]
    fn full_groups_round_to_length() {
        let segs = [segment("L4", 4, 1, ParallelAxis::Both)];
        assert_eq!(seg_track_counts(5, &segs, true), vec![4]);
        assert_eq!(seg_track_counts(7, &segs, true), vec![8]);
    }

    #[test]
    fn empty_inputs() {
        assert!(seg_track_counts(4, &[], false).is_empty());
        let segs = [segment("L1", 1, 1, ParallelAxis::X)];
        assert_eq!(seg_track_counts(0, &segs, false), vec![0]);
    }

    #[test]
    fn axis_split_and_index_map() {
        let unified = [
            segment("hx", 1, 1, ParallelAxis::X),
            segment("both", 2, 1, ParallelAxis::Both),
            segment("vz", 1, 1, ParallelAxis::Z),
        ];
        let map = SegmentMap::new(&unified);
        assert_eq!(map.x.unified, vec![0, 1]);
        assert_eq!(map.y.unified, vec![1]);
        assert_eq!(map.z.unified, vec![2]);
        assert_eq!(map.axis_index(1, Axis::Y), Some(0));
        assert_eq!(map.axis_index(0, Axis::Y), None);
        assert_eq!(map.unified_index(Axis::X, 1), Some(1));
        assert_eq!(map.axis(Axis::Z).len(), 1);
        assert!(!map.y.is_empty());
    }
}
