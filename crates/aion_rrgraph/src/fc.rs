//! Fc: how many tracks of each segment type every pin connects to.
//!
//! The architecture gives Fc per group of pins, either as a fraction of the
//! tracks of a segment type or as an absolute track count. This module turns
//! those specs into a per-pin count, `fc[tile][pin][segment]`, indexed by
//! unified segment.

use crate::error::RrGraphError;
use aion_arch::{Architecture, Directionality, FcType, FcValueType, PhysicalTileType, PinType};

/// Per-pin Fc of one tile type, `[pin][unified segment]`.
pub type TileFc = Vec<Vec<usize>>;

/// Fc of every tile type for one direction.
#[derive(Clone, Debug, PartialEq)]
pub struct FcTable {
    /// `[tile type][pin][unified segment]`.
    pub values: Vec<TileFc>,
    /// Tile types whose Fc had to be clipped to the available tracks.
    pub clipped: Vec<String>,
}

impl FcTable {
    /// Fc of one pin towards one unified segment type.
    pub fn get(&self, tile: usize, pin: usize, seg: usize) -> usize {
        self.values
            .get(tile)
            .and_then(|t| t.get(pin))
            .and_then(|p| p.get(seg))
            .copied()
            .unwrap_or(0)
    }

    /// Total Fc of one pin over all segment types.
    pub fn total(&self, tile: usize, pin: usize) -> usize {
        self.values
            .get(tile)
            .and_then(|t| t.get(pin))
            .map_or(0, |p| p.iter().sum())
    }
}

fn pin_type_for(fc_type: FcType) -> PinType {
    match fc_type {
        FcType::In => PinType::Receiver,
        FcType::Out => PinType::Driver,
    }
}

/// Computes the actual Fc of every pin for one direction.
///
/// `sets_per_seg` is the number of track sets of every unified segment type;
/// a set is one track for bidirectional and an INC/DEC pair for
/// unidirectional wires. Every pin covered by a nonzero spec gets at least
/// one set, connections are dealt out one set per pin in turn, and each
/// result is clipped to the tracks that exist.
pub fn alloc_actual_fc(
    arch: &Architecture,
    sets_per_seg: &[usize],
    directionality: Directionality,
    fc_type: FcType,
    is_global: bool,
) -> Result<FcTable, RrGraphError> {
    let fac = directionality.pairing_factor();
    let num_seg = sets_per_seg.len();
    let mut values = Vec::with_capacity(arch.tile_types.len());
    let mut clipped = Vec::new();

    for tile in &arch.tile_types {
        let mut result = vec![vec![0usize; num_seg]; tile.num_pins()];
        if is_global {
            for (pin, row) in result.iter_mut().enumerate() {
                if tile.pin_type(pin) == pin_type_for(fc_type) && !tile.is_ignored_pin[pin] {
                    row.iter_mut().for_each(|v| *v = 1);
                }
            }
            values.push(result);
            continue;
        }

        let mut tile_clipped = false;
        for spec in tile.fc_specs.iter().filter(|s| s.fc_type == fc_type) {
            let iseg = spec.segment.index();
            if iseg >= num_seg || spec.pins.is_empty() || spec.value == 0.0 {
                continue;
            }
            let total = match spec.value_type {
                FcValueType::Fractional => {
                    let per_pin = (fac * sets_per_seg[iseg]) as f32 * spec.value;
                    (per_pin * spec.pins.len() as f32).round() as usize
                }
                FcValueType::Absolute => {
                    check_absolute(arch, tile, spec.pins[0], iseg, spec.value, fac)?;
                    spec.value.round() as usize * spec.pins.len()
                }
            };
            let mut total = total.max(fac);
            total += total % fac;

            let mut remaining = total;
            'deal: loop {
                for &pin in &spec.pins {
                    if remaining < fac {
                        break 'deal;
                    }
                    result[pin][iseg] += fac;
                    remaining -= fac;
                }
            }

            let max_tracks = sets_per_seg[iseg] * fac;
            for &pin in &spec.pins {
                if result[pin][iseg] > max_tracks {
                    result[pin][iseg] = max_tracks;
                    tile_clipped = true;
                }
            }
        }
        if tile_clipped {
            clipped.push(tile.name.clone());
        }
        values.push(result);
    }
    Ok(FcTable { values, clipped })
}

fn check_absolute(
    arch: &Architecture,
    tile: &PhysicalTileType,
    pin: usize,
    iseg: usize,
    value: f32,
    fac: usize,
) -> Result<(), RrGraphError> {
    let names = || {
        (
            tile.name.clone(),
            tile.pin_names.get(pin).cloned().unwrap_or_else(|| pin.to_string()),
            arch.segments
                .get(iseg)
                .map_or_else(|| iseg.to_string(), |s| s.name.clone()),
        )
    };
    if value % fac as f32 != 0.0 {
        let (block, pin, segment) = names();
        return Err(RrGraphError::AbsoluteFcNotMultiple {
            block,
            pin,
            segment,
            fac,
            value,
        });
    }
    if value < fac as f32 {
        let (block, pin, segment) = names();
        return Err(RrGraphError::AbsoluteFcTooSmall {
            block,
            pin,
            segment,
            fac,
            value,
        });
    }
    Ok(())
}

/// Largest Fc over the pins of `tile` of one pin type towards `seg`.
pub fn max_fc(tile: &PhysicalTileType, fc: &TileFc, pin_type: PinType, seg: usize) -> usize {
    (0..tile.num_pins())
        .filter(|&pin| tile.pin_type(pin) == pin_type)
        .filter_map(|pin| fc.get(pin).and_then(|row| row.get(seg)).copied())
        .max()
        .unwrap_or(0)
}

/// Decides per `[tile type][unified segment]` whether input pins use the
/// perturbed pattern.
///
/// Only bidirectional graphs perturb. A type is perturbed when its input
/// and output Fc are integer multiples of each other, which would make
/// input and output pins land on the same tracks, and the input Fc leaves
/// at least two tracks free.
pub fn perturb_ipins(
    arch: &Architecture,
    sets_per_seg: &[usize],
    fc_in: &FcTable,
    fc_out: &FcTable,
    directionality: Directionality,
) -> Vec<Vec<bool>> {
    let mut result = vec![vec![false; sets_per_seg.len()]; arch.tile_types.len()];
    if directionality != Directionality::Bidir {
        return result;
    }
    for (itype, tile) in arch.tile_types.iter().enumerate().skip(1) {
        for (iseg, &tracks) in sets_per_seg.iter().enumerate() {
            let fin = max_fc(tile, &fc_in.values[itype], PinType::Receiver, iseg);
            let fout = max_fc(tile, &fc_out.values[itype], PinType::Driver, iseg);
            if fin == 0 || fout == 0 {
                continue;
            }
            let ratio = fin.max(fout) as f32 / fin.min(fout) as f32;
            result[itype][iseg] = fin + 2 <= tracks
                && (ratio - ratio.round()).abs() < 0.5 / tracks as f32;
        }
    }
    result
}

/// Distinct prime factors in increasing order.
fn prime_factors(mut n: usize) -> Vec<usize> {
    let mut factors = Vec::new();
    let mut f = 2;
    while f * f <= n {
        if n % f == 0 {
            factors.push(f);
            while n % f == 0 {
                n /= f;
            }
        }
        f += 1;
    }
    if n > 1 {
        factors.push(n);
    }
    factors
}

/// Decides whether the output pins of `tile` use the perturbed pattern.
///
/// Only a channel with a single segment type of length `L` is considered.
/// Output pins step through the channel every `W / Fc` tracks; if that step
/// is a near multiple of a prime factor of `L`, some wire start points would
/// never be driven, so the pattern is perturbed.
pub fn perturb_opins(
    tile: &PhysicalTileType,
    fc_out: &TileFc,
    segment_lengths: &[usize],
    max_chan_width: usize,
) -> Vec<bool> {
    let mut result = vec![false; segment_lengths.len()];
    let [length] = segment_lengths else {
        return result;
    };
    let fc_max = max_fc(tile, fc_out, PinType::Driver, 0);
    if fc_max == 0 || fc_max == max_chan_width {
        return result;
    }
    let step = max_chan_width as f32 / fc_max as f32;
    let factors = match prime_factors(*length) {
        f if f.is_empty() => vec![*length],
        f => f,
    };
    for p in factors {
        if (step.round() as usize) < p {
            break;
        }
        let n = step / p as f32;
        if (n - n.floor()).abs() < 0.07 {
            result[0] = true;
            break;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_arch::load_architecture_from_str;

    fn arch(directionality: &str, fc_in: &str, fc_out: &str) -> Architecture {
        let toml = format!(
            r#"
[routing]
directionality = "{directionality}"
wire_to_ipin_switch = "mux"

[[switch]]
name = "mux"
kind = "mux"

[[segment]]
name = "L1"
mux = "mux"
wire_switch = "mux"
opin_switch = "mux"

[[tile]]
name = "clb"
[[tile.port]]
name = "I"
kind = "input"
count = 4
[[tile.port]]
name = "O"
kind = "output"
count = 2
[tile.fc]
in = {fc_in}
out = {fc_out}

[grid]
width = 5
height = 5
fill = "clb"
"#
        );
        load_architecture_from_str(&toml).unwrap()
    }

    #[test]
    fn fractional_fc_per_pin() {
        let a = arch("unidir", r#"{ type = "frac", value = 0.5 }"#, r#"{ type = "frac", value = 0.25 }"#);
        let clb = a.find_tile_type("clb").unwrap().index();
        let fin = alloc_actual_fc(&a, &[4], Directionality::Unidir, FcType::In, false).unwrap();
        // 0.5 * 8 tracks = 4 per pin
        assert_eq!(fin.get(clb, 0, 0), 4);
        assert_eq!(fin.get(clb, 3, 0), 4);
        assert_eq!(fin.get(clb, 4, 0), 0);
        let fout = alloc_actual_fc(&a, &[4], Directionality::Unidir, FcType::Out, false).unwrap();
        assert_eq!(fout.get(clb, 4, 0), 2);
        assert_eq!(fout.get(clb, 0, 0), 0);
        assert!(fin.clipped.is_empty());
    }

    #[test]
    fn small_fc_gets_one_pair() {
        let a = arch("unidir", r#"{ type = "frac", value = 0.01 }"#, r#"{ type = "frac", value = 0.01 }"#);
        let clb = a.find_tile_type("clb").unwrap().index();
        let fin = alloc_actual_fc(&a, &[4], Directionality::Unidir, FcType::In, false).unwrap();
        // one pair dealt to the first pin, nothing left for the others
        assert_eq!(fin.get(clb, 0, 0), 2);
        assert_eq!(fin.get(clb, 1, 0), 0);
    }

    #[test]
    fn absolute_fc_must_be_multiple() {
        let a = arch("unidir", r#"{ type = "abs", value = 3 }"#, r#"{ type = "abs", value = 2 }"#);
        let err = alloc_actual_fc(&a, &[4], Directionality::Unidir, FcType::In, false).unwrap_err();
        assert!(matches!(err, RrGraphError::AbsoluteFcNotMultiple { ref block, fac: 2, .. } if block == "clb"));
    }

    #[test]
    fn absolute_fc_clipped() {
        let a = arch("unidir", r#"{ type = "abs", value = 12 }"#, r#"{ type = "abs", value = 2 }"#);
        let clb = a.find_tile_type("clb").unwrap().index();
        let fin = alloc_actual_fc(&a, &[4], Directionality::Unidir, FcType::In, false).unwrap();
        assert_eq!(fin.get(clb, 0, 0), 8);
        assert_eq!(fin.clipped, vec!["clb".to_string()]);
    }

    #[test]
    fn zero_fc_means_no_connection() {
        let a = arch("bidir", r#"{ type = "frac", value = 0 }"#, r#"{ type = "frac", value = 0.5 }"#);
        let clb = a.find_tile_type("clb").unwrap().index();
        let fin = alloc_actual_fc(&a, &[6], Directionality::Bidir, FcType::In, false).unwrap();
        assert_eq!(fin.total(clb, 0), 0);
        assert!(fin.clipped.is_empty());
    }

    #[test]
    fn global_fc_is_one_per_matching_pin() {
        let a = arch("bidir", r#"{ type = "frac", value = 0.5 }"#, r#"{ type = "frac", value = 0.5 }"#);
        let clb = a.find_tile_type("clb").unwrap().index();
        let fin = alloc_actual_fc(&a, &[1], Directionality::Bidir, FcType::In, true).unwrap();
        assert_eq!(fin.get(clb, 0, 0), 1);
        assert_eq!(fin.get(clb, 5, 0), 0);
    }

    #[test]
    fn perturb_ipins_when_fc_equal() {
        let a = arch("bidir", r#"{ type = "abs", value = 3 }"#, r#"{ type = "abs", value = 3 }"#);
        let clb = a.find_tile_type("clb").unwrap().index();
        let fin = alloc_actual_fc(&a, &[10], Directionality::Bidir, FcType::In, false).unwrap();
        let fout = alloc_actual_fc(&a, &[10], Directionality::Bidir, FcType::Out, false).unwrap();
        let p = perturb_ipins(&a, &[10], &fin, &fout, Directionality::Bidir);
        assert!(p[clb][0]);
        assert!(!p[0][0]);
        let p = perturb_ipins(&a, &[10], &fin, &fout, Directionality::Unidir);
        assert!(!p[clb][0]);
    }

    #[test]
    fn no_pin_has_both_input_and_output_fc() {
        let frac = |v: f32| format!(r#"{{ type = "frac", value = {v} }}"#);
        let cases = [
            (arch("unidir", &frac(0.5), &frac(0.25)), Directionality::Unidir, 4, false),
            (arch("bidir", r#"{ type = "abs", value = 3 }"#, r#"{ type = "abs", value = 3 }"#), Directionality::Bidir, 10, false),
            (arch("bidir", &frac(1.0), &frac(1.0)), Directionality::Bidir, 6, false),
            (arch("bidir", &frac(0.5), &frac(0.5)), Directionality::Bidir, 1, true),
        ];
        for (a, dir, sets, is_global) in &cases {
            let fin = alloc_actual_fc(a, &[*sets], *dir, FcType::In, *is_global).unwrap();
            let fout = alloc_actual_fc(a, &[*sets], *dir, FcType::Out, *is_global).unwrap();
            assert_eq!(fin.values.len(), a.tile_types.len());
            assert_eq!(fout.values.len(), a.tile_types.len());
            let (mut inputs, mut outputs) = (0, 0);
            for (t, tile) in a.tile_types.iter().enumerate() {
                for pin in 0..tile.num_pins() {
                    let segs = |table: &FcTable| table.values[t].get(pin).map_or(0, Vec::len);
                    for seg in 0..segs(&fin).max(segs(&fout)) {
                        let (i, o) = (fin.get(t, pin, seg), fout.get(t, pin, seg));
                        assert!(i == 0 || o == 0, "pin {pin} of '{}' has Fc_in {i} and Fc_out {o}", tile.name);
                        match tile.pin_type(pin) {
                            PinType::Receiver => assert_eq!(o, 0),
                            PinType::Driver => assert_eq!(i, 0),
                        }
                        inputs += usize::from(i > 0);
                        outputs += usize::from(o > 0);
                    }
                }
            }
            assert!(inputs > 0 && outputs > 0);
        }
    }

    #[test]
    fn prime_factorization() {
        assert_eq!(prime_factors(12), vec![2, 3]);
        assert_eq!(prime_factors(7), vec![7]);
        assert_eq!(prime_factors(8), vec![2]);
        assert!(prime_factors(1).is_empty());
    }

    #[test]
    fn perturb_opins_on_pathological_step() {
        let a = arch("bidir", r#"{ type = "abs", value = 2 }"#, r#"{ type = "abs", value = 2 }"#);
        let clb_id = a.find_tile_type("clb").unwrap();
        let clb = a.tile_type(clb_id);
        let fout = alloc_actual_fc(&a, &[8], Directionality::Bidir, FcType::Out, false).unwrap();
        // step 8 / 2 = 4 is a multiple of the factor 2 of L = 4
        assert_eq!(perturb_opins(clb, &fout.values[clb_id.index()], &[4], 8), vec![true]);
        // step 4 is below the factor 5 of L = 5
        assert_eq!(perturb_opins(clb, &fout.values[clb_id.index()], &[5], 8), vec![false]);
        // several segment types never perturb
        assert_eq!(
            perturb_opins(clb, &fout.values[clb_id.index()], &[4, 4], 8),
            vec![false, false]
        );
    }
}
