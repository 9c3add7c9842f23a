//! Architecture file loading.

use crate::arch::Architecture;
use crate::desc::ArchDescription;
use crate::error::ArchError;
use std::path::Path;

/// Loads, resolves, and validates an architecture TOML file.
pub fn load_architecture(path: &Path) -> Result<Architecture, ArchError> {
    let content = std::fs::read_to_string(path)?;
    load_architecture_from_str(&content)
}

/// Parses, resolves, and validates an architecture from TOML text.
pub fn load_architecture_from_str(content: &str) -> Result<Architecture, ArchError> {
    let desc: ArchDescription =
        toml::from_str(content).map_err(|e| ArchError::ParseError(e.to_string()))?;
    Architecture::resolve(desc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TileTypeId;
    use crate::segment::{Directionality, ParallelAxis};
    use crate::switch::SwitchOverride;
    use crate::switchblock::{SbLocation, SwitchBlockType};
    use crate::tile::{FcType, FcValueType, PinType, SbType};
    use aion_common::Side;

    const ARCH: &str = r#"
[routing]
directionality = "unidir"
switch_block_type = "wilton"
wire_to_ipin_switch = "ipin_cblock"

[[switch]]
name = "mux0"
kind = "mux"
r = 551.0
cin = 0.77e-15
tdel = 58e-12

[[switch]]
name = "ipin_cblock"
kind = "mux"
r = 1055.0

[[segment]]
name = "L4"
length = 4
freq = 1
axis = "both"
mux = "mux0"
r_metal = 101.0
c_metal = 22.5e-15
sb = [1, 0, 1, 0, 1]
cb = [1, 1, 0, 1]

[[tile]]
name = "io"
capacity = 2
[[tile.port]]
name = "outpad"
kind = "output"
[[tile.port]]
name = "inpad"
kind = "input"
[tile.fc]
in = { type = "frac", value = 0.15 }
out = { type = "frac", value = 0.10 }

[[tile]]
name = "clb"
[[tile.port]]
name = "I"
kind = "input"
count = 10
equivalent = true
[[tile.port]]
name = "O"
kind = "output"
count = 4
[[tile.port]]
name = "clk"
kind = "clock"
global = true
[[tile.pin_loc]]
side = "left"
pins = ["I[4:0]"]
[[tile.pin_loc]]
side = "top"
pins = ["I[9:5]", "clk"]
[[tile.pin_loc]]
side = "right"
pins = ["O"]
[tile.fc]
in = { type = "frac", value = 0.15 }
out = { type = "frac", value = 0.10 }
[[tile.fc.override]]
port = "O"
type = "abs"
value = 2

[[tile]]
name = "mem"
height = 2
switchblock_pattern = "external_full_internal_straight"
[[tile.port]]
name = "d"
kind = "input"
count = 8
[tile.fc]
in = { type = "abs", value = 4 }
out = { type = "abs", value = 2 }

[grid]
width = 8
height = 8
fill = "clb"
perimeter = "io"

[[grid.column]]
tile = "mem"
x = 3

[[switchblock]]
name = "corner_sb"
location = "corner"
permutations = { lr = ["t"], "top-bottom" = ["W - t - 1"] }
[[switchblock.wireconn]]
from = [{ type = "L4", switchpoints = [0, 4] }]
to = [{ type = "L4", switchpoints = [0] }]
num_conns = "from"
switch_override = "none"

[[direct]]
name = "carry"
from_pin = "clb.O[0]"
to_pin = "clb.I[0]"
y_offset = -1
switch = "mux0"
"#;

    #[test]
    fn load_full_architecture() {
        let arch = load_architecture_from_str(ARCH).unwrap();
        assert_eq!(arch.routing.directionality, Directionality::Unidir);
        assert_eq!(arch.routing.sb_type, SwitchBlockType::Wilton);
        assert_eq!(arch.routing.fs, 3);
        assert_eq!(arch.switches.len(), 3);
        assert_eq!(arch.switch(arch.routing.delayless_switch).r, 0.0);
        assert_eq!(arch.find_switch("ipin_cblock"), Some(arch.routing.wire_to_ipin_switch));

        let l4 = &arch.segments[0];
        assert_eq!(l4.parallel_axis, ParallelAxis::Both);
        assert_eq!(l4.wire_switch, l4.opin_switch);
        assert_eq!(l4.sb, vec![true, false, true, false, true]);
        assert_eq!(l4.cb, vec![true, true, false, true]);
    }

    #[test]
    fn tile_pins_and_classes() {
        let arch = load_architecture_from_str(ARCH).unwrap();
        let clb = arch.tile_type(arch.find_tile_type("clb").unwrap());
        assert_eq!(clb.num_pins(), 15);
        // I is one equivalent class, O and clk one class per pin
        assert_eq!(clb.classes.len(), 1 + 4 + 1);
        assert_eq!(clb.pin_class[9], 0);
        assert_eq!(clb.pin_type(10), PinType::Driver);
        assert_eq!(clb.pin_type(14), PinType::Receiver);
        assert!(clb.is_ignored_pin[14]);
        assert!(clb.pin_on(2, 0, 0, Side::Left));
        assert!(clb.pin_on(7, 0, 0, Side::Top));
        assert!(clb.pin_on(12, 0, 0, Side::Right));
        assert_eq!(clb.pin_names[10], "clb.O[0]");

        let io = arch.tile_type(arch.find_tile_type("io").unwrap());
        assert_eq!(io.pins_per_sub_tile(), 2);
        assert_eq!(io.num_pins(), 4);
        assert_eq!(io.pin_names[3], "io[1].inpad[0]");
    }

    #[test]
    fn fc_specs_with_override() {
        let arch = load_architecture_from_str(ARCH).unwrap();
        let clb = arch.tile_type(arch.find_tile_type("clb").unwrap());
        // global clock gets no spec
        assert_eq!(clb.fc_specs.len(), 2);
        let out = clb.fc_specs.iter().find(|s| s.fc_type == FcType::Out).unwrap();
        assert_eq!(out.value_type, FcValueType::Absolute);
        assert_eq!(out.value, 2.0);
        assert_eq!(out.pins, vec![10, 11, 12, 13]);
        let fin = clb.fc_specs.iter().find(|s| s.fc_type == FcType::In).unwrap();
        assert_eq!(fin.value_type, FcValueType::Fractional);
        assert_eq!(fin.pins.len(), 10);
    }

    #[test]
    fn grid_layout() {
        let arch = load_architecture_from_str(ARCH).unwrap();
        let grid = &arch.grid;
        let io = arch.find_tile_type("io").unwrap();
        let clb = arch.find_tile_type("clb").unwrap();
        let mem = arch.find_tile_type("mem").unwrap();
        assert_eq!(grid.tile_type(0, 0, 0), TileTypeId::EMPTY);
        assert_eq!(grid.tile_type(0, 0, 3), io);
        assert_eq!(grid.tile_type(0, 7, 5), io);
        assert_eq!(grid.tile_type(0, 2, 2), clb);
        assert_eq!(grid.tile_type(0, 3, 1), mem);
        assert_eq!(grid.tile(0, 3, 2).height_offset, 1);
        assert_eq!(grid.tile_type(0, 3, 5), mem);
        assert!(grid.tile(0, 3, 5).is_root());
        // a 2-high tile at row 7 would leave the grid
        assert_eq!(grid.tile_type(0, 3, 7), io);
        // a one-column tile has every switch block on its right edge
        let mem_type = arch.tile_type(mem);
        assert_eq!(mem_type.switchblock_locations, vec![SbType::Full; 2]);
    }

    #[test]
    fn custom_switchblock_and_direct() {
        let arch = load_architecture_from_str(ARCH).unwrap();
        let sb = &arch.switchblocks[0];
        assert_eq!(sb.location, SbLocation::Corner);
        assert_eq!(sb.directionality, Directionality::Unidir);
        assert_eq!(sb.permutations_for(Side::Left, Side::Right), ["t".to_string()]);
        assert_eq!(
            sb.permutations_for(Side::Top, Side::Bottom),
            ["W - t - 1".to_string()]
        );
        assert_eq!(sb.wireconns[0].switch_override, SwitchOverride::NoSwitch);
        assert_eq!(sb.wireconns[0].from[0].switchpoints, vec![0, 4]);

        let carry = &arch.directs[0];
        assert_eq!((carry.from_pin_start, carry.from_pin_end), (10, 10));
        assert_eq!((carry.to_pin_start, carry.to_pin_end), (0, 0));
        assert_eq!(carry.y_offset, -1);
        assert_eq!(carry.switch, arch.find_switch("mux0").unwrap());
    }

    #[test]
    fn unknown_switch_is_reported() {
        let bad = ARCH.replace("mux = \"mux0\"", "mux = \"mux9\"");
        let err = load_architecture_from_str(&bad).unwrap_err();
        assert!(matches!(err, ArchError::UnknownSwitch { ref name, .. } if name == "mux9"));
        assert!(err.to_string().contains("segment 'L4'"));
    }

    #[test]
    fn small_grid_rejected() {
        let bad = ARCH.replace("width = 8\nheight = 8", "width = 2\nheight = 8");
        assert!(matches!(
            load_architecture_from_str(&bad).unwrap_err(),
            ArchError::GridTooSmall { width: 2, .. }
        ));
    }

    #[test]
    fn bad_pattern_length_rejected() {
        let bad = ARCH.replace("sb = [1, 0, 1, 0, 1]", "sb = [1, 0, 1]");
        let err = load_architecture_from_str(&bad).unwrap_err();
        assert!(err.to_string().contains("sb pattern has 3 entries"));
    }

    #[test]
    fn bad_direct_pin_rejected() {
        let bad = ARCH.replace("to_pin = \"clb.I[0]\"", "to_pin = \"clb.I[12]\"");
        assert!(matches!(
            load_architecture_from_str(&bad).unwrap_err(),
            ArchError::BadPin { .. }
        ));
    }

    #[test]
    fn invalid_toml() {
        assert!(matches!(
            load_architecture_from_str("[routing").unwrap_err(),
            ArchError::ParseError(_)
        ));
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("aion_arch_test_{}.toml", std::process::id()));
        std::fs::write(&path, ARCH).unwrap();
        let arch = load_architecture(&path).unwrap();
        assert_eq!(arch.grid.width(), 8);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            load_architecture(&path).unwrap_err(),
            ArchError::IoError(_)
        ));
    }
}
