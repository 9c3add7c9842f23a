//! Architecture files for the command tests.

use std::path::{Path, PathBuf};

/// A 5x5 unidirectional fabric of length-1 wires.
pub const FIXTURE_ARCH: &str = r#"
[routing]
directionality = "unidir"
wire_to_ipin_switch = "mux"

[[switch]]
name = "mux"
kind = "mux"
r = 500.0
tdel = 60e-12

[[segment]]
name = "L1"
mux = "mux"

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
in = { type = "frac", value = 0.5 }
out = { type = "frac", value = 0.5 }

[grid]
width = 5
height = 5
fill = "clb"
"#;

/// Writes `arch.toml`, and `rrgraph.toml` when given, into `dir`.
pub fn write_fixture(dir: &Path, arch: &str, config: Option<&str>) -> PathBuf {
    let path = dir.join("arch.toml");
    std::fs::write(&path, arch).unwrap();
    if let Some(config) = config {
        std::fs::write(dir.join(aion_config::CONFIG_FILE_NAME), config).unwrap();
    }
    path
}
