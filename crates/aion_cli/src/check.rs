//! `aion check`: validates an architecture and its build options.
//!
//! Loads both files and resolves the channel widths against the device grid
//! without building the graph.

use aion_config::resolve_channel_widths;

use crate::inputs::load_inputs;
use crate::{GlobalArgs, InputArgs};

/// Runs the `aion check` command.
///
/// Load and validation failures are returned as errors; exit code 0 means
/// both files are usable.
pub fn run(args: &InputArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (arch, config) = load_inputs(args, global)?;
    let widths = resolve_channel_widths(&config.channel, arch.grid.width(), arch.grid.height())?;
    tracing::debug!(x_max = widths.x_max, y_max = widths.y_max, "channel widths resolved");

    if !global.quiet {
        eprintln!(
            "     Check {} layer(s), {} switch(es), {} switch block(s), {} direct(s); channel width {}",
            arch.grid.layers(),
            arch.switches.len(),
            arch.switchblocks.len(),
            arch.directs.len(),
            widths.max
        );
        eprintln!("   Result: ok");
    }
    Ok(0)
}
