//! Loading the architecture and build options named on the command line.

use std::path::{Path, PathBuf};

use aion_arch::Architecture;
use aion_config::{load_config, load_config_from_str, RrGraphConfig, CONFIG_FILE_NAME};

use crate::{GlobalArgs, InputArgs};

/// Directory searched for `rrgraph.toml`.
pub fn config_dir(args: &InputArgs) -> PathBuf {
    match &args.config {
        Some(dir) => dir.clone(),
        None => args
            .arch
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

/// Loads the build options, applying a `--width` override.
///
/// Without an `rrgraph.toml` the override alone is enough to build.
pub fn load_build_config(args: &InputArgs) -> Result<RrGraphConfig, Box<dyn std::error::Error>> {
    let dir = config_dir(args);
    if !dir.join(CONFIG_FILE_NAME).is_file() {
        return match args.width {
            Some(width) => Ok(load_config_from_str(&format!("[channel]\nwidth = {width}\n"))?),
            None => Err(format!(
                "no {CONFIG_FILE_NAME} found in {} (pass --width or --config)",
                dir.display()
            )
            .into()),
        };
    }
    let mut config = load_config(&dir)?;
    if let Some(width) = args.width {
        config.channel.width = width;
        config.channel.x_width = None;
        config.channel.y_width = None;
    }
    Ok(config)
}

/// Loads the architecture and build options, announcing them unless quiet.
pub fn load_inputs(
    args: &InputArgs,
    global: &GlobalArgs,
) -> Result<(Architecture, RrGraphConfig), Box<dyn std::error::Error>> {
    let arch = aion_arch::load_architecture(&args.arch)?;
    let config = load_build_config(args)?;

    tracing::debug!(arch = %args.arch.display(), "inputs loaded");
    if !global.quiet {
        eprintln!(
            "   Loaded {} ({}x{}, {} segment(s), {} tile type(s))",
            args.arch.display(),
            arch.grid.width(),
            arch.grid.height(),
            arch.segments.len(),
            arch.tile_types.len()
        );
    }
    Ok((arch, config))
}
