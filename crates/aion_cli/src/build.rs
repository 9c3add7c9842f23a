//! `aion build`: builds the routing resource graph of an architecture.
//!
//! Loads the architecture and `rrgraph.toml`, runs the graph build, renders
//! every warning raised on the way, and reports the graph statistics. The
//! finished graph can be written out as JSON with `--output`.

use aion_config::ChannelWidths;
use aion_diagnostics::{Diagnostic, DiagnosticSink, Severity};
use aion_rrgraph::{build_rr_graph, BuildResult, GraphStats};
use serde::Serialize;

use crate::inputs::load_inputs;
use crate::{render_diagnostics, BuildArgs, GlobalArgs, ReportFormat};

/// Machine-readable summary of a build.
#[derive(Serialize)]
struct BuildReport<'a> {
    stats: &'a GraphStats,
    channel_width: ChannelReport,
    warnings: u32,
    diagnostics: &'a [Diagnostic],
}

#[derive(Serialize)]
struct ChannelReport {
    max: usize,
    x_max: usize,
    y_max: usize,
}

impl From<&ChannelWidths> for ChannelReport {
    fn from(widths: &ChannelWidths) -> Self {
        Self {
            max: widths.max,
            x_max: widths.x_max,
            y_max: widths.y_max,
        }
    }
}

/// Runs the `aion build` command.
///
/// Returns exit code 0 on success, 1 when the build fails or when
/// `--deny-warnings` is set and a warning was raised.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (arch, config) = load_inputs(&args.input, global)?;

    if !global.quiet {
        eprintln!("   Building routing graph");
    }

    let sink = DiagnosticSink::new();
    let outcome = build_rr_graph(&arch, &config, &sink);
    let mut diagnostics = sink.take_all();
    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            tracing::debug!(code = %e.code(), "build failed");
            diagnostics.push(e.to_diagnostic());
            render_diagnostics(&diagnostics, global);
            return Ok(1);
        }
    };

    if let Some(path) = &args.output {
        std::fs::write(path, result.graph.to_json()?)?;
        if !global.quiet {
            eprintln!("    Wrote {}", path.display());
        }
    }

    report(&result, &diagnostics, args.format, global)?;

    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    if args.deny_warnings && warning_count > 0 {
        if !global.quiet {
            eprintln!("   Failed: {warning_count} warning(s) denied");
        }
        return Ok(1);
    }
    Ok(0)
}

fn report(
    result: &BuildResult,
    diagnostics: &[Diagnostic],
    format: ReportFormat,
    global: &GlobalArgs,
) -> Result<(), serde_json::Error> {
    match format {
        ReportFormat::Text => {
            render_diagnostics(diagnostics, global);
            if !global.quiet {
                println!("{}", result.stats);
                println!(
                    "channel width: {} (x {}, y {})",
                    result.channel_widths.max,
                    result.channel_widths.x_max,
                    result.channel_widths.y_max
                );
                eprintln!("   Result: {} warning(s)", diagnostics.len());
            }
        }
        ReportFormat::Json => {
            let report = BuildReport {
                stats: &result.stats,
                channel_width: ChannelReport::from(&result.channel_widths),
                warnings: result.warnings.bits(),
                diagnostics,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
