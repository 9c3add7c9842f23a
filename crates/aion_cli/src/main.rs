//! Aion CLI, the command-line interface for the Aion routing-graph builder.
//!
//! Provides `aion build` to build the routing resource graph of an
//! architecture and report its statistics, and `aion check` to validate an
//! architecture and its build options without building.

#![warn(missing_docs)]

mod build;
mod check;
#[cfg(test)]
mod fixtures;
mod inputs;

use std::path::PathBuf;
use std::process;

use aion_diagnostics::{Diagnostic, DiagnosticRenderer, Severity, TerminalRenderer};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Aion: routing resource graph construction for island-style FPGAs.
#[derive(Parser, Debug)]
#[command(name = "aion", version, about = "Aion routing-graph builder")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Raise log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the routing resource graph and report its statistics.
    Build(BuildArgs),
    /// Validate an architecture and its build options.
    Check(InputArgs),
}

/// The architecture and build options to work on.
#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Architecture file (TOML).
    pub arch: PathBuf,

    /// Directory holding `rrgraph.toml` (default: the architecture's directory).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the requested channel width.
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,
}

/// Arguments for the `aion build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Architecture and build options.
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the finished graph as JSON to this file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format of the build report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Fail the build when any warning is raised.
    #[arg(long)]
    pub deny_warnings: bool,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to use colored output.
    pub color: bool,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => atty_is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    init_logging(cli.quiet, cli.verbose, color);

    let global = GlobalArgs {
        quiet: cli.quiet,
        color,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Renders diagnostics to stderr; only errors are shown when quiet.
pub(crate) fn render_diagnostics(diagnostics: &[Diagnostic], global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color, 80);
    for diag in diagnostics {
        if global.quiet && diag.severity != Severity::Error {
            continue;
        }
        eprintln!("{}", renderer.render(diag));
    }
}

/// Default log filter for the given flags; `RUST_LOG` takes precedence.
fn log_filter(quiet: bool, verbose: u8) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

fn init_logging(quiet: bool, verbose: u8, color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(quiet, verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Rough terminal detection from the `TERM` variable.
fn atty_is_terminal() -> bool {
    std::env::var("TERM").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["aion", "build", "k4.toml"]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.input.arch, PathBuf::from("k4.toml"));
                assert!(args.input.config.is_none());
                assert!(args.input.width.is_none());
                assert!(args.output.is_none());
                assert_eq!(args.format, ReportFormat::Text);
                assert!(!args.deny_warnings);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_with_args() {
        let cli = Cli::parse_from([
            "aion",
            "build",
            "k4.toml",
            "--config",
            "opts",
            "--width",
            "40",
            "--output",
            "graph.json",
            "--format",
            "json",
            "--deny-warnings",
        ]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.input.config, Some(PathBuf::from("opts")));
                assert_eq!(args.input.width, Some(40));
                assert_eq!(args.output, Some(PathBuf::from("graph.json")));
                assert_eq!(args.format, ReportFormat::Json);
                assert!(args.deny_warnings);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(Cli::try_parse_from(["aion", "build", "k4.toml", "--width", "0"]).is_err());
    }

    #[test]
    fn parse_check() {
        let cli = Cli::parse_from(["aion", "check", "k4.toml", "-w", "8"]);
        match cli.command {
            Command::Check(ref args) => {
                assert_eq!(args.arch, PathBuf::from("k4.toml"));
                assert_eq!(args.width, Some(8));
            }
            _ => panic!("expected Check command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["aion", "--quiet", "--color", "never", "check", "a.toml"]);
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn verbose_flag_counts() {
        let cli = Cli::parse_from(["aion", "-vv", "build", "a.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(log_filter(false, cli.verbose), "trace");
        assert_eq!(log_filter(false, 1), "debug");
        assert_eq!(log_filter(false, 0), "warn");
        assert_eq!(log_filter(true, 2), "error");
    }
}
