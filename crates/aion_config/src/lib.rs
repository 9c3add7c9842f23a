//! Parsing and validation of `rrgraph.toml` routing-graph build options.
//!
//! This crate reads the build configuration file and produces a strongly-typed
//! [`RrGraphConfig`], then resolves the requested channel widths against a
//! device grid into per-row and per-column [`ChannelWidths`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{resolve_channel_widths, ChannelWidths};
pub use types::*;
