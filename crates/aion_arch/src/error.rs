//! Error types for architecture loading and resolution.

use thiserror::Error;

/// Errors raised while reading or resolving an architecture description.
#[derive(Debug, Error)]
pub enum ArchError {
    /// The architecture file could not be read.
    #[error("failed to read architecture file: {0}")]
    IoError(#[from] std::io::Error),

    /// The architecture file is not valid TOML or does not match the schema.
    #[error("failed to parse architecture: {0}")]
    ParseError(String),

    /// A switch name is referenced but never declared.
    #[error("{context}: unknown switch '{name}'")]
    UnknownSwitch {
        /// The element holding the reference.
        context: String,
        /// The missing switch name.
        name: String,
    },

    /// A segment name is referenced but never declared.
    #[error("{context}: unknown segment '{name}'")]
    UnknownSegment {
        /// The element holding the reference.
        context: String,
        /// The missing segment name.
        name: String,
    },

    /// A tile type name is referenced but never declared.
    #[error("{context}: unknown tile type '{name}'")]
    UnknownTile {
        /// The element holding the reference.
        context: String,
        /// The missing tile type name.
        name: String,
    },

    /// A pin reference does not name a port of its tile or is out of range.
    #[error("{context}: bad pin reference '{pin}': {reason}")]
    BadPin {
        /// The element holding the reference.
        context: String,
        /// The pin reference as written.
        pin: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The device grid is smaller than the 3x3 minimum.
    #[error("device grid {width}x{height} is smaller than 3x3")]
    GridTooSmall {
        /// Grid width in tiles.
        width: usize,
        /// Grid height in tiles.
        height: usize,
    },

    /// Any other semantic problem, with the offending element named.
    #[error("{context}: {reason}")]
    Invalid {
        /// The offending element.
        context: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ArchError {
    pub(crate) fn invalid(context: impl Into<String>, reason: impl Into<String>) -> Self {
        ArchError::Invalid {
            context: context.into(),
            reason: reason.into(),
        }
    }
}
