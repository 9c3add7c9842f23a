//! Fatal routing-graph build errors.

use aion_common::InternalError;
use aion_config::ConfigError;
use aion_diagnostics::{Category, Diagnostic, DiagnosticCode};
use thiserror::Error;

/// Conditions that abort a routing-graph build.
#[derive(Debug, Error)]
pub enum RrGraphError {
    /// A unidirectional channel width must hold whole INC/DEC pairs.
    #[error("channel width {width} is not a multiple of {fac}")]
    ChannelWidthNotDivisible {
        /// Requested width.
        width: usize,
        /// Pairing factor.
        fac: usize,
    },
    /// An absolute Fc is not a whole number of track pairs.
    #[error(
        "block '{block}' pin {pin}: absolute Fc {value} towards segment '{segment}' is not a multiple of {fac}"
    )]
    AbsoluteFcNotMultiple {
        /// Tile type name.
        block: String,
        /// Pin name.
        pin: String,
        /// Segment type name.
        segment: String,
        /// Pairing factor.
        fac: usize,
        /// Fc value as written.
        value: f32,
    },
    /// An absolute Fc is smaller than one track pair.
    #[error(
        "block '{block}' pin {pin}: absolute Fc {value} towards segment '{segment}' is below the minimum of {fac}"
    )]
    AbsoluteFcTooSmall {
        /// Tile type name.
        block: String,
        /// Pin name.
        pin: String,
        /// Segment type name.
        segment: String,
        /// Pairing factor.
        fac: usize,
        /// Fc value as written.
        value: f32,
    },
    /// Unidirectional wires must use the same switch from wires and pins.
    #[error("segment '{segment}': unidirectional wires need the same wire and opin switch in each direction")]
    UnidirSwitchMismatch {
        /// Segment type name.
        segment: String,
    },
    /// A scatter-gather link must move along exactly one axis.
    #[error("scatter-gather pattern '{pattern}' link '{link}' must have exactly one nonzero offset")]
    ScatterGatherOffset {
        /// Pattern name.
        pattern: String,
        /// Link name.
        link: String,
    },
    /// The finished graph has more nodes than its grid and channel layout call for.
    #[error("expected no more than {expected} nodes, graph has {actual}")]
    NodeCountOverrun {
        /// Nodes counted from the grid and channel layout.
        expected: usize,
        /// Nodes present in the finished graph.
        actual: usize,
    },
    /// A switch-block or scatter-gather formula could not be evaluated.
    #[error("bad formula '{formula}': {reason}")]
    BadFormula {
        /// Formula as written.
        formula: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The perturbed connection-block pattern was requested for unidirectional wires.
    #[error("the perturbed connection-block pattern requires bidirectional wires")]
    PerturbedPatternUnidir,
    /// Unidirectional switch blocks are only defined for Fs = 3.
    #[error("unidirectional switch blocks require Fs = 3, got {fs}")]
    UnsupportedFs {
        /// Requested Fs.
        fs: u32,
    },
    /// The channel options do not fit the device.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    /// A broken internal invariant.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl RrGraphError {
    /// Returns the `E5xx` code used when the error is rendered.
    pub fn code(&self) -> DiagnosticCode {
        let number = match self {
            RrGraphError::ChannelWidthNotDivisible { .. } => 501,
            RrGraphError::AbsoluteFcNotMultiple { .. } => 502,
            RrGraphError::AbsoluteFcTooSmall { .. } => 503,
            RrGraphError::UnidirSwitchMismatch { .. } => 504,
            RrGraphError::ScatterGatherOffset { .. } => 505,
            RrGraphError::NodeCountOverrun { .. } => 506,
            RrGraphError::BadFormula { .. } => 507,
            RrGraphError::PerturbedPatternUnidir => 508,
            RrGraphError::UnsupportedFs { .. } => 509,
            RrGraphError::InvalidConfig(_) => 510,
            RrGraphError::Internal(_) => 599,
        };
        DiagnosticCode::new(Category::Error, number)
    }

    /// Converts the error into a diagnostic for rendering.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code(), self.to_string())
    }

    pub(crate) fn bad_formula(formula: &str, reason: impl Into<String>) -> Self {
        RrGraphError::BadFormula {
            formula: formula.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_block() {
        let err = RrGraphError::AbsoluteFcNotMultiple {
            block: "clb".into(),
            pin: "clb.O[0]".into(),
            segment: "L4".into(),
            fac: 2,
            value: 3.0,
        };
        assert_eq!(
            err.to_string(),
            "block 'clb' pin clb.O[0]: absolute Fc 3 towards segment 'L4' is not a multiple of 2"
        );
        assert_eq!(err.code().to_string(), "E502");
    }

    #[test]
    fn internal_converts() {
        let err: RrGraphError = InternalError::new("dangling node").into();
        assert_eq!(err.to_string(), "internal error: dangling node");
        assert_eq!(err.to_diagnostic().code.to_string(), "E599");
    }
}
