//! Recoverable build conditions: the warning bitmask and `W5xx` diagnostics.
//!
//! Every warning is reported twice: once as a bit in [`RrGraphWarnings`]
//! returned with the graph, and once as a [`Diagnostic`] emitted into the
//! caller's [`DiagnosticSink`]. The caller decides whether a warning fails
//! its flow.

use aion_common::GridLoc;
use aion_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fc was clipped to the number of available tracks.
pub const W_FC_CLIPPED: DiagnosticCode = DiagnosticCode::new(Category::Warning, 501);
/// A channel width was adjusted to fit the segment distribution.
pub const W_CHAN_WIDTH_CHANGED: DiagnosticCode = DiagnosticCode::new(Category::Warning, 502);
/// A scatter-gather link was skipped for lack of candidate wires.
pub const W_SG_LINK_SKIPPED: DiagnosticCode = DiagnosticCode::new(Category::Warning, 503);
/// No pin can reach a track.
pub const W_TRACK_UNREACHABLE: DiagnosticCode = DiagnosticCode::new(Category::Warning, 504);

/// Bitmask of warnings raised during a build.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RrGraphWarnings(u32);

impl RrGraphWarnings {
    /// No warnings.
    pub const NONE: RrGraphWarnings = RrGraphWarnings(0);
    /// Fc was clipped to the channel width.
    pub const FC_CLIPPED: RrGraphWarnings = RrGraphWarnings(1);
    /// The horizontal channel width was adjusted.
    pub const CHAN_X_WIDTH_CHANGED: RrGraphWarnings = RrGraphWarnings(1 << 1);
    /// The vertical channel width was adjusted.
    pub const CHAN_Y_WIDTH_CHANGED: RrGraphWarnings = RrGraphWarnings(1 << 2);

    /// Returns the raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Adds the bits of `other`.
    pub fn insert(&mut self, other: RrGraphWarnings) {
        self.0 |= other.0;
    }

    /// Returns `true` if every bit of `other` is set.
    pub fn contains(self, other: RrGraphWarnings) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no warning bit is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for RrGraphWarnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (RrGraphWarnings::FC_CLIPPED, "FC_CLIPPED"),
            (RrGraphWarnings::CHAN_X_WIDTH_CHANGED, "CHAN_X_WIDTH_CHANGED"),
            (RrGraphWarnings::CHAN_Y_WIDTH_CHANGED, "CHAN_Y_WIDTH_CHANGED"),
        ];
        f.debug_set()
            .entries(
                names
                    .iter()
                    .filter(|(bit, _)| self.contains(*bit))
                    .map(|(_, name)| name),
            )
            .finish()
    }
}

/// Reports an Fc clipped for a tile type.
pub(crate) fn fc_clipped(sink: &DiagnosticSink, block: &str, max_tracks: usize) {
    sink.emit(
        Diagnostic::warning(
            W_FC_CLIPPED,
            format!("Fc of block '{block}' clipped to the {max_tracks} available tracks"),
        )
        .with_help("lower the Fc values or widen the channels"),
    );
}

/// Reports output pins whose unidirectional Fc exceeds the muxes starting
/// next to them.
pub(crate) fn opin_fc_clipped(sink: &DiagnosticSink, block: &str) {
    sink.emit(
        Diagnostic::warning(
            W_FC_CLIPPED,
            format!("Fc of output pins of block '{block}' clipped to the wire muxes available"),
        )
        .with_note("a unidirectional output pin can only drive wires starting next to it")
        .with_help("lower the output Fc or use shorter segments"),
    );
}

/// Reports an adjusted channel width.
pub(crate) fn width_changed(sink: &DiagnosticSink, axis: &str, requested: usize, actual: usize) {
    sink.emit(
        Diagnostic::warning(
            W_CHAN_WIDTH_CHANGED,
            format!("{axis} channel width changed from {requested} to {actual}"),
        )
        .with_note("the width must split into whole track sets of every segment type"),
    );
}

/// Reports a scatter-gather link skipped for zero fan-in or fan-out.
pub(crate) fn sg_link_skipped(
    sink: &DiagnosticSink,
    pattern: &str,
    link: &str,
    loc: GridLoc,
    fanin: usize,
    fanout: usize,
) {
    sink.emit(
        Diagnostic::warning(
            W_SG_LINK_SKIPPED,
            format!("scatter-gather pattern '{pattern}' link '{link}' skipped"),
        )
        .with_location(loc)
        .with_note(format!("fan-in {fanin}, fan-out {fanout}")),
    );
}

/// Reports a track no pin connects to.
pub(crate) fn track_unreachable(sink: &DiagnosticSink, block: &str, axis: &str, track: usize) {
    sink.emit(Diagnostic::warning(
        W_TRACK_UNREACHABLE,
        format!("{axis} track {track} is not reachable from any pin of block '{block}'"),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmask_ops() {
        let mut w = RrGraphWarnings::NONE;
        assert!(w.is_empty());
        w.insert(RrGraphWarnings::FC_CLIPPED);
        w.insert(RrGraphWarnings::CHAN_Y_WIDTH_CHANGED);
        assert!(w.contains(RrGraphWarnings::FC_CLIPPED));
        assert!(!w.contains(RrGraphWarnings::CHAN_X_WIDTH_CHANGED));
        assert_eq!(w.bits(), 0b101);
        assert_eq!(format!("{w:?}"), r#"{"FC_CLIPPED", "CHAN_Y_WIDTH_CHANGED"}"#);
    }

    #[test]
    fn diagnostics_use_w5xx() {
        let sink = DiagnosticSink::new();
        fc_clipped(&sink, "clb", 8);
        sg_link_skipped(&sink, "sg", "up", GridLoc::new(0, 1, 1), 0, 3);
        let diags = sink.take_all();
        assert_eq!(diags[0].code.to_string(), "W501");
        assert_eq!(diags[1].code.to_string(), "W503");
        assert_eq!(diags[1].location, Some(GridLoc::new(0, 1, 1)));
    }
}
