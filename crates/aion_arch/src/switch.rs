//! Architectural switches: the programmable elements behind every edge.

use crate::ids::SwitchId;
use serde::{Deserialize, Serialize};

/// The electrical kind of a switch.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchKind {
    /// Buffered multiplexer input; unidirectional, configurable.
    Mux,
    /// Tri-state buffer; unidirectional, configurable.
    Tristate,
    /// Pass transistor; bidirectional, configurable.
    PassGate,
    /// Electrical short (metal); bidirectional, not configurable.
    Short,
    /// Always-on buffer; unidirectional, not configurable.
    Buffer,
}

/// A switch declared by the architecture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchSwitch {
    /// Switch name, unique within the architecture.
    pub name: String,
    /// Electrical kind.
    pub kind: SwitchKind,
    /// Equivalent resistance in ohms.
    #[serde(default)]
    pub r: f32,
    /// Input capacitance in farads.
    #[serde(default)]
    pub cin: f32,
    /// Output capacitance in farads.
    #[serde(default)]
    pub cout: f32,
    /// Intrinsic delay in seconds.
    #[serde(default)]
    pub tdel: f32,
}

impl ArchSwitch {
    /// Returns `true` if the switch conducts in both directions.
    pub fn is_bidirectional(&self) -> bool {
        matches!(self.kind, SwitchKind::PassGate | SwitchKind::Short)
    }

    /// Returns `true` if the switch isolates its output from its input.
    pub fn is_buffered(&self) -> bool {
        matches!(
            self.kind,
            SwitchKind::Mux | SwitchKind::Tristate | SwitchKind::Buffer
        )
    }

    /// Returns `true` if the switch can be turned off by configuration.
    pub fn is_configurable(&self) -> bool {
        !matches!(self.kind, SwitchKind::Short | SwitchKind::Buffer)
    }
}

/// A switch choice that may defer to the architecture or suppress the edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchOverride {
    /// Use the switch the architecture implies for the connection.
    #[default]
    Default,
    /// Create no edge at all.
    NoSwitch,
    /// Use this switch.
    Switch(SwitchId),
}

impl SwitchOverride {
    /// Resolves the override against the implied switch; `None` means no edge.
    pub fn resolve(self, implied: SwitchId) -> Option<SwitchId> {
        match self {
            SwitchOverride::Default => Some(implied),
            SwitchOverride::NoSwitch => None,
            SwitchOverride::Switch(id) => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch(kind: SwitchKind) -> ArchSwitch {
        ArchSwitch {
            name: "s".into(),
            kind,
            r: 0.0,
            cin: 0.0,
            cout: 0.0,
            tdel: 0.0,
        }
    }

    #[test]
    fn kind_properties() {
        assert!(!switch(SwitchKind::Mux).is_bidirectional());
        assert!(switch(SwitchKind::Mux).is_configurable());
        assert!(switch(SwitchKind::PassGate).is_bidirectional());
        assert!(!switch(SwitchKind::PassGate).is_buffered());
        assert!(!switch(SwitchKind::Short).is_configurable());
        assert!(!switch(SwitchKind::Buffer).is_configurable());
        assert!(switch(SwitchKind::Buffer).is_buffered());
    }

    #[test]
    fn override_resolution() {
        let implied = SwitchId::from_raw(3);
        assert_eq!(SwitchOverride::Default.resolve(implied), Some(implied));
        assert_eq!(SwitchOverride::NoSwitch.resolve(implied), None);
        assert_eq!(
            SwitchOverride::Switch(SwitchId::from_raw(1)).resolve(implied),
            Some(SwitchId::from_raw(1))
        );
    }

    #[test]
    fn switch_serde_roundtrip() {
        let sw = switch(SwitchKind::Tristate);
        let json = serde_json::to_string(&sw).unwrap();
        assert!(json.contains("\"tristate\""));
        let back: ArchSwitch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sw);
    }
}
