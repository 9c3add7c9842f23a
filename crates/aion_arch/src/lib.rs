//! Routing architecture model for the Aion routing-graph builder.
//!
//! An architecture describes everything the graph builder reads but never
//! changes: the switch table, wire segment types, physical tile types with
//! their pins and Fc, the device grid, custom switch blocks, scatter-gather
//! patterns, and direct connections.
//!
//! # Usage
//!
//! Architectures are written in TOML and loaded with [`load_architecture`]
//! or [`load_architecture_from_str`]. Loading resolves every name to a typed
//! id ([`SwitchId`], [`SegmentId`], [`TileTypeId`]) and validates the
//! description:
//!
//! ```
//! use aion_arch::load_architecture_from_str;
//!
//! let arch = load_architecture_from_str(r#"
//! [routing]
//! wire_to_ipin_switch = "mux"
//!
//! [[switch]]
//! name = "mux"
//! kind = "mux"
//!
//! [[segment]]
//! name = "L1"
//! mux = "mux"
//!
//! [grid]
//! width = 4
//! height = 4
//! "#).unwrap();
//! assert_eq!(arch.segments.len(), 1);
//! assert_eq!(arch.grid.width(), 4);
//! ```

#![warn(missing_docs)]

pub mod arch;
pub mod desc;
pub mod direct;
pub mod error;
pub mod grid;
pub mod ids;
pub mod loader;
pub mod pin_ref;
pub mod resolve;
pub mod scatter_gather;
pub mod segment;
pub mod switch;
pub mod switchblock;
pub mod tile;

pub use arch::{Architecture, RoutingParams};
pub use desc::ArchDescription;
pub use direct::DirectInf;
pub use error::ArchError;
pub use grid::{DeviceGrid, GridTile};
pub use ids::{SegmentId, SwitchId, TileTypeId};
pub use loader::{load_architecture, load_architecture_from_str};
pub use resolve::DELAYLESS_SWITCH_NAME;
pub use scatter_gather::{ScatterGatherPattern, SgLink, SgLocation};
pub use segment::{Directionality, ParallelAxis, SegmentInf};
pub use switch::{ArchSwitch, SwitchKind, SwitchOverride};
pub use switchblock::{
    AxisSpec, SbLocation, SidePermutation, SwitchBlockInf, SwitchBlockType, WireOrder,
    WireSwitchpoints, WireconnInf, XySpec,
};
pub use tile::{
    FcSpec, FcType, FcValueType, PhysicalTileType, PinClass, PinLoc, PinType, SbPattern, SbType,
};
