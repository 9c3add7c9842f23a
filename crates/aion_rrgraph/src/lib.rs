//! Routing resource graph construction for island-style FPGAs.
//!
//! Given an [`Architecture`](aion_arch::Architecture) and the build options
//! of an [`RrGraphConfig`](aion_config::RrGraphConfig), [`build_rr_graph`]
//! lays out the routing channels and produces the [`RrGraph`]: one node per
//! wire, pin, pin class, and inter-die bridge, with an edge for every
//! programmable connection between them.
//!
//! # Usage
//!
//! ```
//! use aion_arch::load_architecture_from_str;
//! use aion_config::load_config_from_str;
//! use aion_diagnostics::DiagnosticSink;
//! use aion_rrgraph::{build_rr_graph, RrType};
//!
//! let arch = load_architecture_from_str(r#"
//! [routing]
//! directionality = "unidir"
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
//! [[tile]]
//! name = "clb"
//! [[tile.port]]
//! name = "I"
//! kind = "input"
//! count = 4
//! [[tile.port]]
//! name = "O"
//! kind = "output"
//! count = 2
//! [tile.fc]
//! in = { type = "frac", value = 0.5 }
//! out = { type = "frac", value = 0.5 }
//!
//! [grid]
//! width = 5
//! height = 5
//! fill = "clb"
//! "#).unwrap();
//! let config = load_config_from_str("[channel]\nwidth = 4\n").unwrap();
//!
//! let sink = DiagnosticSink::new();
//! let result = build_rr_graph(&arch, &config, &sink).unwrap();
//! assert!(result.warnings.is_empty());
//! assert!(result.stats.nodes_by_type[&RrType::ChanX.to_string()] > 0);
//! assert!(result.graph.num_edges() > 0);
//! ```
//!
//! # Architecture
//!
//! - [`segments`], [`channel`]: track layout per channel
//! - [`fc`], [`conn_block`]: pin-to-track connection blocks
//! - [`switchblock`]: track-to-track switch blocks, built-in and custom
//! - [`scatter_gather`], [`bridge`]: extra nodes beyond plain wires and pins
//! - [`graph`]: the node and edge tables and their builder
//! - [`build`]: the build sequence tying the stages together

#![warn(missing_docs)]

pub mod bridge;
pub mod build;
pub mod channel;
pub mod conn_block;
pub mod error;
pub mod fc;
pub mod formula;
pub mod graph;
pub mod ids;
pub mod scatter_gather;
pub mod segments;
pub mod stats;
pub mod switchblock;
pub mod warnings;

pub(crate) mod context;
pub(crate) mod edges;
pub(crate) mod indices;

pub use build::{build_rr_graph, BuildResult};
pub use error::RrGraphError;
pub use graph::{CostIndexInfo, GraphBuilder, NodeLookup, NodeRc, RrEdge, RrGraph, RrNode, RrType};
pub use ids::{RcIndex, RrEdgeId, RrNodeId};
pub use stats::GraphStats;
pub use warnings::RrGraphWarnings;
