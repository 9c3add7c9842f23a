//! Shared foundational types used across the Aion routing-graph toolchain.
//!
//! This crate provides the id newtype macro, device geometry (sides, side sets,
//! grid locations), content hashing, and common result types.

#![warn(missing_docs)]

pub mod geom;
pub mod hash;
pub mod ids;
pub mod result;

pub use geom::{Axis, Direction, GridLoc, Side, SideSet};
pub use hash::{ContentHash, ContentHasher};
pub use result::{AionResult, InternalError};
