//! The [`define_id!`](crate::define_id) macro for opaque `u32` index newtypes.
//!
//! Every crate in the workspace names its arena indices with this macro so
//! that node, edge, switch, and segment ids cannot be mixed up. Crates that
//! invoke it must depend on `serde` directly.

/// Defines a `Copy` newtype over `u32` used as an arena index.
///
/// The generated type implements ordering, hashing, `Display`, and serde
/// support, plus `from_raw`/`as_raw` and `from_index`/`index` conversions.
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Debug,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Creates an ID from a `usize` arena position.
            pub fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            /// Returns the arena position of this ID.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}
