//! Content hashing used to fingerprint finished routing graphs.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// A 128-bit content hash computed with XXH3.
///
/// Two routing graphs with the same fingerprint are assumed to have identical
/// node and edge tables; the determinism checks compare these values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data).to_le_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// Incremental XXH3-128 hasher for tables too large to serialize up front.
///
/// Integers are fed little-endian so fingerprints are platform independent.
pub struct ContentHasher {
    state: Xxh3,
}

impl ContentHasher {
    /// Creates an empty hasher.
    pub fn new() -> Self {
        Self { state: Xxh3::new() }
    }

    /// Feeds raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.state.update(bytes);
    }

    /// Feeds a `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.state.update(&value.to_le_bytes());
    }

    /// Feeds an `i32`.
    pub fn write_i32(&mut self, value: i32) {
        self.state.update(&value.to_le_bytes());
    }

    /// Feeds an `f32` by its bit pattern.
    pub fn write_f32(&mut self, value: f32) {
        self.state.update(&value.to_bits().to_le_bytes());
    }

    /// Finishes the hash.
    pub fn finish(&self) -> ContentHash {
        ContentHash(self.state.digest128().to_le_bytes())
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}
