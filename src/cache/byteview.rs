//! Byte View Module
//!
//! Immutable view over a cached value.

use std::fmt;

use bytes::Bytes;

use crate::cache::lru::Value;

// == Byte View ==
/// An immutable snapshot of a cached value's bytes.
///
/// The backing buffer is never handed out mutably. Owned copies are produced
/// by [`ByteView::byte_slice`], so callers can do whatever they like with the
/// result without affecting what the cache holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    b: Bytes,
}

impl ByteView {
    // == Constructor ==
    /// Takes ownership of `bytes`.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            b: Bytes::from(bytes),
        }
    }

    /// Copies `bytes` into a new view.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Self {
            b: Bytes::copy_from_slice(bytes),
        }
    }

    // == Length ==
    /// Returns the number of bytes in the view.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    // == Byte Slice ==
    /// Returns a copy of the data as an owned byte vector.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        &self.b
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.b))
    }
}

impl Value for ByteView {
    fn len(&self) -> usize {
        self.b.len()
    }
}
