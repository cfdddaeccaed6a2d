//! Structural hash values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of hex digits shown by [`NodeHash::short`].
pub const SHORT_HASH_LEN: usize = 8;

/// Structural hash of a vertex, edge or value.
///
/// Implements `Ord` by raw value; that order is only used to put parents into
/// a canonical sequence and carries no semantic meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeHash(u64);

impl NodeHash {
    /// Wrap a raw hash value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw hash value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// First [`SHORT_HASH_LEN`] hex digits, for diagnostics.
    pub fn short(&self) -> String {
        let mut hex = self.to_string();
        hex.truncate(SHORT_HASH_LEN);
        hex
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for NodeHash {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(NodeHash::new(0xab).to_string(), "00000000000000ab");
    }

    #[test]
    fn test_short_hash() {
        let h = NodeHash::new(0x0123_4567_89ab_cdef);
        assert_eq!(h.short(), "01234567");
        assert_eq!(h.short().len(), SHORT_HASH_LEN);
        assert!(u64::from_str_radix(&h.short(), 16).is_ok());
    }
}
