//! Content digests for deriving `extra_hash` payloads.
//!
//! Vertices that stand for external data (files, blobs, rendered text) need
//! their identity to change when that data changes. Hashing the data with
//! SHA-256 and passing the digest as `extra_hash` does exactly that without
//! keeping the data itself inside the node.
//!
//! ## Text Normalization
//!
//! [`text_digest`] hashes the canonical form of a text:
//!
//! ```text
//! canonical(text) = UTF-8(trim(normalize_newlines(text)))
//! ```
//!
//! where `normalize_newlines` maps CRLF and lone CR to LF.

use sha2::{Digest, Sha256};

/// Normalize text to canonical form.
///
/// ```rust
/// use dag_kernel::digest::normalize_text;
///
/// assert_eq!(normalize_text("  Hello\r\nWorld  "), "Hello\nWorld");
/// ```
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

/// Lowercase hex SHA-256 of raw bytes.
///
/// ```rust
/// use dag_kernel::digest::content_digest;
///
/// assert_eq!(content_digest(b"abc").len(), 64);
/// ```
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Lowercase hex SHA-256 of the canonical form of `text`.
pub fn text_digest(text: &str) -> String {
    content_digest(normalize_text(text).as_bytes())
}
