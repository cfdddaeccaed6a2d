//! Canonical hashing for structural node identity.
//!
//! Two hashing paths live here:
//!
//! - [`structural_hash`] folds a [`Value`] tree into a [`NodeHash`]. This is
//!   the identity primitive used by vertices and edges.
//! - [`canonical_hash`] hashes any `Serialize` type through canonical JSON
//!   bytes. It is used for configuration fingerprints.
//!
//! ## Combination Function
//!
//! All hashing is xxh64 with seed [`HASH_SEED`]. Each value writes a one-byte
//! type tag followed by its payload:
//!
//! - Scalars write their little-endian bytes (strings and byte strings are
//!   length-prefixed). Unsigned integers that fit in `i64` hash as signed
//!   integers, so `5u32` and `5i64` are the same value.
//! - Floats are normalized first: `-0.0` hashes as `0.0` and every NaN hashes
//!   as the canonical quiet NaN.
//! - Sequences write their length, then each element hash in order.
//! - Maps write their length, then the sorted list of `(key hash, value hash)`
//!   pairs, so entry order never affects the result. A repeated key keeps its
//!   last value.
//! - Nested vertices and edges write their cached hash and are never
//!   re-derived from payload.
//!
//! Exact hash values are stable for a given crate version but are not part of
//! any portable contract.

use std::collections::BTreeMap;

use serde::Serialize;
use xxhash_rust::xxh64::{xxh64, Xxh64};

use crate::types::{NodeHash, Value};

/// Fixed seed for every structural and canonical hash.
pub const HASH_SEED: u64 = 0;

const TAG_NULL: u8 = 0x00;
const TAG_BOOL: u8 = 0x01;
const TAG_INT: u8 = 0x02;
const TAG_UINT: u8 = 0x03;
const TAG_FLOAT: u8 = 0x04;
const TAG_STR: u8 = 0x05;
const TAG_BYTES: u8 = 0x06;
const TAG_SEQ: u8 = 0x07;
const TAG_MAP: u8 = 0x08;
const TAG_VERTEX: u8 = 0x09;
const TAG_EDGE: u8 = 0x0a;
const TAG_ABSENT: u8 = 0x0b;

/// Incremental hasher for node identity.
///
/// Thin wrapper around [`Xxh64`] that knows how to write [`Value`]s and
/// optional payloads with type tags.
pub struct StructuralHasher {
    inner: Xxh64,
}

impl StructuralHasher {
    /// Create a hasher seeded with [`HASH_SEED`].
    pub fn new() -> Self {
        Self {
            inner: Xxh64::new(HASH_SEED),
        }
    }

    /// Write a domain tag (e.g. `b"vertex"`) that separates node kinds.
    pub fn write_domain(&mut self, domain: &[u8]) {
        self.write_len(domain.len());
        self.inner.update(domain);
    }

    /// Write an optional payload; `None` gets its own tag.
    pub fn write_optional(&mut self, value: Option<&Value>) {
        match value {
            Some(value) => self.write_value(value),
            None => self.inner.update(&[TAG_ABSENT]),
        }
    }

    /// Write an already computed node hash.
    pub fn write_hash(&mut self, hash: NodeHash) {
        self.inner.update(&hash.raw().to_le_bytes());
    }

    /// Write a length or count.
    pub fn write_len(&mut self, len: usize) {
        self.inner.update(&(len as u64).to_le_bytes());
    }

    /// Write a value tree.
    pub fn write_value(&mut self, value: &Value) {
        match value {
            Value::Null => self.inner.update(&[TAG_NULL]),
            Value::Bool(b) => self.inner.update(&[TAG_BOOL, u8::from(*b)]),
            Value::Int(i) => self.write_int(*i),
            Value::UInt(u) => match i64::try_from(*u) {
                Ok(i) => self.write_int(i),
                Err(_) => {
                    self.inner.update(&[TAG_UINT]);
                    self.inner.update(&u.to_le_bytes());
                }
            },
            Value::Float(f) => {
                self.inner.update(&[TAG_FLOAT]);
                self.inner.update(&normalize_float(*f).to_le_bytes());
            }
            Value::Str(s) => {
                self.inner.update(&[TAG_STR]);
                self.write_len(s.len());
                self.inner.update(s.as_bytes());
            }
            Value::Bytes(b) => {
                self.inner.update(&[TAG_BYTES]);
                self.write_len(b.len());
                self.inner.update(b);
            }
            Value::Seq(items) => {
                self.inner.update(&[TAG_SEQ]);
                self.write_len(items.len());
                for item in items {
                    self.write_hash(structural_hash(item));
                }
            }
            Value::Map(entries) => {
                let pairs: BTreeMap<u64, u64> = entries
                    .iter()
                    .map(|(k, v)| (structural_hash(k).raw(), structural_hash(v).raw()))
                    .collect();

                self.inner.update(&[TAG_MAP]);
                self.write_len(pairs.len());
                for (k, v) in pairs {
                    self.inner.update(&k.to_le_bytes());
                    self.inner.update(&v.to_le_bytes());
                }
            }
            Value::Vertex(vertex) => {
                self.inner.update(&[TAG_VERTEX]);
                self.write_hash(vertex.hash());
            }
            Value::Edge(edge) => {
                self.inner.update(&[TAG_EDGE]);
                self.write_hash(edge.hash());
            }
        }
    }

    fn write_int(&mut self, i: i64) {
        self.inner.update(&[TAG_INT]);
        self.inner.update(&i.to_le_bytes());
    }

    /// Finish and return the hash.
    pub fn finish(&self) -> NodeHash {
        NodeHash::new(self.inner.digest())
    }
}

impl Default for StructuralHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a float onto the bit pattern it should hash as.
fn normalize_float(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

/// Compute the structural hash of a value tree.
pub fn structural_hash(value: &Value) -> NodeHash {
    let mut hasher = StructuralHasher::new();
    hasher.write_value(value);
    hasher.finish()
}

/// Serialize a value to canonical JSON bytes for hashing.
///
/// Struct fields serialize in declaration order, so the output is stable for
/// the same input. Maps in hashed data should be `BTreeMap`s.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, HASH_SEED)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestStruct {
        name: String,
        value: i32,
    }

    #[test]
    fn test_canonical_determinism() {
        let s = TestStruct {
            name: "test".to_string(),
            value: 42,
        };

        assert_eq!(canonical_hash(&s), canonical_hash(&s));
        assert_eq!(canonical_hash_hex(&s).len(), 16);
    }

    #[test]
    fn test_scalars_are_tagged() {
        // Same bit pattern, different type: must not collide.
        assert_ne!(structural_hash(&Value::Int(1)), structural_hash(&Value::Float(1.0)));
        assert_ne!(structural_hash(&Value::Int(-1)), structural_hash(&Value::UInt(u64::MAX)));
        assert_ne!(structural_hash(&Value::Null), structural_hash(&Value::Bool(false)));
        assert_ne!(
            structural_hash(&Value::Str("ab".into())),
            structural_hash(&Value::Bytes(b"ab".to_vec()))
        );
    }

    #[test]
    fn test_sequence_order_matters() {
        let a = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::Seq(vec![Value::Int(2), Value::Int(1)]);
        assert_ne!(structural_hash(&a), structural_hash(&b));
    }

    #[test]
    fn test_map_order_does_not_matter() {
        let a = Value::Map(vec![
            (Value::from("x"), Value::Int(1)),
            (Value::from("y"), Value::Int(2)),
        ]);
        let b = Value::Map(vec![
            (Value::from("y"), Value::Int(2)),
            (Value::from("x"), Value::Int(1)),
        ]);
        assert_eq!(structural_hash(&a), structural_hash(&b));

        let c = Value::Map(vec![
            (Value::from("x"), Value::Int(2)),
            (Value::from("y"), Value::Int(1)),
        ]);
        assert_ne!(structural_hash(&a), structural_hash(&c));
    }

    #[test]
    fn test_fitting_unsigned_hashes_as_int() {
        assert_eq!(structural_hash(&Value::UInt(1)), structural_hash(&Value::Int(1)));
        assert_eq!(
            structural_hash(&Value::UInt(i64::MAX as u64)),
            structural_hash(&Value::Int(i64::MAX))
        );
    }

    #[test]
    fn test_map_repeated_key_keeps_last_value() {
        let single = Value::Map(vec![(Value::from("a"), Value::Int(1))]);
        let repeated = Value::Map(vec![
            (Value::from("a"), Value::Int(1)),
            (Value::from("a"), Value::Int(1)),
        ]);
        assert_eq!(structural_hash(&single), structural_hash(&repeated));

        let overwritten = Value::Map(vec![
            (Value::from("a"), Value::Int(2)),
            (Value::from("a"), Value::Int(1)),
        ]);
        assert_eq!(structural_hash(&single), structural_hash(&overwritten));

        let conflicting = Value::Map(vec![
            (Value::from("a"), Value::Int(1)),
            (Value::from("a"), Value::Int(2)),
        ]);
        assert_ne!(structural_hash(&single), structural_hash(&conflicting));
    }

    #[test]
    fn test_nested_lengths_disambiguate() {
        let flat = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        let nested = Value::Seq(vec![Value::Seq(vec![Value::Int(1)]), Value::Int(2)]);
        assert_ne!(structural_hash(&flat), structural_hash(&nested));
    }

    #[test]
    fn test_float_normalization() {
        assert_eq!(
            structural_hash(&Value::Float(0.0)),
            structural_hash(&Value::Float(-0.0))
        );
        assert_eq!(
            structural_hash(&Value::Float(f64::NAN)),
            structural_hash(&Value::Float(-f64::NAN))
        );
        assert_ne!(
            structural_hash(&Value::Float(1.0)),
            structural_hash(&Value::Float(2.0))
        );
    }

    #[test]
    fn test_optional_absent_differs_from_null() {
        let mut absent = StructuralHasher::new();
        absent.write_optional(None);
        let mut null = StructuralHasher::new();
        null.write_optional(Some(&Value::Null));
        assert_ne!(absent.finish(), null.finish());
    }
}
