//! Key remapping for value maps produced by a transform.
//!
//! After a graph is rewritten, values keyed by old nodes often need to be
//! carried over to the new nodes. A key map sends each old key to zero or
//! more new keys; the value map is then rebuilt under the new keys.
//!
//! ## Conflicts
//!
//! When two or more old keys land on the same new key, a merge function
//! must resolve them. Without one the remap fails with
//! [`GraphError::AmbiguousMapping`]. Old keys missing from the value map are
//! ignored.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use crate::error::{GraphError, Result};

/// One key to many values.
pub type MultiMap<K, V> = HashMap<K, HashSet<V>>;

type CloneFn<'a, K, V> = Box<dyn FnMut(&K, &K, &V) -> V + 'a>;
type MergeFn<'a, K, V> = Box<dyn FnMut(&K, &HashMap<K, V>) -> V + 'a>;

/// Invert a map into a multimap, so non-injective maps lose nothing.
pub fn invert_map<K, V>(map: &HashMap<K, V>) -> MultiMap<V, K>
where
    K: Clone + Eq + Hash,
    V: Clone + Eq + Hash,
{
    let mut inverted: MultiMap<V, K> = HashMap::new();
    for (key, value) in map {
        inverted.entry(value.clone()).or_default().insert(key.clone());
    }
    inverted
}

/// Invert a multimap.
pub fn invert_multimap<K, V>(multimap: &MultiMap<K, V>) -> MultiMap<V, K>
where
    K: Clone + Eq + Hash,
    V: Clone + Eq + Hash,
{
    let mut inverted: MultiMap<V, K> = HashMap::new();
    for (key, values) in multimap {
        for value in values {
            inverted.entry(value.clone()).or_default().insert(key.clone());
        }
    }
    inverted
}

/// Rebuilds value maps under new keys.
///
/// ```rust
/// use std::collections::HashMap;
/// use dag_kernel::mapping::Remapper;
///
/// let values: HashMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
/// let keys: HashMap<&str, &str> = [("a", "x"), ("b", "x")].into_iter().collect();
///
/// let merged = Remapper::<&str, i32>::new()
///     .with_merge(|_, old| old.values().sum())
///     .apply(&keys, &values)
///     .unwrap();
/// assert_eq!(merged["x"], 3);
/// ```
pub struct Remapper<'a, K, V> {
    clone_fn: Option<CloneFn<'a, K, V>>,
    merge_fn: Option<MergeFn<'a, K, V>>,
}

impl<'a, K, V> Default for Remapper<'a, K, V> {
    fn default() -> Self {
        Self {
            clone_fn: None,
            merge_fn: None,
        }
    }
}

impl<'a, K, V> Remapper<'a, K, V>
where
    K: Clone + Eq + Hash + Debug,
    V: Clone,
{
    /// Remapper that copies values unchanged and rejects conflicts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the value for a new key from `(old_key, new_key, value)`.
    pub fn with_clone(mut self, f: impl FnMut(&K, &K, &V) -> V + 'a) -> Self {
        self.clone_fn = Some(Box::new(f));
        self
    }

    /// Resolve several old keys landing on one new key from
    /// `(new_key, old_key -> value)`.
    pub fn with_merge(mut self, f: impl FnMut(&K, &HashMap<K, V>) -> V + 'a) -> Self {
        self.merge_fn = Some(Box::new(f));
        self
    }

    /// Apply a one-to-many key map.
    pub fn apply_multi(&mut self, key_map: &MultiMap<K, K>, values: &HashMap<K, V>) -> Result<HashMap<K, V>> {
        let inverted = invert_multimap(key_map);
        let mut out = HashMap::with_capacity(inverted.len());
        let mut merged = 0usize;

        for (new_key, old_keys) in inverted {
            let mut present: Vec<(K, V)> = old_keys
                .into_iter()
                .filter_map(|k| values.get(&k).map(|v| (k, v.clone())))
                .collect();

            let value = if present.len() > 1 {
                let Some(merge) = self.merge_fn.as_mut() else {
                    return Err(GraphError::AmbiguousMapping {
                        key: format!("{new_key:?}"),
                    });
                };
                merged += 1;
                let old: HashMap<K, V> = present.into_iter().collect();
                merge(&new_key, &old)
            } else if let Some((old_key, value)) = present.pop() {
                match self.clone_fn.as_mut() {
                    Some(clone) => clone(&old_key, &new_key, &value),
                    None => value,
                }
            } else {
                continue;
            };
            out.insert(new_key, value);
        }

        debug!(keys = out.len(), merged, "values remapped");
        Ok(out)
    }

    /// Apply a one-to-one key map.
    pub fn apply(&mut self, key_map: &HashMap<K, K>, values: &HashMap<K, V>) -> Result<HashMap<K, V>> {
        let multimap: MultiMap<K, K> = key_map
            .iter()
            .map(|(old, new)| (old.clone(), HashSet::from([new.clone()])))
            .collect();
        self.apply_multi(&multimap, values)
    }

    /// Apply a key map given as a function of each existing key.
    pub fn apply_with<F, I>(&mut self, mut key_fn: F, values: &HashMap<K, V>) -> Result<HashMap<K, V>>
    where
        F: FnMut(&K) -> I,
        I: IntoIterator<Item = K>,
    {
        let multimap: MultiMap<K, K> = values
            .keys()
            .map(|k| (k.clone(), key_fn(k).into_iter().collect()))
            .collect();
        self.apply_multi(&multimap, values)
    }
}

/// Apply a one-to-many key map, copying values and rejecting conflicts.
pub fn apply_multi_mapping<K, V>(key_map: &MultiMap<K, K>, values: &HashMap<K, V>) -> Result<HashMap<K, V>>
where
    K: Clone + Eq + Hash + Debug,
    V: Clone,
{
    Remapper::new().apply_multi(key_map, values)
}

/// Apply a one-to-one key map, copying values and rejecting conflicts.
pub fn apply_mapping<K, V>(key_map: &HashMap<K, K>, values: &HashMap<K, V>) -> Result<HashMap<K, V>>
where
    K: Clone + Eq + Hash + Debug,
    V: Clone,
{
    Remapper::new().apply(key_map, values)
}
