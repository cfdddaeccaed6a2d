//! Bottom-up fold over a DAG, with incremental seeding.
//!
//! ## Evaluation
//!
//! Nodes are visited in topological order. For each node, every parent
//! relationship first gets an edge value from `edge_fn(parent, child,
//! parent_value)`, then `vertex_fn(node, edge_values)` produces the node's
//! value from those edge values in parent order.
//!
//! ## Seeding
//!
//! Any node present in the seed map is a frontier node: its value is copied
//! from the seed, its parents are never requested and nothing above it is
//! visited. Because nodes are keyed by structural identity, passing the
//! previous run's `vertex_values` as the seed makes unchanged subgraphs cost
//! nothing.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::analysis::analyze;
use crate::error::{GraphError, Result};

/// Values produced by [`transform`].
#[derive(Debug, Clone)]
pub struct TransformOutput<T, V, E> {
    /// Value per visited node, including seeded frontier nodes.
    pub vertex_values: HashMap<T, V>,
    /// Value per `(parent, child)` relationship that was evaluated.
    pub edge_values: HashMap<(T, T), E>,
    /// Number of `vertex_fn` calls.
    pub computed: usize,
    /// Number of nodes taken verbatim from the seed.
    pub reused: usize,
}

impl<T: Eq + Hash, V, E> TransformOutput<T, V, E> {
    /// Value computed for `node`.
    pub fn value_of(&self, node: &T) -> Option<&V> {
        self.vertex_values.get(node)
    }
}

impl<T: Clone + Eq + Hash, V, E> TransformOutput<T, V, E> {
    /// Value of the relationship `parent -> child`.
    pub fn edge_value(&self, parent: &T, child: &T) -> Option<&E> {
        self.edge_values.get(&(parent.clone(), child.clone()))
    }
}

/// Fold `vertex_fn` and `edge_fn` over everything reachable from `roots`.
///
/// Fails with [`GraphError::GraphCycle`] if the traversed graph (stopping at
/// seeded nodes) contains a cycle.
pub fn transform<T, I, F, P, V, E, VF, EF>(
    roots: I,
    mut parent_fn: F,
    mut vertex_fn: VF,
    mut edge_fn: EF,
    seed: &HashMap<T, V>,
) -> Result<TransformOutput<T, V, E>>
where
    T: Clone + Eq + Hash + Debug,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> P,
    P: IntoIterator<Item = T>,
    V: Clone,
    E: Clone,
    VF: FnMut(&T, &[E]) -> V,
    EF: FnMut(&T, &T, &V) -> E,
{
    let analysis = analyze(roots, |node: &T| -> Vec<T> {
        if seed.contains_key(node) {
            Vec::new()
        } else {
            parent_fn(node).into_iter().collect()
        }
    })?;

    let mut vertex_values: HashMap<T, V> = HashMap::with_capacity(analysis.len());
    let mut edge_values: HashMap<(T, T), E> = HashMap::new();
    let mut computed = 0;
    let mut reused = 0;

    for node in analysis.order() {
        if let Some(value) = seed.get(node) {
            trace!(node = ?node, "seeded");
            vertex_values.insert(node.clone(), value.clone());
            reused += 1;
            continue;
        }

        let parents = analysis.parents_of(node);
        let mut parent_values = Vec::with_capacity(parents.len());
        for parent in parents {
            let parent_value = vertex_values.get(parent).ok_or_else(|| GraphError::MissingParentValue {
                node: format!("{node:?}"),
                parent: format!("{parent:?}"),
            })?;
            let edge_value = edge_fn(parent, node, parent_value);
            edge_values.insert((parent.clone(), node.clone()), edge_value.clone());
            parent_values.push(edge_value);
        }

        let value = vertex_fn(node, &parent_values);
        vertex_values.insert(node.clone(), value);
        computed += 1;
    }

    debug!(
        nodes = analysis.len(),
        computed,
        reused,
        edges = edge_values.len(),
        "transform complete"
    );

    Ok(TransformOutput {
        vertex_values,
        edge_values,
        computed,
        reused,
    })
}

/// Vertex-only fold: edge values are the parent values unchanged.
pub fn transform_vertices<T, I, F, P, V, VF>(
    roots: I,
    parent_fn: F,
    vertex_fn: VF,
    seed: &HashMap<T, V>,
) -> Result<HashMap<T, V>>
where
    T: Clone + Eq + Hash + Debug,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> P,
    P: IntoIterator<Item = T>,
    V: Clone,
    VF: FnMut(&T, &[V]) -> V,
{
    transform(roots, parent_fn, vertex_fn, |_: &T, _: &T, value: &V| value.clone(), seed)
        .map(|out| out.vertex_values)
}

/// Edge-only fold: computes a value per `(parent, child)` relationship.
pub fn transform_edges<T, I, F, P, E, EF>(
    roots: I,
    parent_fn: F,
    mut edge_fn: EF,
) -> Result<HashMap<(T, T), E>>
where
    T: Clone + Eq + Hash + Debug,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> P,
    P: IntoIterator<Item = T>,
    E: Clone,
    EF: FnMut(&T, &T) -> E,
{
    let seed: HashMap<T, ()> = HashMap::new();
    transform(
        roots,
        parent_fn,
        |_: &T, _: &[E]| (),
        |parent: &T, child: &T, _: &()| edge_fn(parent, child),
        &seed,
    )
    .map(|out| out.edge_values)
}
