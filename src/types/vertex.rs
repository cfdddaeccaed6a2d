//! Vertex type for content-addressed DAGs.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::edge::Edge;
use super::hash::NodeHash;
use super::node::GraphNode;
use super::value::Value;
use crate::canonical::StructuralHasher;
use crate::error::{GraphError, Result};

/// Immutable, content-addressed node in a DAG.
///
/// A vertex's identity is its structural hash, a pure function of
/// `(label, parents, extra_hash)`. Two vertices with the same hash are the
/// same node everywhere: equality, ordering and map keys all go through the
/// hash. Parent edges are sorted by hash on construction, so the order they
/// are supplied in never affects identity.
///
/// Cloning is cheap; clones share one allocation. Parents are held by value,
/// so many vertices may share a parent.
#[derive(Clone)]
pub struct Vertex(Arc<VertexInner>);

struct VertexInner {
    label: Option<Value>,
    parents: Vec<Edge>,
    extra_hash: Option<Value>,
    hash: NodeHash,
}

/// Field overrides for [`Vertex::clone_with`].
///
/// Unset fields keep the original vertex's value.
#[derive(Debug, Clone, Default)]
pub struct VertexOverrides {
    label: Option<Option<Value>>,
    parents: Option<Vec<Edge>>,
    extra_hash: Option<Option<Value>>,
}

impl VertexOverrides {
    /// Replace the label.
    pub fn label(mut self, label: Option<Value>) -> Self {
        self.label = Some(label);
        self
    }

    /// Replace the parent edges.
    pub fn parents(mut self, parents: Vec<Edge>) -> Self {
        self.parents = Some(parents);
        self
    }

    /// Replace the extra hash.
    pub fn extra_hash(mut self, extra_hash: Option<Value>) -> Self {
        self.extra_hash = Some(extra_hash);
        self
    }
}

impl Vertex {
    /// Create a vertex.
    ///
    /// Fails with [`GraphError::DuplicateEdgeLabel`] if two parent edges carry
    /// the same label. Unlabeled edges never conflict.
    pub fn new(
        label: Option<Value>,
        parents: impl IntoIterator<Item = Edge>,
        extra_hash: Option<Value>,
    ) -> Result<Self> {
        let parents: Vec<Edge> = parents.into_iter().collect();

        let mut seen = HashSet::new();
        for edge in &parents {
            if let Some(edge_label) = edge.label() {
                if !seen.insert(edge_label.hash()) {
                    return Err(GraphError::DuplicateEdgeLabel {
                        label: edge_label.to_string(),
                        vertex: label
                            .as_ref()
                            .map_or_else(|| "<unlabeled>".to_string(), Value::to_string),
                    });
                }
            }
        }

        Ok(Self::from_validated(label, parents, extra_hash))
    }

    /// Create a vertex from untyped nodes.
    ///
    /// Fails with [`GraphError::TypeMismatch`] if any parent is not an edge.
    pub fn try_from_nodes(
        label: Option<Value>,
        parents: impl IntoIterator<Item = GraphNode>,
        extra_hash: Option<Value>,
    ) -> Result<Self> {
        let edges = parents
            .into_iter()
            .map(|node| match node {
                GraphNode::Edge(edge) => Ok(edge),
                other => Err(GraphError::TypeMismatch {
                    expected: "Edge",
                    found: other.to_string(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(label, edges, extra_hash)
    }

    /// Create a vertex with no label, parents or extra hash.
    pub fn leaf() -> Self {
        Self::from_validated(None, Vec::new(), None)
    }

    /// Create a parentless vertex with a label.
    pub fn labeled(label: impl Into<Value>) -> Self {
        Self::from_validated(Some(label.into()), Vec::new(), None)
    }

    /// Build a vertex whose parents are known not to conflict.
    pub(crate) fn from_validated(label: Option<Value>, mut parents: Vec<Edge>, extra_hash: Option<Value>) -> Self {
        parents.sort_by_key(|e| e.hash());

        let mut hasher = StructuralHasher::new();
        hasher.write_domain(b"vertex");
        hasher.write_optional(label.as_ref());
        hasher.write_len(parents.len());
        for parent in &parents {
            hasher.write_hash(parent.hash());
        }
        hasher.write_optional(extra_hash.as_ref());

        Self(Arc::new(VertexInner {
            label,
            parents,
            extra_hash,
            hash: hasher.finish(),
        }))
    }

    /// The caller-defined label.
    pub fn label(&self) -> Option<&Value> {
        self.0.label.as_ref()
    }

    /// Incoming edges, sorted by hash.
    pub fn parents(&self) -> &[Edge] {
        &self.0.parents
    }

    /// Extra identity payload.
    pub fn extra_hash(&self) -> Option<&Value> {
        self.0.extra_hash.as_ref()
    }

    /// Structural hash.
    pub fn hash(&self) -> NodeHash {
        self.0.hash
    }

    /// Truncated hex hash for diagnostics.
    pub fn short_hash(&self) -> String {
        self.0.hash.short()
    }

    /// Upstream vertex of each parent edge, in parent order.
    pub fn parent_vertices(&self) -> Vec<Vertex> {
        self.0.parents.iter().map(|e| e.parent().clone()).collect()
    }

    /// Create a new vertex with some fields replaced.
    pub fn clone_with(&self, overrides: VertexOverrides) -> Result<Self> {
        Self::new(
            overrides.label.unwrap_or_else(|| self.0.label.clone()),
            overrides.parents.unwrap_or_else(|| self.0.parents.clone()),
            overrides.extra_hash.unwrap_or_else(|| self.0.extra_hash.clone()),
        )
    }

    /// Create a copy of this vertex with new parent edges.
    ///
    /// Label and extra hash are kept, so this rebases the vertex onto a
    /// different upstream without touching its own payload.
    pub fn transplant(&self, new_parents: impl IntoIterator<Item = Edge>) -> Result<Self> {
        Self::new(self.0.label.clone(), new_parents, self.0.extra_hash.clone())
    }

    /// Create an unlabeled outgoing edge.
    pub fn edge(&self) -> Edge {
        Edge::new(None, self.clone(), None)
    }

    /// Create a labeled outgoing edge.
    pub fn edge_labeled(&self, label: impl Into<Value>) -> Edge {
        Edge::new(Some(label.into()), self.clone(), None)
    }

    /// Create a downstream vertex connected through an unlabeled edge.
    ///
    /// ```rust
    /// use dag_kernel::Vertex;
    ///
    /// // n1 -> n2 -> n3
    /// let n3 = Vertex::labeled("n1").vertex(Some("n2".into())).vertex(Some("n3".into()));
    /// assert_eq!(n3.parent_vertices()[0].label().and_then(|l| l.as_str()), Some("n2"));
    /// ```
    pub fn vertex(&self, label: Option<Value>) -> Vertex {
        self.edge().vertex(label)
    }

    /// Short representation: label plus truncated hash.
    ///
    /// `...` marks a vertex that also has parents or an extra hash.
    pub fn repr(&self, include_hash: bool) -> String {
        let mut args = Vec::new();
        if let Some(label) = &self.0.label {
            args.push(label.to_string());
        }
        if !self.0.parents.is_empty() || self.0.extra_hash.is_some() {
            args.push("...".to_string());
        }
        let base = format!("Vertex({})", args.join(", "));
        if include_hash {
            format!("{} <{}>", base, self.short_hash())
        } else {
            base
        }
    }

    /// Representation that lists parent edges one level deep.
    pub fn repr_with_parents(&self) -> String {
        let parents: Vec<String> = self.0.parents.iter().map(|e| e.repr(true)).collect();
        let mut args = Vec::new();
        if let Some(label) = &self.0.label {
            args.push(label.to_string());
        }
        args.push(format!("[{}]", parents.join(", ")));
        if self.0.extra_hash.is_some() {
            args.push("...".to_string());
        }
        format!("Vertex({}) <{}>", args.join(", "), self.short_hash())
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.0.hash == other.0.hash
    }
}

impl Eq for Vertex {}

impl std::hash::Hash for Vertex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash.raw());
    }
}

impl PartialOrd for Vertex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Vertex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.hash.cmp(&other.0.hash)
    }
}

impl fmt::Debug for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr(true))
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr(true))
    }
}
