//! Edge type for content-addressed DAGs.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::hash::NodeHash;
use super::node::GraphNode;
use super::value::Value;
use super::vertex::Vertex;
use crate::canonical::StructuralHasher;
use crate::error::{GraphError, Result};

/// Immutable connection from one upstream vertex to a downstream consumer.
///
/// The downstream vertex is whichever vertex lists this edge among its
/// parents; it is not stored here. Identity is a pure function of
/// `(label, upstream vertex hash, extra_hash)`, and the label is what tells
/// apart several edges leaving the same upstream vertex.
#[derive(Clone)]
pub struct Edge(Arc<EdgeInner>);

struct EdgeInner {
    label: Option<Value>,
    parent: Vertex,
    extra_hash: Option<Value>,
    hash: NodeHash,
}

/// Field overrides for [`Edge::clone_with`].
#[derive(Debug, Clone, Default)]
pub struct EdgeOverrides {
    label: Option<Option<Value>>,
    parent: Option<Vertex>,
    extra_hash: Option<Option<Value>>,
}

impl EdgeOverrides {
    /// Replace the label.
    pub fn label(mut self, label: Option<Value>) -> Self {
        self.label = Some(label);
        self
    }

    /// Replace the upstream vertex.
    pub fn parent(mut self, parent: Vertex) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Replace the extra hash.
    pub fn extra_hash(mut self, extra_hash: Option<Value>) -> Self {
        self.extra_hash = Some(extra_hash);
        self
    }
}

impl Edge {
    /// Create an edge leaving `parent`.
    pub fn new(label: Option<Value>, parent: Vertex, extra_hash: Option<Value>) -> Self {
        let mut hasher = StructuralHasher::new();
        hasher.write_domain(b"edge");
        hasher.write_optional(label.as_ref());
        hasher.write_hash(parent.hash());
        hasher.write_optional(extra_hash.as_ref());

        Self(Arc::new(EdgeInner {
            label,
            parent,
            extra_hash,
            hash: hasher.finish(),
        }))
    }

    /// Create an edge from an untyped upstream node.
    ///
    /// Fails with [`GraphError::TypeMismatch`] if `parent` is not a vertex.
    pub fn try_from_node(
        label: Option<Value>,
        parent: GraphNode,
        extra_hash: Option<Value>,
    ) -> Result<Self> {
        match parent {
            GraphNode::Vertex(vertex) => Ok(Self::new(label, vertex, extra_hash)),
            other => Err(GraphError::TypeMismatch {
                expected: "Vertex",
                found: other.to_string(),
            }),
        }
    }

    /// The edge label.
    pub fn label(&self) -> Option<&Value> {
        self.0.label.as_ref()
    }

    /// The upstream vertex.
    pub fn parent(&self) -> &Vertex {
        &self.0.parent
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

    /// Create a new edge with some fields replaced.
    pub fn clone_with(&self, overrides: EdgeOverrides) -> Self {
        Self::new(
            overrides.label.unwrap_or_else(|| self.0.label.clone()),
            overrides.parent.unwrap_or_else(|| self.0.parent.clone()),
            overrides.extra_hash.unwrap_or_else(|| self.0.extra_hash.clone()),
        )
    }

    /// Create a copy of this edge leaving a different upstream vertex.
    pub fn transplant(&self, new_parent: Vertex) -> Self {
        Self::new(self.0.label.clone(), new_parent, self.0.extra_hash.clone())
    }

    /// Create the downstream vertex fed only by this edge.
    pub fn vertex(&self, label: Option<Value>) -> Vertex {
        Vertex::from_validated(label, vec![self.clone()], None)
    }

    /// Short representation: label plus truncated hash.
    pub fn repr(&self, include_hash: bool) -> String {
        let mut args = Vec::new();
        if let Some(label) = &self.0.label {
            args.push(label.to_string());
        }
        args.push("...".to_string());
        let base = format!("Edge({})", args.join(", "));
        if include_hash {
            format!("{} <{}>", base, self.short_hash())
        } else {
            base
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.0.hash == other.0.hash
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash.raw());
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.hash.cmp(&other.0.hash)
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr(true))
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr(true))
    }
}
