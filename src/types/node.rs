//! Untyped node wrapper used by the unified vertex/edge traversal.

use std::fmt;

use super::edge::Edge;
use super::hash::NodeHash;
use super::vertex::Vertex;

/// Either a vertex or an edge.
///
/// In the edge model an edge is a graph node in its own right: a vertex's
/// parents are edges and an edge's single parent is a vertex. The analyzer
/// walks this alternating sequence in one pass.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphNode {
    /// A vertex.
    Vertex(Vertex),
    /// An edge.
    Edge(Edge),
}

impl GraphNode {
    /// Structural hash of the wrapped node.
    pub fn hash(&self) -> NodeHash {
        match self {
            Self::Vertex(v) => v.hash(),
            Self::Edge(e) => e.hash(),
        }
    }

    /// Node kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vertex(_) => "Vertex",
            Self::Edge(_) => "Edge",
        }
    }

    /// Immediate parents: a vertex's edges, or an edge's upstream vertex.
    pub fn parents(&self) -> Vec<GraphNode> {
        match self {
            Self::Vertex(v) => v.parents().iter().cloned().map(Self::Edge).collect(),
            Self::Edge(e) => vec![Self::Vertex(e.parent().clone())],
        }
    }

    /// Borrow the vertex, if this is one.
    pub fn as_vertex(&self) -> Option<&Vertex> {
        match self {
            Self::Vertex(v) => Some(v),
            Self::Edge(_) => None,
        }
    }

    /// Borrow the edge, if this is one.
    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Self::Edge(e) => Some(e),
            Self::Vertex(_) => None,
        }
    }
}

impl From<Vertex> for GraphNode {
    fn from(v: Vertex) -> Self {
        Self::Vertex(v)
    }
}

impl From<Edge> for GraphNode {
    fn from(e: Edge) -> Self {
        Self::Edge(e)
    }
}

impl fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex(v) => fmt::Debug::fmt(v, f),
            Self::Edge(e) => fmt::Debug::fmt(e, f),
        }
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
