//! Typed view over a vertex/edge DAG.
//!
//! Edges are graph nodes in their own right, so one traversal over
//! [`GraphNode`] yields a single order that alternates vertices and the
//! edges between them. The view splits that order by kind and keeps the two
//! child indexes the scheduler needs.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::toposort::analyze_nodes;
use crate::error::Result;
use crate::types::{Edge, GraphNode, Vertex};

/// Sorted vertex/edge sequence plus child indexes for one root set.
#[derive(Debug, Clone)]
pub struct DagView {
    roots: Vec<Vertex>,
    nodes: Vec<GraphNode>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    outgoing: BTreeMap<Vertex, Vec<Edge>>,
    dependents: BTreeMap<Edge, Vec<Vertex>>,
}

impl DagView {
    /// Analyze everything reachable from `roots`.
    pub fn from_roots(roots: impl IntoIterator<Item = Vertex>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        let roots: Vec<Vertex> = roots
            .into_iter()
            .filter(|v| seen.insert(v.hash()))
            .collect();

        let analysis = analyze_nodes(roots.iter().cloned().map(GraphNode::Vertex))?;

        let mut vertices = Vec::new();
        let mut edges = Vec::new();
        let mut outgoing: BTreeMap<Vertex, Vec<Edge>> = BTreeMap::new();
        let mut dependents: BTreeMap<Edge, Vec<Vertex>> = BTreeMap::new();

        for node in analysis.order() {
            let children = analysis.children_of(node);
            match node {
                GraphNode::Vertex(v) => {
                    vertices.push(v.clone());
                    let out = children.iter().filter_map(GraphNode::as_edge).cloned().collect();
                    outgoing.insert(v.clone(), out);
                }
                GraphNode::Edge(e) => {
                    edges.push(e.clone());
                    let deps = children.iter().filter_map(GraphNode::as_vertex).cloned().collect();
                    dependents.insert(e.clone(), deps);
                }
            }
        }

        debug!(
            roots = roots.len(),
            vertices = vertices.len(),
            edges = edges.len(),
            "dag view built"
        );

        Ok(Self {
            roots,
            nodes: analysis.into_order(),
            vertices,
            edges,
            outgoing,
            dependents,
        })
    }

    /// Distinct roots, in the order given.
    pub fn roots(&self) -> &[Vertex] {
        &self.roots
    }

    /// Vertices and edges in one topological order.
    pub fn sorted_nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Vertices in topological order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Edges in topological order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges leaving `vertex` that some reachable vertex consumes.
    pub fn outgoing_edges(&self, vertex: &Vertex) -> &[Edge] {
        self.outgoing.get(vertex).map_or(&[][..], Vec::as_slice)
    }

    /// Vertices that list `edge` among their parents.
    pub fn dependent_vertices(&self, edge: &Edge) -> &[Vertex] {
        self.dependents.get(edge).map_or(&[][..], Vec::as_slice)
    }

    /// Parent edges of `vertex`.
    pub fn incoming_edges<'a>(&self, vertex: &'a Vertex) -> &'a [Edge] {
        vertex.parents()
    }

    /// Vertices directly downstream of `vertex`, deduplicated.
    pub fn child_vertices(&self, vertex: &Vertex) -> Vec<Vertex> {
        let mut seen = BTreeSet::new();
        self.outgoing_edges(vertex)
            .iter()
            .flat_map(|e| self.dependent_vertices(e))
            .filter(|v| seen.insert(v.hash()))
            .cloned()
            .collect()
    }

    /// Vertex to outgoing edges index.
    pub fn outgoing_map(&self) -> &BTreeMap<Vertex, Vec<Edge>> {
        &self.outgoing
    }

    /// Edge to dependent vertices index.
    pub fn dependent_map(&self) -> &BTreeMap<Edge, Vec<Vertex>> {
        &self.dependents
    }

    /// Whether `vertex` is part of this DAG.
    pub fn contains_vertex(&self, vertex: &Vertex) -> bool {
        self.outgoing.contains_key(vertex)
    }

    /// Number of distinct vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
