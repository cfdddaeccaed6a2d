//! Generic topological analysis over any object graph.
//!
//! ## Algorithm
//!
//! Depth-first traversal from each root with an explicit stack and three
//! marks per node: unvisited, in progress, done.
//!
//! 1. Visiting an unvisited node marks it in progress, asks the parent
//!    function for its parents once, and descends into them in order.
//! 2. Reaching a node that is still in progress means the walk came back to
//!    one of its own ancestors: the graph has a cycle and analysis fails.
//! 3. Reaching a done node is a no-op.
//! 4. When all parents of a node are done, the node is marked done and
//!    appended to the order (post-order), so parents always precede
//!    children.
//!
//! Roots are visited in the order given; repeated roots and shared
//! ancestors still appear exactly once. Work is O(V + E).

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::error::{GraphError, Result};
use crate::types::{Edge, GraphNode, Vertex};

/// Something that can list its own immediate parents.
///
/// Implement this for an existing object graph to analyze it without
/// converting to [`Vertex`]/[`Edge`]. A closure passed to [`analyze`]
/// works just as well.
pub trait ParentSource: Sized {
    /// Immediate parents of this node.
    fn parent_nodes(&self) -> Vec<Self>;
}

impl ParentSource for Vertex {
    fn parent_nodes(&self) -> Vec<Self> {
        self.parent_vertices()
    }
}

/// Edges chain through their upstream vertex: an edge's parents are the
/// edges feeding the vertex it leaves.
impl ParentSource for Edge {
    fn parent_nodes(&self) -> Vec<Self> {
        self.parent().parents().to_vec()
    }
}

impl ParentSource for GraphNode {
    fn parent_nodes(&self) -> Vec<Self> {
        self.parents()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Frame<T> {
    node: T,
    parents: Vec<T>,
    next: usize,
}

/// Result of analyzing the graph reachable from a root set.
#[derive(Debug, Clone)]
pub struct Analysis<T: Eq + Hash> {
    order: Vec<T>,
    parents: HashMap<T, Vec<T>>,
    children: HashMap<T, Vec<T>>,
}

impl<T: Clone + Eq + Hash> Analysis<T> {
    /// Nodes in topological order: every node follows all of its parents.
    pub fn order(&self) -> &[T] {
        &self.order
    }

    /// Consume the analysis and keep only the order.
    pub fn into_order(self) -> Vec<T> {
        self.order
    }

    /// Parents of a node as reported by the parent function.
    pub fn parents_of(&self, node: &T) -> &[T] {
        self.parents.get(node).map_or(&[][..], Vec::as_slice)
    }

    /// Nodes that list `node` as an immediate parent, in topological order.
    pub fn children_of(&self, node: &T) -> &[T] {
        self.children.get(node).map_or(&[][..], Vec::as_slice)
    }

    /// Node to parents map.
    pub fn parent_map(&self) -> &HashMap<T, Vec<T>> {
        &self.parents
    }

    /// Node to children map. Every visited node has an entry.
    pub fn child_map(&self) -> &HashMap<T, Vec<T>> {
        &self.children
    }

    /// Whether `node` was reached from the roots.
    pub fn contains(&self, node: &T) -> bool {
        self.parents.contains_key(node)
    }

    /// Number of distinct nodes reached.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing was reached.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Analyze the graph reachable from `roots`.
///
/// `parent_fn` is called exactly once per reachable node. Fails with
/// [`GraphError::GraphCycle`] if a cycle is reachable from any root.
pub fn analyze<T, I, F, P>(roots: I, mut parent_fn: F) -> Result<Analysis<T>>
where
    T: Clone + Eq + Hash + Debug,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> P,
    P: IntoIterator<Item = T>,
{
    let mut marks: HashMap<T, Mark> = HashMap::new();
    let mut order: Vec<T> = Vec::new();
    let mut parents: HashMap<T, Vec<T>> = HashMap::new();
    let mut stack: Vec<Frame<T>> = Vec::new();

    for root in roots {
        if marks.contains_key(&root) {
            continue;
        }

        let root_parents: Vec<T> = parent_fn(&root).into_iter().collect();
        marks.insert(root.clone(), Mark::InProgress);
        stack.push(Frame {
            node: root,
            parents: root_parents,
            next: 0,
        });

        while let Some(frame) = stack.last_mut() {
            if let Some(parent) = frame.parents.get(frame.next).cloned() {
                frame.next += 1;

                match marks.get(&parent).copied() {
                    Some(Mark::Done) => {}
                    Some(Mark::InProgress) => {
                        debug!(node = ?parent, "cycle detected during analysis");
                        return Err(GraphError::GraphCycle {
                            node: format!("{parent:?}"),
                        });
                    }
                    None => {
                        let grandparents: Vec<T> = parent_fn(&parent).into_iter().collect();
                        marks.insert(parent.clone(), Mark::InProgress);
                        stack.push(Frame {
                            node: parent,
                            parents: grandparents,
                            next: 0,
                        });
                    }
                }
            } else if let Some(done) = stack.pop() {
                trace!(node = ?done.node, depth = stack.len(), "node complete");
                marks.insert(done.node.clone(), Mark::Done);
                parents.insert(done.node.clone(), done.parents);
                order.push(done.node);
            }
        }
    }

    let mut children: HashMap<T, Vec<T>> = HashMap::with_capacity(order.len());
    for node in &order {
        children.entry(node.clone()).or_default();
        for parent in parents.get(node).map_or(&[][..], Vec::as_slice) {
            let list = children.entry(parent.clone()).or_default();
            // Repeated parents of one node are pushed back to back.
            if list.last() != Some(node) {
                list.push(node.clone());
            }
        }
    }

    debug!(nodes = order.len(), "graph analysis complete");

    Ok(Analysis {
        order,
        parents,
        children,
    })
}

/// Analyze a graph of [`ParentSource`] nodes.
pub fn analyze_nodes<T, I>(roots: I) -> Result<Analysis<T>>
where
    T: ParentSource + Clone + Eq + Hash + Debug,
    I: IntoIterator<Item = T>,
{
    analyze(roots, T::parent_nodes)
}

/// Topological order of everything reachable from `roots`.
pub fn toposort<T, I, F, P>(roots: I, parent_fn: F) -> Result<Vec<T>>
where
    T: Clone + Eq + Hash + Debug,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> P,
    P: IntoIterator<Item = T>,
{
    analyze(roots, parent_fn).map(Analysis::into_order)
}

/// Node to immediate parents, for everything reachable from `roots`.
pub fn parent_map<T, I, F, P>(roots: I, parent_fn: F) -> Result<HashMap<T, Vec<T>>>
where
    T: Clone + Eq + Hash + Debug,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> P,
    P: IntoIterator<Item = T>,
{
    analyze(roots, parent_fn).map(|a| a.parents)
}

/// Node to immediate children, for everything reachable from `roots`.
pub fn child_map<T, I, F, P>(roots: I, parent_fn: F) -> Result<HashMap<T, Vec<T>>>
where
    T: Clone + Eq + Hash + Debug,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> P,
    P: IntoIterator<Item = T>,
{
    analyze(roots, parent_fn).map(|a| a.children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(edges: &[(&'static str, &'static [&'static str])]) -> HashMap<&'static str, Vec<&'static str>> {
        edges.iter().map(|(k, v)| (*k, v.to_vec())).collect()
    }

    fn position<T: PartialEq>(order: &[T], node: &T) -> usize {
        order.iter().position(|n| n == node).expect("node in order")
    }

    #[test]
    fn test_empty_roots() {
        let order = toposort(Vec::<&str>::new(), |_| Vec::new()).unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn test_chain() {
        let g = deps(&[("c", &["b"]), ("b", &["a"]), ("a", &[])]);
        let order = toposort(["c"], |n| g[n].clone()).unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parents_precede_children() {
        let g = deps(&[
            ("v4", &["v3"]),
            ("v5", &["v3"]),
            ("v6", &["v5"]),
            ("v7", &["v5"]),
            ("v9", &["v4", "v6", "v7"]),
            ("v10", &["v3", "v8"]),
            ("v3", &[]),
            ("v8", &[]),
            ("v11", &[]),
        ]);
        let analysis = analyze(["v4", "v9", "v10", "v11"], |n| g[n].clone()).unwrap();
        let order = analysis.order();

        assert_eq!(order.len(), 9);
        for (child, parents) in &g {
            for parent in parents {
                assert!(position(order, parent) < position(order, child));
            }
        }
    }

    #[test]
    fn test_shared_parents_and_repeated_roots_appear_once() {
        let g = deps(&[("l", &["r"]), ("m", &["r"]), ("r", &[])]);
        let order = toposort(["l", "m", "l", "r"], |n| g[n].clone()).unwrap();
        assert_eq!(order, vec!["r", "l", "m"]);
    }

    #[test]
    fn test_parent_fn_called_once_per_node() {
        let g = deps(&[("d", &["b", "c"]), ("b", &["a"]), ("c", &["a"]), ("a", &[])]);
        let mut calls: HashMap<&str, usize> = HashMap::new();
        analyze(["d", "b"], |n| {
            *calls.entry(*n).or_default() += 1;
            g[n].clone()
        })
        .unwrap();
        assert_eq!(calls.len(), 4);
        assert!(calls.values().all(|&c| c == 1));
    }

    #[test]
    fn test_cycle_detected() {
        let g = deps(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        let err = toposort(["a"], |n| g[n].clone()).unwrap_err();
        assert!(matches!(err, GraphError::GraphCycle { .. }));
    }

    #[test]
    fn test_self_loop_detected() {
        let err = toposort(["a"], |n| vec![*n]).unwrap_err();
        assert_eq!(
            err,
            GraphError::GraphCycle {
                node: "\"a\"".to_string()
            }
        );
    }

    #[test]
    fn test_cycle_behind_acyclic_root() {
        let g = deps(&[("ok", &[]), ("x", &["y"]), ("y", &["x"])]);
        assert!(toposort(["ok", "x"], |n| g[n].clone()).is_err());
    }

    #[test]
    fn test_child_and_parent_maps() {
        let g = deps(&[("d", &["b", "c"]), ("b", &["a"]), ("c", &["a", "a"]), ("a", &[])]);
        let analysis = analyze(["d"], |n| g[n].clone()).unwrap();

        let mut a_children = analysis.children_of(&"a").to_vec();
        a_children.sort_unstable();
        assert_eq!(a_children, vec!["b", "c"]);
        assert!(analysis.children_of(&"d").is_empty());
        assert_eq!(analysis.parents_of(&"d"), &["b", "c"]);
        assert!(analysis.contains(&"a"));
        assert!(!analysis.contains(&"z"));

        let children = child_map(["d"], |n| g[n].clone()).unwrap();
        assert_eq!(children.len(), 4);
        let parents = parent_map(["d"], |n| g[n].clone()).unwrap();
        assert_eq!(parents[&"c"], vec!["a", "a"]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let order = toposort([100_000u32], |n| if *n == 0 { vec![] } else { vec![n - 1] }).unwrap();
        assert_eq!(order.len(), 100_001);
        assert_eq!(order[0], 0);
    }

    #[test]
    fn test_analyze_vertices() {
        let v1 = Vertex::labeled("v1");
        let v2 = v1.vertex(Some("v2".into()));
        let order = analyze_nodes([v2.clone()]).unwrap().into_order();
        assert_eq!(order, vec![v1, v2]);
    }
}
