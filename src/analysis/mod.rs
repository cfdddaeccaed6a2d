//! Graph analysis: topological order, cycle detection, child indexes.
//!
//! [`analyze`] works over any node type with a caller-supplied parent
//! function. [`DagView`] specializes it to the typed vertex/edge model.

pub mod dag;
pub mod toposort;

pub use dag::DagView;
pub use toposort::{
    analyze, analyze_nodes, child_map, parent_map, toposort, Analysis, ParentSource,
};
