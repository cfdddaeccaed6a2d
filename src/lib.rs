//! # dag-kernel
//!
//! Content-addressed DAGs: analysis, incremental folds and readiness
//! scheduling.
//!
//! ## Core Contract
//!
//! 1. Vertices and edges are immutable; identity is a structural hash of
//!    their fields, so equal content means the same node everywhere
//! 2. Analysis yields a deterministic topological order and child indexes,
//!    and fails on any reachable cycle
//! 3. Transforms fold caller functions bottom-up and can be seeded with a
//!    previous run's values to skip unchanged subgraphs
//! 4. The scheduler reports which vertices are runnable; running them is
//!    the caller's job
//!
//! ## Architecture
//!
//! ```text
//! Vertex/Edge (types) → analysis (order + child maps) → transform
//!                                                    ↘ scheduler
//! ```
//!
//! Any object graph works with [`analyze`] and [`transform`] given a parent
//! function; [`Vertex`] and [`Edge`] are one ready-made node model.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use dag_kernel::{transform_vertices, Scheduler, Vertex};
//!
//! let a = Vertex::labeled("a");
//! let b = a.vertex(Some("b".into()));
//! let c = b.vertex(Some("c".into()));
//!
//! let depth = transform_vertices(
//!     [c.clone()],
//!     |v: &Vertex| v.parent_vertices(),
//!     |_, parents: &[u32]| parents.iter().max().map_or(0, |d| d + 1),
//!     &HashMap::new(),
//! )
//! .unwrap();
//! assert_eq!(depth[&c], 2);
//!
//! let mut scheduler = Scheduler::new([c]).unwrap();
//! assert_eq!(scheduler.start(None), vec![a]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod canonical;
pub mod config;
pub mod digest;
pub mod error;
pub mod mapping;
pub mod scheduler;
pub mod telemetry;
pub mod transform;
pub mod types;

// Re-exports
pub use types::{Edge, EdgeOverrides, GraphNode, NodeHash, Value, Vertex, VertexOverrides, SHORT_HASH_LEN};
pub use error::{GraphError, Result, ScheduleError};
pub use analysis::{
    analyze, analyze_nodes, child_map, parent_map, toposort, Analysis, DagView, ParentSource,
};
pub use transform::{transform, transform_edges, transform_vertices, TransformOutput};
pub use mapping::{
    apply_mapping, apply_multi_mapping, invert_map, invert_multimap, MultiMap, Remapper,
};
pub use scheduler::{Scheduler, VertexState};
pub use config::{LogFormat, SchedulerConfig, TelemetryConfig};
pub use telemetry::{init_tracing, try_init_tracing};
pub use canonical::{canonical_hash, canonical_hash_hex, structural_hash, to_canonical_bytes};
pub use digest::{content_digest, text_digest};

/// Schema version for hashed node identity.
/// Increment whenever structural hash inputs change.
pub const DAG_KERNEL_SCHEMA_VERSION: &str = "1.0.0";
