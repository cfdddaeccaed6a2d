//! Core node types: vertices, edges, payload values and hashes.

pub mod hash;
pub mod value;
pub mod vertex;
pub mod edge;
pub mod node;

pub use hash::{NodeHash, SHORT_HASH_LEN};
pub use value::Value;
pub use vertex::{Vertex, VertexOverrides};
pub use edge::{Edge, EdgeOverrides};
pub use node::GraphNode;
