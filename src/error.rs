//! Error types for graph construction, analysis and scheduling.
//!
//! Every error here is fatal to the operation that raised it. Nodes are
//! immutable, so a failed construction or analysis never leaves a partially
//! modified graph behind.

/// Errors raised while building, analyzing or transforming a graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A parent handed to a constructor is not of the expected node kind.
    #[error("Expected {expected} instance; got {found}")]
    TypeMismatch {
        /// Node kind the constructor accepts.
        expected: &'static str,
        /// Representation of the rejected node.
        found: String,
    },

    /// Traversal re-entered a node that is still being visited.
    #[error("Graph is not a DAG; recursively encountered {node}")]
    GraphCycle {
        /// Representation of the node that closed the cycle.
        node: String,
    },

    /// Two incoming edges of one vertex carry the same label.
    #[error("Duplicate incoming edge label {label} on vertex {vertex}")]
    DuplicateEdgeLabel {
        /// The repeated label.
        label: String,
        /// Label of the vertex being built.
        vertex: String,
    },

    /// Several old keys collapse onto one new key and no merge function was given.
    #[error("Multiple keys map to {key}; a merge function is required to resolve the conflict")]
    AmbiguousMapping {
        /// The new key that received more than one old key.
        key: String,
    },

    /// A parent value was not available when its child was computed.
    #[error("Parent {parent} of {node} has no computed value")]
    MissingParentValue {
        /// The node being computed.
        node: String,
        /// The parent whose value is missing.
        parent: String,
    },
}

/// Errors raised when a driver breaks the scheduler's start/finish protocol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The vertex does not belong to the scheduled DAG.
    #[error("Vertex {0} is not part of this schedule")]
    UnknownVertex(String),

    /// `finish` was called for a vertex that was never started.
    #[error("Vertex {0} was never started")]
    NotStarted(String),

    /// `finish` was called twice for the same vertex.
    #[error("Vertex {0} is already finished")]
    AlreadyFinished(String),
}

/// Result alias for graph operations.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;
