//! Error types for halfmesh.
//!
//! This module defines all error types used throughout the library. A flip
//! that cannot be applied is not an error; see
//! [`FlipOutcome`](crate::mesh::FlipOutcome).

use thiserror::Error;

use crate::data::ElementKind;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A handle does not resolve to a live record.
    #[error("invalid {kind} handle {index}")]
    InvalidHandle {
        /// What the handle addresses: `"node"`, `"halfedge"`, `"face"` or `"data"`.
        kind: &'static str,
        /// The raw index carried by the handle.
        index: usize,
    },

    /// An attached payload does not have one entry per element.
    #[error("payload for {kind} data has {actual} entries, mesh has {expected}")]
    SizeMismatch {
        /// The element kind the payload was attached to.
        kind: ElementKind,
        /// Current element count of that kind.
        expected: usize,
        /// Length of the payload.
        actual: usize,
    },

    /// A payload was fetched as a different type than it was attached as.
    #[error("data was attached as {stored}, fetched as {requested}")]
    TypeMismatch {
        /// Type name recorded at attach time.
        stored: &'static str,
        /// Type name requested by the caller.
        requested: &'static str,
    },

    /// Walking `next` from a half-edge never came back to it.
    #[error("next links starting at half-edge {start} do not form a cycle")]
    OpenCycle {
        /// Index of the half-edge the walk started from.
        start: usize,
    },

    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references a node index outside the node range.
    #[error("face {face} references invalid node index {node}")]
    InvalidNodeIndex {
        /// The face index.
        face: usize,
        /// The invalid node index.
        node: usize,
    },

    /// A face has fewer than three nodes or repeats a node.
    #[error("face {face} is degenerate")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A directed edge is used by more than one face.
    #[error("edge ({n0}, {n1}) is used by more than one face in the same direction")]
    NonManifoldEdge {
        /// First node of the edge.
        n0: usize,
        /// Second node of the edge.
        n1: usize,
    },

    /// A node is where two boundary loops touch.
    #[error("node {node} joins more than one boundary loop")]
    NonManifoldVertex {
        /// The node index.
        node: usize,
    },

    /// An arena is full for the chosen index type.
    #[error("cannot add another {kind}: index type holds at most {limit}")]
    CapacityExceeded {
        /// What was being added: `"node"`, `"halfedge"` or `"face"`.
        kind: &'static str,
        /// Largest number of elements of that kind.
        limit: usize,
    },

    /// A triangle query was made on a face with a different edge count.
    #[error("face {face} has {edges} edges, expected a triangle")]
    NotTriangle {
        /// The face index.
        face: usize,
        /// Edge count of the face.
        edges: usize,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),
}

impl MeshError {
    /// Create an invalid handle error.
    pub fn invalid_handle(kind: &'static str, index: usize) -> Self {
        MeshError::InvalidHandle { kind, index }
    }

    /// Check if this error reports an unresolvable handle.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, MeshError::InvalidHandle { .. })
    }
}
