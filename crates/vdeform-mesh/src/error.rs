//! Error types for mesh construction.

use thiserror::Error;

/// Errors that can occur while building a [`Mesh`](crate::Mesh).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Mesh has no vertices or no faces.
    #[error("mesh is empty ({vertices} vertices, {faces} faces)")]
    Empty {
        /// Number of vertices supplied.
        vertices: usize,
        /// Number of faces supplied.
        faces: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfBounds {
        /// Face index.
        face: usize,
        /// Offending vertex index.
        index: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face uses the same vertex more than once.
    #[error("face {face} repeats vertex {index}")]
    RepeatedIndex {
        /// Face index.
        face: usize,
        /// Repeated vertex index.
        index: usize,
    },

    /// A vertex position contains NaN or Inf.
    #[error("vertex {0} has a non-finite position")]
    NonFinite(usize),

    /// Replacement positions do not match the mesh vertex count.
    #[error("expected {expected} vertex positions, got {actual}")]
    VertexCountMismatch {
        /// Vertex count of the mesh.
        expected: usize,
        /// Number of positions supplied.
        actual: usize,
    },
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
