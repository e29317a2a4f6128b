//! Error types for the deformation facade.

use thiserror::Error;
use vdeform_detail::DetailError;
use vdeform_mesh::MeshError;
use vdeform_solver::SolverError;

/// Errors that can occur while configuring or driving a [`Deformer`](crate::Deformer).
#[derive(Error, Debug)]
pub enum DeformError {
    /// No mesh has been set.
    #[error("no mesh has been set")]
    NoMesh,

    /// No handle vertices are selected.
    #[error("no handle vertices are selected")]
    NoConstraints,

    /// The handle assignment was made for a different vertex count.
    #[error("handle assignment covers {actual} vertices, mesh has {expected}")]
    AssignmentSizeMismatch {
        /// Vertex count of the mesh.
        expected: usize,
        /// Length of the assignment.
        actual: usize,
    },

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Mesh construction failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Factorization or solve failed.
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Detail extraction or reapplication failed.
    #[error(transparent)]
    Detail(DetailError),

    /// Configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<DetailError> for DeformError {
    fn from(err: DetailError) -> Self {
        match err {
            DetailError::Solver(e) => Self::Solver(e),
            other => Self::Detail(other),
        }
    }
}

/// Result type for deformation operations.
pub type Result<T> = std::result::Result<T, DeformError>;
