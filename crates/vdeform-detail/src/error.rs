//! Error types for detail extraction and reapplication.

use thiserror::Error;
use vdeform_solver::SolverError;

/// Errors that can occur while extracting or reapplying detail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetailError {
    /// A position array does not match the mesh it belongs to.
    #[error("expected {expected} positions, got {actual}")]
    PositionCountMismatch {
        /// Vertex count of the mesh.
        expected: usize,
        /// Number of positions supplied.
        actual: usize,
    },

    /// The Poisson reconstruction failed.
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Result type for detail operations.
pub type Result<T> = std::result::Result<T, DetailError>;
