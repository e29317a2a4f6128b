//! Error types for constrained solves.

use thiserror::Error;
use vdeform_operators::OperatorError;

/// Errors that can occur while factoring or solving a constrained system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// No vertex is constrained, the system has no unique solution.
    #[error("at least one handle vertex is required")]
    NoConstraints,

    /// A handle index is outside the mesh.
    #[error("handle vertex {index} is out of bounds for {vertex_count} vertices")]
    HandleOutOfBounds {
        /// Offending vertex index.
        index: usize,
        /// Number of vertices in the system.
        vertex_count: usize,
    },

    /// The same vertex was listed as a handle twice.
    #[error("handle vertex {0} is listed more than once")]
    DuplicateHandle(usize),

    /// The number of target positions differs from the number of handles.
    #[error("expected {expected} handle targets, got {actual}")]
    TargetCountMismatch {
        /// Number of handle vertices.
        expected: usize,
        /// Number of targets supplied.
        actual: usize,
    },

    /// A per-face field does not have one 3-row block per face.
    #[error("expected a gradient field with {expected} rows, got {actual}")]
    GradientShapeMismatch {
        /// `3 * faces`.
        expected: usize,
        /// Rows supplied.
        actual: usize,
    },

    /// Cholesky factorization of the free block failed.
    #[error("factorization of the {free}×{free} free block failed: {reason}")]
    Factorization {
        /// Number of free variables.
        free: usize,
        /// Backend failure description.
        reason: String,
    },

    /// The solve produced NaN or Inf.
    #[error("solve produced a non-finite value at vertex {0}")]
    NonFiniteSolution(usize),

    /// Operator settings are invalid.
    #[error(transparent)]
    Operator(#[from] OperatorError),
}

/// Result type for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;
