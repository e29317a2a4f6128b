#![warn(missing_docs)]

//! Sparse linear solves for the vdeform pipeline.
//!
//! - [`ConstrainedSystem`]: symmetric system with hard-fixed variables and a
//!   cached Cholesky factorization of the free block
//! - [`SmoothBaseSolver`]: bi-Laplacian smooth base under handle constraints
//! - [`PoissonSolver`]: positions from a per-face gradient field
//!
//! Factorizations depend only on the rest mesh and the handle vertex set.
//! Moving handle targets never refactors.

pub mod error;
pub mod poisson;
pub mod smooth;
pub mod system;

pub use error::{Result, SolverError};
pub use poisson::PoissonSolver;
pub use smooth::SmoothBaseSolver;
pub use system::ConstrainedSystem;
