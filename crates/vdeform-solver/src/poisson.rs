//! Poisson reconstruction of vertex positions from per-face gradients.
//!
//! Given a target gradient field `g` (one `3 × 3` block per face), finds the
//! positions `x` minimizing `Σ_f A_f |(G x)_f - g_f|²` with handle vertices
//! held at their targets. The normal equations are `Gᵀ A G x = Gᵀ A g`,
//! whose matrix only depends on the rest mesh, so it is factored once.

use nalgebra::DMatrix;
use tracing::debug;
use vdeform_math::Point3;
use vdeform_mesh::Mesh;
use vdeform_operators::linalg::{matrix_to_positions, positions_to_matrix};
use vdeform_operators::{build_gradient, GradientOperator, OperatorSettings};

use crate::{ConstrainedSystem, Result, SolverError};

/// Gradient-domain solver on a fixed mesh and handle set.
#[derive(Debug)]
pub struct PoissonSolver {
    gradient: GradientOperator,
    system: ConstrainedSystem,
}

impl PoissonSolver {
    /// Build the gradient operator of `mesh` and factor `Gᵀ A G` with
    /// `handles` fixed.
    pub fn new(mesh: &Mesh, handles: &[usize], settings: &OperatorSettings) -> Result<Self> {
        settings.validate()?;
        let gradient = build_gradient(mesh, settings);
        let system = ConstrainedSystem::factor(&gradient.stiffness(), handles)?;
        debug!(faces = gradient.num_faces(), handles = handles.len(), "poisson solver ready");
        Ok(Self { gradient, system })
    }

    /// The rest-mesh gradient operator.
    pub fn gradient(&self) -> &GradientOperator {
        &self.gradient
    }

    /// Handle vertices in target order.
    pub fn handles(&self) -> &[usize] {
        self.system.fixed()
    }

    fn check_shape(&self, gradients: &DMatrix<f64>) -> Result<()> {
        let expected = 3 * self.gradient.num_faces();
        if gradients.nrows() != expected || gradients.ncols() != 3 {
            return Err(SolverError::GradientShapeMismatch {
                expected,
                actual: gradients.nrows(),
            });
        }
        Ok(())
    }

    /// Positions whose gradients best match `gradients` in the area-weighted
    /// least-squares sense, with handles placed at `targets`.
    pub fn reconstruct(&self, gradients: &DMatrix<f64>, targets: &[Point3]) -> Result<Vec<Point3>> {
        self.check_shape(gradients)?;
        let rhs = self.gradient.divergence(gradients);
        let x = self.system.solve(&positions_to_matrix(targets), Some(&rhs))?;
        Ok(matrix_to_positions(&x))
    }

    /// `G x - g` for a candidate position array.
    pub fn residual_gradient(&self, positions: &[Point3], gradients: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.check_shape(gradients)?;
        Ok(self.gradient.apply(&positions_to_matrix(positions)) - gradients)
    }
}
