//! Smooth base: minimal thin-plate energy under hard handle constraints.

use nalgebra::DMatrix;
use nalgebra_sparse::CscMatrix;
use tracing::debug;
use vdeform_math::Point3;
use vdeform_mesh::Mesh;
use vdeform_operators::linalg::{matrix_to_positions, positions_to_matrix};
use vdeform_operators::{build_bilaplacian, build_laplacian, build_mass_matrix, OperatorSettings};

use crate::{ConstrainedSystem, Result};

/// Bi-Laplacian solver for one mesh and one handle vertex set.
///
/// Construction assembles `Lᵀ M⁻¹ L` on the rest mesh and factors its free
/// block. Every [`solve`](Self::solve) afterwards is a pair of triangular
/// solves, so the original smooth base and every deformed smooth base go
/// through the same path with different targets.
#[derive(Debug)]
pub struct SmoothBaseSolver {
    bilaplacian: CscMatrix<f64>,
    system: ConstrainedSystem,
}

impl SmoothBaseSolver {
    /// Assemble and factor for `handles`. Targets passed to
    /// [`solve`](Self::solve) follow the order of `handles`.
    pub fn new(mesh: &Mesh, handles: &[usize], settings: &OperatorSettings) -> Result<Self> {
        settings.validate()?;
        let laplacian = build_laplacian(mesh, settings);
        let mass = build_mass_matrix(mesh, settings);
        let bilaplacian = build_bilaplacian(&laplacian, &mass);
        let system = ConstrainedSystem::factor(&bilaplacian, handles)?;
        debug!(
            vertices = mesh.num_vertices(),
            handles = handles.len(),
            nnz = bilaplacian.nnz(),
            "smooth base solver ready"
        );
        Ok(Self { bilaplacian, system })
    }

    /// Handle vertices in target order.
    pub fn handles(&self) -> &[usize] {
        self.system.fixed()
    }

    /// Smooth base positions with handles placed at `targets`.
    pub fn solve(&self, targets: &[Point3]) -> Result<Vec<Point3>> {
        let fixed = positions_to_matrix(targets);
        let x = self.system.solve(&fixed, None)?;
        Ok(matrix_to_positions(&x))
    }

    /// Thin-plate energy `tr(Xᵀ Q X)` of a position array.
    pub fn energy(&self, positions: &[Point3]) -> f64 {
        let x = positions_to_matrix(positions);
        let qx: DMatrix<f64> = &self.bilaplacian * &x;
        x.dot(&qx)
    }
}
