//! Per-face gradient operator for piecewise-linear vertex functions.
//!
//! Row `3f + d` of the matrix holds the `d`-th component of the gradient of
//! every hat function on face `f`. Applying it to a `V × 3` coordinate
//! matrix yields, per face, a `3 × 3` block whose column `c` is the gradient
//! of coordinate `c`, i.e. the transposed face Jacobian.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CscMatrix};
use tracing::{debug, warn};
use vdeform_mesh::Mesh;

use crate::linalg::scale_rows;
use crate::OperatorSettings;

/// Sparse gradient matrix plus the face areas it was built with.
#[derive(Debug, Clone)]
pub struct GradientOperator {
    matrix: CscMatrix<f64>,
    transpose: CscMatrix<f64>,
    areas: Vec<f64>,
}

/// Build the `3F × V` gradient operator of `mesh`.
///
/// Degenerate faces (area below `settings.area_epsilon`) get zero rows and
/// a zero area, so they drop out of every weighted product.
pub fn build_gradient(mesh: &Mesh, settings: &OperatorSettings) -> GradientOperator {
    let p = mesh.positions();
    let nf = mesh.num_faces();
    let mut coo = CooMatrix::new(3 * nf, mesh.num_vertices());
    let mut areas = vec![0.0; nf];
    let mut skipped = 0usize;

    for (fi, &face) in mesh.faces().iter().enumerate() {
        let [i, j, k] = face;
        let n = (p[j] - p[i]).cross(&(p[k] - p[i]));
        let double_area = n.norm();
        if !(0.5 * double_area >= settings.area_epsilon) {
            skipped += 1;
            continue;
        }
        areas[fi] = 0.5 * double_area;
        let unit = n / double_area;
        // ∇φ_v = n̂ × (opposite edge, counter-clockwise) / 2A
        let opposite = [(i, p[k] - p[j]), (j, p[i] - p[k]), (k, p[j] - p[i])];
        for (v, edge) in opposite {
            let g = unit.cross(&edge) / double_area;
            for d in 0..3 {
                coo.push(3 * fi + d, v, g[d]);
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, "degenerate faces have zero gradient rows");
    }
    let matrix = CscMatrix::from(&coo);
    debug!(faces = nf, nnz = matrix.nnz(), "assembled gradient operator");
    let transpose = matrix.transpose();
    GradientOperator {
        matrix,
        transpose,
        areas,
    }
}

impl GradientOperator {
    /// The `3F × V` sparse matrix.
    pub fn matrix(&self) -> &CscMatrix<f64> {
        &self.matrix
    }

    /// Face areas; zero for degenerate faces.
    pub fn face_areas(&self) -> &[f64] {
        &self.areas
    }

    /// Number of faces.
    pub fn num_faces(&self) -> usize {
        self.areas.len()
    }

    /// Face areas repeated once per gradient row.
    fn row_weights(&self) -> DVector<f64> {
        DVector::from_fn(3 * self.areas.len(), |r, _| self.areas[r / 3])
    }

    /// `G x` for a `V × c` field.
    pub fn apply(&self, field: &DMatrix<f64>) -> DMatrix<f64> {
        &self.matrix * field
    }

    /// Area-weighted divergence `Gᵀ A g` of a `3F × c` face field.
    pub fn divergence(&self, gradients: &DMatrix<f64>) -> DMatrix<f64> {
        let mut weighted = gradients.clone();
        for (r, mut row) in weighted.row_iter_mut().enumerate() {
            row *= self.areas[r / 3];
        }
        &self.transpose * &weighted
    }

    /// Poisson stiffness `Gᵀ A G`.
    ///
    /// Coincides with the cotangent Laplacian of the same mesh.
    pub fn stiffness(&self) -> CscMatrix<f64> {
        let weighted = scale_rows(&self.matrix, &self.row_weights());
        &self.transpose * &weighted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_laplacian;
    use crate::linalg::{dense, positions_to_matrix};
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;
    use vdeform_math::Point3;
    use vdeform_mesh::primitives;

    fn face_block(g: &DMatrix<f64>, fi: usize) -> Matrix3<f64> {
        Matrix3::from_fn(|r, c| g[(3 * fi + r, c)])
    }

    #[test]
    fn test_hat_gradients_on_unit_triangle() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let g = dense(build_gradient(&mesh, &OperatorSettings::default()).matrix());
        // φ0 = 1 - x - y, φ1 = x, φ2 = y
        assert_relative_eq!(g[(0, 0)], -1.0, epsilon = 1e-12);
        assert_relative_eq!(g[(1, 0)], -1.0, epsilon = 1e-12);
        assert_relative_eq!(g[(0, 1)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(g[(1, 2)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(g[(2, 0)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_of_linear_map_is_constant() {
        let mesh = primitives::uv_sphere(1.0, 5, 8);
        let op = build_gradient(&mesh, &OperatorSettings::default());
        let a = Matrix3::new(1.0, 2.0, 0.0, 0.0, 1.0, -1.0, 0.5, 0.0, 3.0);
        let mapped: Vec<Point3> = mesh.positions().iter().map(|p| Point3::from(a * p.coords)).collect();
        let g = op.apply(&positions_to_matrix(&mapped));
        let normals = mesh.face_area_vectors();
        for fi in 0..mesh.num_faces() {
            let n = normals[fi].normalize();
            // Tangential part of the transposed Jacobian matches the map
            let block = face_block(&g, fi);
            let [p0, p1, p2] = mesh.triangle(fi);
            for e in [p1 - p0, p2 - p0] {
                assert_relative_eq!(block.transpose() * e, a * e, epsilon = 1e-10);
            }
            assert_relative_eq!((block.transpose() * n).norm(), 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_constant_field_has_zero_gradient() {
        let mesh = primitives::tube(3, 6, 1.0, 0.5);
        let op = build_gradient(&mesh, &OperatorSettings::default());
        let ones = DMatrix::from_element(mesh.num_vertices(), 3, 2.5);
        assert!(op.apply(&ones).amax() < 1e-12);
    }

    #[test]
    fn test_stiffness_matches_cotangent_laplacian() {
        let settings = OperatorSettings::default();
        for mesh in [primitives::uv_sphere(1.0, 6, 7), primitives::grid(4, 3, 0.5)] {
            let k = dense(&build_gradient(&mesh, &settings).stiffness());
            let l = dense(&build_laplacian(&mesh, &settings));
            assert_relative_eq!(k, l, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_divergence_of_gradient_is_stiffness() {
        let mesh = primitives::grid(4, 4, 1.0);
        let op = build_gradient(&mesh, &OperatorSettings::default());
        let x = DMatrix::from_fn(mesh.num_vertices(), 1, |i, _| (i as f64 * 0.37).sin());
        let lhs = op.divergence(&op.apply(&x));
        let rhs = dense(&op.stiffness()) * &x;
        assert_relative_eq!(lhs, rhs, epsilon = 1e-10);
    }

    #[test]
    fn test_degenerate_face_has_zero_rows() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 3, 1]],
        )
        .unwrap();
        let op = build_gradient(&mesh, &OperatorSettings::default());
        assert_eq!(op.face_areas()[1], 0.0);
        let g = dense(op.matrix());
        assert!(g.iter().all(|v| v.is_finite()));
        assert!(g.rows(3, 3).iter().all(|&v| v == 0.0));
    }
}
