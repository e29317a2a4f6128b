//! Deformation transfer of per-face detail.
//!
//! Each face gets a frame matrix `[e1, e2, n/√|n|]` (the scaled normal acts
//! as a fourth vertex). The map carrying the smooth face onto the original
//! face, `C_f = S_f⁻¹ O_f`, is cached. To reapply, the map is composed with
//! the deformed smooth face, giving a target face `T_f = S'_f C_f` and a
//! target deformation `A_f = T_f O_f⁻¹` of the original surface. The
//! per-face `A_fᵀ` blocks form a gradient field that the Poisson solver
//! integrates back to positions.

use nalgebra::DMatrix;
use tracing::{debug, warn};
use vdeform_math::{Mat3, Point3, Tolerance, Vec3};
use vdeform_mesh::{triangle_of, Mesh};
use vdeform_solver::PoissonSolver;

use crate::{check_len, Result};

/// Edge-and-normal frame of a triangle, or `None` if it is degenerate.
pub fn face_frame(corners: [Point3; 3], tol: &Tolerance) -> Option<Mat3> {
    let [a, b, c] = corners;
    let (e1, e2) = (b - a, c - a);
    let n = e1.cross(&e2);
    let len = n.norm();
    if !(0.5 * len >= tol.area) {
        return None;
    }
    Some(Mat3::from_columns(&[e1, e2, n / len.sqrt()]))
}

/// Per-face maps from the smooth base to the original surface.
#[derive(Debug, Clone)]
pub struct TransferDetail {
    vertex_count: usize,
    faces: Vec<[usize; 3]>,
    /// `O_f⁻¹`; `None` for degenerate original faces.
    original_inverse: Vec<Option<Mat3>>,
    /// `S_f⁻¹ O_f`; identity where the smooth face is degenerate.
    maps: Vec<Mat3>,
    tolerance: Tolerance,
}

impl TransferDetail {
    /// Cache `S_f⁻¹ O_f` for every face of `mesh` against `smooth`.
    pub fn extract(mesh: &Mesh, smooth: &[Point3]) -> Result<Self> {
        check_len(mesh.num_vertices(), smooth.len())?;
        let tol = Tolerance::DEFAULT;
        let mut singular = 0usize;

        let mut original_inverse = Vec::with_capacity(mesh.num_faces());
        let mut maps = Vec::with_capacity(mesh.num_faces());
        for &face in mesh.faces() {
            let original = face_frame(triangle_of(mesh.positions(), face), &tol);
            let smooth_inv = face_frame(triangle_of(smooth, face), &tol).and_then(|s| s.try_inverse());
            let map = match (smooth_inv, original) {
                (Some(s_inv), Some(o)) => s_inv * o,
                _ => {
                    singular += 1;
                    Mat3::identity()
                }
            };
            original_inverse.push(original.and_then(|o| o.try_inverse()));
            maps.push(map);
        }

        if singular > 0 {
            warn!(singular, "degenerate faces carry an identity detail map");
        }
        debug!(faces = maps.len(), "extracted deformation transfer detail");
        Ok(Self {
            vertex_count: mesh.num_vertices(),
            faces: mesh.faces().to_vec(),
            original_inverse,
            maps,
            tolerance: tol,
        })
    }

    /// Number of faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Cached `S_f⁻¹ O_f` of face `fi`.
    pub fn map(&self, fi: usize) -> &Mat3 {
        &self.maps[fi]
    }

    /// Target deformation gradients `A_fᵀ`, stacked as a `3F × 3` field.
    ///
    /// Faces that are degenerate on the original mesh get a zero block;
    /// they carry no area in the reconstruction.
    pub fn target_gradients(&self, deformed_smooth: &[Point3]) -> Result<DMatrix<f64>> {
        check_len(self.vertex_count, deformed_smooth.len())?;
        let mut g = DMatrix::zeros(3 * self.faces.len(), 3);
        for (fi, &face) in self.faces.iter().enumerate() {
            let Some(o_inv) = self.original_inverse[fi] else {
                continue;
            };
            let [a, b, c] = triangle_of(deformed_smooth, face);
            let (e1, e2) = (b - a, c - a);
            let n = e1.cross(&e2);
            // A collapsed face keeps its edges; only the normal column vanishes
            let len = n.norm();
            let normal = if 0.5 * len >= self.tolerance.area {
                n / len.sqrt()
            } else {
                Vec3::zeros()
            };
            let s = Mat3::from_columns(&[e1, e2, normal]);
            let deformation = s * self.maps[fi] * o_inv;
            g.fixed_view_mut::<3, 3>(3 * fi, 0)
                .copy_from(&deformation.transpose());
        }
        Ok(g)
    }

    /// Transfer the detail onto `deformed_smooth` and reconstruct positions
    /// with the handles of `poisson` at `targets`.
    pub fn apply(
        &self,
        deformed_smooth: &[Point3],
        poisson: &PoissonSolver,
        targets: &[Point3],
    ) -> Result<Vec<Point3>> {
        let g = self.target_gradients(deformed_smooth)?;
        Ok(poisson.reconstruct(&g, targets)?)
    }
}
