//! Cotangent and uniform Laplacians, and the bi-Laplacian energy matrix.

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use tracing::{debug, warn};
use vdeform_math::Vec3;
use vdeform_mesh::Mesh;

use crate::linalg::scale_rows;
use crate::{LaplacianKind, OperatorSettings};

/// Cotangent of the angle between `a` and `b`, clamped to `±clamp`.
///
/// A vanishing cross product (collinear edges) yields `±clamp` instead of
/// an infinity.
pub fn cotangent(a: &Vec3, b: &Vec3, clamp: f64) -> f64 {
    let sin = a.cross(b).norm();
    let cos = a.dot(b);
    if sin <= f64::MIN_POSITIVE {
        return if cos >= 0.0 { clamp } else { -clamp };
    }
    (cos / sin).clamp(-clamp, clamp)
}

/// Half-cotangent weights of the edges opposite each corner of a face.
///
/// Returns `[w_jk, w_ki, w_ij]` for face `(i, j, k)`, or `None` if the
/// face is degenerate.
pub(crate) fn face_cotangent_weights(
    mesh: &Mesh,
    face: [usize; 3],
    settings: &OperatorSettings,
) -> Option<[f64; 3]> {
    let p = mesh.positions();
    let [i, j, k] = face;
    let area = 0.5 * (p[j] - p[i]).cross(&(p[k] - p[i])).norm();
    if !(area >= settings.area_epsilon) {
        return None;
    }
    let c = settings.cot_clamp;
    let cot_i = cotangent(&(p[j] - p[i]), &(p[k] - p[i]), c);
    let cot_j = cotangent(&(p[k] - p[j]), &(p[i] - p[j]), c);
    let cot_k = cotangent(&(p[i] - p[k]), &(p[j] - p[k]), c);
    Some([0.5 * cot_i, 0.5 * cot_j, 0.5 * cot_k])
}

fn push_edge(coo: &mut CooMatrix<f64>, a: usize, b: usize, w: f64) {
    coo.push(a, b, -w);
    coo.push(b, a, -w);
    coo.push(a, a, w);
    coo.push(b, b, w);
}

/// Build the `V × V` Laplacian of `mesh`.
///
/// The result is symmetric with zero row sums. With cotangent weights it is
/// positive semi-definite for any non-degenerate mesh; boundary edges only
/// receive the cotangent of their single incident interior angle.
pub fn build_laplacian(mesh: &Mesh, settings: &OperatorSettings) -> CscMatrix<f64> {
    let n = mesh.num_vertices();
    let mut coo = CooMatrix::new(n, n);

    match settings.laplacian {
        LaplacianKind::Cotangent => {
            let mut skipped = 0usize;
            for &face in mesh.faces() {
                let Some([w_jk, w_ki, w_ij]) = face_cotangent_weights(mesh, face, settings) else {
                    skipped += 1;
                    continue;
                };
                let [i, j, k] = face;
                push_edge(&mut coo, j, k, w_jk);
                push_edge(&mut coo, k, i, w_ki);
                push_edge(&mut coo, i, j, w_ij);
            }
            if skipped > 0 {
                warn!(skipped, "degenerate faces left out of the cotangent Laplacian");
            }
        }
        LaplacianKind::Uniform => {
            for &(a, b) in mesh.edge_face_counts().keys() {
                push_edge(&mut coo, a, b, 1.0);
            }
        }
    }

    let l = CscMatrix::from(&coo);
    debug!(vertices = n, nnz = l.nnz(), kind = ?settings.laplacian, "assembled Laplacian");
    l
}

/// Thin-plate energy matrix `Lᵀ M⁻¹ L` from a Laplacian and a diagonal mass.
pub fn build_bilaplacian(laplacian: &CscMatrix<f64>, mass: &DVector<f64>) -> CscMatrix<f64> {
    let inv_mass = mass.map(|m| 1.0 / m);
    let scaled = scale_rows(laplacian, &inv_mass);
    let lt = laplacian.transpose();
    &lt * &scaled
}
