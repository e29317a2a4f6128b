//! Lumped (diagonal) mass matrices.

use nalgebra::DVector;
use tracing::debug;
use vdeform_mesh::Mesh;

use crate::{MassKind, OperatorSettings};

/// Per-vertex area weights, the diagonal of the lumped mass matrix.
///
/// Every entry is at least `settings.area_epsilon`, so `M⁻¹` is always
/// finite. On a mesh without degenerate faces the entries sum to the total
/// surface area.
pub fn build_mass_matrix(mesh: &Mesh, settings: &OperatorSettings) -> DVector<f64> {
    let p = mesh.positions();
    let mut mass = DVector::<f64>::zeros(mesh.num_vertices());

    for &[i, j, k] in mesh.faces() {
        let (e_ij, e_jk, e_ki) = (p[j] - p[i], p[k] - p[j], p[i] - p[k]);
        let area = 0.5 * e_ij.cross(&(-e_ki)).norm();
        if !(area >= settings.area_epsilon) {
            continue;
        }

        match settings.mass {
            MassKind::Barycentric => {
                for v in [i, j, k] {
                    mass[v] += area / 3.0;
                }
            }
            MassKind::Voronoi => {
                // Corner dot products; negative means the corner is obtuse
                let dots = [-e_ki.dot(&e_ij), -e_ij.dot(&e_jk), -e_jk.dot(&e_ki)];
                let corners = [i, j, k];
                if let Some(obtuse) = dots.iter().position(|&d| d < 0.0) {
                    for (c, &v) in corners.iter().enumerate() {
                        mass[v] += if c == obtuse { area / 2.0 } else { area / 4.0 };
                    }
                } else {
                    let two_area = 2.0 * area;
                    let cot = dots.map(|d| d / two_area);
                    let sq = [e_jk.norm_squared(), e_ki.norm_squared(), e_ij.norm_squared()];
                    // Each edge contributes |e|² cot(opposite) / 8 to both endpoints
                    mass[j] += sq[0] * cot[0] / 8.0;
                    mass[k] += sq[0] * cot[0] / 8.0;
                    mass[k] += sq[1] * cot[1] / 8.0;
                    mass[i] += sq[1] * cot[1] / 8.0;
                    mass[i] += sq[2] * cot[2] / 8.0;
                    mass[j] += sq[2] * cot[2] / 8.0;
                }
            }
        }
    }

    for m in mass.iter_mut() {
        *m = m.max(settings.area_epsilon);
    }
    debug!(vertices = mass.len(), total = mass.sum(), kind = ?settings.mass, "assembled mass matrix");
    mass
}
