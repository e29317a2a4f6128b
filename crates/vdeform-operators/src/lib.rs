#![warn(missing_docs)]

//! Discrete differential operators for the vdeform solver.
//!
//! Everything here is assembled once per mesh (or once per handle set) and
//! stored as `nalgebra_sparse::CscMatrix`:
//!
//! - [`build_laplacian`]: cotangent or uniform Laplacian, positive
//!   semi-definite convention (`L_ii = Σ w_ij`, `L_ij = -w_ij`)
//! - [`build_mass_matrix`]: lumped barycentric or mixed Voronoi areas
//! - [`build_bilaplacian`]: `Lᵀ M⁻¹ L`, the thin-plate energy matrix
//! - [`build_gradient`]: per-face gradient of hat functions, used by the
//!   Poisson reconstruction
//!
//! Degenerate triangles never produce NaN or Inf entries: faces below
//! [`OperatorSettings::area_epsilon`] are skipped and cotangents are
//! clamped to [`OperatorSettings::cot_clamp`].
//!
//! # Example
//!
//! ```
//! use vdeform_mesh::primitives;
//! use vdeform_operators::{build_laplacian, OperatorSettings};
//!
//! let mesh = primitives::grid(4, 4, 1.0);
//! let l = build_laplacian(&mesh, &OperatorSettings::default());
//! assert_eq!(l.nrows(), 16);
//! ```

pub mod error;
pub mod gradient;
pub mod laplacian;
pub mod linalg;
pub mod mass;

pub use error::{OperatorError, Result};
pub use gradient::{build_gradient, GradientOperator};
pub use laplacian::{build_bilaplacian, build_laplacian, cotangent};
pub use mass::build_mass_matrix;

use serde::{Deserialize, Serialize};
use vdeform_math::Tolerance;

/// Edge weighting used by [`build_laplacian`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaplacianKind {
    /// `w_ij = ½ (cot α_ij + cot β_ij)`.
    #[default]
    Cotangent,
    /// `w_ij = 1` for every edge.
    Uniform,
}

/// Per-vertex area model used by [`build_mass_matrix`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassKind {
    /// One third of every incident face area.
    Barycentric,
    /// Mixed Voronoi areas, falling back to area fractions on obtuse faces.
    #[default]
    Voronoi,
}

/// Operator assembly parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorSettings {
    /// Laplacian edge weights.
    pub laplacian: LaplacianKind,
    /// Mass matrix model.
    pub mass: MassKind,
    /// Faces with a smaller area are treated as degenerate.
    pub area_epsilon: f64,
    /// Absolute bound on a single cotangent.
    pub cot_clamp: f64,
}

impl Default for OperatorSettings {
    fn default() -> Self {
        Self {
            laplacian: LaplacianKind::Cotangent,
            mass: MassKind::Voronoi,
            area_epsilon: Tolerance::DEFAULT.area,
            cot_clamp: 1e5,
        }
    }
}

impl OperatorSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.area_epsilon.is_finite() && self.area_epsilon > 0.0) {
            return Err(OperatorError::InvalidSettings(
                "area_epsilon must be positive and finite".into(),
            ));
        }
        if !(self.cot_clamp.is_finite() && self.cot_clamp > 0.0) {
            return Err(OperatorError::InvalidSettings(
                "cot_clamp must be positive and finite".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(OperatorSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_settings() {
        let bad_eps = OperatorSettings {
            area_epsilon: 0.0,
            ..Default::default()
        };
        assert!(bad_eps.validate().is_err());
        let bad_clamp = OperatorSettings {
            cot_clamp: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            bad_clamp.validate(),
            Err(OperatorError::InvalidSettings(_))
        ));
    }
}
