#![warn(missing_docs)]

//! Detail separation for multiresolution editing.
//!
//! The detail of a mesh is what its smooth base lacks. It is extracted once
//! against the original smooth base and reapplied to any deformed smooth
//! base with the same topology:
//!
//! - [`DisplacementDetail`]: one offset per vertex, stored in a local frame
//!   of the smooth base so it turns with the surface
//! - [`TransferDetail`]: one 3×3 map per face, transplanted onto the
//!   deformed base and integrated back to positions by a Poisson solve

pub mod displacement;
pub mod error;
pub mod transfer;

pub use displacement::DisplacementDetail;
pub use error::{DetailError, Result};
pub use transfer::TransferDetail;

use serde::{Deserialize, Serialize};

/// How detail is put back on a deformed smooth base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailMode {
    /// Per-vertex local-frame displacements.
    #[default]
    Displacement,
    /// Per-face deformation transfer plus Poisson reconstruction.
    DeformationTransfer,
}

pub(crate) fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(DetailError::PositionCountMismatch { expected, actual });
    }
    Ok(())
}
