#![warn(missing_docs)]

//! Multiresolution mesh deformation with handle constraints.
//!
//! A [`Deformer`] owns a triangle mesh and a [`HandleAssignment`]. Selecting
//! handles splits the mesh into a smooth base, the minimizer of thin-plate
//! energy with the handles pinned, and the detail the base lacks. Moving the
//! handle targets re-solves the base with a cached factorization and puts
//! the detail back, either as local-frame displacements or by deformation
//! transfer and a Poisson solve.
//!
//! # Example
//!
//! ```
//! use vdeform::{primitives, DeformConfig, Deformer, HandleAssignment, ViewMode};
//!
//! let mesh = primitives::tube(8, 12, 4.0, 0.5);
//! let mut deformer = Deformer::with_mesh(mesh, DeformConfig::default()).unwrap();
//!
//! let mut handles = HandleAssignment::new(96);
//! handles.assign(&(0..12).collect::<Vec<_>>());
//! handles.assign(&(84..96).collect::<Vec<_>>());
//! deformer.update_handle_vertex_selection(&handles).unwrap();
//!
//! let targets = deformer.rest_targets().unwrap().to_vec();
//! let positions = deformer.solve(ViewMode::Deformed, &targets).unwrap();
//! assert_eq!(positions.len(), 96);
//! ```

pub use vdeform_detail;
pub use vdeform_math;
pub use vdeform_mesh;
pub use vdeform_operators;
pub use vdeform_solver;

pub mod config;
pub mod deformer;
pub mod error;
pub mod handles;

pub use config::DeformConfig;
pub use deformer::{Deformer, ViewMode};
pub use error::{DeformError, Result};
pub use handles::{HandleAssignment, HandleId};

pub use vdeform_detail::DetailMode;
pub use vdeform_math::{Point3, Rotation, Transform, Vec3};
pub use vdeform_mesh::{primitives, Mesh};
pub use vdeform_operators::{LaplacianKind, MassKind, OperatorSettings};
