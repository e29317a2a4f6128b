//! The deformation orchestrator.

use tracing::{debug, info, instrument};
use vdeform_detail::{DetailMode, DisplacementDetail, TransferDetail};
use vdeform_math::Point3;
use vdeform_mesh::Mesh;
use vdeform_solver::{PoissonSolver, SmoothBaseSolver, SolverError};

use crate::{DeformConfig, DeformError, HandleAssignment, Result};

/// Which surface [`Deformer::solve`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// The input mesh, untouched.
    Original,
    /// Smooth base with handles at their rest positions.
    Smooth,
    /// Smooth base with handles at the given targets.
    DeformedSmooth,
    /// Deformed smooth base plus detail, using the configured detail mode.
    #[default]
    Deformed,
}

/// Everything derived from one handle vertex set.
#[derive(Debug)]
struct Selection {
    handle_vertices: Vec<usize>,
    rest_targets: Vec<Point3>,
    smooth_solver: SmoothBaseSolver,
    poisson: PoissonSolver,
    smooth: Vec<Point3>,
    displacement: DisplacementDetail,
    transfer: TransferDetail,
}

impl Selection {
    fn build(mesh: &Mesh, handle_vertices: Vec<usize>, config: &DeformConfig) -> Result<Self> {
        let rest_targets: Vec<Point3> = handle_vertices.iter().map(|&v| mesh.positions()[v]).collect();
        let smooth_solver = SmoothBaseSolver::new(mesh, &handle_vertices, &config.operators)?;
        let smooth = smooth_solver.solve(&rest_targets)?;
        let displacement = DisplacementDetail::extract(mesh, &smooth)?;
        let transfer = TransferDetail::extract(mesh, &smooth)?;
        let poisson = PoissonSolver::new(mesh, &handle_vertices, &config.operators)?;
        Ok(Self {
            handle_vertices,
            rest_targets,
            smooth_solver,
            poisson,
            smooth,
            displacement,
            transfer,
        })
    }
}

/// Multiresolution deformation state for one mesh.
///
/// ```
/// use vdeform::{primitives, DeformConfig, Deformer, HandleAssignment, Transform, Vec3};
///
/// let mesh = primitives::grid(4, 4, 1.0);
/// let mut deformer = Deformer::with_mesh(mesh, DeformConfig::default()).unwrap();
///
/// let mut handles = HandleAssignment::new(16);
/// handles.assign(&[0, 4, 8, 12]);
/// let right = handles.assign(&[3, 7, 11, 15]).unwrap();
/// deformer.update_handle_vertex_selection(&handles).unwrap();
///
/// let mut targets = deformer.rest_targets().unwrap().to_vec();
/// let lift = Transform::translation(Vec3::new(0.0, 0.0, 1.0));
/// handles.transform_handle(right, &mut targets, &lift);
///
/// let deformed = deformer.get_deformed_mesh(&targets).unwrap();
/// assert_eq!(deformed[15].z, 1.0);
/// ```
#[derive(Debug)]
pub struct Deformer {
    config: DeformConfig,
    mesh: Option<Mesh>,
    handles: HandleAssignment,
    selection: Option<Selection>,
}

impl Deformer {
    // =========================================================================
    // Setup
    // =========================================================================

    /// Create a deformer without a mesh.
    pub fn new(config: DeformConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            mesh: None,
            handles: HandleAssignment::default(),
            selection: None,
        })
    }

    /// Create a deformer and set its mesh.
    pub fn with_mesh(mesh: Mesh, config: DeformConfig) -> Result<Self> {
        let mut deformer = Self::new(config)?;
        deformer.set_initial_mesh(mesh);
        Ok(deformer)
    }

    /// Replace the mesh. Clears the handle assignment and all cached solves.
    pub fn set_initial_mesh(&mut self, mesh: Mesh) {
        debug!(vertices = mesh.num_vertices(), faces = mesh.num_faces(), "mesh set");
        self.handles = HandleAssignment::new(mesh.num_vertices());
        self.selection = None;
        self.mesh = Some(mesh);
    }

    /// Adopt a new handle assignment.
    ///
    /// Builds the smooth base solver, the rest smooth base, both detail
    /// representations and the Poisson solver. If the handle vertex set is
    /// unchanged the cached factorizations are kept. On error the previous
    /// assignment and caches remain in effect.
    #[instrument(level = "info", skip_all, fields(vertices = assignment.len()))]
    pub fn update_handle_vertex_selection(&mut self, assignment: &HandleAssignment) -> Result<()> {
        let mesh = self.mesh.as_ref().ok_or(DeformError::NoMesh)?;
        if assignment.len() != mesh.num_vertices() {
            return Err(DeformError::AssignmentSizeMismatch {
                expected: mesh.num_vertices(),
                actual: assignment.len(),
            });
        }
        let handle_vertices = assignment.handle_vertices();
        if handle_vertices.is_empty() {
            return Err(DeformError::NoConstraints);
        }

        if let Some(selection) = &self.selection {
            if selection.handle_vertices == handle_vertices {
                debug!(handles = handle_vertices.len(), "handle set unchanged, reusing factorizations");
                self.handles = assignment.clone();
                return Ok(());
            }
        }

        let selection = Selection::build(mesh, handle_vertices, &self.config)?;
        info!(
            handles = assignment.handle_count(),
            handle_vertices = selection.handle_vertices.len(),
            "handle selection updated"
        );
        self.handles = assignment.clone();
        self.selection = Some(selection);
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Active configuration.
    pub fn config(&self) -> &DeformConfig {
        &self.config
    }

    /// Current mesh, if set.
    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Current handle assignment.
    pub fn handle_assignment(&self) -> &HandleAssignment {
        &self.handles
    }

    /// Handle vertices of the active selection, in target order.
    pub fn handle_vertices(&self) -> Result<&[usize]> {
        Ok(&self.selection()?.handle_vertices)
    }

    /// Rest positions of the handle vertices, in target order.
    pub fn rest_targets(&self) -> Result<&[Point3]> {
        Ok(&self.selection()?.rest_targets)
    }

    /// Centroid of each handle for the given targets, indexed by handle id.
    pub fn handle_centroids(&self, targets: &[Point3]) -> Result<Vec<Option<Point3>>> {
        self.check_targets(targets)?;
        Ok(self.handles.centroids(targets))
    }

    fn selection(&self) -> Result<&Selection> {
        if self.mesh.is_none() {
            return Err(DeformError::NoMesh);
        }
        self.selection.as_ref().ok_or(DeformError::NoConstraints)
    }

    fn check_targets(&self, targets: &[Point3]) -> Result<()> {
        let expected = self.selection()?.handle_vertices.len();
        if targets.len() != expected {
            return Err(SolverError::TargetCountMismatch {
                expected,
                actual: targets.len(),
            }
            .into());
        }
        Ok(())
    }

    // =========================================================================
    // Solves
    // =========================================================================

    /// Smooth base with handles at rest.
    pub fn get_smooth_mesh(&self) -> Result<&[Point3]> {
        Ok(&self.selection()?.smooth)
    }

    /// Smooth base with handles at `targets`.
    pub fn get_deformed_smooth_mesh(&self, targets: &[Point3]) -> Result<Vec<Point3>> {
        let selection = self.selection()?;
        Ok(selection.smooth_solver.solve(targets)?)
    }

    /// Deformed smooth base plus local-frame displacement detail.
    pub fn get_deformed_mesh(&self, targets: &[Point3]) -> Result<Vec<Point3>> {
        let selection = self.selection()?;
        let smooth = selection.smooth_solver.solve(targets)?;
        Ok(selection.displacement.apply(&smooth)?)
    }

    /// Deformed smooth base with detail carried over by deformation transfer.
    pub fn get_deformed_mesh_deformation_transfer(&self, targets: &[Point3]) -> Result<Vec<Point3>> {
        let selection = self.selection()?;
        let smooth = selection.smooth_solver.solve(targets)?;
        Ok(selection.transfer.apply(&smooth, &selection.poisson, targets)?)
    }

    /// Positions for a view mode. `targets` is ignored by
    /// [`ViewMode::Original`] and [`ViewMode::Smooth`].
    pub fn solve(&self, view: ViewMode, targets: &[Point3]) -> Result<Vec<Point3>> {
        match view {
            ViewMode::Original => {
                let mesh = self.mesh.as_ref().ok_or(DeformError::NoMesh)?;
                Ok(mesh.positions().to_vec())
            }
            ViewMode::Smooth => Ok(self.get_smooth_mesh()?.to_vec()),
            ViewMode::DeformedSmooth => self.get_deformed_smooth_mesh(targets),
            ViewMode::Deformed => match self.config.detail {
                DetailMode::Displacement => self.get_deformed_mesh(targets),
                DetailMode::DeformationTransfer => self.get_deformed_mesh_deformation_transfer(targets),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vdeform_mesh::primitives;

    fn grid_deformer() -> (Deformer, HandleAssignment) {
        let mesh = primitives::grid(5, 5, 0.25);
        let deformer = Deformer::with_mesh(mesh, DeformConfig::default()).unwrap();
        let mut handles = HandleAssignment::new(25);
        handles.assign(&[0, 5, 10, 15, 20]);
        handles.assign(&[4, 9, 14, 19, 24]);
        (deformer, handles)
    }

    #[test]
    fn test_queries_before_setup() {
        let deformer = Deformer::new(DeformConfig::default()).unwrap();
        assert!(matches!(deformer.get_smooth_mesh(), Err(DeformError::NoMesh)));
        assert!(matches!(deformer.solve(ViewMode::Original, &[]), Err(DeformError::NoMesh)));

        let (deformer, _) = grid_deformer();
        assert!(matches!(deformer.get_smooth_mesh(), Err(DeformError::NoConstraints)));
        assert_eq!(deformer.solve(ViewMode::Original, &[]).unwrap().len(), 25);
    }

    #[test]
    fn test_update_validates_assignment() {
        let (mut deformer, _) = grid_deformer();
        assert!(matches!(
            deformer.update_handle_vertex_selection(&HandleAssignment::new(25)),
            Err(DeformError::NoConstraints)
        ));
        assert!(matches!(
            deformer.update_handle_vertex_selection(&HandleAssignment::new(3)),
            Err(DeformError::AssignmentSizeMismatch {
                expected: 25,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_rest_targets_give_original_mesh() {
        let (mut deformer, handles) = grid_deformer();
        deformer.update_handle_vertex_selection(&handles).unwrap();
        let rest = deformer.rest_targets().unwrap().to_vec();
        let original = deformer.mesh().unwrap().positions().to_vec();
        for out in [
            deformer.get_deformed_mesh(&rest).unwrap(),
            deformer.get_deformed_mesh_deformation_transfer(&rest).unwrap(),
        ] {
            for (a, b) in out.iter().zip(&original) {
                assert_relative_eq!(*a, *b, epsilon = 1e-8);
            }
        }
        assert_eq!(
            deformer.get_deformed_smooth_mesh(&rest).unwrap(),
            deformer.get_smooth_mesh().unwrap()
        );
    }

    #[test]
    fn test_target_count_mismatch() {
        let (mut deformer, handles) = grid_deformer();
        deformer.update_handle_vertex_selection(&handles).unwrap();
        let short = vec![Point3::origin(); 3];
        for view in [ViewMode::DeformedSmooth, ViewMode::Deformed] {
            assert!(matches!(
                deformer.solve(view, &short),
                Err(DeformError::Solver(SolverError::TargetCountMismatch {
                    expected: 10,
                    actual: 3
                }))
            ));
        }
        assert!(matches!(
            deformer.get_deformed_mesh_deformation_transfer(&short),
            Err(DeformError::Solver(SolverError::TargetCountMismatch { .. }))
        ));
        assert!(deformer.handle_centroids(&short).is_err());
    }

    #[test]
    fn test_failed_update_keeps_previous_state() {
        let (mut deformer, handles) = grid_deformer();
        deformer.update_handle_vertex_selection(&handles).unwrap();
        let before = deformer.get_smooth_mesh().unwrap().to_vec();

        assert!(deformer
            .update_handle_vertex_selection(&HandleAssignment::new(25))
            .is_err());
        assert_eq!(deformer.handle_assignment(), &handles);
        assert_eq!(deformer.get_smooth_mesh().unwrap(), &before[..]);
    }

    #[test]
    fn test_reselecting_same_vertices_keeps_results() {
        let (mut deformer, handles) = grid_deformer();
        deformer.update_handle_vertex_selection(&handles).unwrap();
        let mut targets = deformer.rest_targets().unwrap().to_vec();
        for t in &mut targets[5..] {
            t.z += 0.5;
        }
        let first = deformer.get_deformed_mesh(&targets).unwrap();

        // Same vertices, split into different handle ids
        let mut regrouped = HandleAssignment::new(25);
        regrouped.assign(&[0, 5, 10, 15, 20, 4, 9]);
        regrouped.assign(&[14, 19, 24]);
        deformer.update_handle_vertex_selection(&regrouped).unwrap();
        assert_eq!(deformer.handle_assignment(), &regrouped);
        assert_eq!(deformer.get_deformed_mesh(&targets).unwrap(), first);
    }

    #[test]
    fn test_set_initial_mesh_resets() {
        let (mut deformer, handles) = grid_deformer();
        deformer.update_handle_vertex_selection(&handles).unwrap();
        deformer.set_initial_mesh(primitives::unit_cube());
        assert!(deformer.handle_assignment().handle_vertices().is_empty());
        assert_eq!(deformer.handle_assignment().len(), 8);
        assert!(matches!(deformer.get_smooth_mesh(), Err(DeformError::NoConstraints)));
    }

    #[test]
    fn test_view_modes_dispatch() {
        let mesh = primitives::grid(5, 5, 0.25);
        let config = DeformConfig {
            detail: DetailMode::DeformationTransfer,
            ..Default::default()
        };
        let mut deformer = Deformer::with_mesh(mesh, config).unwrap();
        let (_, handles) = grid_deformer();
        deformer.update_handle_vertex_selection(&handles).unwrap();
        let mut targets = deformer.rest_targets().unwrap().to_vec();
        targets[9].y += 0.3;

        assert_eq!(
            deformer.solve(ViewMode::Deformed, &targets).unwrap(),
            deformer.get_deformed_mesh_deformation_transfer(&targets).unwrap()
        );
        assert_eq!(
            deformer.solve(ViewMode::DeformedSmooth, &targets).unwrap(),
            deformer.get_deformed_smooth_mesh(&targets).unwrap()
        );
        assert_eq!(
            deformer.solve(ViewMode::Smooth, &[]).unwrap(),
            deformer.get_smooth_mesh().unwrap()
        );
    }
}
