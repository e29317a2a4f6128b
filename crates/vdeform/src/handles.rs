//! Handle regions: which vertices are pinned, and how their targets move.

use tracing::debug;
use vdeform_math::{Point3, Transform};
use vdeform_mesh::Mesh;

/// Identifier of a handle region. Ids are handed out densely from 0.
pub type HandleId = usize;

/// Per-vertex handle membership.
///
/// The ascending list of assigned vertices ([`handle_vertices`]) defines the
/// order of handle target positions everywhere in the crate.
///
/// [`handle_vertices`]: HandleAssignment::handle_vertices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandleAssignment {
    ids: Vec<Option<HandleId>>,
}

impl HandleAssignment {
    /// Assignment for `vertex_count` vertices with no handles.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            ids: vec![None; vertex_count],
        }
    }

    /// Assignment from explicit per-vertex ids.
    pub fn from_ids(ids: Vec<Option<HandleId>>) -> Self {
        Self { ids }
    }

    /// Number of vertices covered.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// `true` if the assignment covers no vertices.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Per-vertex ids.
    pub fn ids(&self) -> &[Option<HandleId>] {
        &self.ids
    }

    /// Turn the unassigned vertices among `selection` into a new handle.
    ///
    /// The new id is one past the largest existing id. Vertices that already
    /// belong to a handle, or are out of range, are left alone. Returns
    /// `None` if nothing was claimed.
    pub fn assign(&mut self, selection: &[usize]) -> Option<HandleId> {
        let id = self.ids.iter().flatten().max().map_or(0, |m| m + 1);
        let mut claimed = 0usize;
        for &v in selection {
            if let Some(slot) = self.ids.get_mut(v) {
                if slot.is_none() {
                    *slot = Some(id);
                    claimed += 1;
                }
            }
        }
        debug!(handle = id, claimed, selected = selection.len(), "assigned handle");
        (claimed > 0).then_some(id)
    }

    /// Remove every handle.
    pub fn clear(&mut self) {
        self.ids.iter_mut().for_each(|id| *id = None);
    }

    /// Handle of vertex `v`, if any.
    pub fn handle_of(&self, v: usize) -> Option<HandleId> {
        self.ids.get(v).copied().flatten()
    }

    /// One past the largest handle id.
    pub fn handle_count(&self) -> usize {
        self.ids.iter().flatten().max().map_or(0, |m| m + 1)
    }

    /// Assigned vertices, ascending.
    pub fn handle_vertices(&self) -> Vec<usize> {
        self.ids
            .iter()
            .enumerate()
            .filter_map(|(v, id)| id.map(|_| v))
            .collect()
    }

    /// Handle vertex positions on `mesh`, in target order.
    pub fn rest_targets(&self, mesh: &Mesh) -> Vec<Point3> {
        self.handle_vertices()
            .into_iter()
            .filter_map(|v| mesh.positions().get(v).copied())
            .collect()
    }

    /// Centroid of each handle's targets, indexed by handle id.
    ///
    /// `targets` follows [`handle_vertices`](Self::handle_vertices) order.
    /// Ids without vertices get `None`.
    pub fn centroids(&self, targets: &[Point3]) -> Vec<Option<Point3>> {
        let count = self.handle_count();
        let mut sums = vec![(Point3::origin().coords, 0usize); count];
        for (v, target) in self.handle_vertices().into_iter().zip(targets) {
            if let Some(id) = self.handle_of(v) {
                sums[id].0 += target.coords;
                sums[id].1 += 1;
            }
        }
        sums.into_iter()
            .map(|(sum, n)| (n > 0).then(|| Point3::from(sum / n as f64)))
            .collect()
    }

    /// Apply `transform` to the targets of one handle, in place.
    ///
    /// Returns the number of targets moved.
    pub fn transform_handle(
        &self,
        handle: HandleId,
        targets: &mut [Point3],
        transform: &Transform,
    ) -> usize {
        let mut moved = 0;
        for (v, target) in self.handle_vertices().into_iter().zip(targets.iter_mut()) {
            if self.handle_of(v) == Some(handle) {
                *target = transform.apply_point(target);
                moved += 1;
            }
        }
        moved
    }
}
