//! Displacement detail in rotating local frames.

use tracing::{debug, warn};
use vdeform_math::{Frame, Point3, Tolerance, Vec3};
use vdeform_mesh::{vertex_normals, Mesh};

use crate::{check_len, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
struct VertexDetail {
    /// Neighbor whose edge fixes the tangent direction, if a frame exists.
    anchor: Option<usize>,
    /// Offset in `(tangent, bitangent, normal)` coordinates.
    local: Vec3,
    /// Offset in world coordinates, used when no frame can be built.
    world: Vec3,
}

/// Per-vertex offsets from the smooth base to the original surface.
#[derive(Debug, Clone)]
pub struct DisplacementDetail {
    faces: Vec<[usize; 3]>,
    vertices: Vec<VertexDetail>,
    tolerance: Tolerance,
}

fn frame_at(
    positions: &[Point3],
    normals: &[Vec3],
    v: usize,
    anchor: usize,
    tol: &Tolerance,
) -> Option<Frame> {
    Frame::from_normal_and_hint(&normals[v], &(positions[anchor] - positions[v]), tol)
}

impl DisplacementDetail {
    /// Record `mesh - smooth` for every vertex.
    ///
    /// The tangent anchor of each vertex is the neighbor whose edge has the
    /// longest projection onto the smooth tangent plane, which keeps the
    /// frame well conditioned.
    pub fn extract(mesh: &Mesh, smooth: &[Point3]) -> Result<Self> {
        check_len(mesh.num_vertices(), smooth.len())?;
        let tol = Tolerance::DEFAULT;
        let normals = vertex_normals(smooth, mesh.faces());
        let neighbors = mesh.vertex_neighbors();

        let mut frameless = 0usize;
        let vertices: Vec<VertexDetail> = mesh
            .positions()
            .iter()
            .enumerate()
            .map(|(v, original)| {
                let world = original - smooth[v];
                let n = normals[v];
                let anchor = neighbors[v]
                    .iter()
                    .map(|&u| {
                        let e = smooth[u] - smooth[v];
                        (u, (e - n * e.dot(&n)).norm())
                    })
                    .filter(|(_, len)| len.is_finite())
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(u, _)| u);
                match anchor.and_then(|u| frame_at(smooth, &normals, v, u, &tol)) {
                    Some(frame) => VertexDetail {
                        anchor,
                        local: frame.to_local(&world),
                        world,
                    },
                    None => {
                        frameless += 1;
                        VertexDetail {
                            anchor: None,
                            local: world,
                            world,
                        }
                    }
                }
            })
            .collect();

        if frameless > 0 {
            warn!(frameless, "vertices without a local frame keep world-space detail");
        }
        debug!(vertices = vertices.len(), "extracted displacement detail");
        Ok(Self {
            faces: mesh.faces().to_vec(),
            vertices,
            tolerance: tol,
        })
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// `true` if no vertices are stored.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// World-space offsets as recorded against the original smooth base.
    pub fn world_offsets(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|d| d.world).collect()
    }

    /// Add the stored detail to a deformed smooth base.
    ///
    /// Each offset is mapped through the frame rebuilt on `smooth` with the
    /// same anchor neighbor. Where that frame degenerates the world-space
    /// offset is added unchanged.
    pub fn apply(&self, smooth: &[Point3]) -> Result<Vec<Point3>> {
        check_len(self.vertices.len(), smooth.len())?;
        let normals = vertex_normals(smooth, &self.faces);

        let mut fallbacks = 0usize;
        let deformed: Vec<Point3> = self
            .vertices
            .iter()
            .enumerate()
            .map(|(v, detail)| {
                let frame = detail
                    .anchor
                    .and_then(|u| frame_at(smooth, &normals, v, u, &self.tolerance));
                let offset = match frame {
                    Some(frame) => frame.to_world(&detail.local),
                    None => {
                        if detail.anchor.is_some() {
                            fallbacks += 1;
                        }
                        detail.world
                    }
                };
                smooth[v] + offset
            })
            .collect();

        if fallbacks > 0 {
            warn!(fallbacks, "degenerate local frames, using world-space detail");
        }
        Ok(deformed)
    }
}
