#![warn(missing_docs)]

//! Triangle mesh representation for the vdeform solver.
//!
//! A [`Mesh`] is an indexed triangle list: positions plus index triples.
//! It is validated once on construction and then shared read-only by the
//! operator, solver and detail crates. Deformed states are plain position
//! arrays with the same topology.
//!
//! # Example
//!
//! ```
//! use vdeform_mesh::primitives;
//!
//! let cube = primitives::unit_cube();
//! assert_eq!(cube.num_vertices(), 8);
//! assert_eq!(cube.num_faces(), 12);
//! ```

pub mod error;
pub mod primitives;

pub use error::{MeshError, Result};

use std::collections::HashMap;
use vdeform_math::{Point3, Vec3};

/// An indexed triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<Point3>,
    faces: Vec<[usize; 3]>,
}

impl Mesh {
    /// Create a mesh, validating indices and coordinates.
    pub fn new(positions: Vec<Point3>, faces: Vec<[usize; 3]>) -> Result<Self> {
        if positions.is_empty() || faces.is_empty() {
            return Err(MeshError::Empty {
                vertices: positions.len(),
                faces: faces.len(),
            });
        }
        if let Some(vi) = positions.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(MeshError::NonFinite(vi));
        }
        let n = positions.len();
        for (fi, face) in faces.iter().enumerate() {
            for (k, &index) in face.iter().enumerate() {
                if index >= n {
                    return Err(MeshError::IndexOutOfBounds {
                        face: fi,
                        index,
                        vertex_count: n,
                    });
                }
                if face[(k + 1) % 3] == index {
                    return Err(MeshError::RepeatedIndex { face: fi, index });
                }
            }
        }
        Ok(Self { positions, faces })
    }

    /// Same topology, new positions.
    pub fn with_positions(&self, positions: Vec<Point3>) -> Result<Self> {
        if positions.len() != self.positions.len() {
            return Err(MeshError::VertexCountMismatch {
                expected: self.positions.len(),
                actual: positions.len(),
            });
        }
        if let Some(vi) = positions.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(MeshError::NonFinite(vi));
        }
        Ok(Self {
            positions,
            faces: self.faces.clone(),
        })
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    /// Triangle index triples.
    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    /// Corner positions of face `fi`.
    pub fn triangle(&self, fi: usize) -> [Point3; 3] {
        triangle_of(&self.positions, self.faces[fi])
    }

    /// Per-face `(v1 - v0) × (v2 - v0)`; length is twice the face area.
    pub fn face_area_vectors(&self) -> Vec<Vec3> {
        face_area_vectors(&self.positions, &self.faces)
    }

    /// Per-face areas.
    pub fn face_areas(&self) -> Vec<f64> {
        self.face_area_vectors()
            .iter()
            .map(|n| 0.5 * n.norm())
            .collect()
    }

    /// Sum of face areas.
    pub fn total_area(&self) -> f64 {
        self.face_areas().iter().sum()
    }

    /// Area-weighted unit vertex normals.
    ///
    /// Isolated vertices and vertices whose incident faces cancel out get a
    /// zero vector.
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        vertex_normals(&self.positions, &self.faces)
    }

    /// Sorted, deduplicated one-ring neighbors of every vertex.
    pub fn vertex_neighbors(&self) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); self.positions.len()];
        for face in &self.faces {
            for k in 0..3 {
                let v = face[k];
                neighbors[v].push(face[(k + 1) % 3]);
                neighbors[v].push(face[(k + 2) % 3]);
            }
        }
        for ring in &mut neighbors {
            ring.sort_unstable();
            ring.dedup();
        }
        neighbors
    }

    /// Use count of every undirected edge `(min, max)`.
    pub fn edge_face_counts(&self) -> HashMap<(usize, usize), usize> {
        let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
        for face in &self.faces {
            for k in 0..3 {
                let (a, b) = (face[k], face[(k + 1) % 3]);
                let key = if a < b { (a, b) } else { (b, a) };
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Per-vertex flag: `true` if the vertex lies on an edge used by a
    /// single face.
    pub fn boundary_vertices(&self) -> Vec<bool> {
        let mut boundary = vec![false; self.positions.len()];
        for ((a, b), count) in self.edge_face_counts() {
            if count == 1 {
                boundary[a] = true;
                boundary[b] = true;
            }
        }
        boundary
    }
}

/// Corner positions of `face` taken from `positions`.
pub fn triangle_of(positions: &[Point3], face: [usize; 3]) -> [Point3; 3] {
    [positions[face[0]], positions[face[1]], positions[face[2]]]
}

/// Per-face area vectors for an arbitrary position array sharing `faces`.
pub fn face_area_vectors(positions: &[Point3], faces: &[[usize; 3]]) -> Vec<Vec3> {
    faces
        .iter()
        .map(|&f| {
            let [a, b, c] = triangle_of(positions, f);
            (b - a).cross(&(c - a))
        })
        .collect()
}

/// Area-weighted unit vertex normals for an arbitrary position array
/// sharing `faces`. Used on smooth bases that are not full [`Mesh`]es.
pub fn vertex_normals(positions: &[Point3], faces: &[[usize; 3]]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::zeros(); positions.len()];
    for (face, n) in faces.iter().zip(face_area_vectors(positions, faces)) {
        for &vi in face {
            normals[vi] += n;
        }
    }
    for n in &mut normals {
        let len = n.norm();
        if len > 1e-300 && len.is_finite() {
            *n /= len;
        } else {
            *n = Vec3::zeros();
        }
    }
    normals
}
