//! Simple closed and open meshes for tests, benchmarks and demos.
//!
//! All primitives use counter-clockwise winding when viewed from outside,
//! so face normals point outward by the right-hand rule.

use std::f64::consts::PI;
use vdeform_math::Point3;

use crate::Mesh;

/// Unit cube `[0,1]^3`: 8 vertices, 12 triangles.
///
/// Vertex layout:
/// ```text
///     v7----v6
///    /|    /|
///   v4----v5|    z
///   | v3--|-v2   | y
///   |/    |/     |/
///   v0----v1     +---x
/// ```
pub fn unit_cube() -> Mesh {
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];
    let faces = vec![
        // Bottom (z=0)
        [0, 2, 1],
        [0, 3, 2],
        // Top (z=1)
        [4, 5, 6],
        [4, 6, 7],
        // Front (y=0)
        [0, 1, 5],
        [0, 5, 4],
        // Back (y=1)
        [2, 3, 7],
        [2, 7, 6],
        // Left (x=0)
        [0, 4, 7],
        [0, 7, 3],
        // Right (x=1)
        [1, 2, 6],
        [1, 6, 5],
    ];
    Mesh { positions, faces }
}

/// Flat `nx × ny` vertex grid in the XY plane with the given spacing.
///
/// Vertex `(i, j)` has index `j * nx + i`. Each cell is split along its
/// `(i, j)`–`(i+1, j+1)` diagonal.
pub fn grid(nx: usize, ny: usize, spacing: f64) -> Mesh {
    let (nx, ny) = (nx.max(2), ny.max(2));
    let mut positions = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            positions.push(Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0));
        }
    }
    let mut faces = Vec::with_capacity(2 * (nx - 1) * (ny - 1));
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let idx = j * nx + i;
            faces.push([idx, idx + 1, idx + nx + 1]);
            faces.push([idx, idx + nx + 1, idx + nx]);
        }
    }
    Mesh { positions, faces }
}

/// Open cylinder along +X from `x = 0` to `x = length`.
///
/// Ring `r` holds vertices `r * segments .. (r + 1) * segments`. Both ends
/// are open boundaries.
pub fn tube(rings: usize, segments: usize, length: f64, radius: f64) -> Mesh {
    let (rings, segments) = (rings.max(2), segments.max(3));
    let mut positions = Vec::with_capacity(rings * segments);
    for r in 0..rings {
        let x = length * r as f64 / (rings - 1) as f64;
        for s in 0..segments {
            let theta = 2.0 * PI * s as f64 / segments as f64;
            positions.push(Point3::new(x, radius * theta.cos(), radius * theta.sin()));
        }
    }
    let mut faces = Vec::with_capacity(2 * (rings - 1) * segments);
    for r in 0..rings - 1 {
        for s in 0..segments {
            let a = r * segments + s;
            let b = r * segments + (s + 1) % segments;
            let c = (r + 1) * segments + s;
            let d = (r + 1) * segments + (s + 1) % segments;
            faces.push([a, b, d]);
            faces.push([a, d, c]);
        }
    }
    Mesh { positions, faces }
}

/// Latitude/longitude sphere centered at the origin.
///
/// Vertex 0 is the north pole, the last vertex the south pole.
pub fn uv_sphere(radius: f64, stacks: usize, slices: usize) -> Mesh {
    let (stacks, slices) = (stacks.max(2), slices.max(3));
    let mut positions = Vec::with_capacity((stacks - 1) * slices + 2);
    positions.push(Point3::new(0.0, 0.0, radius));
    for i in 1..stacks {
        let phi = PI * i as f64 / stacks as f64;
        for s in 0..slices {
            let theta = 2.0 * PI * s as f64 / slices as f64;
            positions.push(Point3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            ));
        }
    }
    let south = positions.len();
    positions.push(Point3::new(0.0, 0.0, -radius));

    let ring = |i: usize, s: usize| 1 + (i - 1) * slices + s % slices;
    let mut faces = Vec::new();
    for s in 0..slices {
        faces.push([0, ring(1, s), ring(1, s + 1)]);
    }
    for i in 1..stacks - 1 {
        for s in 0..slices {
            let (a, b) = (ring(i, s), ring(i, s + 1));
            let (c, d) = (ring(i + 1, s), ring(i + 1, s + 1));
            faces.push([a, c, d]);
            faces.push([a, d, b]);
        }
    }
    for s in 0..slices {
        faces.push([ring(stacks - 1, s), south, ring(stacks - 1, s + 1)]);
    }
    Mesh { positions, faces }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_outward(mesh: &Mesh, center: Point3) {
        for (fi, n) in mesh.face_area_vectors().iter().enumerate() {
            let [a, b, c] = mesh.triangle(fi);
            let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
            assert!(n.dot(&(centroid - center)) > 0.0, "face {fi} points inward");
        }
    }

    #[test]
    fn test_cube_is_outward_and_valid() {
        let cube = unit_cube();
        assert!(Mesh::new(cube.positions().to_vec(), cube.faces().to_vec()).is_ok());
        assert_outward(&cube, Point3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_tube_layout() {
        let mesh = tube(5, 8, 4.0, 1.0);
        assert_eq!(mesh.num_vertices(), 40);
        assert_eq!(mesh.num_faces(), 64);
        assert_relative_eq!(mesh.positions()[8].x, 1.0, epsilon = 1e-12);
        let boundary = mesh.boundary_vertices();
        assert_eq!(boundary.iter().filter(|b| **b).count(), 16);
        let normals = mesh.vertex_normals();
        for (p, n) in mesh.positions().iter().zip(&normals) {
            assert!(n.dot(&(p - Point3::new(p.x, 0.0, 0.0))) > 0.0);
        }
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let sphere = uv_sphere(2.0, 8, 12);
        assert_eq!(sphere.num_vertices(), 7 * 12 + 2);
        assert!(sphere.edge_face_counts().values().all(|&c| c == 2));
        assert_outward(&sphere, Point3::origin());
        // Inscribed polyhedron area is below the sphere area
        assert!(sphere.total_area() < 4.0 * PI * 4.0);
    }

    #[test]
    fn test_grid_layout() {
        let g = grid(4, 3, 0.5);
        assert_eq!(g.num_vertices(), 12);
        assert_eq!(g.num_faces(), 12);
        assert_relative_eq!(g.total_area(), 1.5 * 1.0, epsilon = 1e-12);
        assert!(g.face_area_vectors().iter().all(|n| n.z > 0.0));
    }
}
