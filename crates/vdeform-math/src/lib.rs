#![warn(missing_docs)]

//! Math types for the vdeform mesh deformation solver.
//!
//! Thin wrappers around nalgebra providing the types shared by every
//! vdeform crate: points, vectors, 3x3 maps, rigid transforms for moving
//! handles, orthonormal local frames, and tolerance constants.

use nalgebra::{Matrix3, Matrix4, Unit, UnitQuaternion, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 3x3 linear map.
pub type Mat3 = Matrix3<f64>;

/// A rotation represented as a unit quaternion.
pub type Rotation = UnitQuaternion<f64>;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Translation by `offset`.
    pub fn translation(offset: Vec3) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = offset.x;
        m[(1, 3)] = offset.y;
        m[(2, 3)] = offset.z;
        Self { matrix: m }
    }

    /// Rotation by `rotation` about the point `center`.
    ///
    /// This is how a handle is spun around its own centroid.
    pub fn rotation_about(rotation: &Rotation, center: &Point3) -> Self {
        let to_origin = Self::translation(-center.coords);
        let back = Self::translation(center.coords);
        let rot = Self {
            matrix: rotation.to_homogeneous(),
        };
        back.then(&rot).then(&to_origin)
    }

    /// Rotation of `angle` radians about `axis` through `center`.
    pub fn axis_angle_about(axis: &Dir3, angle: f64, center: &Point3) -> Self {
        Self::rotation_about(&Rotation::from_axis_angle(axis, angle), center)
    }

    /// Compose: `self * other`, so `other` is applied first.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }
}

/// An orthonormal frame attached to a surface point.
///
/// `normal` follows the surface; `tangent` and `bitangent` span the tangent
/// plane. Coordinates expressed in a frame rotate with the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// First tangent axis.
    pub tangent: Vec3,
    /// Second tangent axis, `normal × tangent`.
    pub bitangent: Vec3,
    /// Unit surface normal.
    pub normal: Vec3,
}

impl Frame {
    /// Build a frame from a normal and a tangent hint.
    ///
    /// The hint is projected onto the plane orthogonal to `normal`.
    /// Returns `None` if either the normal or the projected hint is shorter
    /// than `tol.linear`.
    pub fn from_normal_and_hint(normal: &Vec3, hint: &Vec3, tol: &Tolerance) -> Option<Self> {
        let n_len = normal.norm();
        if !n_len.is_finite() || n_len < tol.linear {
            return None;
        }
        let n = normal / n_len;
        let projected = hint - n * hint.dot(&n);
        let t_len = projected.norm();
        if !t_len.is_finite() || t_len < tol.linear {
            return None;
        }
        let t = projected / t_len;
        Some(Self {
            tangent: t,
            bitangent: n.cross(&t),
            normal: n,
        })
    }

    /// Express a world-space vector in frame coordinates.
    pub fn to_local(&self, v: &Vec3) -> Vec3 {
        Vec3::new(v.dot(&self.tangent), v.dot(&self.bitangent), v.dot(&self.normal))
    }

    /// Map frame coordinates back to a world-space vector.
    pub fn to_world(&self, c: &Vec3) -> Vec3 {
        self.tangent * c.x + self.bitangent * c.y + self.normal * c.z
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance.
    pub linear: f64,
    /// Area below which a triangle is treated as degenerate.
    pub area: f64,
}

impl Tolerance {
    /// Default tolerances (1e-12 linear, 1e-12 area).
    pub const DEFAULT: Self = Self {
        linear: 1e-12,
        area: 1e-12,
    };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_translation() {
        let t = Transform::translation(Vec3::new(1.0, 2.0, 3.0));
        let p = t.apply_point(&Point3::new(1.0, 1.0, 1.0));
        assert!((p - Point3::new(2.0, 3.0, 4.0)).norm() < 1e-12);
    }

    #[test]
    fn test_rotation_about_center_keeps_center_fixed() {
        let center = Point3::new(1.0, 1.0, 0.0);
        let t = Transform::axis_angle_about(&Vec3::z_axis(), PI / 2.0, &center);
        let moved = t.apply_point(&center);
        assert!((moved - center).norm() < 1e-12);

        // (2,1,0) is +x of the center; a quarter turn takes it to +y
        let p = t.apply_point(&Point3::new(2.0, 1.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_is_orthonormal() {
        let f = Frame::from_normal_and_hint(
            &Vec3::new(0.0, 0.0, 2.0),
            &Vec3::new(1.0, 0.0, 5.0),
            &Tolerance::DEFAULT,
        )
        .unwrap();
        assert_relative_eq!(f.tangent, Vec3::x(), epsilon = 1e-12);
        assert_relative_eq!(f.bitangent, Vec3::y(), epsilon = 1e-12);
        assert_relative_eq!(f.normal, Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_frame_local_world_roundtrip() {
        let f = Frame::from_normal_and_hint(
            &Vec3::new(0.3, -1.0, 0.2),
            &Vec3::new(1.0, 0.4, 0.0),
            &Tolerance::DEFAULT,
        )
        .unwrap();
        let v = Vec3::new(-0.25, 3.0, 1.5);
        let back = f.to_world(&f.to_local(&v));
        assert_relative_eq!(back, v, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_rotates_with_surface() {
        let tol = Tolerance::DEFAULT;
        let n = Vec3::new(0.0, 0.0, 1.0);
        let hint = Vec3::new(1.0, 0.0, 0.0);
        let f = Frame::from_normal_and_hint(&n, &hint, &tol).unwrap();
        let coords = f.to_local(&Vec3::new(0.2, 0.0, 1.0));

        let rot = Rotation::from_axis_angle(&Vec3::y_axis(), PI / 2.0);
        let g = Frame::from_normal_and_hint(&(rot * n), &(rot * hint), &tol).unwrap();
        let moved = g.to_world(&coords);
        assert_relative_eq!(moved, rot * Vec3::new(0.2, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_frame_degenerate_inputs() {
        let tol = Tolerance::DEFAULT;
        assert!(Frame::from_normal_and_hint(&Vec3::zeros(), &Vec3::x(), &tol).is_none());
        // Hint parallel to normal has no tangent component
        assert!(Frame::from_normal_and_hint(&Vec3::z(), &Vec3::z(), &tol).is_none());
    }
}
