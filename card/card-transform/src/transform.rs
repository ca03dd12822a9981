//! The placement transform value type.

use card_types::{Aabb, Mesh, Point3};
use nalgebra::{Matrix4, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// A placement composed as `T · R · S`.
///
/// Points are scaled per axis, then rotated, then translated. The value is
/// never mutated by the layout engine: every builder method returns a new
/// transform and the caller decides whether to commit it.
///
/// # Example
///
/// ```
/// use card_transform::Transform;
/// use card_types::Point3;
///
/// let t = Transform::identity().with_scale_factor(2.0).with_scale_factor(1.5);
/// assert!((t.uniform_scale() - 3.0).abs() < 1e-12);
///
/// let p = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert!((p.x - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    translation: Vector3<f64>,
    rotation: Rotation3<f64>,
    scale: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity placement.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: Rotation3::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// A pure translation.
    #[must_use]
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// A pure rotation about the origin.
    #[must_use]
    pub fn from_rotation(rotation: Rotation3<f64>) -> Self {
        Self {
            rotation,
            ..Self::identity()
        }
    }

    /// Translation component.
    #[must_use]
    pub const fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    /// Rotation component.
    #[must_use]
    pub const fn rotation(&self) -> &Rotation3<f64> {
        &self.rotation
    }

    /// Per-axis scale component.
    #[must_use]
    pub const fn scale(&self) -> &Vector3<f64> {
        &self.scale
    }

    /// The scale factor along X, which is the whole scale for uniform transforms.
    #[must_use]
    pub fn uniform_scale(&self) -> f64 {
        self.scale.x
    }

    /// True if all three scale components agree within `1e-12` (relative).
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        let s = self.scale;
        let tol = 1e-12 * s.x.abs().max(1.0);
        (s.x - s.y).abs() <= tol && (s.x - s.z).abs() <= tol
    }

    /// True if this is the identity within `1e-12`.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.translation.norm() <= 1e-12
            && (self.rotation.matrix() - Rotation3::<f64>::identity().matrix()).norm() <= 1e-12
            && (self.scale - Vector3::new(1.0, 1.0, 1.0)).norm() <= 1e-12
    }

    /// The homogeneous matrix `T · R · S`.
    #[must_use]
    pub fn matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.translation)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// Map a point through the transform.
    #[must_use]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        let scaled = Point3::from(p.coords.component_mul(&self.scale));
        self.rotation * scaled + self.translation
    }

    /// Shift by `delta` in world space.
    #[must_use]
    pub fn translated(&self, delta: Vector3<f64>) -> Self {
        Self {
            translation: self.translation + delta,
            ..*self
        }
    }

    /// Left-multiply a rotation about the world origin: `R · M`.
    #[must_use]
    pub fn rotated(&self, r: &Rotation3<f64>) -> Self {
        Self {
            translation: r * self.translation,
            rotation: r * self.rotation,
            scale: self.scale,
        }
    }

    /// Left-multiply a rotation about a world pivot: `T(c) · R · T(-c) · M`.
    #[must_use]
    pub fn rotated_about(&self, r: &Rotation3<f64>, pivot: &Point3<f64>) -> Self {
        let c = pivot.coords;
        Self {
            translation: r * (self.translation - c) + c,
            rotation: r * self.rotation,
            scale: self.scale,
        }
    }

    /// Left-multiply a uniform scale about a world pivot: `T(c) · S(s) · T(-c) · M`.
    #[must_use]
    pub fn scaled_about(&self, factor: f64, pivot: &Point3<f64>) -> Self {
        let c = pivot.coords;
        Self {
            translation: (self.translation - c) * factor + c,
            rotation: self.rotation,
            scale: self.scale * factor,
        }
    }

    /// Multiply the existing scale component by `factor`.
    ///
    /// Compounds: two calls with `2.0` leave a scale of `4.0`. The
    /// translation is kept, so geometry scales about the entity's origin.
    #[must_use]
    pub fn with_scale_factor(&self, factor: f64) -> Self {
        Self {
            scale: self.scale * factor,
            ..*self
        }
    }

    /// Replace the scale component with a uniform `factor`.
    #[must_use]
    pub fn with_uniform_scale(&self, factor: f64) -> Self {
        Self {
            scale: Vector3::new(factor, factor, factor),
            ..*self
        }
    }

    /// Compose a child placement under this one: `self · child`.
    ///
    /// Exact when `self` has uniform scale, which holds for every pivot the
    /// layout engine creates.
    #[must_use]
    pub fn compose(&self, child: &Self) -> Self {
        let s = self.uniform_scale();
        Self {
            translation: self.translation + self.rotation * (child.translation * s),
            rotation: self.rotation * child.rotation,
            scale: child.scale * s,
        }
    }

    /// Inverse placement, if the scale is uniform and non-zero.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let s = self.uniform_scale();
        if !self.is_uniform() || s.abs() < f64::EPSILON || !s.is_finite() {
            return None;
        }
        let inv_rot = self.rotation.inverse();
        Some(Self {
            translation: -(inv_rot * self.translation) / s,
            rotation: inv_rot,
            scale: Vector3::new(1.0 / s, 1.0 / s, 1.0 / s),
        })
    }

    /// Rotation about world Z in the `XYZ` Euler convention, radians.
    ///
    /// This is the yaw of `R = Rz · Ry · Rx`.
    #[must_use]
    pub fn euler_z(&self) -> f64 {
        self.rotation.euler_angles().2
    }

    /// Apply to every vertex of a mesh, returning the transformed copy.
    #[must_use]
    pub fn apply_to_mesh(&self, mesh: &Mesh) -> Mesh {
        let mut out = mesh.clone();
        out.map_positions(|p| self.transform_point(&p));
        out
    }

    /// World bounds of a mesh placed by this transform.
    ///
    /// Transforms every vertex, so the box is tight for any rotation.
    #[must_use]
    pub fn mesh_bounds(&self, mesh: &Mesh) -> Aabb {
        Aabb::from_points(mesh.vertices.iter().map(|v| self.transform_point(&v.position)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Axis, quarter_turn};
    use approx::assert_relative_eq;
    use card_types::box_mesh;

    #[test]
    fn matrix_matches_point_path() {
        let t = Transform::identity()
            .with_scale_factor(2.0)
            .rotated(&quarter_turn(Axis::Z, 1))
            .translated(Vector3::new(1.0, 2.0, 3.0));
        let p = Point3::new(1.0, 0.5, -1.0);
        let via_point = t.transform_point(&p);
        let via_matrix = t.matrix().transform_point(&p);
        assert_relative_eq!(via_point, via_matrix, epsilon = 1e-12);
    }

    #[test]
    fn rotated_left_multiplies() {
        let t = Transform::from_translation(Vector3::new(1.0, 0.0, 0.0));
        let r = quarter_turn(Axis::Z, 1);
        let rotated = t.rotated(&r);
        let expected = r.to_homogeneous() * t.matrix();
        assert_relative_eq!(rotated.matrix(), expected, epsilon = 1e-12);
    }

    #[test]
    fn rotated_about_keeps_pivot_fixed() {
        let pivot = Point3::new(5.0, 5.0, 5.0);
        let t = Transform::identity().rotated_about(&quarter_turn(Axis::X, -1), &pivot);
        assert_relative_eq!(t.transform_point(&pivot), pivot, epsilon = 1e-12);
    }

    #[test]
    fn scaled_about_keeps_pivot_fixed() {
        let pivot = Point3::new(-3.0, 2.0, 1.0);
        let t = Transform::from_translation(Vector3::new(4.0, 0.0, 0.0)).scaled_about(1.2, &pivot);
        assert_relative_eq!(t.transform_point(&pivot), pivot, epsilon = 1e-12);
        assert_relative_eq!(t.uniform_scale(), 1.2);
    }

    #[test]
    fn scale_factor_compounds_but_uniform_scale_replaces() {
        let t = Transform::identity().with_scale_factor(0.5);
        assert_relative_eq!(t.with_scale_factor(0.5).uniform_scale(), 0.25);
        assert_relative_eq!(t.with_uniform_scale(0.5).uniform_scale(), 0.5);
    }

    #[test]
    fn inverse_round_trips_points() {
        let t = Transform::identity()
            .with_scale_factor(3.0)
            .rotated(&quarter_turn(Axis::Y, 1))
            .translated(Vector3::new(7.0, -2.0, 0.5));
        let inv = t.inverse().unwrap_or_default();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(inv.transform_point(&t.transform_point(&p)), p, epsilon = 1e-12);
        assert!(t.compose(&inv).is_identity());
    }

    #[test]
    fn non_uniform_has_no_inverse() {
        let t = Transform {
            scale: Vector3::new(1.0, 2.0, 1.0),
            ..Transform::identity()
        };
        assert!(t.inverse().is_none());
    }

    #[test]
    fn compose_matches_matrix_product() {
        let parent = Transform::from_translation(Vector3::new(0.0, 0.0, 10.0))
            .scaled_about(2.0, &Point3::new(1.0, 1.0, 1.0));
        let child = Transform::identity()
            .rotated(&quarter_turn(Axis::X, 1))
            .translated(Vector3::new(3.0, 0.0, 0.0));
        let composed = parent.compose(&child);
        assert_relative_eq!(composed.matrix(), parent.matrix() * child.matrix(), epsilon = 1e-12);
    }

    #[test]
    fn euler_z_of_quarter_turn() {
        let t = Transform::from_rotation(quarter_turn(Axis::Z, 1));
        assert_relative_eq!(t.euler_z(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(Transform::identity().euler_z(), 0.0);
    }

    #[test]
    fn mesh_bounds_follow_rotation() {
        let mesh = box_mesh(Point3::origin(), Point3::new(10.0, 5.0, 20.0));
        let t = Transform::from_rotation(quarter_turn(Axis::X, 1));
        let size = t.mesh_bounds(&mesh).size();
        assert_relative_eq!(size.x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(size.y, 20.0, epsilon = 1e-12);
        assert_relative_eq!(size.z, 5.0, epsilon = 1e-12);
    }
}
