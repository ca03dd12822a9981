//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::DEGENERATE_EXTENT;
use crate::rect::Rect;

/// An axis-aligned bounding box (AABB) in world space.
///
/// Invariant: for a non-empty box `min <= max` on every axis. An empty box
/// (the fold identity) has `min = +inf`, `max = -inf`.
///
/// # Example
///
/// ```
/// use card_types::{Aabb, Point3};
///
/// let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
/// let b = Aabb::new(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0));
/// let u = a.union(&b);
/// assert_eq!(u.size().x, 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create an AABB from two corners, swapping components where needed.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Create an empty AABB, the identity for [`Aabb::union`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Create the tightest AABB around a set of points.
    ///
    /// Returns an empty AABB for an empty iterator.
    #[must_use]
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand_to_include(&p);
        }
        aabb
    }

    /// Check if the AABB contains no points at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Check if the AABB signals "no geometry".
    ///
    /// True for empty boxes and for boxes whose extent along any axis is
    /// below [`DEGENERATE_EXTENT`]. Dependent operations short-circuit on it.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        let s = self.size();
        s.x < DEGENERATE_EXTENT || s.y < DEGENERATE_EXTENT || s.z < DEGENERATE_EXTENT
    }

    /// Extent along each axis. Zero for empty boxes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Center point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Bounding volume. Zero for empty boxes.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Smallest AABB containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Grow the AABB in place to include a point.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// The eight corners, `min` first, `max` last.
    #[must_use]
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Projection onto the XY plane (top view).
    #[must_use]
    pub fn xy_rect(&self) -> Rect {
        Rect::from_min_max(self.min.x, self.min.y, self.max.x, self.max.y)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
