//! Rectangles in the card plane.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A plain 2D pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec2 {
    /// First component.
    pub x: f64,
    /// Second component.
    pub y: f64,
}

impl Vec2 {
    /// Create a new pair.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in the XY plane, stored by center and size.
///
/// # Example
///
/// ```
/// use card_types::Rect;
///
/// let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
/// let inner = Rect::new(10.0, 10.0, 20.0, 20.0);
/// assert!(outer.contains(&inner, 1e-9));
/// assert!(!outer.overlaps(&Rect::new(200.0, 0.0, 10.0, 10.0), 1e-9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Center X.
    pub x_center: f64,
    /// Center Y.
    pub y_center: f64,
    /// Extent along X.
    pub width: f64,
    /// Extent along Y.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from its center and size.
    #[must_use]
    pub const fn new(x_center: f64, y_center: f64, width: f64, height: f64) -> Self {
        Self {
            x_center,
            y_center,
            width,
            height,
        }
    }

    /// Create a rectangle from its corner coordinates.
    #[must_use]
    pub fn from_min_max(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            x_center: 0.5 * (min_x + max_x),
            y_center: 0.5 * (min_y + max_y),
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Left edge.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.x_center - 0.5 * self.width
    }

    /// Right edge.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.x_center + 0.5 * self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.y_center - 0.5 * self.height
    }

    /// Top edge.
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.y_center + 0.5 * self.height
    }

    /// Center as a pair.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        Vec2::new(self.x_center, self.y_center)
    }

    /// Size as a pair.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// True if `other` lies inside `self`, allowing `tol` of slack.
    #[must_use]
    pub fn contains(&self, other: &Self, tol: f64) -> bool {
        other.min_x() >= self.min_x() - tol
            && other.max_x() <= self.max_x() + tol
            && other.min_y() >= self.min_y() - tol
            && other.max_y() <= self.max_y() + tol
    }

    /// True if the interiors intersect by more than `tol`. Shared edges do not count.
    #[must_use]
    pub fn overlaps(&self, other: &Self, tol: f64) -> bool {
        let dx = self.max_x().min(other.max_x()) - self.min_x().max(other.min_x());
        let dy = self.max_y().min(other.max_y()) - self.min_y().max(other.min_y());
        dx > tol && dy > tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn edges() {
        let r = Rect::new(10.0, -5.0, 4.0, 2.0);
        assert_relative_eq!(r.min_x(), 8.0);
        assert_relative_eq!(r.max_x(), 12.0);
        assert_relative_eq!(r.min_y(), -6.0);
        assert_relative_eq!(r.max_y(), -4.0);
    }

    #[test]
    fn touching_is_not_overlap() {
        let left = Rect::from_min_max(0.0, 0.0, 10.0, 10.0);
        let right = Rect::from_min_max(10.0, 0.0, 20.0, 10.0);
        assert!(!left.overlaps(&right, 1e-9));
        assert!(right.overlaps(&Rect::from_min_max(15.0, 5.0, 25.0, 15.0), 1e-9));
    }
}
