//! Placement transforms for card layout.
//!
//! A [`Transform`] is an immutable value composed as `T · R · S`:
//! translation, an orthonormal rotation and a per-axis scale. Every
//! placement step in the layout engine takes the current value and returns
//! a new one; nothing is mutated in place.
//!
//! Rotations in this engine are built from exact quarter turns
//! ([`quarter_turn`]), so rotated bounding boxes carry no trigonometric
//! noise.
//!
//! # Example
//!
//! ```
//! use card_transform::{Axis, Transform, quarter_turn};
//! use card_types::Point3;
//!
//! let t = Transform::identity()
//!     .rotated(&quarter_turn(Axis::Z, 1))
//!     .translated(nalgebra::Vector3::new(10.0, 0.0, 0.0));
//!
//! let p = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
//! assert!((p.x - 10.0).abs() < 1e-12);
//! assert!((p.y - 1.0).abs() < 1e-12);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod rotation;
mod transform;

pub use rotation::{Axis, quarter_turn};
pub use transform::Transform;
