//! Core geometric types for card layout.
//!
//! This crate provides the value types every other `card-*` crate speaks:
//!
//! - [`Aabb`] - Axis-aligned bounding box in world millimeters
//! - [`Mesh`] / [`Vertex`] - Indexed triangle geometry owned by scene entities
//! - [`Rect`] - Axis-aligned rectangle in the card's XY plane
//! - [`Vec2`] - Plain 2D pair used by layout records
//! - [`Role`] - What an entity is on the card (figure, accessory, text, ...)
//! - [`Rgba`] - Flat material color
//!
//! # Layer 0 Crate
//!
//! No I/O, no logging, no global state. Everything here is `Copy` or cheap
//! to clone and safe to use from CLI tools, servers or tests.
//!
//! # Coordinate System
//!
//! Right-handed, millimeters:
//! - X: card width (left/right)
//! - Y: "up the card" (bottom edge to title strip)
//! - Z: out of the card face; the card top lies at `Z = 0`
//!
//! # Example
//!
//! ```
//! use card_types::{Aabb, Point3};
//!
//! let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 5.0, 2.0));
//! assert!(!aabb.is_degenerate());
//! assert_eq!(aabb.xy_rect().width, 10.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod color;
mod mesh;
mod rect;
mod role;

pub use bounds::Aabb;
pub use color::Rgba;
pub use mesh::{Mesh, Vertex, box_mesh};
pub use rect::{Rect, Vec2};
pub use role::Role;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Extent below which an AABB axis counts as "no geometry".
pub const DEGENERATE_EXTENT: f64 = 1e-9;
