//! Procedural geometry for the card plate.

use std::f64::consts::FRAC_PI_2;

use card_types::{Mesh, Point3, Vertex};

/// Arc segments per rounded corner.
pub const CORNER_SEGMENTS: usize = 8;

/// Clearance kept between the corner radius and half the short side.
const RADIUS_CLEARANCE: f64 = 0.01;

/// Rounded-rectangle plate centered on the origin.
///
/// The top face lies at `Z = 0` and the plate extends down to
/// `Z = -thickness`. `radius` is clamped to
/// `[0, min(width, height) / 2 - 0.01]`; a zero radius gives square
/// corners.
///
/// # Example
///
/// ```
/// use card_scene::card_plate;
///
/// let plate = card_plate(130.0, 190.0, 5.0, 5.0);
/// let b = plate.bounds();
/// assert!((b.max.z - 0.0).abs() < 1e-12);
/// assert!((b.min.z + 5.0).abs() < 1e-12);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn card_plate(width: f64, height: f64, thickness: f64, radius: f64) -> Mesh {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let r = radius.min(width.min(height) / 2.0 - RADIUS_CLEARANCE).max(0.0);

    // Counter-clockwise outline seen from +Z, starting at the bottom-right corner.
    let mut outline: Vec<(f64, f64)> = Vec::new();
    let corners = [
        (hw - r, -hh + r, -FRAC_PI_2),
        (hw - r, hh - r, 0.0),
        (-hw + r, hh - r, FRAC_PI_2),
        (-hw + r, -hh + r, 2.0 * FRAC_PI_2),
    ];
    for (cx, cy, start) in corners {
        if r <= 0.0 {
            outline.push((cx, cy));
            continue;
        }
        for k in 0..=CORNER_SEGMENTS {
            let a = start + FRAC_PI_2 * (k as f64) / (CORNER_SEGMENTS as f64);
            outline.push((cx + r * a.cos(), cy + r * a.sin()));
        }
    }

    let n = outline.len() as u32;
    let mut vertices = Vec::with_capacity(outline.len() * 2 + 2);
    for &(x, y) in &outline {
        vertices.push(Vertex::from_coords(x, y, 0.0));
    }
    for &(x, y) in &outline {
        vertices.push(Vertex::from_coords(x, y, -thickness));
    }
    let top_center = 2 * n;
    let bottom_center = 2 * n + 1;
    vertices.push(Vertex::new(Point3::new(0.0, 0.0, 0.0)));
    vertices.push(Vertex::new(Point3::new(0.0, 0.0, -thickness)));

    let mut faces = Vec::with_capacity(outline.len() * 4);
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push([top_center, i, j]);
        faces.push([bottom_center, n + j, n + i]);
        faces.push([n + i, n + j, j]);
        faces.push([n + i, j, i]);
    }

    Mesh::from_parts(vertices, faces)
}
