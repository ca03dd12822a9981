//! Top-down orthographic render request for the text group.
//!
//! The engine only frames the shot. Pixels come from whatever external
//! renderer consumes the request file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use card_types::{Aabb, DEGENERATE_EXTENT, Rgba};

/// Camera height above the framed box's center.
pub const CAMERA_LIFT: f64 = 2.0;

/// File name of the request inside the output directory.
pub const RENDER_REQUEST_FILE: &str = "text_group_render.json";

/// Everything an external renderer needs for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Name of the framed entity.
    pub entity: String,
    /// Always `orthographic_top`.
    pub projection: String,
    /// Camera position, looking down `-Z`.
    pub camera: [f64; 3],
    /// Orthographic scale: the framed long side, margin included.
    pub ortho_scale: f64,
    /// Image width in pixels.
    pub resolution_x: u32,
    /// Image height in pixels.
    pub resolution_y: u32,
    /// Flat color for every face.
    pub color: [f32; 4],
    /// Background left transparent.
    pub transparent_background: bool,
    /// Where the image should be written.
    pub output: PathBuf,
}

impl RenderRequest {
    /// Frame `aabb` from above with `margin` on each side.
    ///
    /// The long side of the framed area gets `px` pixels; the short side is
    /// scaled to keep the aspect ratio, never below one pixel. Returns
    /// `None` when the box has no XY extent.
    #[must_use]
    pub fn frame(entity: &str, aabb: &Aabb, margin: f64, px: u32, color: Rgba, output: PathBuf) -> Option<Self> {
        if aabb.is_empty() {
            return None;
        }
        let size = aabb.size();
        if size.x <= DEGENERATE_EXTENT || size.y <= DEGENERATE_EXTENT {
            return None;
        }
        let w = size.x * (1.0 + 2.0 * margin);
        let h = size.y * (1.0 + 2.0 * margin);
        let aspect = w / h;
        let long = px.max(1);
        let short = |ratio: f64| -> u32 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            // Truncation: ratio <= 1 so the result never exceeds `long`.
            let v = (f64::from(long) * ratio).round() as u32;
            v.max(1)
        };
        let (resolution_x, resolution_y) = if aspect >= 1.0 {
            (long, short(1.0 / aspect))
        } else {
            (short(aspect), long)
        };
        let center = aabb.center();
        Some(Self {
            entity: entity.to_string(),
            projection: "orthographic_top".to_string(),
            camera: [center.x, center.y, center.z + CAMERA_LIFT],
            ortho_scale: w.max(h),
            resolution_x,
            resolution_y,
            color: [color.r, color.g, color.b, color.a],
            transparent_background: true,
            output,
        })
    }
}
