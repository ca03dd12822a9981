//! Flat material colors.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Linear RGBA color, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Rgba {
    /// Solid red, the text color used for the text group render.
    pub const RED: Self = Self {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Neutral light grey for the card plate.
    pub const CARD_GREY: Self = Self {
        r: 0.8,
        g: 0.8,
        b: 0.8,
        a: 1.0,
    };

    /// Create a color, clamping each channel into `[0, 1]`.
    #[must_use]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }
}
