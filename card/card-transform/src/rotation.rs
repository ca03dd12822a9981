//! Exact quarter-turn rotations.

use nalgebra::{Matrix3, Rotation3};
use serde::{Deserialize, Serialize};

/// A world coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// World X.
    X,
    /// World Y.
    Y,
    /// World Z.
    Z,
}

/// Rotation by `turns · 90°` about `axis`, right-handed.
///
/// Entries are exactly `0` or `±1`. `turns` may be negative and is taken
/// modulo 4.
#[must_use]
pub fn quarter_turn(axis: Axis, turns: i32) -> Rotation3<f64> {
    let (c, s) = match turns.rem_euclid(4) {
        0 => (1.0, 0.0),
        1 => (0.0, 1.0),
        2 => (-1.0, 0.0),
        _ => (0.0, -1.0),
    };
    #[rustfmt::skip]
    let m = match axis {
        Axis::X => Matrix3::new(
            1.0, 0.0, 0.0,
            0.0,   c,  -s,
            0.0,   s,   c,
        ),
        Axis::Y => Matrix3::new(
              c, 0.0,   s,
            0.0, 1.0, 0.0,
             -s, 0.0,   c,
        ),
        Axis::Z => Matrix3::new(
              c,  -s, 0.0,
              s,   c, 0.0,
            0.0, 0.0, 1.0,
        ),
    };
    Rotation3::from_matrix_unchecked(m)
}
