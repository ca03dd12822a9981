//! Card and slot planning.
//!
//! Every rectangle is derived from a [`CardSpec`] in the card's centered
//! frame (origin at the card center, top face at `Z = 0`). Nothing here is
//! stored on the scene; recompute on demand.
//!
//! ```text
//!  ┌──────────────────────────────┐  +H/2
//!  │          text strip          │
//!  ├──────────────────┬───────────┤  +H/2 - H·upper_ratio
//!  │                  │  cell 0   │
//!  │      figure      ├───────────┤
//!  │     (3/5 W)      │  cell 1   │  accessory column (2/5 W)
//!  │                  ├───────────┤
//!  │                  │  cell 2   │
//!  └──────────────────┴───────────┘  -H/2
//! ```

use serde::{Deserialize, Serialize};

use card_types::Rect;

use crate::error::{LayoutError, LayoutResult};

/// Accessory cells per card.
pub const ACCESSORY_CELLS: usize = 3;

/// Fraction of the padded width given to the figure slot.
pub const FIGURE_WIDTH_FRACTION: f64 = 3.0 / 5.0;

/// Fraction of the padded height spanned by the fixed accessory column.
pub const ACCESSORY_COLUMN_FRACTION: f64 = 2.0 / 3.0;

/// How the accessory column is divided.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AccessoryPolicy {
    /// A `2/3·H` column centered in the lower band, three equal cells.
    /// The column is clamped to the lower band when the band is shorter.
    #[default]
    FixedColumn,
    /// Three square cells of `cell_size`, top-aligned and spaced evenly over
    /// the whole lower band.
    EvenSpacing {
        /// Side of each cell, clamped to the column width and spacing.
        cell_size: f64,
    },
}

/// Card dimensions and partition ratios.
///
/// # Example
///
/// ```
/// use card_layout::CardSpec;
///
/// let spec = CardSpec::default();
/// assert_eq!(spec.width, 130.0);
/// assert_eq!(spec.padded_width(), 122.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSpec {
    /// Plate width in mm.
    pub width: f64,
    /// Plate height in mm.
    pub height: f64,
    /// Plate thickness in mm.
    pub thickness: f64,
    /// Share of the padded height given to the text strip, in `(0, 1)`.
    pub upper_ratio: f64,
    /// Inset on every side before slots are computed.
    pub padding: f64,
    /// Plate corner radius.
    pub fillet_radius: f64,
    /// Accessory column partition.
    pub accessory_policy: AccessoryPolicy,
}

impl Default for CardSpec {
    fn default() -> Self {
        Self {
            width: 130.0,
            height: 190.0,
            thickness: 5.0,
            upper_ratio: 0.25,
            padding: 4.0,
            fillet_radius: 5.0,
            accessory_policy: AccessoryPolicy::FixedColumn,
        }
    }
}

impl CardSpec {
    /// A card of `width × height` with default ratios.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Set the thickness.
    #[must_use]
    pub const fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Set the upper band ratio.
    #[must_use]
    pub const fn with_upper_ratio(mut self, ratio: f64) -> Self {
        self.upper_ratio = ratio;
        self
    }

    /// Set the padding.
    #[must_use]
    pub const fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Set the corner radius.
    #[must_use]
    pub const fn with_fillet_radius(mut self, radius: f64) -> Self {
        self.fillet_radius = radius;
        self
    }

    /// Set the accessory policy.
    #[must_use]
    pub const fn with_accessory_policy(mut self, policy: AccessoryPolicy) -> Self {
        self.accessory_policy = policy;
        self
    }

    /// Width after padding.
    #[must_use]
    pub fn padded_width(&self) -> f64 {
        self.width - 2.0 * self.padding
    }

    /// Height after padding.
    #[must_use]
    pub fn padded_height(&self) -> f64 {
        self.height - 2.0 * self.padding
    }

    /// Check that a slot grid can be derived.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidCard`] for non-positive or non-finite
    /// dimensions, a ratio outside `(0, 1)`, negative padding, padding that
    /// consumes the card, or a non-positive even-spacing cell.
    pub fn validate(&self) -> LayoutResult<()> {
        let fail = |reason: String| Err(LayoutError::InvalidCard { reason });
        if !(self.width.is_finite() && self.width > 0.0 && self.height.is_finite() && self.height > 0.0) {
            return fail(format!("card must be positive, got {} x {}", self.width, self.height));
        }
        if !(self.thickness.is_finite() && self.thickness >= 0.0) {
            return fail(format!("thickness must be non-negative, got {}", self.thickness));
        }
        if !(self.upper_ratio > 0.0 && self.upper_ratio < 1.0) {
            return fail(format!("upper_ratio must be in (0, 1), got {}", self.upper_ratio));
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return fail(format!("padding must be non-negative, got {}", self.padding));
        }
        if self.padded_width() <= 0.0 || self.padded_height() <= 0.0 {
            return fail(format!(
                "padding {} leaves no room on a {} x {} card",
                self.padding, self.width, self.height
            ));
        }
        if let AccessoryPolicy::EvenSpacing { cell_size } = self.accessory_policy
            && !(cell_size.is_finite() && cell_size > 0.0)
        {
            return fail(format!("accessory cell size must be positive, got {cell_size}"));
        }
        Ok(())
    }
}

/// Every region derived from a [`CardSpec`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPlan {
    /// Padded card footprint.
    pub footprint: Rect,
    /// Upper band, `H · upper_ratio` tall.
    pub upper_band: Rect,
    /// Lower band, the remainder.
    pub lower_band: Rect,
    /// Figure slot, left `3/5` of the lower band.
    pub figure: Rect,
    /// Accessory column, right `2/5` of the card.
    pub accessory_column: Rect,
    /// Accessory cells, top to bottom.
    pub accessory_cells: [Rect; ACCESSORY_CELLS],
    /// Text strip, the whole upper band.
    pub text_strip: Rect,
}

impl CardPlan {
    /// Derive all slots.
    ///
    /// # Errors
    ///
    /// Whatever [`CardSpec::validate`] rejects.
    pub fn compute(spec: &CardSpec) -> LayoutResult<Self> {
        spec.validate()?;
        let w = spec.padded_width();
        let h = spec.padded_height();
        let (left, right) = (-w / 2.0, w / 2.0);
        let (bottom, top) = (-h / 2.0, h / 2.0);

        let upper_h = h * spec.upper_ratio;
        let split_y = top - upper_h;
        let split_x = left + w * FIGURE_WIDTH_FRACTION;

        let footprint = Rect::from_min_max(left, bottom, right, top);
        let upper_band = Rect::from_min_max(left, split_y, right, top);
        let lower_band = Rect::from_min_max(left, bottom, right, split_y);
        let figure = Rect::from_min_max(left, bottom, split_x, split_y);

        let (accessory_column, accessory_cells) = match spec.accessory_policy {
            AccessoryPolicy::FixedColumn => fixed_column(&lower_band, split_x, right, h),
            AccessoryPolicy::EvenSpacing { cell_size } => even_spacing(&lower_band, split_x, right, cell_size),
        };

        Ok(Self {
            footprint,
            upper_band,
            lower_band,
            figure,
            accessory_column,
            accessory_cells,
            text_strip: upper_band,
        })
    }

    /// Cell for accessory `index`, if it exists.
    #[must_use]
    pub fn accessory_cell(&self, index: usize) -> Option<Rect> {
        self.accessory_cells.get(index).copied()
    }

    /// Every placement slot with a label, for checks and diagnostics.
    #[must_use]
    pub fn slots(&self) -> Vec<(&'static str, Rect)> {
        let mut slots = vec![("text_strip", self.text_strip), ("figure", self.figure)];
        let labels = ["accessory_1", "accessory_2", "accessory_3"];
        slots.extend(labels.into_iter().zip(self.accessory_cells));
        slots
    }
}

fn fixed_column(band: &Rect, left: f64, right: f64, padded_h: f64) -> (Rect, [Rect; ACCESSORY_CELLS]) {
    let col_h = (ACCESSORY_COLUMN_FRACTION * padded_h).min(band.height);
    let column = Rect::new((left + right) / 2.0, band.y_center, right - left, col_h);
    let cell_h = col_h / 3.0;
    let first = column.max_y() - cell_h / 2.0;
    let cells = std::array::from_fn(|i| {
        #[allow(clippy::cast_precision_loss)]
        let y = first - i as f64 * cell_h;
        Rect::new(column.x_center, y, column.width, cell_h)
    });
    (column, cells)
}

fn even_spacing(band: &Rect, left: f64, right: f64, cell_size: f64) -> (Rect, [Rect; ACCESSORY_CELLS]) {
    let column = Rect::from_min_max(left, band.min_y(), right, band.max_y());
    let spacing = band.height / 3.0;
    let side_h = cell_size.min(spacing);
    let side_w = cell_size.min(column.width);
    let first = band.max_y() - side_h / 2.0;
    let cells = std::array::from_fn(|i| {
        #[allow(clippy::cast_precision_loss)]
        let y = first - i as f64 * spacing;
        Rect::new(column.x_center, y, side_w, side_h)
    });
    (column, cells)
}
