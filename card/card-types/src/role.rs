//! Entity roles.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What an entity is on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Role {
    /// The card plate itself.
    Card,
    /// The main figure.
    Figure,
    /// One of up to three accessories (zero-based slot index).
    Accessory(usize),
    /// First text line.
    Title,
    /// Second text line.
    Subtitle,
    /// Pivot grouping the two text lines.
    TextGroup,
    /// Imported geometry that lost primary selection.
    Auxiliary,
}

impl Role {
    /// Short tag used in layout records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Figure => "figure",
            Self::Accessory(_) => "accessory",
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::TextGroup => "text",
            Self::Auxiliary => "auxiliary",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accessory(i) => write!(f, "accessory[{i}]"),
            other => f.write_str(other.as_str()),
        }
    }
}
