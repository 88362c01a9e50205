//! Nine-grid anchors and their geometry.
//!
//! An anchor names which point of the overlay sits on the layout position:
//! `TopLeft` pins the overlay's top-left corner, `Center` its middle, and so on.

use serde::{Deserialize, Serialize};

/// Margin used for the canonical positions of edge anchors.
const EDGE_MARGIN: f64 = 0.05;

/// One of the 9 grid anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    #[default]
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::CenterLeft,
        Anchor::Center,
        Anchor::CenterRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// Name used in settings files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "top_left",
            Anchor::TopCenter => "top_center",
            Anchor::TopRight => "top_right",
            Anchor::CenterLeft => "center_left",
            Anchor::Center => "center",
            Anchor::CenterRight => "center_right",
            Anchor::BottomLeft => "bottom_left",
            Anchor::BottomCenter => "bottom_center",
            Anchor::BottomRight => "bottom_right",
        }
    }

    fn from_grid(column: usize, row: usize) -> Self {
        match (column, row) {
            (0, 0) => Anchor::TopLeft,
            (1, 0) => Anchor::TopCenter,
            (2, 0) => Anchor::TopRight,
            (0, 1) => Anchor::CenterLeft,
            (1, 1) => Anchor::Center,
            (2, 1) => Anchor::CenterRight,
            (0, _) => Anchor::BottomLeft,
            (1, _) => Anchor::BottomCenter,
            _ => Anchor::BottomRight,
        }
    }
}

impl std::str::FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Anchor::ALL
            .into_iter()
            .find(|anchor| anchor.as_str() == normalized)
            .ok_or_else(|| format!("unknown anchor: {}", s))
    }
}

/// Fraction of the overlay's own size to subtract from the anchor point to
/// reach the overlay's top-left corner.
pub fn anchor_to_ratio(anchor: Anchor) -> (f64, f64) {
    match anchor {
        Anchor::TopLeft => (0.0, 0.0),
        Anchor::TopCenter => (0.5, 0.0),
        Anchor::TopRight => (1.0, 0.0),
        Anchor::CenterLeft => (0.0, 0.5),
        Anchor::Center => (0.5, 0.5),
        Anchor::CenterRight => (1.0, 0.5),
        Anchor::BottomLeft => (0.0, 1.0),
        Anchor::BottomCenter => (0.5, 1.0),
        Anchor::BottomRight => (1.0, 1.0),
    }
}

/// Snap a normalized point to the anchor of the grid cell containing it.
///
/// Each axis is split into `[0, 0.33)`, `[0.33, 0.66]` and `(0.66, 1]`.
pub fn nearest_anchor(x: f64, y: f64) -> Anchor {
    Anchor::from_grid(band(x), band(y))
}

fn band(value: f64) -> usize {
    if value < 0.33 {
        0
    } else if value <= 0.66 {
        1
    } else {
        2
    }
}

/// Position an anchor button places the watermark at.
pub fn canonical_position(anchor: Anchor) -> (f64, f64) {
    let (rx, ry) = anchor_to_ratio(anchor);
    (canonical_axis(rx), canonical_axis(ry))
}

fn canonical_axis(ratio: f64) -> f64 {
    if ratio == 0.0 {
        EDGE_MARGIN
    } else if ratio == 1.0 {
        1.0 - EDGE_MARGIN
    } else {
        0.5
    }
}
