//! Detection domain entity

use serde::{Deserialize, Serialize};

/// Axis-aligned box in image pixel coordinates.
///
/// Callers are expected to supply `x1 <= x2` and `y1 <= y2`; the box is
/// not validated here. Zero-width boxes are valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Horizontal midpoint of the box.
    pub fn x_center(&self) -> f32 {
        (self.x1 + self.x2) / 2.0
    }

    pub fn is_well_formed(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }
}

/// One object recognized by the detector in a single image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label, normally a single digit glyph ("0".."9")
    pub label: String,
    /// Detector certainty in [0, 1]
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }

    /// Ordering key used by reading assembly.
    pub fn x_center(&self) -> f32 {
        self.bbox.x_center()
    }

    /// Confidence rounded to two decimals, as shown to users.
    pub fn display_confidence(&self) -> f32 {
        (self.confidence * 100.0).round() / 100.0
    }
}

// ── Tests ──────────────────────────────────────────────────────
