//! Reading DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::domain::{BoundingBox, Detection, Reading};

/// Bounding box in image pixel coordinates (`x1 <= x2`, `y1 <= y2`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_box"))]
pub struct BoundingBoxDto {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

fn validate_box(b: &BoundingBoxDto) -> Result<(), ValidationError> {
    let (code, message) = if ![b.x1, b.y1, b.x2, b.y2].iter().all(|v| v.is_finite()) {
        ("bbox_not_finite", "coordinates must be finite")
    } else if !BoundingBox::from(*b).is_well_formed() {
        ("bbox_inverted", "expected x1 <= x2 and y1 <= y2")
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    Err(err)
}

impl From<BoundingBoxDto> for BoundingBox {
    fn from(b: BoundingBoxDto) -> Self {
        BoundingBox::new(b.x1, b.y1, b.x2, b.y2)
    }
}

impl From<BoundingBox> for BoundingBoxDto {
    fn from(b: BoundingBox) -> Self {
        Self {
            x1: b.x1,
            y1: b.y1,
            x2: b.x2,
            y2: b.y2,
        }
    }
}

/// One detector output record
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DetectionDto {
    /// Class label, e.g. "7"
    #[validate(length(min = 1, max = 16, message = "label must be 1-16 characters"))]
    pub label: String,
    /// Detector confidence in [0, 1]
    #[validate(range(min = 0.0, max = 1.0, message = "confidence must be within [0, 1]"))]
    pub confidence: f32,
    #[validate(nested)]
    pub bbox: BoundingBoxDto,
}

impl From<DetectionDto> for Detection {
    fn from(d: DetectionDto) -> Self {
        Detection::new(d.label, d.confidence, d.bbox.into())
    }
}

/// Detections for one meter image, in any order
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReadingRequest {
    #[validate(
        length(max = 256, message = "at most 256 detections per request"),
        nested
    )]
    pub detections: Vec<DetectionDto>,
}

impl ReadingRequest {
    pub fn into_detections(self) -> Vec<Detection> {
        self.detections.into_iter().map(Into::into).collect()
    }
}

/// A detection in reading order
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingDigitDto {
    pub label: String,
    /// Rounded to two decimals
    pub confidence: f32,
    pub x_center: f32,
    pub bbox: BoundingBoxDto,
}

impl From<&Detection> for ReadingDigitDto {
    fn from(d: &Detection) -> Self {
        Self {
            label: d.label.clone(),
            confidence: d.display_confidence(),
            x_center: d.x_center(),
            bbox: d.bbox.into(),
        }
    }
}

/// Reading assembled from detections
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingResponse {
    /// Concatenated labels, or "No detection"
    pub reading: String,
    /// Reading as a number; 0 when the reading is not purely numeric
    pub consumption: i64,
    /// Detections ordered left to right
    pub detections: Vec<ReadingDigitDto>,
}

impl From<&Reading> for ReadingResponse {
    fn from(r: &Reading) -> Self {
        Self {
            reading: r.value.clone(),
            consumption: r.consumption(),
            detections: r.detections.iter().map(Into::into).collect(),
        }
    }
}
