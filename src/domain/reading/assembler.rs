//! Reading assembly
//!
//! Detections are ordered left-to-right by the horizontal center of their
//! bounding box and their labels concatenated. Exact ties keep the order in
//! which the detector reported them, so the same detection set always yields
//! the same reading.

use crate::domain::detection::Detection;

/// Reading value reported when the detector found nothing.
pub const NO_DETECTION: &str = "No detection";

/// Ordered detections plus the reading string built from them
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Detections sorted by `x_center`, ties in input order
    pub detections: Vec<Detection>,
    /// Concatenated labels, or [`NO_DETECTION`]
    pub value: String,
}

impl Reading {
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Billing quantity derived from the reading. See [`parse_consumption`].
    pub fn consumption(&self) -> i64 {
        parse_consumption(&self.value)
    }
}

/// Order detections left-to-right and concatenate their labels.
///
/// The input is not mutated and the geometry is not validated. Ordering uses
/// a total order on `f32`, so degenerate coordinates never panic.
pub fn assemble_reading(detections: &[Detection]) -> Reading {
    if detections.is_empty() {
        return Reading {
            detections: Vec::new(),
            value: NO_DETECTION.to_string(),
        };
    }

    let mut ordered = detections.to_vec();
    // `sort_by` is stable: equal centers keep their input order
    ordered.sort_by(|a, b| a.x_center().total_cmp(&b.x_center()));

    let value = ordered.iter().map(|d| d.label.as_str()).collect::<String>();

    Reading {
        detections: ordered,
        value,
    }
}

/// Convert a reading string into a consumption quantity.
///
/// Only strings made entirely of ASCII decimal digits parse. Everything else
/// (the [`NO_DETECTION`] sentinel, misread glyphs such as `"1O5"`, signs,
/// whitespace, the empty string, values beyond `i64`) silently becomes `0`,
/// which the tariff calculator then reports as an invalid consumption.
pub fn parse_consumption(reading: &str) -> i64 {
    if reading.is_empty() || !reading.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    reading.parse::<i64>().unwrap_or(0)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::BoundingBox;

    fn det(label: &str, x_center: f32) -> Detection {
        Detection::new(
            label,
            0.9,
            BoundingBox::new(x_center - 5.0, 0.0, x_center + 5.0, 20.0),
        )
    }

    #[test]
    fn empty_detections_yield_sentinel() {
        let reading = assemble_reading(&[]);
        assert!(reading.detections.is_empty());
        assert_eq!(reading.value, "No detection");
        assert_eq!(reading.consumption(), 0);
    }

    #[test]
    fn orders_left_to_right() {
        let input = vec![det("3", 30.0), det("1", 10.0), det("2", 20.0)];
        let reading = assemble_reading(&input);
        assert_eq!(reading.value, "123");
        let centers: Vec<f32> = reading.detections.iter().map(|d| d.x_center()).collect();
        assert_eq!(centers, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn exact_ties_keep_input_order() {
        let forward = assemble_reading(&[det("4", 15.0), det("9", 15.0)]);
        assert_eq!(forward.value, "49");

        let reversed = assemble_reading(&[det("9", 15.0), det("4", 15.0)]);
        assert_eq!(reversed.value, "94");
    }

    #[test]
    fn input_is_not_mutated() {
        let input = vec![det("2", 20.0), det("1", 10.0)];
        let snapshot = input.clone();
        let _ = assemble_reading(&input);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn zero_width_boxes_are_accepted() {
        let input = vec![
            Detection::new("8", 0.5, BoundingBox::new(40.0, 0.0, 40.0, 10.0)),
            Detection::new("0", 0.5, BoundingBox::new(5.0, 0.0, 5.0, 10.0)),
        ];
        assert_eq!(assemble_reading(&input).value, "08");
    }

    #[test]
    fn nan_coordinates_do_not_panic() {
        let input = vec![
            det("1", 10.0),
            Detection::new("x", 0.1, BoundingBox::new(f32::NAN, 0.0, 1.0, 1.0)),
        ];
        let reading = assemble_reading(&input);
        assert_eq!(reading.detections.len(), 2);
    }

    #[test]
    fn same_set_is_reproducible() {
        let input = vec![det("5", 50.0), det("0", 5.0), det("7", 25.0), det("7", 25.0)];
        assert_eq!(assemble_reading(&input), assemble_reading(&input));
    }

    #[test]
    fn non_digit_labels_are_concatenated_verbatim() {
        let reading = assemble_reading(&[det("O", 20.0), det("1", 10.0), det("5", 30.0)]);
        assert_eq!(reading.value, "1O5");
        // misread glyphs fall back to zero consumption rather than an error
        assert_eq!(reading.consumption(), 0);
    }

    #[test]
    fn parse_consumption_accepts_digit_strings() {
        assert_eq!(parse_consumption("00250"), 250);
        assert_eq!(parse_consumption("7"), 7);
    }

    #[test]
    fn parse_consumption_falls_back_to_zero() {
        assert_eq!(parse_consumption(NO_DETECTION), 0);
        assert_eq!(parse_consumption(""), 0);
        assert_eq!(parse_consumption("-12"), 0);
        assert_eq!(parse_consumption("+12"), 0);
        assert_eq!(parse_consumption(" 12"), 0);
        assert_eq!(parse_consumption("12.5"), 0);
        assert_eq!(parse_consumption("99999999999999999999999"), 0);
    }
}
