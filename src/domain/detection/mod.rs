//! Detection aggregate
//!
//! Raw output of the digit detector: one labelled, localized glyph per record.

pub mod model;

pub use model::{BoundingBox, Detection};
