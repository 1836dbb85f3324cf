//! Reading aggregate
//!
//! Reconstructs the meter reading from the detector's per-digit output.

pub mod assembler;

pub use assembler::{assemble_reading, parse_consumption, Reading, NO_DETECTION};
