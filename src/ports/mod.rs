//! Ports layer: Trait definitions for external inputs.
//!
//! The only external collaborator of the calculator is the source of the
//! risk-category cut points.

mod thresholds;

pub use thresholds::ThresholdSource;
