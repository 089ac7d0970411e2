//! Adapters layer: Concrete implementations of ports.
//!
//! - `thresholds`: built-in and JSON-file cut-point tables
//! - `redact`: measurement filtering for logs

pub mod redact;
pub mod thresholds;

pub use thresholds::{ConfigError, ConfiguredThresholds, JsonThresholdFile, PublishedThresholds};
