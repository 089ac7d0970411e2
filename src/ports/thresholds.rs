//! Threshold port: where the risk-category cut points come from.
//!
//! The cut points are clinical configuration, not code. The application asks
//! this port for a validated table once and classifies every score with it.

use crate::domain::ThresholdTable;

/// Supplies the cut-point table used to categorise scores.
pub trait ThresholdSource: Send + Sync {
    /// Error type for loading the table.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the table.
    ///
    /// # Errors
    /// Returns error if the table cannot be read or is structurally invalid.
    fn load(&self) -> Result<ThresholdTable, Self::Error>;

    /// Short human-readable description of the source (for logs and the UI).
    fn describe(&self) -> String;
}
