//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides the interactive calculator:
//! - Measurement form with derived CMI/VAI
//! - Result view with category and band strip
//! - Equation and cut-point reference

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
