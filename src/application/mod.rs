//! Application layer: Use cases and services.
//!
//! This module combines the domain equations with the threshold port to
//! implement the calculator's use cases.

mod calculator;
mod session;

pub use calculator::CalculatorService;
pub use session::SessionTally;
