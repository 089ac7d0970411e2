//! Domain layer: FOSSI inputs, equations and risk categories.
//!
//! Pure value types with no I/O. Every evaluation is deterministic.

mod assessment;
mod category;
mod indices;
mod patient;
mod score;
pub mod validation;

pub(crate) use assessment::uuid_v4;
pub use assessment::Assessment;
pub(crate) use category::ThresholdBands;
pub use category::{RiskCategory, ThresholdBand, ThresholdError, ThresholdTable};
pub use indices::{
    cardiometabolic_index, visceral_adiposity_index, DerivedIndices, LipidUnit, Measurements,
};
pub use patient::{FemaleInput, MaleInput, PatientInput, PatientRecord, Sex};
pub use score::{equation_text, evaluate_fossi, female, male, ScoreResult};
pub use validation::{Constraint, ValidationError};
