//! Patient input for the FOSSI equations.
//!
//! The two sexes use different predictors, so the input is a tagged variant:
//! a female record always carries hypertension and VAI, a male record always
//! carries waist circumference. Loosely-typed records coming from a form or a
//! JSON document go through [`PatientRecord::into_input`].

use serde::{Deserialize, Serialize};

use super::validation::{check, require, Constraint, ValidationError};

/// Age must be a plausible adult or child age in years.
pub const AGE_BOUNDS: Constraint = Constraint::Between { min: 0.0, max: 130.0 };
/// BMI in kg/m².
pub const BMI_BOUNDS: Constraint = Constraint::GreaterThan(0.0);
/// Cardiometabolic Index.
pub const CMI_BOUNDS: Constraint = Constraint::AtLeast(0.0);
/// Visceral Adiposity Index.
pub const VAI_BOUNDS: Constraint = Constraint::AtLeast(0.0);
/// Waist circumference in cm.
pub const WC_BOUNDS: Constraint = Constraint::GreaterThan(0.0);

/// Selects which FOSSI equation applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Name of the equation used for this sex.
    #[must_use]
    pub fn equation(&self) -> &'static str {
        match self {
            Self::Female => "FOSSI-F",
            Self::Male => "FOSSI-M",
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Female => write!(f, "Female"),
            Self::Male => write!(f, "Male"),
        }
    }
}

/// Predictors for FOSSI-F.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FemaleInput {
    /// Age in years
    pub age: f64,
    /// Body mass index in kg/m²
    pub bmi: f64,
    /// Cardiometabolic Index
    pub cmi: f64,
    /// Diagnosed hypertension
    pub hypertension: bool,
    /// Visceral Adiposity Index
    pub vai: f64,
}

impl FemaleInput {
    /// Build a validated female input.
    ///
    /// # Errors
    /// Returns the first field that violates its range.
    pub fn new(age: f64, bmi: f64, cmi: f64, hypertension: bool, vai: f64) -> Result<Self, ValidationError> {
        let input = Self {
            age,
            bmi,
            cmi,
            hypertension,
            vai,
        };
        input.validate()?;
        Ok(input)
    }

    /// # Errors
    /// Returns the first field that violates its range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("age", self.age, AGE_BOUNDS)?;
        check("bmi", self.bmi, BMI_BOUNDS)?;
        check("cmi", self.cmi, CMI_BOUNDS)?;
        check("vai", self.vai, VAI_BOUNDS)?;
        Ok(())
    }
}

/// Predictors for FOSSI-M.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaleInput {
    /// Age in years
    pub age: f64,
    /// Body mass index in kg/m²
    pub bmi: f64,
    /// Cardiometabolic Index
    pub cmi: f64,
    /// Waist circumference in cm
    pub wc: f64,
}

impl MaleInput {
    /// Build a validated male input.
    ///
    /// # Errors
    /// Returns the first field that violates its range.
    pub fn new(age: f64, bmi: f64, cmi: f64, wc: f64) -> Result<Self, ValidationError> {
        let input = Self { age, bmi, cmi, wc };
        input.validate()?;
        Ok(input)
    }

    /// # Errors
    /// Returns the first field that violates its range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("age", self.age, AGE_BOUNDS)?;
        check("bmi", self.bmi, BMI_BOUNDS)?;
        check("cmi", self.cmi, CMI_BOUNDS)?;
        check("wc", self.wc, WC_BOUNDS)?;
        Ok(())
    }
}

/// A fully formed patient record for one sex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sex", rename_all = "lowercase")]
pub enum PatientInput {
    Female(FemaleInput),
    Male(MaleInput),
}

impl PatientInput {
    #[must_use]
    pub fn sex(&self) -> Sex {
        match self {
            Self::Female(_) => Sex::Female,
            Self::Male(_) => Sex::Male,
        }
    }

    #[must_use]
    pub fn age(&self) -> f64 {
        match self {
            Self::Female(f) => f.age,
            Self::Male(m) => m.age,
        }
    }

    /// # Errors
    /// Returns the first field that violates its range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Female(f) => f.validate(),
            Self::Male(m) => m.validate(),
        }
    }
}

impl From<FemaleInput> for PatientInput {
    fn from(input: FemaleInput) -> Self {
        Self::Female(input)
    }
}

impl From<MaleInput> for PatientInput {
    fn from(input: MaleInput) -> Self {
        Self::Male(input)
    }
}

/// Raw patient record as collected from a form or a JSON document.
///
/// Every predictor is optional here; which ones are required depends on
/// `sex`. Fields that do not apply to the selected sex are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub sex: Option<Sex>,
    pub age: Option<f64>,
    pub bmi: Option<f64>,
    pub cmi: Option<f64>,
    /// 0 = no, 1 = yes
    pub hypertension: Option<f64>,
    pub vai: Option<f64>,
    pub wc: Option<f64>,
}

impl PatientRecord {
    /// Convert into a typed input, enforcing the fields required for `sex`.
    ///
    /// # Errors
    /// Returns a `ValidationError` naming the first missing or invalid field.
    pub fn into_input(self) -> Result<PatientInput, ValidationError> {
        let sex = require("sex", self.sex)?;
        let age = require("age", self.age)?;
        let bmi = require("bmi", self.bmi)?;
        let cmi = require("cmi", self.cmi)?;

        match sex {
            Sex::Female => {
                let hypertension = require("hypertension", self.hypertension)?;
                let hypertension = check("hypertension", hypertension, Constraint::Indicator)? == 1.0;
                let vai = require("vai", self.vai)?;
                Ok(FemaleInput::new(age, bmi, cmi, hypertension, vai)?.into())
            }
            Sex::Male => {
                let wc = require("wc", self.wc)?;
                Ok(MaleInput::new(age, bmi, cmi, wc)?.into())
            }
        }
    }
}
