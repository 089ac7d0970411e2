//! Derived lipid/adiposity indices (CMI, VAI) from raw measurements.
//!
//! Lipids may be entered in mmol/L or mg/dL; the indices are always computed
//! in mmol/L.

use serde::{Deserialize, Serialize};

use super::patient::{FemaleInput, MaleInput, PatientInput, Sex};
use super::validation::{check, Constraint, ValidationError};

/// mg/dL per mmol/L for triglycerides.
pub const TG_MG_PER_MMOL: f64 = 88.57;
/// mg/dL per mmol/L for HDL cholesterol.
pub const HDL_MG_PER_MMOL: f64 = 38.67;

pub const AGE_RANGE: Constraint = Constraint::Within { min: 18.0, max: 100.0 };
pub const BMI_RANGE: Constraint = Constraint::Within { min: 10.0, max: 60.0 };
pub const HEIGHT_RANGE: Constraint = Constraint::Within { min: 120.0, max: 220.0 };
pub const WAIST_RANGE: Constraint = Constraint::Within { min: 50.0, max: 180.0 };

/// Unit the lipid panel was reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LipidUnit {
    #[default]
    MmolPerL,
    MgPerDl,
}

impl LipidUnit {
    /// Accepted triglyceride range in this unit.
    #[must_use]
    pub fn tg_range(&self) -> Constraint {
        match self {
            Self::MmolPerL => Constraint::Within { min: 0.1, max: 20.0 },
            Self::MgPerDl => Constraint::Within { min: 0.1, max: 2000.0 },
        }
    }

    /// Accepted HDL range in this unit.
    #[must_use]
    pub fn hdl_range(&self) -> Constraint {
        match self {
            Self::MmolPerL => Constraint::Within { min: 0.1, max: 10.0 },
            Self::MgPerDl => Constraint::Within { min: 0.1, max: 400.0 },
        }
    }

    #[must_use]
    pub fn tg_to_mmol(&self, tg: f64) -> f64 {
        match self {
            Self::MmolPerL => tg,
            Self::MgPerDl => tg / TG_MG_PER_MMOL,
        }
    }

    #[must_use]
    pub fn hdl_to_mmol(&self, hdl: f64) -> f64 {
        match self {
            Self::MmolPerL => hdl,
            Self::MgPerDl => hdl / HDL_MG_PER_MMOL,
        }
    }
}

impl std::fmt::Display for LipidUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MmolPerL => write!(f, "mmol/L"),
            Self::MgPerDl => write!(f, "mg/dL"),
        }
    }
}

/// Measurements as entered on the calculator form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub sex: Sex,
    /// Age in years
    pub age: f64,
    /// Body mass index in kg/m²
    pub bmi: f64,
    /// Height in cm
    pub height_cm: f64,
    /// Waist circumference in cm
    pub waist_cm: f64,
    /// Triglycerides, in `lipid_unit`
    pub triglycerides: f64,
    /// HDL cholesterol, in `lipid_unit`
    pub hdl: f64,
    #[serde(default)]
    pub lipid_unit: LipidUnit,
    pub hypertension: bool,
}

/// Indices computed from [`Measurements`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedIndices {
    /// Cardiometabolic Index
    pub cmi: f64,
    /// Visceral Adiposity Index (female equation only)
    pub vai: Option<f64>,
    pub tg_mmol: f64,
    pub hdl_mmol: f64,
}

/// CMI = (TG / HDL) × (WC / height), lipids in mmol/L.
#[must_use]
pub fn cardiometabolic_index(tg_mmol: f64, hdl_mmol: f64, waist_cm: f64, height_cm: f64) -> f64 {
    (tg_mmol / hdl_mmol) * (waist_cm / height_cm)
}

/// Female VAI = [WC / (36.58 + 1.89 × BMI)] × (TG / 0.81) × (1.52 / HDL).
#[must_use]
pub fn visceral_adiposity_index(waist_cm: f64, bmi: f64, tg_mmol: f64, hdl_mmol: f64) -> f64 {
    (waist_cm / (36.58 + 1.89 * bmi)) * (tg_mmol / 0.81) * (1.52 / hdl_mmol)
}

impl Measurements {
    /// # Errors
    /// Returns the first field outside the form ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("age", self.age, AGE_RANGE)?;
        check("bmi", self.bmi, BMI_RANGE)?;
        check("height", self.height_cm, HEIGHT_RANGE)?;
        check("waist", self.waist_cm, WAIST_RANGE)?;
        check("triglycerides", self.triglycerides, self.lipid_unit.tg_range())?;
        check("hdl", self.hdl, self.lipid_unit.hdl_range())?;
        Ok(())
    }

    /// Convert lipids to mmol/L and compute CMI (and VAI for women).
    ///
    /// # Errors
    /// Returns the first field outside the form ranges.
    pub fn derive_indices(&self) -> Result<DerivedIndices, ValidationError> {
        self.validate()?;

        let tg_mmol = self.lipid_unit.tg_to_mmol(self.triglycerides);
        let hdl_mmol = self.lipid_unit.hdl_to_mmol(self.hdl);
        let cmi = cardiometabolic_index(tg_mmol, hdl_mmol, self.waist_cm, self.height_cm);
        let vai = match self.sex {
            Sex::Female => Some(visceral_adiposity_index(self.waist_cm, self.bmi, tg_mmol, hdl_mmol)),
            Sex::Male => None,
        };

        Ok(DerivedIndices {
            cmi,
            vai,
            tg_mmol,
            hdl_mmol,
        })
    }

    /// Build the equation input together with the indices it was derived from.
    ///
    /// # Errors
    /// Returns the first field outside the form ranges.
    pub fn to_input(&self) -> Result<(PatientInput, DerivedIndices), ValidationError> {
        let indices = self.derive_indices()?;

        let input = match (self.sex, indices.vai) {
            (Sex::Female, Some(vai)) => {
                FemaleInput::new(self.age, self.bmi, indices.cmi, self.hypertension, vai)?.into()
            }
            (Sex::Female, None) => return Err(ValidationError::missing("vai")),
            (Sex::Male, _) => MaleInput::new(self.age, self.bmi, indices.cmi, self.waist_cm)?.into(),
        };

        Ok((input, indices))
    }
}
