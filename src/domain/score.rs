//! The FOSSI-F and FOSSI-M equations.

use serde::{Deserialize, Serialize};

use super::category::{RiskCategory, ThresholdTable};
use super::patient::{FemaleInput, MaleInput, PatientInput, Sex};
use super::validation::{Constraint, ValidationError};

/// FOSSI-F coefficients.
pub mod female {
    pub const INTERCEPT: f64 = -18.811;
    pub const AGE: f64 = 0.209;
    pub const BMI: f64 = 0.350;
    pub const CMI: f64 = 1.359;
    pub const HYPERTENSION: f64 = 0.799;
    pub const VAI: f64 = 0.203;
}

/// FOSSI-M coefficients.
pub mod male {
    pub const INTERCEPT: f64 = -4.663;
    pub const AGE: f64 = 0.039;
    pub const BMI: f64 = 0.045;
    pub const CMI: f64 = -0.223;
    pub const WC: f64 = 0.015;
}

/// Signed term for an equation line, e.g. `+ 0.209·Age` or `- 0.223·CMI`.
fn term(coefficient: f64, name: &str) -> String {
    let sign = if coefficient < 0.0 { '-' } else { '+' };
    format!(" {sign} {:.3}·{name}", coefficient.abs())
}

/// The equation for `sex` written out with its coefficients.
#[must_use]
pub fn equation_text(sex: Sex) -> String {
    match sex {
        Sex::Female => format!(
            "FOSSI-F = {:.3}{}{}{}{}{}",
            female::INTERCEPT,
            term(female::AGE, "Age"),
            term(female::BMI, "BMI"),
            term(female::CMI, "CMI"),
            term(female::HYPERTENSION, "HT"),
            term(female::VAI, "VAI"),
        ),
        Sex::Male => format!(
            "FOSSI-M = {:.3}{}{}{}{}",
            male::INTERCEPT,
            term(male::AGE, "Age"),
            term(male::BMI, "BMI"),
            term(male::CMI, "CMI"),
            term(male::WC, "WC"),
        ),
    }
}

impl FemaleInput {
    /// Evaluate FOSSI-F.
    #[must_use]
    pub fn score(&self) -> f64 {
        let hypertension = if self.hypertension { 1.0 } else { 0.0 };
        female::INTERCEPT
            + female::AGE * self.age
            + female::BMI * self.bmi
            + female::CMI * self.cmi
            + female::HYPERTENSION * hypertension
            + female::VAI * self.vai
    }
}

impl MaleInput {
    /// Evaluate FOSSI-M.
    #[must_use]
    pub fn score(&self) -> f64 {
        male::INTERCEPT + male::AGE * self.age + male::BMI * self.bmi + male::CMI * self.cmi + male::WC * self.wc
    }
}

impl PatientInput {
    /// Raw FOSSI value for this input, using the equation for its sex.
    #[must_use]
    pub fn score(&self) -> f64 {
        match self {
            Self::Female(f) => f.score(),
            Self::Male(m) => m.score(),
        }
    }
}

/// Score and category for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub sex: Sex,
    pub score: f64,
    pub category: RiskCategory,
}

impl ScoreResult {
    /// Score rounded for display.
    #[must_use]
    pub fn formatted_score(&self) -> String {
        format!("{:.2}", self.score)
    }
}

/// Evaluate the FOSSI equation for `input` and classify the result.
///
/// The input is re-validated so that hand-assembled struct literals are held
/// to the same ranges as the checked constructors.
///
/// # Errors
/// Returns a `ValidationError` naming the offending field.
pub fn evaluate_fossi(input: &PatientInput, thresholds: &ThresholdTable) -> Result<ScoreResult, ValidationError> {
    input.validate()?;

    let sex = input.sex();
    let score = input.score();
    if !score.is_finite() {
        return Err(ValidationError::new("score", Constraint::NotFinite));
    }

    Ok(ScoreResult {
        sex,
        score,
        category: thresholds.classify(sex, score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scenario_female() -> PatientInput {
        FemaleInput::new(50.0, 28.0, 1.2, true, 2.5).expect("valid").into()
    }

    fn scenario_male() -> PatientInput {
        MaleInput::new(60.0, 27.0, 0.9, 102.0).expect("valid").into()
    }

    #[test]
    fn test_equation_text() {
        assert_eq!(
            equation_text(Sex::Female),
            "FOSSI-F = -18.811 + 0.209·Age + 0.350·BMI + 1.359·CMI + 0.799·HT + 0.203·VAI"
        );
        assert_eq!(
            equation_text(Sex::Male),
            "FOSSI-M = -4.663 + 0.039·Age + 0.045·BMI - 0.223·CMI + 0.015·WC"
        );
    }

    #[test]
    fn test_female_scenario() {
        let result = evaluate_fossi(&scenario_female(), &ThresholdTable::published()).unwrap();
        assert_eq!(result.sex, Sex::Female);
        assert!((result.score - 4.3763).abs() < 1e-6);
        assert_eq!(result.category, RiskCategory::Low);
        assert_eq!(result.formatted_score(), "4.38");
    }

    #[test]
    fn test_male_scenario() {
        let result = evaluate_fossi(&scenario_male(), &ThresholdTable::published()).unwrap();
        assert_eq!(result.sex, Sex::Male);
        assert!((result.score - 0.2213).abs() < 1e-6);
        assert_eq!(result.category, RiskCategory::GreyZone);
    }

    #[test]
    fn test_form_defaults() {
        // Form defaults: age 62, BMI 31, height 160, waist 98, TG 1.9, HDL 1.0, hypertensive.
        let cmi = (1.9 / 1.0) * (98.0 / 160.0);
        let vai = (98.0 / (36.58 + 1.89 * 31.0)) * (1.9 / 0.81) * (1.52 / 1.0);
        let input: PatientInput = FemaleInput::new(62.0, 31.0, cmi, true, vai).unwrap().into();
        let result = evaluate_fossi(&input, &ThresholdTable::published()).unwrap();
        assert!((result.score - 8.1228).abs() < 1e-3);
        assert_eq!(result.category, RiskCategory::High);

        let input: PatientInput = MaleInput::new(62.0, 31.0, cmi, 98.0).unwrap().into();
        let result = evaluate_fossi(&input, &ThresholdTable::published()).unwrap();
        assert!((result.score - 0.3605).abs() < 1e-3);
        assert_eq!(result.category, RiskCategory::GreyZone);
    }

    #[test]
    fn test_overflowing_inputs_rejected() {
        let input: PatientInput = FemaleInput::new(50.0, f64::MAX, f64::MAX, true, f64::MAX)
            .expect("each field is in range")
            .into();
        let err = evaluate_fossi(&input, &ThresholdTable::published()).unwrap_err();
        assert_eq!(err.field, "score");
        assert_eq!(err.constraint, Constraint::NotFinite);

        let input: PatientInput = MaleInput::new(60.0, 27.0, 0.9, f64::MAX).unwrap().into();
        let result = evaluate_fossi(&input, &ThresholdTable::published()).unwrap();
        assert!(result.score.is_finite());
    }

    #[test]
    fn test_struct_literal_is_revalidated() {
        let input = PatientInput::Female(FemaleInput {
            age: -5.0,
            bmi: 28.0,
            cmi: 1.2,
            hypertension: false,
            vai: 2.5,
        });
        let err = evaluate_fossi(&input, &ThresholdTable::published()).unwrap_err();
        assert_eq!(err.field, "age");
    }

    proptest! {
        #[test]
        fn prop_female_matches_formula(
            age in 0.5f64..129.5,
            bmi in 0.1f64..80.0,
            cmi in 0.0f64..20.0,
            hypertension in any::<bool>(),
            vai in 0.0f64..30.0,
        ) {
            let input: PatientInput = FemaleInput::new(age, bmi, cmi, hypertension, vai).unwrap().into();
            let ht = if hypertension { 1.0 } else { 0.0 };
            let expected = -18.811 + 0.209 * age + 0.350 * bmi + 1.359 * cmi + 0.799 * ht + 0.203 * vai;

            let first = evaluate_fossi(&input, &ThresholdTable::published()).unwrap();
            let second = evaluate_fossi(&input, &ThresholdTable::published()).unwrap();

            prop_assert!((first.score - expected).abs() < 1e-6);
            prop_assert!(first.score.is_finite());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_male_matches_formula(
            age in 0.5f64..129.5,
            bmi in 0.1f64..80.0,
            cmi in 0.0f64..20.0,
            wc in 1.0f64..250.0,
        ) {
            let input: PatientInput = MaleInput::new(age, bmi, cmi, wc).unwrap().into();
            let expected = -4.663 + 0.039 * age + 0.045 * bmi - 0.223 * cmi + 0.015 * wc;

            let first = evaluate_fossi(&input, &ThresholdTable::published()).unwrap();
            let second = evaluate_fossi(&input, &ThresholdTable::published()).unwrap();

            prop_assert!((first.score - expected).abs() < 1e-6);
            prop_assert_eq!(first, second);
        }
    }
}
