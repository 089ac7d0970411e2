//! Calculator service: orchestrates one FOSSI evaluation.
//!
//! This service coordinates:
//! - Loading the cut-point table from its port
//! - Turning raw measurements or records into a typed input
//! - Scoring and categorising
//! - Session bookkeeping and logging

use crate::adapters::ConfigError;
use crate::domain::{
    evaluate_fossi, Assessment, Measurements, PatientInput, PatientRecord, ThresholdTable,
};
use crate::ports::ThresholdSource;
use crate::FossiError;

use super::session::SessionTally;

/// Service for running FOSSI calculations against a threshold source.
pub struct CalculatorService<T>
where
    T: ThresholdSource,
{
    source: T,
    thresholds: ThresholdTable,
    session: SessionTally,
}

impl<T> CalculatorService<T>
where
    T: ThresholdSource,
    T::Error: Into<ConfigError>,
{
    /// Create a service, loading the threshold table once.
    ///
    /// # Errors
    /// Returns error if the threshold source cannot be loaded.
    pub fn new(source: T) -> Result<Self, FossiError> {
        let thresholds = source.load().map_err(|e| FossiError::Config(e.into()))?;
        tracing::info!("Using {}", source.describe());

        Ok(Self {
            source,
            thresholds,
            session: SessionTally::new(),
        })
    }

    /// Re-read the threshold table. The previous table is kept on failure.
    ///
    /// # Errors
    /// Returns error if the threshold source cannot be loaded.
    pub fn reload_thresholds(&mut self) -> Result<(), FossiError> {
        match self.source.load() {
            Ok(table) => {
                self.thresholds = table;
                tracing::info!("Reloaded {}", self.source.describe());
                Ok(())
            }
            Err(e) => {
                let e: ConfigError = e.into();
                tracing::warn!("Keeping previous thresholds: {}", e);
                Err(FossiError::Config(e))
            }
        }
    }

    #[must_use]
    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    #[must_use]
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    #[must_use]
    pub fn session(&self) -> &SessionTally {
        &self.session
    }

    /// Score a typed input.
    ///
    /// # Errors
    /// Returns `FossiError::Validation` naming the offending field.
    pub fn evaluate(&mut self, input: &PatientInput) -> Result<Assessment, FossiError> {
        let result = evaluate_fossi(input, &self.thresholds).map_err(|e| {
            tracing::debug!(field = e.field, "Rejected input: {}", e);
            e
        })?;
        Ok(self.finish(Assessment::new(result)))
    }

    /// Score a loosely-typed record (form, JSON).
    ///
    /// # Errors
    /// Returns `FossiError::Validation` naming the first missing or invalid field.
    pub fn evaluate_record(&mut self, record: PatientRecord) -> Result<Assessment, FossiError> {
        let input = record.into_input()?;
        self.evaluate(&input)
    }

    /// Derive CMI/VAI from raw measurements, then score.
    ///
    /// # Errors
    /// Returns `FossiError::Validation` naming the first out-of-range measurement.
    pub fn evaluate_measurements(&mut self, measurements: &Measurements) -> Result<Assessment, FossiError> {
        let (input, indices) = measurements.to_input()?;
        let result = evaluate_fossi(&input, &self.thresholds)?;
        Ok(self.finish(Assessment::with_indices(result, indices)))
    }

    fn finish(&mut self, assessment: Assessment) -> Assessment {
        let counted = self.session.record(&assessment.result);

        tracing::info!(
            equation = assessment.result.sex.equation(),
            category = %assessment.result.category,
            "FOSSI={:.2}",
            assessment.result.score
        );
        if counted {
            tracing::debug!(
                "Session {} calculations: {}",
                self.session.session_id(),
                self.session.calculations()
            );
        }

        assessment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ConfiguredThresholds, JsonThresholdFile, PublishedThresholds};
    use crate::domain::{FemaleInput, LipidUnit, MaleInput, RiskCategory, Sex};

    fn create_test_service() -> CalculatorService<PublishedThresholds> {
        CalculatorService::new(PublishedThresholds).expect("Should create service")
    }

    #[test]
    fn test_evaluate_female() {
        let mut service = create_test_service();
        let input: PatientInput = FemaleInput::new(50.0, 28.0, 1.2, true, 2.5).unwrap().into();

        let assessment = service.evaluate(&input).expect("Should evaluate");
        assert!((assessment.result.score - 4.3763).abs() < 1e-6);
        assert_eq!(assessment.result.category, RiskCategory::Low);
        assert!(assessment.indices.is_none());
        assert_eq!(service.session().calculations(), 1);
    }

    #[test]
    fn test_repeat_evaluation_is_identical_and_not_recounted() {
        let mut service = create_test_service();
        let input: PatientInput = MaleInput::new(60.0, 27.0, 0.9, 102.0).unwrap().into();

        let first = service.evaluate(&input).unwrap();
        let second = service.evaluate(&input).unwrap();

        assert_eq!(first.result, second.result);
        assert_ne!(first.id, second.id);
        assert_eq!(service.session().calculations(), 1);
    }

    #[test]
    fn test_evaluate_record_missing_field() {
        let mut service = create_test_service();
        let record = PatientRecord {
            sex: Some(Sex::Male),
            age: Some(60.0),
            bmi: Some(27.0),
            cmi: Some(0.9),
            ..Default::default()
        };

        match service.evaluate_record(record) {
            Err(FossiError::Validation(e)) => assert_eq!(e.field, "wc"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(service.session().calculations(), 0);
    }

    #[test]
    fn test_evaluate_measurements_carries_indices() {
        let mut service = create_test_service();
        let m = Measurements {
            sex: Sex::Female,
            age: 62.0,
            bmi: 31.0,
            height_cm: 160.0,
            waist_cm: 98.0,
            triglycerides: 1.9,
            hdl: 1.0,
            lipid_unit: LipidUnit::MmolPerL,
            hypertension: true,
        };

        let assessment = service.evaluate_measurements(&m).expect("Should evaluate");
        let indices = assessment.indices.expect("Should carry indices");
        assert!((indices.cmi - 1.16375).abs() < 1e-9);
        assert_eq!(assessment.result.category, RiskCategory::High);
    }

    #[test]
    fn test_bad_threshold_file_fails_construction() {
        let source = ConfiguredThresholds::File(JsonThresholdFile::new("/nonexistent/thresholds.json"));
        assert!(matches!(
            CalculatorService::new(source),
            Err(FossiError::Config(ConfigError::Io { .. }))
        ));
    }

    #[test]
    fn test_reload_keeps_previous_table_on_failure() {
        let path = std::env::temp_dir().join(format!("fossi-reload-{}.json", std::process::id()));
        let json = serde_json::to_string(&ThresholdTable::published()).unwrap();
        std::fs::write(&path, json).unwrap();

        let mut service = CalculatorService::new(JsonThresholdFile::new(&path)).unwrap();
        std::fs::write(&path, "garbage").unwrap();

        assert!(service.reload_thresholds().is_err());
        assert_eq!(service.thresholds(), &ThresholdTable::published());
        let _ = std::fs::remove_file(path);
    }
}
