//! Risk categories and the cut-point tables that assign them.

use serde::{Deserialize, Serialize};

use super::patient::Sex;

/// Risk category reported alongside a FOSSI score.
///
/// FOSSI-F is stratified into four bands; FOSSI-M only separates a grey
/// zone from the high-risk group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Low,
    Intermediate,
    High,
    VeryHigh,
    GreyZone,
    HighOrVeryHigh,
}

impl RiskCategory {
    /// Categories that may appear in the table for `sex`.
    #[must_use]
    pub fn allowed_for(sex: Sex) -> &'static [RiskCategory] {
        match sex {
            Sex::Female => &[Self::Low, Self::Intermediate, Self::High, Self::VeryHigh],
            Sex::Male => &[Self::GreyZone, Self::HighOrVeryHigh],
        }
    }

    /// Clinical interpretation shown with the result.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Metabolically quiescent; FO prevalence ~12%.",
            Self::Intermediate => "Early metabolic priming; bone status variable.",
            Self::High => "High-risk metabolic footprint; trabecular damage likely.",
            Self::VeryHigh => {
                "Near-certain FO; severe metabolic burden; trabecular deterioration."
            }
            Self::GreyZone => "Baseline FO prevalence ~17%; monitor closely.",
            Self::HighOrVeryHigh => {
                "Full FO phenotype; pronounced metabolic overload and trabecular decline."
            }
        }
    }

    /// Display colour (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129), // Emerald
            Self::Intermediate | Self::GreyZone => (251, 191, 36), // Amber
            Self::High => (249, 115, 22), // Orange
            Self::VeryHigh | Self::HighOrVeryHigh => (244, 63, 94), // Rose
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Intermediate => write!(f, "Intermediate"),
            Self::High => write!(f, "High"),
            Self::VeryHigh => write!(f, "Very High"),
            Self::GreyZone => write!(f, "Grey zone"),
            Self::HighOrVeryHigh => write!(f, "High/Very High"),
        }
    }
}

/// Errors raised while validating a threshold table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("{sex} table has no bands")]
    Empty { sex: Sex },

    #[error("{sex} band {index} has a non-finite upper bound")]
    NonFinite { sex: Sex, index: usize },

    #[error("{sex} band {index} upper bound {upper} does not exceed the previous bound")]
    NotIncreasing { sex: Sex, index: usize, upper: f64 },

    #[error("{sex} table must end with exactly one unbounded band")]
    Unbounded { sex: Sex },

    #[error("category {category} is not valid for {sex}")]
    WrongCategory { sex: Sex, category: RiskCategory },
}

/// One row of a cut-point table.
///
/// The band's lower bound is the previous band's upper bound. `upper = None`
/// marks the final, open-ended band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub category: RiskCategory,
    pub upper: Option<f64>,
    /// Whether a score equal to `upper` still belongs to this band.
    #[serde(default)]
    pub upper_inclusive: bool,
}

impl ThresholdBand {
    #[must_use]
    pub const fn below(upper: f64, category: RiskCategory) -> Self {
        Self {
            category,
            upper: Some(upper),
            upper_inclusive: false,
        }
    }

    #[must_use]
    pub const fn up_to(upper: f64, category: RiskCategory) -> Self {
        Self {
            category,
            upper: Some(upper),
            upper_inclusive: true,
        }
    }

    #[must_use]
    pub const fn rest(category: RiskCategory) -> Self {
        Self {
            category,
            upper: None,
            upper_inclusive: false,
        }
    }

    fn admits(&self, score: f64) -> bool {
        match self.upper {
            None => true,
            Some(upper) if self.upper_inclusive => score <= upper,
            Some(upper) => score < upper,
        }
    }
}

/// Cut points for both sexes.
///
/// Deserialization goes through [`ThresholdTable::new`], so every table in
/// hand has passed [`ThresholdTable::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdBands")]
pub struct ThresholdTable {
    female: Vec<ThresholdBand>,
    male: Vec<ThresholdBand>,
}

/// Unchecked band lists as read from a document.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ThresholdBands {
    female: Vec<ThresholdBand>,
    male: Vec<ThresholdBand>,
}

impl TryFrom<ThresholdBands> for ThresholdTable {
    type Error = ThresholdError;

    fn try_from(bands: ThresholdBands) -> Result<Self, Self::Error> {
        Self::new(bands.female, bands.male)
    }
}

impl ThresholdTable {
    /// Build a table, checking ordering and coverage of both band lists.
    ///
    /// # Errors
    /// Returns the first structural problem found.
    pub fn new(female: Vec<ThresholdBand>, male: Vec<ThresholdBand>) -> Result<Self, ThresholdError> {
        let table = Self { female, male };
        table.validate()?;
        Ok(table)
    }

    /// Cut points published with the FOSSI equations.
    ///
    /// Women: <5.84 Low, 5.84-7.88 Intermediate, 7.89-9.58 High, >9.58 Very High.
    /// Men: <0.71 Grey zone, >=0.71 High/Very High.
    #[must_use]
    pub fn published() -> Self {
        Self {
            female: vec![
                ThresholdBand::below(5.84, RiskCategory::Low),
                ThresholdBand::up_to(7.88, RiskCategory::Intermediate),
                ThresholdBand::up_to(9.58, RiskCategory::High),
                ThresholdBand::rest(RiskCategory::VeryHigh),
            ],
            male: vec![
                ThresholdBand::below(0.71, RiskCategory::GreyZone),
                ThresholdBand::rest(RiskCategory::HighOrVeryHigh),
            ],
        }
    }

    #[must_use]
    pub fn bands(&self, sex: Sex) -> &[ThresholdBand] {
        match sex {
            Sex::Female => &self.female,
            Sex::Male => &self.male,
        }
    }

    /// Map a score to its category.
    ///
    /// Always returns a category for a validated table since the last band
    /// is unbounded.
    #[must_use]
    pub fn classify(&self, sex: Sex, score: f64) -> RiskCategory {
        let bands = self.bands(sex);
        bands
            .iter()
            .find(|band| band.admits(score))
            .or_else(|| bands.last())
            .map(|band| band.category)
            .unwrap_or(RiskCategory::allowed_for(sex)[0])
    }

    /// Human-readable score range for each band, e.g. `< 5.84`, `5.84 to 7.88`
    /// or `> 7.88 to 9.58`. A bound that belongs to the neighbouring band is
    /// marked with `>` or `<`.
    #[must_use]
    pub fn range_labels(&self, sex: Sex) -> Vec<(RiskCategory, String)> {
        let mut lower: Option<(f64, bool)> = None;
        let mut labels = Vec::new();

        for band in self.bands(sex) {
            let label = match (lower, band.upper) {
                (None, Some(upper)) => {
                    format!("{} {upper:.2}", if band.upper_inclusive { "≤" } else { "<" })
                }
                (Some((lo, prev_inclusive)), None) => {
                    format!("{} {lo:.2}", if prev_inclusive { ">" } else { "≥" })
                }
                (Some((lo, prev_inclusive)), Some(upper)) => format!(
                    "{}{lo:.2} to {}{upper:.2}",
                    if prev_inclusive { "> " } else { "" },
                    if band.upper_inclusive { "" } else { "< " },
                ),
                (None, None) => "any".to_string(),
            };
            labels.push((band.category, label));
            lower = band.upper.map(|u| (u, band.upper_inclusive));
        }

        labels
    }

    /// # Errors
    /// Returns the first structural problem found.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        validate_bands(Sex::Female, &self.female)?;
        validate_bands(Sex::Male, &self.male)
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::published()
    }
}

fn validate_bands(sex: Sex, bands: &[ThresholdBand]) -> Result<(), ThresholdError> {
    let Some((last, bounded)) = bands.split_last() else {
        return Err(ThresholdError::Empty { sex });
    };

    if last.upper.is_some() || bounded.iter().any(|b| b.upper.is_none()) {
        return Err(ThresholdError::Unbounded { sex });
    }

    let allowed = RiskCategory::allowed_for(sex);
    if let Some(band) = bands.iter().find(|b| !allowed.contains(&b.category)) {
        return Err(ThresholdError::WrongCategory {
            sex,
            category: band.category,
        });
    }

    let mut previous: Option<f64> = None;
    for (index, band) in bounded.iter().enumerate() {
        let upper = band.upper.unwrap_or(f64::INFINITY);
        if !upper.is_finite() {
            return Err(ThresholdError::NonFinite { sex, index });
        }
        if previous.is_some_and(|p| upper <= p) {
            return Err(ThresholdError::NotIncreasing { sex, index, upper });
        }
        previous = Some(upper);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_table_is_valid() {
        assert!(ThresholdTable::published().validate().is_ok());
    }

    #[test]
    fn test_female_boundaries() {
        let t = ThresholdTable::published();
        assert_eq!(t.classify(Sex::Female, 4.3763), RiskCategory::Low);
        assert_eq!(t.classify(Sex::Female, 5.839), RiskCategory::Low);
        assert_eq!(t.classify(Sex::Female, 5.84), RiskCategory::Intermediate);
        assert_eq!(t.classify(Sex::Female, 7.88), RiskCategory::Intermediate);
        assert_eq!(t.classify(Sex::Female, 7.89), RiskCategory::High);
        assert_eq!(t.classify(Sex::Female, 9.58), RiskCategory::High);
        assert_eq!(t.classify(Sex::Female, 9.581), RiskCategory::VeryHigh);
        assert_eq!(t.classify(Sex::Female, -30.0), RiskCategory::Low);
    }

    #[test]
    fn test_range_labels() {
        let t = ThresholdTable::published();
        let female: Vec<String> = t.range_labels(Sex::Female).into_iter().map(|(_, l)| l).collect();
        assert_eq!(female, vec!["< 5.84", "5.84 to 7.88", "> 7.88 to 9.58", "> 9.58"]);

        let male = t.range_labels(Sex::Male);
        assert_eq!(male[0], (RiskCategory::GreyZone, "< 0.71".to_string()));
        assert_eq!(male[1], (RiskCategory::HighOrVeryHigh, "≥ 0.71".to_string()));
    }

    #[test]
    fn test_male_boundaries() {
        let t = ThresholdTable::published();
        assert_eq!(t.classify(Sex::Male, 0.2213), RiskCategory::GreyZone);
        assert_eq!(t.classify(Sex::Male, 0.709), RiskCategory::GreyZone);
        assert_eq!(t.classify(Sex::Male, 0.71), RiskCategory::HighOrVeryHigh);
        assert_eq!(t.classify(Sex::Male, 5.0), RiskCategory::HighOrVeryHigh);
    }

    #[test]
    fn test_rejects_unordered_bands() {
        let err = ThresholdTable::new(
            vec![
                ThresholdBand::below(7.0, RiskCategory::Low),
                ThresholdBand::below(6.0, RiskCategory::Intermediate),
                ThresholdBand::rest(RiskCategory::High),
            ],
            ThresholdTable::published().male.clone(),
        )
        .unwrap_err();
        assert!(matches!(err, ThresholdError::NotIncreasing { index: 1, .. }));
    }

    #[test]
    fn test_rejects_missing_open_band() {
        let err = ThresholdTable::new(
            ThresholdTable::published().female.clone(),
            vec![ThresholdBand::below(0.71, RiskCategory::GreyZone)],
        )
        .unwrap_err();
        assert_eq!(err, ThresholdError::Unbounded { sex: Sex::Male });
    }

    #[test]
    fn test_rejects_empty_and_wrong_category() {
        let err = ThresholdTable::new(vec![], ThresholdTable::published().male.clone()).unwrap_err();
        assert_eq!(err, ThresholdError::Empty { sex: Sex::Female });

        let err = ThresholdTable::new(
            ThresholdTable::published().female.clone(),
            vec![ThresholdBand::rest(RiskCategory::Low)],
        )
        .unwrap_err();
        assert!(matches!(err, ThresholdError::WrongCategory { sex: Sex::Male, .. }));
    }

    #[test]
    fn test_rejects_non_finite_bound() {
        let err = ThresholdTable::new(
            vec![
                ThresholdBand::below(f64::NAN, RiskCategory::Low),
                ThresholdBand::rest(RiskCategory::High),
            ],
            ThresholdTable::published().male.clone(),
        )
        .unwrap_err();
        assert_eq!(err, ThresholdError::NonFinite { sex: Sex::Female, index: 0 });
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "female": [
                {"category": "low", "upper": 6.0},
                {"category": "very_high", "upper": null}
            ],
            "male": [
                {"category": "grey_zone", "upper": 1.0, "upper_inclusive": true},
                {"category": "high_or_very_high", "upper": null}
            ]
        }"#;
        let table: ThresholdTable = serde_json::from_str(json).expect("Should parse");
        assert!(table.validate().is_ok());
        assert_eq!(table.classify(Sex::Male, 1.0), RiskCategory::GreyZone);
        assert_eq!(table.classify(Sex::Female, 6.0), RiskCategory::VeryHigh);
    }

    #[test]
    fn test_range_labels_follow_classify_at_shared_bounds() {
        let t = ThresholdTable::new(
            vec![
                ThresholdBand::up_to(5.0, RiskCategory::Low),
                ThresholdBand::below(8.0, RiskCategory::Intermediate),
                ThresholdBand::rest(RiskCategory::High),
            ],
            ThresholdTable::published().male.clone(),
        )
        .unwrap();
        let labels: Vec<String> = t.range_labels(Sex::Female).into_iter().map(|(_, l)| l).collect();
        assert_eq!(labels, vec!["≤ 5.00", "> 5.00 to < 8.00", "≥ 8.00"]);
        assert_eq!(t.classify(Sex::Female, 5.0), RiskCategory::Low);
        assert_eq!(t.classify(Sex::Female, 8.0), RiskCategory::High);
    }

    #[test]
    fn test_deserialize_rejects_invalid_table() {
        // Bounded last band: scores above 6.0 would have no category
        let json = r#"{
            "female": [{"category": "low", "upper": 6.0}],
            "male": [{"category": "grey_zone", "upper": null}]
        }"#;
        let err = serde_json::from_str::<ThresholdTable>(json).unwrap_err();
        assert!(err.to_string().contains("Female table must end"), "{err}");

        let json = r#"{
            "female": [
                {"category": "high", "upper": 9.0},
                {"category": "low", "upper": 4.0},
                {"category": "very_high", "upper": null}
            ],
            "male": [{"category": "grey_zone", "upper": null}]
        }"#;
        assert!(serde_json::from_str::<ThresholdTable>(json).is_err());
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(RiskCategory::VeryHigh.to_string(), "Very High");
        assert_eq!(RiskCategory::HighOrVeryHigh.to_string(), "High/Very High");
    }
}
