//! Field-level validation errors for patient input.

use std::fmt;

/// The rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Required for the selected sex but not supplied.
    Missing,
    /// Could not be read as a number.
    NotNumeric,
    /// NaN or infinite.
    NotFinite,
    /// Must be strictly greater than the bound.
    GreaterThan(f64),
    /// Must be greater than or equal to the bound.
    AtLeast(f64),
    /// Must lie in the open interval `(min, max)`.
    Between { min: f64, max: f64 },
    /// Must lie in the closed interval `[min, max]`.
    Within { min: f64, max: f64 },
    /// Must be exactly 0 or 1.
    Indicator,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "is required"),
            Self::NotNumeric => write!(f, "must be a number"),
            Self::NotFinite => write!(f, "must be a finite number"),
            Self::GreaterThan(min) => write!(f, "must be greater than {min}"),
            Self::AtLeast(min) => write!(f, "must be at least {min}"),
            Self::Between { min, max } => write!(f, "must be between {min} and {max} (exclusive)"),
            Self::Within { min, max } => write!(f, "must be between {min} and {max}"),
            Self::Indicator => write!(f, "must be 0 or 1"),
        }
    }
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} {constraint}")]
pub struct ValidationError {
    /// Name of the offending field (`age`, `vai`, `wc`, ...).
    pub field: &'static str,
    /// The rule it violated.
    pub constraint: Constraint,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &'static str, constraint: Constraint) -> Self {
        Self { field, constraint }
    }

    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self::new(field, Constraint::Missing)
    }
}

/// Check a value against a constraint, rejecting NaN and infinities first.
///
/// # Errors
/// Returns a `ValidationError` naming `field` when the check fails.
pub fn check(field: &'static str, value: f64, constraint: Constraint) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, Constraint::NotFinite));
    }

    let ok = match constraint {
        Constraint::Missing | Constraint::NotNumeric | Constraint::NotFinite => true,
        Constraint::GreaterThan(min) => value > min,
        Constraint::AtLeast(min) => value >= min,
        Constraint::Between { min, max } => value > min && value < max,
        Constraint::Within { min, max } => (min..=max).contains(&value),
        Constraint::Indicator => value == 0.0 || value == 1.0,
    };

    if ok {
        Ok(value)
    } else {
        Err(ValidationError::new(field, constraint))
    }
}

/// Unwrap an optional field or report it as missing.
///
/// # Errors
/// Returns `Constraint::Missing` for `field` when `value` is `None`.
pub fn require<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::missing(field))
}

/// Parse free text (form or CLI input) into a number.
///
/// # Errors
/// Returns `Constraint::Missing` for blank text and `Constraint::NotNumeric`
/// when the text does not parse.
pub fn parse_number(field: &'static str, text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing(field));
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| ValidationError::new(field, Constraint::NotNumeric))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rejects_non_finite() {
        let err = check("bmi", f64::NAN, Constraint::GreaterThan(0.0)).unwrap_err();
        assert_eq!(err.field, "bmi");
        assert_eq!(err.constraint, Constraint::NotFinite);

        let err = check("bmi", f64::INFINITY, Constraint::GreaterThan(0.0)).unwrap_err();
        assert_eq!(err.constraint, Constraint::NotFinite);
    }

    #[test]
    fn test_check_bounds() {
        assert!(check("age", 50.0, Constraint::Between { min: 0.0, max: 130.0 }).is_ok());
        assert!(check("age", 0.0, Constraint::Between { min: 0.0, max: 130.0 }).is_err());
        assert!(check("age", 130.0, Constraint::Between { min: 0.0, max: 130.0 }).is_err());
        assert!(check("cmi", 0.0, Constraint::AtLeast(0.0)).is_ok());
        assert!(check("cmi", -0.1, Constraint::AtLeast(0.0)).is_err());
        assert!(check("height", 220.0, Constraint::Within { min: 120.0, max: 220.0 }).is_ok());
    }

    #[test]
    fn test_indicator() {
        assert!(check("hypertension", 1.0, Constraint::Indicator).is_ok());
        assert!(check("hypertension", 0.0, Constraint::Indicator).is_ok());
        assert!(check("hypertension", 0.5, Constraint::Indicator).is_err());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("age", " 62 ").unwrap(), 62.0);
        assert_eq!(parse_number("age", "").unwrap_err().constraint, Constraint::Missing);
        assert_eq!(
            parse_number("age", "sixty").unwrap_err().constraint,
            Constraint::NotNumeric
        );
    }

    #[test]
    fn test_error_message_names_field() {
        let err = ValidationError::new("age", Constraint::Between { min: 0.0, max: 130.0 });
        assert_eq!(err.to_string(), "age must be between 0 and 130 (exclusive)");
        assert_eq!(ValidationError::missing("vai").to_string(), "vai is required");
    }
}
