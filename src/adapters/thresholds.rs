//! Threshold adapters: built-in published cut points and JSON files.

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use crate::domain::{ThresholdBands, ThresholdError, ThresholdTable};
use crate::ports::ThresholdSource;

/// Error type for threshold configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read threshold file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed threshold file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid threshold table: {0}")]
    Invalid(#[from] ThresholdError),
}

impl From<Infallible> for ConfigError {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

/// The cut points published with the FOSSI equations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishedThresholds;

impl ThresholdSource for PublishedThresholds {
    type Error = Infallible;

    fn load(&self) -> Result<ThresholdTable, Self::Error> {
        Ok(ThresholdTable::published())
    }

    fn describe(&self) -> String {
        "published cut points".to_string()
    }
}

/// A threshold table read from a JSON document.
///
/// Expected shape:
///
/// ```json
/// {
///   "female": [{"category": "low", "upper": 5.84}, ..., {"category": "very_high", "upper": null}],
///   "male":   [{"category": "grey_zone", "upper": 0.71}, {"category": "high_or_very_high", "upper": null}]
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonThresholdFile {
    path: PathBuf,
}

impl JsonThresholdFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ThresholdSource for JsonThresholdFile {
    type Error = ConfigError;

    fn load(&self) -> Result<ThresholdTable, Self::Error> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        // Parse the raw bands first so a structural problem is reported as
        // `Invalid` rather than as a JSON syntax error.
        let bands: ThresholdBands = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let table = ThresholdTable::try_from(bands)?;
        tracing::debug!("Loaded threshold table from {:?}", self.path);
        Ok(table)
    }

    fn describe(&self) -> String {
        format!("threshold file {}", self.path.display())
    }
}

/// Either source, chosen at startup from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredThresholds {
    Published(PublishedThresholds),
    File(JsonThresholdFile),
}

impl ConfiguredThresholds {
    /// Use `path` when given, otherwise the published cut points.
    #[must_use]
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::File(JsonThresholdFile::new(p)),
            None => Self::Published(PublishedThresholds),
        }
    }
}

impl ThresholdSource for ConfiguredThresholds {
    type Error = ConfigError;

    fn load(&self) -> Result<ThresholdTable, Self::Error> {
        match self {
            Self::Published(p) => Ok(p.load()?),
            Self::File(f) => f.load(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Published(p) => p.describe(),
            Self::File(f) => f.describe(),
        }
    }
}
