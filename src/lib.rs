//! # FOSSI
//!
//! Fast Ossifier Stratification Index calculator for Diffuse Idiopathic
//! Skeletal Hyperostosis (DISH).
//!
//! This crate provides:
//! - The sex-specific FOSSI-F / FOSSI-M equations and risk categories
//! - CMI/VAI derivation from raw waist, height and lipid measurements
//! - Terminal UI and one-shot command line for local use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Inputs, equations, categories (pure)
//! - `ports`: Trait for the cut-point source
//! - `adapters`: Published/JSON thresholds, log redaction
//! - `application`: Calculator service orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{
    evaluate_fossi, FemaleInput, MaleInput, PatientInput, RiskCategory, ScoreResult, Sex,
    ThresholdTable, ValidationError,
};

/// Result type for FOSSI operations
pub type Result<T> = std::result::Result<T, FossiError>;

/// Main error type for FOSSI
#[derive(Debug, thiserror::Error)]
pub enum FossiError {
    #[error("Invalid patient data: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error("Threshold configuration error: {0}")]
    Config(#[from] adapters::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
