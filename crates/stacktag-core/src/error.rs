//! Error types for the stacktag tagging pipeline.
//!
//! Errors are organized by concern (configuration, model fitting/inference,
//! dataset loading, artifact persistence) so callers get actionable messages
//! that name the offending parameter, dimension, or file.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for stacktag operations.
#[derive(Error, Debug)]
pub enum TaggerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model fitting or inference errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Dataset loading errors
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Artifact persistence errors
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while fitting or applying the encoder, vectorizer, or classifier.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A hyperparameter is out of range for the data it is fitted on
    #[error("Invalid hyperparameter {name}: {message}")]
    InvalidHyperparameter { name: &'static str, message: String },

    /// Vector width does not match the fitted space
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Feature rows and label rows disagree in count
    #[error("Sample count mismatch: {features} feature rows vs {labels} label rows")]
    SampleMismatch { features: usize, labels: usize },

    /// Fitting on nothing leaves the model undefined
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),
}

/// Dataset loading errors.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// CSV reader failure (I/O or malformed record)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    /// Sampling or split fraction outside its valid range
    #[error("Invalid {name} {value}: {message}")]
    InvalidFraction {
        name: &'static str,
        value: f64,
        message: &'static str,
    },

    /// Not enough rows to perform the requested operation
    #[error("Dataset too small: {0}")]
    TooSmall(String),
}

/// Artifact persistence errors.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// No artifact stored under this name
    #[error("Artifact not found: {0}")]
    NotFound(PathBuf),

    /// Reading the artifact failed
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or renaming the artifact failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the artifact failed
    #[error("Failed to encode artifact '{name}': {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Deserializing the artifact failed
    #[error("Failed to decode artifact '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Artifact was written by an incompatible store format
    #[error("Unsupported format version {found} for '{name}' (expected {expected})")]
    UnsupportedFormat {
        name: String,
        found: u32,
        expected: u32,
    },

    /// Stored payload does not match the recorded checksum
    #[error("Checksum mismatch for '{name}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

/// Convenience type alias for stacktag results.
pub type Result<T> = std::result::Result<T, TaggerError>;

/// Convenience type alias for model-specific results.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
