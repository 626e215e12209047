//! Error types for the catalog build pipeline.
//!
//! One error enum per pipeline stage:
//!
//! - [`CsvError`] - Source table loading and seeding errors
//! - [`ValidationError`] - Column, status and artifact schema checks
//! - [`TransformError`] - List / keyed-map transformation errors
//! - [`ArtifactError`] - JSON artifact writing and reading errors
//! - [`ConfigError`] - Configuration errors
//! - [`CollectError`] - Image acquisition errors
//! - [`PipelineError`] - Top-level per-entity errors
//!
//! Stage errors convert into [`PipelineError`] via `From`, so `?` works
//! across stage boundaries. [`PipelineError::kind`] maps any failure onto
//! the user-facing [`ErrorKind`] taxonomy.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Source Table Errors
// =============================================================================

/// Errors while reading (or seeding) a tabular source.
#[derive(Debug, Error)]
pub enum CsvError {
    /// The source table does not exist.
    #[error("Source table not found: {}", path.display())]
    SourceMissing { path: PathBuf },

    /// Failed to read or create the file.
    #[error("Failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to detect or decode the encoding.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Malformed row.
    #[error("Line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Failed to write a seed table.
    #[error("Failed to write '{}': {message}", path.display())]
    WriteError { path: PathBuf, message: String },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors raised by the schema validator.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more required columns are absent.
    #[error("Missing required column(s): {}", missing.join(", "))]
    SchemaInvalid { missing: Vec<String> },

    /// A status cell is outside {Halal, Haram, Mushbooh, Unknown}.
    #[error("Line {line}: invalid status value '{value}' (expected Halal, Haram, Mushbooh or Unknown)")]
    InvalidStatusValue { value: String, line: u64 },

    /// A document does not match its artifact schema.
    #[error("Artifact does not match schema: {}", errors.join("; "))]
    ArtifactSchema { errors: Vec<String> },
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors during list / keyed-map transformation.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The key column is not part of the table.
    #[error("Key column '{0}' not found")]
    MissingKeyColumn(String),

    /// A row has an empty identifier.
    #[error("Line {line}: empty value in key column '{key_field}'")]
    EmptyKey { key_field: String, line: u64 },
}

// =============================================================================
// Artifact Errors
// =============================================================================

/// Errors while writing or reading a JSON artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// IO error.
    #[error("Artifact IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("Artifact JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors building the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Country code is empty, too long or contains path characters.
    #[error("Invalid country code '{0}' (expected 1-16 letters, digits, '-' or '_')")]
    InvalidCountry(String),
}

// =============================================================================
// Image Acquisition Errors
// =============================================================================

/// Errors reported by an image downloader.
#[derive(Debug, Error)]
pub enum CollectError {
    /// A download request failed.
    #[error("Download failed for '{query}': {message}")]
    Download { query: String, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Error that aborts a single entity pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source loading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Artifact error.
    #[error("Output error: {0}")]
    Artifact(#[from] ArtifactError),
}

impl PipelineError {
    /// Classify the error for diagnostics and run reports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Csv(CsvError::SourceMissing { .. }) => ErrorKind::SourceMissing,
            PipelineError::Validation(ValidationError::SchemaInvalid { .. }) => {
                ErrorKind::SchemaInvalid
            }
            PipelineError::Validation(ValidationError::InvalidStatusValue { .. }) => {
                ErrorKind::InvalidStatusValue
            }
            _ => ErrorKind::ProcessingError,
        }
    }
}

/// User-facing failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    SourceMissing,
    SchemaInvalid,
    InvalidStatusValue,
    ProcessingError,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source table operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
