//! # TBYN - per-country halal classification catalogs
//!
//! Builds the lookup data used by the TBYN scanner: hand-maintained CSV
//! tables of products and additives become two JSON artifacts per country.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV table  │────▶│   Parser    │────▶│  Validate   │────▶│  Transform  │────▶ JSON artifact
//! │ (UTF8/EUCKR)│     │  (auto-enc) │     │ (cols+status│     │ (list / map)│     (products.json,
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘      additives.json)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tbyn::{run_all, CatalogConfig, RunOptions};
//!
//! let config = CatalogConfig::from_env()?;
//! let reports = run_all(&config, &RunOptions::default());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per pipeline stage
//! - [`models`] - Status, product and additive records
//! - [`config`] - Data directory and country codes
//! - [`parser`] - CSV loading with auto-detection
//! - [`validation`] - Column, status and artifact schema checks
//! - [`transform`] - Entity descriptors, list/keyed transforms, pipeline
//! - [`artifact`] - Deterministic JSON writer
//! - [`seed`] - Seed tables for new countries
//! - [`collect`] - Image acquisition plan
//! - [`lookup`] - Queries over published catalogs
//! - [`logs`] - Progress logging

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Transformation
pub mod transform;

// Output
pub mod artifact;
pub mod seed;

// Collaborators and clients
pub mod collect;
pub mod lookup;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ArtifactError, CollectError, ConfigError, CsvError, ErrorKind, PipelineError,
    TransformError, ValidationError,
};

// =============================================================================
// Re-exports - Models & Config
// =============================================================================

pub use config::{CatalogConfig, CountryCode};
pub use models::{AdditiveRecord, EntityKind, ProductEntry, ProductRecord, Status};

// =============================================================================
// Re-exports - Parsing & Validation
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, load_table, parse_bytes_auto,
    parse_table, Row, Table,
};

pub use validation::{
    artifact_schema, is_valid, normalize_status_column, require_columns, validate,
    validate_artifact,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    build_entity, rows_to_keyed_map, rows_to_list, run_all, run_country, run_entity,
    seed_sources, transform, CountryReport, EntityDescriptor, EntityOutcome, EntityReport,
    EntityRun, KeyedMap, MissingPolicy, RunOptions, TransformMode, Transformed,
};

pub use artifact::{read_artifact, to_artifact_string, write_artifact};
pub use seed::seed_if_missing;

// =============================================================================
// Re-exports - Clients
// =============================================================================

pub use collect::{collect_images, CollectionPlan, DownloadRequest, ImageDownloader, PlanOnly};
pub use lookup::{clean_ocr_text, Catalog, ProductVerdict, ScanMatch};
