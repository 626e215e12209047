//! Catalog build pipeline.
//!
//! One engine runs every entity: load → check columns → check statuses →
//! transform → check artifact schema → write. Each country runs the product
//! and additive pipelines independently; a failing entity never stops its
//! sibling or the next country.
//!
//! # Example
//!
//! ```rust,ignore
//! use tbyn::{run_all, CatalogConfig, RunOptions};
//!
//! let config = CatalogConfig::from_env()?;
//! for report in run_all(&config, &RunOptions::default()) {
//!     println!("{}: {} failure(s)", report.country, report.failures());
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::entity::{EntityDescriptor, MissingPolicy};
use super::transform;
use crate::artifact::write_artifact;
use crate::config::{CatalogConfig, CountryCode};
use crate::error::{ErrorKind, PipelineError, PipelineResult};
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::models::EntityKind;
use crate::parser::load_table;
use crate::seed::seed_if_missing;
use crate::validation::{normalize_status_column, require_columns, validate_artifact};

/// Options for a pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Write seed tables for sources that do not exist yet
    pub seed_missing: bool,
}

/// Successful entity build
#[derive(Debug, Clone, Serialize)]
pub struct EntityRun {
    pub artifact: PathBuf,
    pub records: usize,
    pub duplicate_keys: Vec<String>,
}

/// What happened to one entity
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntityOutcome {
    Written {
        artifact: PathBuf,
        records: usize,
        duplicate_keys: Vec<String>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        kind: ErrorKind,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityReport {
    pub entity: EntityKind,
    #[serde(flatten)]
    pub outcome: EntityOutcome,
}

impl EntityReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, EntityOutcome::Failed { .. })
    }
}

/// Outcome of all entity pipelines for one country
#[derive(Debug, Clone, Serialize)]
pub struct CountryReport {
    pub country: CountryCode,
    pub entities: Vec<EntityReport>,
}

impl CountryReport {
    pub fn failures(&self) -> usize {
        self.entities.iter().filter(|e| e.is_failure()).count()
    }

    pub fn entity(&self, kind: EntityKind) -> Option<&EntityReport> {
        self.entities.iter().find(|e| e.entity == kind)
    }
}

/// Build one entity's artifact inside `country_dir`.
///
/// Nothing is written unless every check passes.
pub fn build_entity(
    country_dir: &Path,
    descriptor: &EntityDescriptor,
) -> PipelineResult<EntityRun> {
    let source = descriptor.source_path(country_dir);
    log_info(format!("📖 Reading {}...", source.display()));

    let mut table = load_table(&source)?;
    log_success(format!(
        "Read {} rows ({} columns, {}, delimiter '{}')",
        table.len(),
        table.headers.len(),
        table.encoding,
        format_delimiter(table.delimiter)
    ));

    require_columns(&table, descriptor.required_columns)?;
    if let Some(column) = descriptor.status_column {
        normalize_status_column(&mut table, column)?;
    }

    let transformed = transform(table.rows, &descriptor.mode)?;
    if !transformed.duplicate_keys.is_empty() {
        log_warning(format!(
            "{} duplicate id(s), later rows replaced earlier ones:",
            transformed.duplicate_keys.len()
        ));
        for line in duplicate_listing(&transformed.duplicate_keys) {
            log_info_indent(line, 1);
        }
    }

    validate_artifact(descriptor.kind, &transformed.document)?;

    let artifact = descriptor.artifact_path(country_dir);
    write_artifact(&artifact, &transformed.document)?;
    log_success(format!(
        "✅ Generated {} (Size: {} items)",
        artifact.display(),
        transformed.records
    ));

    Ok(EntityRun {
        artifact,
        records: transformed.records,
        duplicate_keys: transformed.duplicate_keys,
    })
}

/// Run one entity, turning any failure into a report entry.
pub fn run_entity(country_dir: &Path, descriptor: &EntityDescriptor) -> EntityReport {
    let outcome = match build_entity(country_dir, descriptor) {
        Ok(run) => EntityOutcome::Written {
            artifact: run.artifact,
            records: run.records,
            duplicate_keys: run.duplicate_keys,
        },
        Err(err) => classify_failure(descriptor, err),
    };

    EntityReport {
        entity: descriptor.kind,
        outcome,
    }
}

fn classify_failure(descriptor: &EntityDescriptor, err: PipelineError) -> EntityOutcome {
    let kind = err.kind();
    if kind == ErrorKind::SourceMissing && descriptor.on_missing == MissingPolicy::Skip {
        log_warning(format!("Skipping {}: {}", descriptor.kind, err));
        return EntityOutcome::Skipped {
            reason: err.to_string(),
        };
    }

    log_error(format!("{} aborted: {}", descriptor.kind, err));
    EntityOutcome::Failed {
        kind,
        message: err.to_string(),
    }
}

/// Run every entity pipeline for one country.
pub fn run_country(
    config: &CatalogConfig,
    country: &CountryCode,
    options: &RunOptions,
) -> CountryReport {
    let country_dir = config.country_dir(country);
    log_info(format!("🌏 Country {} ({})", country, country_dir.display()));

    let descriptors = EntityDescriptor::all();

    if options.seed_missing {
        seed_sources(&country_dir, &descriptors);
    }

    let entities = descriptors
        .iter()
        .map(|descriptor| run_entity(&country_dir, descriptor))
        .collect();

    CountryReport {
        country: country.clone(),
        entities,
    }
}

/// Run every configured country in order.
pub fn run_all(config: &CatalogConfig, options: &RunOptions) -> Vec<CountryReport> {
    config
        .countries
        .iter()
        .map(|country| run_country(config, country, options))
        .collect()
}

/// Write seed tables for missing sources. Returns the kinds that were seeded.
pub fn seed_sources(country_dir: &Path, descriptors: &[EntityDescriptor]) -> Vec<EntityKind> {
    let mut seeded = Vec::new();
    for descriptor in descriptors {
        let source = descriptor.source_path(country_dir);
        match seed_if_missing(&source, descriptor.kind) {
            Ok(true) => {
                log_warning(format!("{} not found. Created a template.", source.display()));
                seeded.push(descriptor.kind);
            }
            Ok(false) => {}
            Err(err) => log_error(format!(
                "Could not create template {}: {}",
                source.display(),
                err
            )),
        }
    }
    seeded
}

/// Duplicate ids shown in the run log.
const DUPLICATES_SHOWN: usize = 5;

/// Bullet lines for the duplicate-id warning, with a count of the rest.
fn duplicate_listing(keys: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = keys
        .iter()
        .take(DUPLICATES_SHOWN)
        .map(|key| format!("• {}", key))
        .collect();
    if keys.len() > DUPLICATES_SHOWN {
        lines.push(format!("… and {} more", keys.len() - DUPLICATES_SHOWN));
    }
    lines
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
