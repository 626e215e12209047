//! Entity descriptors.
//!
//! The catalog pipeline is one engine; what differs between products and
//! additives is data: file names, required columns, status column, target
//! shape and what to do when the source table is missing.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::TransformMode;
use crate::models::EntityKind;

/// What to do when an entity's source table does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Optional entity: report and move on.
    Skip,
    /// Required entity: fail this entity, siblings still run.
    Abort,
}

/// Configuration of one entity pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    /// Source table file name inside the country directory
    pub source_file: &'static str,
    /// Artifact file name inside the country directory
    pub artifact_file: &'static str,
    /// Columns that must exist in the source header
    pub required_columns: &'static [&'static str],
    /// Column validated against the closed status set, if present
    pub status_column: Option<&'static str>,
    pub mode: TransformMode,
    pub on_missing: MissingPolicy,
}

impl EntityDescriptor {
    /// `products.csv` -> `products.json`, keyed by `id`, optional.
    pub fn products() -> Self {
        Self {
            kind: EntityKind::Products,
            source_file: "products.csv",
            artifact_file: "products.json",
            required_columns: &["id"],
            status_column: Some("status"),
            mode: TransformMode::KeyedMap {
                key_field: "id".to_string(),
            },
            on_missing: MissingPolicy::Skip,
        }
    }

    /// `ingredients.csv` -> `additives.json`, ordered list, required.
    pub fn additives() -> Self {
        Self {
            kind: EntityKind::Additives,
            source_file: "ingredients.csv",
            artifact_file: "additives.json",
            required_columns: &["code", "name_local", "status"],
            status_column: Some("status"),
            mode: TransformMode::List,
            on_missing: MissingPolicy::Abort,
        }
    }

    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Products => Self::products(),
            EntityKind::Additives => Self::additives(),
        }
    }

    /// Descriptors in processing order.
    pub fn all() -> Vec<Self> {
        vec![Self::products(), Self::additives()]
    }

    pub fn source_path(&self, country_dir: &Path) -> PathBuf {
        country_dir.join(self.source_file)
    }

    pub fn artifact_path(&self, country_dir: &Path) -> PathBuf {
        country_dir.join(self.artifact_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_paths() {
        let dir = Path::new("data/KR");
        let products = EntityDescriptor::products();
        assert_eq!(products.source_path(dir), PathBuf::from("data/KR/products.csv"));
        assert_eq!(products.artifact_path(dir), PathBuf::from("data/KR/products.json"));

        let additives = EntityDescriptor::additives();
        assert_eq!(additives.source_path(dir), PathBuf::from("data/KR/ingredients.csv"));
        assert_eq!(additives.artifact_path(dir), PathBuf::from("data/KR/additives.json"));
    }

    #[test]
    fn test_missing_policies() {
        assert_eq!(EntityDescriptor::products().on_missing, MissingPolicy::Skip);
        assert_eq!(EntityDescriptor::additives().on_missing, MissingPolicy::Abort);
    }

    #[test]
    fn test_processing_order() {
        let kinds: Vec<EntityKind> = EntityDescriptor::all().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Products, EntityKind::Additives]);
        assert_eq!(EntityDescriptor::for_kind(EntityKind::Additives).mode, TransformMode::List);
    }
}
