//! Transformation module.
//!
//! Turns validated rows into the document published for an entity:
//! - Entity: descriptors for the product and additive catalogs
//! - Keyed: rows to a map indexed by an identifier column
//! - Pipeline: per-entity pipeline and per-country orchestration

pub mod entity;
pub mod keyed;
pub mod pipeline;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransformResult;
use crate::parser::Row;

pub use entity::{EntityDescriptor, MissingPolicy};
pub use keyed::{rows_to_keyed_map, KeyedMap};
pub use pipeline::*;

/// Target shape of an entity's artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TransformMode {
    /// Ordered array of records, one per source row.
    List,
    /// Object indexed by `key_field`; the key column is dropped from the values.
    KeyedMap { key_field: String },
}

/// Output of a transformation, ready to be written.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub document: Value,
    /// Number of records in the document.
    pub records: usize,
    /// Keys that appeared on more than one row (keyed-map mode only).
    pub duplicate_keys: Vec<String>,
}

/// Rows to an ordered list of records. No deduplication.
pub fn rows_to_list(rows: Vec<Row>) -> Vec<Value> {
    rows.into_iter().map(|row| Value::Object(row.fields)).collect()
}

/// Transform rows according to the mode.
pub fn transform(rows: Vec<Row>, mode: &TransformMode) -> TransformResult<Transformed> {
    match mode {
        TransformMode::List => {
            let list = rows_to_list(rows);
            Ok(Transformed {
                records: list.len(),
                document: Value::Array(list),
                duplicate_keys: Vec::new(),
            })
        }
        TransformMode::KeyedMap { key_field } => {
            let keyed = rows_to_keyed_map(&rows, key_field)?;
            Ok(Transformed {
                records: keyed.entries.len(),
                document: Value::Object(keyed.entries),
                duplicate_keys: keyed.duplicate_keys,
            })
        }
    }
}
