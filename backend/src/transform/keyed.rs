//! Index rows by an identifier column.
//!
//! ```text
//! Source rows                         →  Keyed map
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │ id: P1, name_en: A, status: X│      │ P1: { name_en: C, status: Z }│
//! │ id: P2, name_en: B, status: Y│  →   │ P2: { name_en: B, status: Y }│
//! │ id: P1, name_en: C, status: Z│      └──────────────────────────────┘
//! └──────────────────────────────┘
//! ```
//!
//! Duplicate identifiers: the last row wins, and the entry keeps the
//! position where the identifier first appeared. Duplicates are reported
//! back to the caller, not rejected.

use serde_json::{Map, Value};

use crate::error::{TransformError, TransformResult};
use crate::parser::Row;

/// Result of indexing rows by key.
#[derive(Debug, Clone, Default)]
pub struct KeyedMap {
    /// key -> remaining fields of the row
    pub entries: Map<String, Value>,
    /// Keys seen more than once, in order of their first repetition
    pub duplicate_keys: Vec<String>,
}

/// Build a map from the value of `key_field` to the rest of the row.
///
/// # Errors
/// - [`TransformError::MissingKeyColumn`] if a row lacks the key column
/// - [`TransformError::EmptyKey`] if a row's key is blank
pub fn rows_to_keyed_map(rows: &[Row], key_field: &str) -> TransformResult<KeyedMap> {
    let mut keyed = KeyedMap::default();

    for row in rows {
        let key = row
            .fields
            .get(key_field)
            .and_then(Value::as_str)
            .ok_or_else(|| TransformError::MissingKeyColumn(key_field.to_string()))?;

        if key.trim().is_empty() {
            return Err(TransformError::EmptyKey {
                key_field: key_field.to_string(),
                line: row.line,
            });
        }

        let value: Map<String, Value> = row
            .fields
            .iter()
            .filter(|(column, _)| column.as_str() != key_field)
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();

        let replaced = keyed.entries.insert(key.to_string(), Value::Object(value));
        if replaced.is_some() && !keyed.duplicate_keys.iter().any(|k| k == key) {
            keyed.duplicate_keys.push(key.to_string());
        }
    }

    Ok(keyed)
}
