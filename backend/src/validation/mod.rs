//! Validation for source tables and catalog artifacts.
//!
//! # Source tables
//!
//! - [`require_columns`] checks that every required column name is present.
//!   Row contents are not inspected.
//! - [`normalize_status_column`] checks every status cell against the closed
//!   set {Halal, Haram, Mushbooh, Unknown} and rewrites it in canonical form.
//!   Blank cells stay blank.
//!
//! # Artifacts
//!
//! JSON Schemas (Draft 7) for `products.json` and `additives.json` are
//! embedded at compile time from the `schemas/` directory:
//! - `products.schema.json`
//! - `additives.schema.json`
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use tbyn::{validate_artifact, EntityKind};
//!
//! let additives = json!([{
//!     "code": "E120",
//!     "name_en": "Cochineal",
//!     "name_local": "코치닐",
//!     "status": "Haram",
//!     "description": "Insect dye"
//! }]);
//! assert!(validate_artifact(EntityKind::Additives, &additives).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::{ValidationError, ValidationResult};
use crate::models::{EntityKind, Status};
use crate::parser::Table;

static PRODUCTS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/products.schema.json"))
        .expect("Invalid embedded schema")
});

static ADDITIVES_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/additives.schema.json"))
        .expect("Invalid embedded schema")
});

/// Check that every required column exists in the table header.
///
/// Missing columns are reported in the order they are required.
pub fn require_columns(table: &Table, required: &[&str]) -> ValidationResult<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !table.has_column(col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::SchemaInvalid { missing })
    }
}

/// Validate and canonicalize every cell of a status column.
///
/// `"haram"` becomes `"Haram"`; a value outside the closed set fails with
/// [`ValidationError::InvalidStatusValue`] naming the first offending line.
/// Does nothing when the table has no such column.
pub fn normalize_status_column(table: &mut Table, column: &str) -> ValidationResult<()> {
    if !table.has_column(column) {
        return Ok(());
    }

    for row in &mut table.rows {
        let line = row.line;
        let Some(cell) = row.fields.get_mut(column) else {
            continue;
        };
        let raw = cell.as_str().unwrap_or("").to_string();

        match Status::parse_cell(&raw) {
            Ok(Some(status)) => *cell = Value::String(status.as_str().to_string()),
            Ok(None) => *cell = Value::String(String::new()),
            Err(_) => {
                return Err(ValidationError::InvalidStatusValue { value: raw, line });
            }
        }
    }

    Ok(())
}

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Embedded artifact schema for an entity.
pub fn artifact_schema(kind: EntityKind) -> &'static Value {
    match kind {
        EntityKind::Products => &PRODUCTS_SCHEMA,
        EntityKind::Additives => &ADDITIVES_SCHEMA,
    }
}

/// Validate a complete artifact document against its entity schema.
pub fn validate_artifact(kind: EntityKind, document: &Value) -> ValidationResult<()> {
    validate(artifact_schema(kind), document)
        .map_err(|errors| ValidationError::ArtifactSchema { errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes_auto;
    use serde_json::json;

    fn table(content: &str) -> Table {
        parse_bytes_auto(content.as_bytes()).unwrap()
    }

    #[test]
    fn test_required_columns_present() {
        let t = table(
            "code,name_en,name_local,status,description\nE120,Cochineal,코치닐,Haram,Insect dye",
        );
        assert!(require_columns(&t, &["code", "name_local", "status"]).is_ok());
    }

    #[test]
    fn test_missing_columns_listed_in_order() {
        let t = table("name_en,description\nPork,Pig meat");
        let err = require_columns(&t, &["code", "name_local", "status"]).unwrap_err();
        match err {
            ValidationError::SchemaInvalid { missing } => {
                assert_eq!(missing, vec!["code", "name_local", "status"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_values_do_not_fail_column_check() {
        let t = table("id,name_en\n,");
        assert!(require_columns(&t, &["id"]).is_ok());
    }

    #[test]
    fn test_status_canonicalized() {
        let mut t = table("name_en,status\nPork,haram\nWater,\nGelatin, MUSHBOOH ");
        normalize_status_column(&mut t, "status").unwrap();
        assert_eq!(t.rows[0].get("status"), "Haram");
        assert_eq!(t.rows[1].get("status"), "");
        assert_eq!(t.rows[2].get("status"), "Mushbooh");
    }

    #[test]
    fn test_invalid_status_reports_value_and_line() {
        let mut t = table("name_en,status\nPork,Haram\nWine,Forbidden");
        let err = normalize_status_column(&mut t, "status").unwrap_err();
        match err {
            ValidationError::InvalidStatusValue { value, line } => {
                assert_eq!(value, "Forbidden");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_status_column_optional() {
        let mut t = table("id,name_en\nP1,Banana Milk");
        assert!(normalize_status_column(&mut t, "status").is_ok());
    }

    #[test]
    fn test_valid_additives_artifact() {
        let doc = json!([{
            "code": "",
            "name_en": "Pork",
            "name_local": "돼지고기",
            "status": "Haram",
            "description": "Pig meat"
        }]);
        assert!(validate_artifact(EntityKind::Additives, &doc).is_ok());
    }

    #[test]
    fn test_invalid_additives_artifact() {
        let doc = json!([{ "code": "E120", "status": "Maybe" }]);
        let err = validate_artifact(EntityKind::Additives, &doc).unwrap_err();
        match err {
            ValidationError::ArtifactSchema { errors } => assert!(!errors.is_empty()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_products_artifact_shape() {
        let valid = json!({
            "P1": {
                "name_en": "Shin Ramyun",
                "status": "Haram",
                "reason": "Beef extract",
                "color": "#c62828"
            }
        });
        assert!(is_valid(artifact_schema(EntityKind::Products), &valid));

        let not_a_map = json!([{ "id": "P1" }]);
        assert!(!is_valid(artifact_schema(EntityKind::Products), &not_a_map));

        let null_field = json!({ "P1": { "name_en": null } });
        assert!(!is_valid(artifact_schema(EntityKind::Products), &null_field));
    }
}
