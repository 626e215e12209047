//! Seed tables for a fresh country directory.
//!
//! When a source table does not exist yet, a small illustrative table is
//! written so the pipeline can run out of the box. Seed rows cover Halal,
//! Haram and Mushbooh and populate every column. An existing table is never
//! touched.

use std::fs;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{AdditiveRecord, EntityKind, ProductRecord, Status};

/// Display colours used by the product seed rows.
pub const COLOR_HALAL: &str = "#2e7d32";
pub const COLOR_HARAM: &str = "#c62828";
pub const COLOR_MUSHBOOH: &str = "#f9a825";

/// Example additives and ingredients.
pub fn additive_seed_rows() -> Vec<AdditiveRecord> {
    vec![
        AdditiveRecord::new("E120", "Cochineal", "코치닐", Status::Haram, "Insect dye"),
        AdditiveRecord::new("", "Pork", "돼지고기", Status::Haram, "Pig meat"),
        AdditiveRecord::new("", "Lard", "라드", Status::Haram, "Pig fat"),
        AdditiveRecord::new("", "Gelatin", "젤라틴", Status::Mushbooh, "Animal bones"),
        AdditiveRecord::new("E330", "Citric acid", "구연산", Status::Halal, "Fermentation product"),
    ]
}

/// Example products.
pub fn product_seed_rows() -> Vec<ProductRecord> {
    vec![
        ProductRecord::new(
            "shin_ramyun",
            "Shin Ramyun",
            Status::Haram,
            "Contains beef extract from non-halal slaughter",
            COLOR_HARAM,
        ),
        ProductRecord::new(
            "buldak_carbonara",
            "Samyang Buldak Carbonara",
            Status::Halal,
            "Halal certified",
            COLOR_HALAL,
        ),
        ProductRecord::new(
            "banana_milk",
            "Binggrae Banana Milk",
            Status::Halal,
            "No animal-derived ingredients",
            COLOR_HALAL,
        ),
        ProductRecord::new("jinro_soju", "Jinro Soju", Status::Haram, "Alcohol", COLOR_HARAM),
        ProductRecord::new(
            "pepero",
            "Lotte Pepero",
            Status::Mushbooh,
            "Emulsifier of unverified origin",
            COLOR_MUSHBOOH,
        ),
    ]
}

/// Write the seed table for `kind` at `path` unless a file already exists.
///
/// Returns `true` when a table was created.
pub fn seed_if_missing(path: &Path, kind: EntityKind) -> CsvResult<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CsvError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let content = match kind {
        EntityKind::Products => to_csv(&product_seed_rows()),
        EntityKind::Additives => to_csv(&additive_seed_rows()),
    }
    .map_err(|message| CsvError::WriteError {
        path: path.to_path_buf(),
        message,
    })?;

    fs::write(path, content).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(true)
}

fn to_csv<T: serde::Serialize>(rows: &[T]) -> Result<Vec<u8>, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(|e| e.to_string())?;
    }
    writer.into_inner().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::load_table;
    use crate::validation::require_columns;
    use std::collections::HashSet;
    use tempfile::tempdir;

    #[test]
    fn test_seed_covers_status_range() {
        let additive: HashSet<Status> =
            additive_seed_rows().iter().filter_map(|r| r.status).collect();
        let product: HashSet<Status> =
            product_seed_rows().iter().filter_map(|r| r.status).collect();

        for status in [Status::Halal, Status::Haram, Status::Mushbooh] {
            assert!(additive.contains(&status), "additives lack {}", status);
            assert!(product.contains(&status), "products lack {}", status);
        }
    }

    #[test]
    fn test_additive_seed_readable_by_loader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("KR").join("ingredients.csv");

        assert!(seed_if_missing(&path, EntityKind::Additives).unwrap());

        let table = load_table(&path).unwrap();
        assert_eq!(
            table.headers,
            vec!["code", "name_en", "name_local", "status", "description"]
        );
        assert!(require_columns(&table, &["code", "name_local", "status"]).is_ok());
        assert_eq!(table.len(), additive_seed_rows().len());
        assert_eq!(table.rows[0].get("name_local"), "코치닐");
        assert_eq!(table.rows[1].get("code"), "");
    }

    #[test]
    fn test_product_seed_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.csv");

        assert!(seed_if_missing(&path, EntityKind::Products).unwrap());

        let table = load_table(&path).unwrap();
        assert_eq!(table.headers, vec!["id", "name_en", "status", "reason", "color"]);
        assert_eq!(table.rows[0].get("color"), COLOR_HARAM);
    }

    #[test]
    fn test_existing_table_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ingredients.csv");
        fs::write(&path, "code,name_local,status\nE999,테스트,Unknown\n").unwrap();

        assert!(!seed_if_missing(&path, EntityKind::Additives).unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "code,name_local,status\nE999,테스트,Unknown\n"
        );
    }
}
