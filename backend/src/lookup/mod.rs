//! Lookups over published catalogs.
//!
//! Reads `products.json` and `additives.json` back and answers the two
//! questions the scanning client asks:
//!
//! - what is the status (and display colour) of a detected product?
//! - which additives appear in a block of label text?
//!
//! Label text usually comes from OCR, so it is cleaned up first: `€` and `©`
//! are read as `E` and `C`, and E-numbers misread as `6120`, `0120` or
//! `e120` become `E120`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::artifact::read_artifact;
use crate::error::ArtifactResult;
use crate::models::{AdditiveRecord, ProductEntry, Status};
use crate::transform::EntityDescriptor;

/// Colour shown for products missing from the catalog.
pub const DEFAULT_COLOR: &str = "white";

// ASCII word boundaries: an E-number glued to Hangul (`색소6120`) still counts.
static MISREAD_E_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)[60]([0-9]{3})(?-u:\b)").expect("valid E-number regex")
});

static LOWERCASE_E_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)e([0-9]{3})(?-u:\b)").expect("valid E-number regex")
});

/// Normalize OCR output before matching.
pub fn clean_ocr_text(text: &str) -> String {
    let text = text.replace('€', "E").replace('©', "C");
    let text = MISREAD_E_NUMBER.replace_all(&text, "E$1");
    LOWERCASE_E_NUMBER.replace_all(&text, "E$1").into_owned()
}

/// Status and colour for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductVerdict {
    pub id: String,
    pub name_en: Option<String>,
    pub status: Status,
    pub color: String,
    pub reason: String,
}

/// An additive found in label text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanMatch {
    pub additive: AdditiveRecord,
    /// Which field matched: `code`, `name_en` or `name_local`.
    pub matched_on: &'static str,
}

impl ScanMatch {
    /// Anything not known to be Halal needs attention.
    pub fn is_risky(&self) -> bool {
        self.additive.status != Some(Status::Halal)
    }
}

/// Both catalogs of one country.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub products: HashMap<String, ProductEntry>,
    pub additives: Vec<AdditiveRecord>,
}

impl Catalog {
    /// Load whichever artifacts exist in `country_dir`.
    pub fn load(country_dir: &Path) -> ArtifactResult<Self> {
        let mut catalog = Catalog::default();

        let products = EntityDescriptor::products().artifact_path(country_dir);
        if products.exists() {
            catalog.products = serde_json::from_value(read_artifact(&products)?)?;
        }

        let additives = EntityDescriptor::additives().artifact_path(country_dir);
        if additives.exists() {
            catalog.additives = serde_json::from_value(read_artifact(&additives)?)?;
        }

        Ok(catalog)
    }

    /// Look up a product. Unlisted products are `Unknown` and white.
    pub fn product_status(&self, id: &str) -> ProductVerdict {
        match self.products.get(id) {
            Some(entry) => ProductVerdict {
                id: id.to_string(),
                name_en: Some(entry.name_en.clone()),
                status: entry.status.unwrap_or(Status::Unknown),
                color: if entry.color.is_empty() {
                    DEFAULT_COLOR.to_string()
                } else {
                    entry.color.clone()
                },
                reason: entry.reason.clone(),
            },
            None => ProductVerdict {
                id: id.to_string(),
                name_en: None,
                status: Status::Unknown,
                color: DEFAULT_COLOR.to_string(),
                reason: String::new(),
            },
        }
    }

    /// Additives mentioned in `text`, each once, in catalog order.
    pub fn scan_text(&self, text: &str) -> Vec<ScanMatch> {
        let cleaned = clean_ocr_text(text);
        let lower = cleaned.to_lowercase();

        self.additives
            .iter()
            .filter_map(|additive| {
                matched_field(additive, &lower, &cleaned).map(|matched_on| ScanMatch {
                    additive: additive.clone(),
                    matched_on,
                })
            })
            .collect()
    }
}

fn matched_field(additive: &AdditiveRecord, lower: &str, original: &str) -> Option<&'static str> {
    let code = additive.code.trim();
    if !code.is_empty() && lower.contains(&code.to_lowercase()) {
        return Some("code");
    }
    let name_en = additive.name_en.trim();
    if !name_en.is_empty() && lower.contains(&name_en.to_lowercase()) {
        return Some("name_en");
    }
    let name_local = additive.name_local.trim();
    if !name_local.is_empty() && original.contains(name_local) {
        return Some("name_local");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::write_artifact;
    use serde_json::json;
    use tempfile::tempdir;

    fn catalog() -> Catalog {
        Catalog {
            products: HashMap::from([(
                "jinro_soju".to_string(),
                ProductEntry {
                    name_en: "Jinro Soju".into(),
                    status: Some(Status::Haram),
                    reason: "Alcohol".into(),
                    color: "#c62828".into(),
                },
            )]),
            additives: vec![
                AdditiveRecord::new("E120", "Cochineal", "코치닐", Status::Haram, "Insect dye"),
                AdditiveRecord::new("", "Gelatin", "젤라틴", Status::Mushbooh, "Animal bones"),
                AdditiveRecord::new("E330", "Citric acid", "구연산", Status::Halal, ""),
            ],
        }
    }

    #[test]
    fn test_clean_ocr_text() {
        assert_eq!(clean_ocr_text("€120, 6471 and e330"), "E120, E471 and E330");
        assert_eq!(clean_ocr_text("©armine 0100"), "Carmine E100");
        assert_eq!(clean_ocr_text("16120 stays"), "16120 stays");
    }

    #[test]
    fn test_clean_ocr_text_after_hangul() {
        assert_eq!(clean_ocr_text("색소6120"), "색소E120");
        assert_eq!(clean_ocr_text("착색료e330,"), "착색료E330,");
        assert_eq!(clean_ocr_text("산도조절제0330)"), "산도조절제E330)");
    }

    #[test]
    fn test_scan_matches_code_glued_to_hangul() {
        let matches = catalog().scan_text("착색료6120");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].additive.code, "E120");
        assert_eq!(matches[0].matched_on, "code");
    }

    #[test]
    fn test_product_lookup() {
        let verdict = catalog().product_status("jinro_soju");
        assert_eq!(verdict.status, Status::Haram);
        assert_eq!(verdict.color, "#c62828");
        assert_eq!(verdict.name_en.as_deref(), Some("Jinro Soju"));
    }

    #[test]
    fn test_unknown_product_defaults() {
        let verdict = catalog().product_status("mystery");
        assert_eq!(verdict.status, Status::Unknown);
        assert_eq!(verdict.color, DEFAULT_COLOR);
        assert!(verdict.name_en.is_none());
    }

    #[test]
    fn test_scan_matches_code_name_and_local_name() {
        let matches = catalog().scan_text("원재료: 설탕, 젤라틴, 착색료(€120), citric ACID");
        let found: Vec<(&str, &str)> = matches
            .iter()
            .map(|m| (m.additive.name_en.as_str(), m.matched_on))
            .collect();

        assert_eq!(
            found,
            vec![("Cochineal", "code"), ("Gelatin", "name_local"), ("Citric acid", "name_en")]
        );
        assert!(matches[0].is_risky());
        assert!(matches[1].is_risky());
        assert!(!matches[2].is_risky());
    }

    #[test]
    fn test_scan_without_matches() {
        assert!(catalog().scan_text("water, salt").is_empty());
    }

    #[test]
    fn test_load_from_artifacts() {
        let dir = tempdir().unwrap();
        write_artifact(
            &dir.path().join("additives.json"),
            &json!([{
                "code": "E120",
                "name_en": "Cochineal",
                "name_kr": "코치닐",
                "status": "Haram",
                "description": ""
            }]),
        )
        .unwrap();

        let catalog = Catalog::load(dir.path()).unwrap();
        assert!(catalog.products.is_empty());
        assert_eq!(catalog.additives.len(), 1);
        assert_eq!(catalog.additives[0].name_local, "코치닐");
    }
}
