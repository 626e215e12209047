//! Domain models for the catalog build pipeline.
//!
//! - [`Status`] - Dietary-permissibility classification
//! - [`ProductRecord`] - One row of `products.csv`
//! - [`ProductEntry`] - One value of `products.json` (record without its id)
//! - [`AdditiveRecord`] - One row of `ingredients.csv` / one element of `additives.json`
//! - [`EntityKind`] - Which of the two catalogs a table belongs to

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Status
// =============================================================================

/// Dietary-permissibility classification under Islamic dietary law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Permitted.
    Halal,
    /// Forbidden.
    Haram,
    /// Uncertain, requires review.
    Mushbooh,
    /// Not classified yet.
    Unknown,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::Halal, Status::Haram, Status::Mushbooh, Status::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Halal => "Halal",
            Status::Haram => "Haram",
            Status::Mushbooh => "Mushbooh",
            Status::Unknown => "Unknown",
        }
    }

    /// Parse a table cell. Blank cells carry no classification.
    pub fn parse_cell(cell: &str) -> Result<Option<Status>, UnknownStatus> {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Serde helpers for a status cell that may be blank (`""` <-> `None`).
pub mod status_cell {
    use super::*;

    pub fn serialize<S: Serializer>(
        status: &Option<Status>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(status.map(|s| s.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Status>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Status::parse_cell(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Records
// =============================================================================

/// A product row as stored in `products.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name_en: String,
    #[serde(with = "status_cell")]
    pub status: Option<Status>,
    pub reason: String,
    /// Display hex code, e.g. `#c62828`.
    pub color: String,
}

impl ProductRecord {
    pub fn new(
        id: &str,
        name_en: &str,
        status: Status,
        reason: &str,
        color: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name_en: name_en.to_string(),
            status: Some(status),
            reason: reason.to_string(),
            color: color.to_string(),
        }
    }
}

/// A product as published in `products.json`, keyed by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductEntry {
    pub name_en: String,
    #[serde(with = "status_cell")]
    pub status: Option<Status>,
    pub reason: String,
    pub color: String,
}

/// An additive or ingredient, in source row order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditiveRecord {
    /// E-number or similar; empty for uncoded ingredients.
    pub code: String,
    pub name_en: String,
    /// Name in the country's language. Older artifacts call it `name_kr`.
    #[serde(alias = "name_kr")]
    pub name_local: String,
    #[serde(with = "status_cell")]
    pub status: Option<Status>,
    pub description: String,
}

impl AdditiveRecord {
    pub fn new(
        code: &str,
        name_en: &str,
        name_local: &str,
        status: Status,
        description: &str,
    ) -> Self {
        Self {
            code: code.to_string(),
            name_en: name_en.to_string(),
            name_local: name_local.to_string(),
            status: Some(status),
            description: description.to_string(),
        }
    }
}

// =============================================================================
// Entity Kind
// =============================================================================

/// The two catalogs built per country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Products,
    Additives,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Products => "products",
            EntityKind::Additives => "additives",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "products" | "product" => Ok(EntityKind::Products),
            "additives" | "additive" | "ingredients" => Ok(EntityKind::Additives),
            other => Err(format!("unknown entity '{}' (expected products or additives)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!("haram".parse::<Status>().unwrap(), Status::Haram);
        assert_eq!(" Mushbooh ".parse::<Status>().unwrap(), Status::Mushbooh);
        assert_eq!("UNKNOWN".parse::<Status>().unwrap(), Status::Unknown);
    }

    #[test]
    fn test_status_rejects_outside_values() {
        let err = "Kosher".parse::<Status>().unwrap_err();
        assert_eq!(err, UnknownStatus("Kosher".into()));
    }

    #[test]
    fn test_blank_cell_has_no_status() {
        assert_eq!(Status::parse_cell("").unwrap(), None);
        assert_eq!(Status::parse_cell("   ").unwrap(), None);
        assert_eq!(Status::parse_cell("Halal").unwrap(), Some(Status::Halal));
    }

    #[test]
    fn test_additive_accepts_name_kr_alias() {
        let value = json!({
            "code": "E120",
            "name_en": "Cochineal",
            "name_kr": "코치닐",
            "status": "Haram",
            "description": "Insect dye"
        });
        let record: AdditiveRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.name_local, "코치닐");
        assert_eq!(record.status, Some(Status::Haram));
    }

    #[test]
    fn test_blank_status_serializes_as_empty_string() {
        let entry = ProductEntry {
            name_en: "Mystery snack".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["status"], "");
        assert_eq!(value["color"], "");
    }

    #[test]
    fn test_entity_kind_from_str() {
        assert_eq!("Products".parse::<EntityKind>().unwrap(), EntityKind::Products);
        assert_eq!("ingredients".parse::<EntityKind>().unwrap(), EntityKind::Additives);
        assert!("recipes".parse::<EntityKind>().is_err());
    }
}
