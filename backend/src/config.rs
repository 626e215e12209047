//! Run configuration.
//!
//! Every path the pipeline touches is derived from one explicit base
//! directory. Values come from the environment (optionally through a
//! `.env` file loaded by the binary) and can be overridden on the command
//! line.
//!
//! ```text
//! <data_dir>/<CC>/products.csv     -> <data_dir>/<CC>/products.json
//! <data_dir>/<CC>/ingredients.csv  -> <data_dir>/<CC>/additives.json
//! <data_dir>/<CC>/raw_images/
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

/// Environment variable holding the base data directory.
pub const DATA_DIR_ENV: &str = "TBYN_DATA_DIR";

/// Environment variable holding comma-separated country codes.
pub const COUNTRIES_ENV: &str = "TBYN_COUNTRIES";

/// Base data directory when nothing is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Country processed when nothing is configured.
pub const DEFAULT_COUNTRY: &str = "KR";

static COUNTRY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,16}$").expect("valid country code regex"));

/// A country code selecting one data subdirectory (e.g. `KR`, `JP`).
///
/// Restricted to a safe character set so it can never escape the data
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: &str) -> Result<Self, ConfigError> {
        let code = code.trim();
        if COUNTRY_CODE_RE.is_match(code) {
            Ok(Self(code.to_string()))
        } else {
            Err(ConfigError::InvalidCountry(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CountryCode {
    fn default() -> Self {
        Self(DEFAULT_COUNTRY.to_string())
    }
}

impl FromStr for CountryCode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration for one invocation.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base directory holding one subdirectory per country.
    pub data_dir: PathBuf,
    /// Countries to process, in order.
    pub countries: Vec<CountryCode>,
}

impl CatalogConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            countries: vec![CountryCode::default()],
        }
    }

    /// Build from `TBYN_DATA_DIR` and `TBYN_COUNTRIES`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(Vec::new())
    }

    /// Like [`from_env`](Self::from_env), but a non-empty `countries` wins and
    /// `TBYN_COUNTRIES` is then never read.
    pub fn from_env_with(countries: Vec<CountryCode>) -> Result<Self, ConfigError> {
        let countries_var = if countries.is_empty() {
            env::var(COUNTRIES_ENV).ok()
        } else {
            None
        };
        Self::from_values(env::var(DATA_DIR_ENV).ok(), countries_var, countries)
    }

    /// Resolve raw values: explicit countries, then the comma-separated list,
    /// then the default country.
    pub fn from_values(
        data_dir: Option<String>,
        countries_var: Option<String>,
        countries: Vec<CountryCode>,
    ) -> Result<Self, ConfigError> {
        let data_dir = data_dir
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        let mut config = Self::new(data_dir);
        if !countries.is_empty() {
            config.countries = countries;
        } else if let Some(raw) = countries_var {
            let parsed = parse_country_list(&raw)?;
            if !parsed.is_empty() {
                config.countries = parsed;
            }
        }
        Ok(config)
    }

    /// Replace the data directory when one is given.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    /// Replace the country list when a non-empty one is given.
    pub fn with_countries(mut self, countries: Vec<CountryCode>) -> Self {
        if !countries.is_empty() {
            self.countries = countries;
        }
        self
    }

    /// Directory holding one country's tables and artifacts.
    pub fn country_dir(&self, country: &CountryCode) -> PathBuf {
        self.data_dir.join(country.as_str())
    }

    /// Directory where the image collector stores downloads.
    pub fn raw_images_dir(&self, country: &CountryCode) -> PathBuf {
        self.country_dir(country).join("raw_images")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// First configured country, used by single-country commands.
    pub fn primary_country(&self) -> CountryCode {
        self.countries.first().cloned().unwrap_or_default()
    }
}

/// Parse `"KR, JP"` into country codes. Blank items are ignored.
pub fn parse_country_list(raw: &str) -> Result<Vec<CountryCode>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(CountryCode::new)
        .collect()
}
