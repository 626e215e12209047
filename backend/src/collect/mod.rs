//! Raw image acquisition plan.
//!
//! Training images are fetched by an external image-search downloader. This
//! module owns what to ask for: a fixed query list per country, and the
//! request settings handed to the downloader for each query. Downloads run
//! one after another; a failed query is reported and the rest continue.
//!
//! ```rust,ignore
//! use tbyn::collect::{collect_images, CollectionPlan, PlanOnly};
//!
//! let plan = CollectionPlan::for_country(&config, &country);
//! let summary = collect_images(&plan, &PlanOnly);
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{CatalogConfig, CountryCode};
use crate::error::CollectError;
use crate::logs::{log_error, log_info, log_success, log_warning};

/// Images requested per query.
pub const RESULT_LIMIT: u32 = 50;

/// Per-query download timeout.
pub const TIMEOUT_SECONDS: u64 = 60;

const KR_QUERIES: &[&str] = &[
    "Shin Ramyun korean noodles package",
    "Samyang Buldak Carbonara package",
    "Binggrae Banana Milk bottle",
    "Jinro Soju green bottle",
    "Lotte Pepero box",
];

const JP_QUERIES: &[&str] = &["Takoyaki", "Ramen pork broth"];

/// Search queries for a country: a mix of halal-safe and haram-risk products.
pub fn queries_for(country: &CountryCode) -> &'static [&'static str] {
    match country.as_str().to_uppercase().as_str() {
        "KR" => KR_QUERIES,
        "JP" => JP_QUERIES,
        _ => &[],
    }
}

/// One request handed to the downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub query: String,
    pub result_limit: u32,
    pub output_directory: PathBuf,
    pub adult_filter_off: bool,
    pub overwrite_existing: bool,
    pub timeout_seconds: u64,
}

impl DownloadRequest {
    pub fn new(query: &str, output_directory: PathBuf) -> Self {
        Self {
            query: query.to_string(),
            result_limit: RESULT_LIMIT,
            output_directory,
            adult_filter_off: true,
            overwrite_existing: false,
            timeout_seconds: TIMEOUT_SECONDS,
        }
    }
}

/// Every request for one country.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionPlan {
    pub country: String,
    pub output_directory: PathBuf,
    pub requests: Vec<DownloadRequest>,
}

impl CollectionPlan {
    pub fn for_country(config: &CatalogConfig, country: &CountryCode) -> Self {
        let output_directory = config.raw_images_dir(country);
        let requests = queries_for(country)
            .iter()
            .map(|q| DownloadRequest::new(q, output_directory.clone()))
            .collect();

        Self {
            country: country.to_string(),
            output_directory,
            requests,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// The external image-search downloader.
pub trait ImageDownloader {
    fn download(&self, request: &DownloadRequest) -> Result<(), CollectError>;
}

/// Downloader that only logs what would be fetched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOnly;

impl ImageDownloader for PlanOnly {
    fn download(&self, request: &DownloadRequest) -> Result<(), CollectError> {
        log_info(format!(
            "would fetch {} image(s) for \"{}\" into {}",
            request.result_limit,
            request.query,
            request.output_directory.display()
        ));
        Ok(())
    }
}

/// Counts from a collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectSummary {
    pub completed: usize,
    pub failed: Vec<String>,
}

/// Issue every request of the plan, in order.
pub fn collect_images(plan: &CollectionPlan, downloader: &dyn ImageDownloader) -> CollectSummary {
    let mut summary = CollectSummary::default();

    if plan.is_empty() {
        log_warning(format!("No queries defined for {}", plan.country));
        return summary;
    }

    log_info(format!("📂 Saving images to: {}", plan.output_directory.display()));
    for request in &plan.requests {
        log_info(format!("📷 Downloading: {}...", request.query));
        match downloader.download(request) {
            Ok(()) => summary.completed += 1,
            Err(err) => {
                log_error(err.to_string());
                summary.failed.push(request.query.clone());
            }
        }
    }
    log_success(format!(
        "Download complete for {} ({} ok, {} failed)",
        plan.country,
        summary.completed,
        summary.failed.len()
    ));

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Recording {
        seen: RefCell<Vec<String>>,
        fail_on: &'static str,
    }

    impl ImageDownloader for Recording {
        fn download(&self, request: &DownloadRequest) -> Result<(), CollectError> {
            self.seen.borrow_mut().push(request.query.clone());
            if request.query == self.fail_on {
                return Err(CollectError::Download {
                    query: request.query.clone(),
                    message: "timed out".into(),
                });
            }
            Ok(())
        }
    }

    fn country(code: &str) -> CountryCode {
        CountryCode::new(code).unwrap()
    }

    #[test]
    fn test_plan_settings() {
        let config = CatalogConfig::new("data");
        let plan = CollectionPlan::for_country(&config, &country("KR"));

        assert_eq!(plan.requests.len(), 5);
        assert_eq!(plan.output_directory, PathBuf::from("data/KR/raw_images"));
        let first = &plan.requests[0];
        assert_eq!(first.query, "Shin Ramyun korean noodles package");
        assert_eq!(first.result_limit, 50);
        assert!(first.adult_filter_off);
        assert!(!first.overwrite_existing);
        assert_eq!(first.timeout_seconds, 60);
    }

    #[test]
    fn test_unknown_country_has_no_queries() {
        let config = CatalogConfig::new("data");
        let plan = CollectionPlan::for_country(&config, &country("FR"));
        assert!(plan.is_empty());
        assert_eq!(collect_images(&plan, &PlanOnly), CollectSummary::default());
    }

    #[test]
    fn test_failed_query_does_not_stop_others() {
        let config = CatalogConfig::new("data");
        let plan = CollectionPlan::for_country(&config, &country("JP"));
        let downloader = Recording {
            seen: RefCell::new(Vec::new()),
            fail_on: "Takoyaki",
        };

        let summary = collect_images(&plan, &downloader);

        assert_eq!(*downloader.seen.borrow(), vec!["Takoyaki", "Ramen pork broth"]);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.failed, vec!["Takoyaki"]);
    }
}
