//! Scrape request payload and run statistics.

use crate::error::CoreError;
use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// Everything a caller supplies to start a scrape.
///
/// Facet and filter values are kept as the caller wrote them; the facet
/// mapper normalizes them at use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrapeConfig {
    /// Search keywords (required)
    pub keywords: String,
    /// Search location (required)
    pub location: String,
    /// Pages to request per facet; clamped to the configured cap
    #[serde(alias = "pagesToScrape")]
    pub pages_requested: u32,
    /// Single experience facet, used when no include list is given
    pub experience_level: Option<String>,
    /// Experience facets searched one after another
    #[serde(alias = "experienceLevelInclude")]
    pub experience_levels_include: Vec<String>,
    /// Job type facet
    pub job_type: Option<String>,
    /// Restrict to remote postings
    pub remote_only: bool,
    /// Recency window in days (0 = any)
    pub days_old: u32,
    /// Keep only titles containing one of these words
    pub title_include_words: Vec<String>,
    /// Drop titles containing any of these words
    pub title_exclude_words: Vec<String>,
    /// Drop companies containing any of these words
    pub company_exclude_words: Vec<String>,
    /// Drop descriptions containing any of these words
    pub description_exclude_words: Vec<String>,
    /// Drop postings whose experience tier is listed here
    pub experience_level_exclude: Vec<String>,
    /// Owning user, passed through to the store
    pub user_id: Option<UserId>,
}

impl ScrapeConfig {
    /// Create a request for `keywords` in `location` with one page and no filters.
    #[must_use]
    pub fn new(keywords: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            location: location.into(),
            pages_requested: 1,
            ..Self::default()
        }
    }

    /// Check the required fields.
    ///
    /// # Errors
    /// Returns `CoreError::Validation` if keywords or location are blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.keywords.trim().is_empty() || self.location.trim().is_empty() {
            return Err(CoreError::Validation(
                "keywords and location are required".to_string(),
            ));
        }
        Ok(())
    }

    /// Pages to scrape after applying `max_pages`.
    #[must_use]
    pub fn clamped_pages(&self, max_pages: u32) -> u32 {
        self.pages_requested.min(max_pages)
    }
}

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Result pages attempted, across all facets
    pub pages_scraped: u32,
    /// Cards extracted before any deduplication
    pub total_found: usize,
    /// Postings left after the filter pipeline
    pub after_filtering: usize,
    /// Postings dropped as run or store duplicates
    pub duplicates_skipped: usize,
    /// Postings written to the store
    pub saved: usize,
    /// Wall-clock duration of the run
    pub elapsed_ms: u64,
}
