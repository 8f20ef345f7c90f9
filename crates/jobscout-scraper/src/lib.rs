//! JobScout Scraper - job-listing acquisition engine.
//!
//! Queries a public job-search site over plain HTTP, extracts postings from
//! its results markup, deduplicates across facet searches, filters, saves
//! through a [`jobscout_core::PostingStore`], and reports live progress.
//!
//! # Features
//!
//! - Anonymous session bootstrap with linear backoff
//! - Page retries with exponential backoff and challenge-page detection
//! - One search per experience facet, deduplicated by canonical URL
//! - Ordered filter pipeline and store-level duplicate checks
//! - Progress registry with deferred, cancellable cleanup
//!
//! # Example
//!
//! ```rust,ignore
//! use jobscout_scraper::{ProgressRegistry, ScrapeOrchestrator, ScrapeService};
//! use std::sync::Arc;
//!
//! let orchestrator = ScrapeOrchestrator::new(
//!     &app_config,
//!     Arc::new(transport),
//!     Arc::new(store),
//!     ProgressRegistry::new(),
//! )?;
//! let service = ScrapeService::new(Arc::new(orchestrator));
//!
//! let token = service.trigger(request)?;
//! let state = service.poll(&token);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod dedup;
#[allow(missing_docs)]
pub mod detail;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod facets;
#[allow(missing_docs)]
pub mod fetcher;
#[allow(missing_docs)]
pub mod filter;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod parser;
pub mod progress;
#[allow(missing_docs)]
pub mod retry;
#[allow(missing_docs)]
pub mod session;
pub mod service;
#[allow(missing_docs)]
pub mod url_builder;

// Re-export commonly used types
pub use dedup::Deduplicator;
pub use detail::DetailFetcher;
pub use error::{Result, ScrapeError};
pub use fetcher::{ChallengeDetector, PageFetcher};
pub use filter::FilterPipeline;
pub use orchestrator::{format_elapsed, RunPhase, ScrapeOrchestrator, ScrapeOutcome};
pub use parser::ListingExtractor;
pub use progress::{ProgressRegistry, ProgressState};
pub use retry::{Backoff, RetryPolicy};
pub use service::ScrapeService;
pub use session::SessionBootstrapper;
pub use url_builder::{build_search_url, canonical_url};
