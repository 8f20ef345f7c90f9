//! Scrape orchestrator.
//!
//! Drives one run through its phases:
//! `Initializing → Connecting → Searching(i) → Filtering → Saving → Completed | Failed`.
//! Postings and counters accumulate in a run context, so a run that fails
//! part-way still reports what it gathered.

use crate::dedup::Deduplicator;
use crate::detail::DetailFetcher;
use crate::error::{Result, ScrapeError};
use crate::facets;
use crate::fetcher::PageFetcher;
use crate::filter::FilterPipeline;
use crate::parser::ListingExtractor;
use crate::progress::{ProgressRegistry, ProgressState, FAILED};
use crate::retry::{Backoff, RetryPolicy};
use crate::session::SessionBootstrapper;
use crate::url_builder::build_search_url;
use jobscout_core::{
    AppConfig, ExperienceLevel, Posting, PostingStore, RunStats, RunToken, ScrapeConfig,
    ScraperSettings,
};
use jobscout_http::{CookieJar, HttpTransport, UserAgentPool};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

const CONNECTING_PERCENT: i32 = 5;
const FILTERING_PERCENT: i32 = 90;
const SAVING_SPAN: i32 = 9;

/// Phase of a scrape run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "facetIndex", rename_all = "camelCase")]
pub enum RunPhase {
    /// Counters reset, progress at 0%
    Initializing,
    /// Establishing the anonymous session
    Connecting,
    /// Searching the facet at this index
    Searching(usize),
    /// Applying the filter pipeline
    Filtering,
    /// Store-tier dedup and saving
    Saving,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => f.write_str("Initializing"),
            Self::Connecting => f.write_str("Connecting to job site..."),
            Self::Searching(i) => write!(f, "Searching facet {}", i + 1),
            Self::Filtering => f.write_str("Filtering jobs..."),
            Self::Saving => f.write_str("Saving jobs..."),
            Self::Completed => f.write_str("Completed"),
            Self::Failed => f.write_str("Failed"),
        }
    }
}

/// Message carried by a caught panic payload.
pub(crate) fn panic_reason(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutcome {
    /// Run this outcome belongs to
    pub token: RunToken,
    /// `Completed` or `Failed`, or the phase the run stopped in
    pub phase: RunPhase,
    /// Postings left after filtering; saved ones carry their store id
    pub postings: Vec<Posting>,
    /// Run counters
    pub stats: RunStats,
    /// Failure reason, if the run failed
    pub error: Option<String>,
    /// Human-readable summary line
    pub message: String,
}

impl ScrapeOutcome {
    /// Outcome for a run whose task died before reporting.
    #[must_use]
    pub fn aborted(token: RunToken, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            token,
            phase: RunPhase::Failed,
            postings: Vec::new(),
            stats: RunStats::default(),
            message: format!("Scraping failed: {reason}"),
            error: Some(reason),
        }
    }

    /// Whether the run completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.phase == RunPhase::Completed
    }
}

/// Format a duration as `HH:MM:SS`.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

struct RunContext {
    phase: RunPhase,
    postings: Vec<Posting>,
    stats: RunStats,
    dedup: Deduplicator,
}

impl RunContext {
    fn new() -> Self {
        Self {
            phase: RunPhase::Initializing,
            postings: Vec::new(),
            stats: RunStats::default(),
            dedup: Deduplicator::new(),
        }
    }
}

/// Runs scrapes against the configured job site.
pub struct ScrapeOrchestrator {
    settings: ScraperSettings,
    retention: Duration,
    store: Arc<dyn PostingStore>,
    progress: ProgressRegistry,
    session: SessionBootstrapper,
    fetcher: PageFetcher,
    extractor: ListingExtractor,
    details: DetailFetcher,
}

impl ScrapeOrchestrator {
    /// Create an orchestrator from application config.
    pub fn new(
        config: &AppConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn PostingStore>,
        progress: ProgressRegistry,
    ) -> Result<Self> {
        let settings = config.scraper.clone();
        let agents = UserAgentPool::new(settings.user_agents.clone());
        let delay = settings.request_delay();

        let session = SessionBootstrapper::new(
            transport.clone(),
            agents.clone(),
            &settings.base_url,
            RetryPolicy::new(settings.bootstrap_attempts, delay, Backoff::Linear),
        );
        let fetcher = PageFetcher::new(
            transport,
            agents,
            RetryPolicy::new(settings.fetch_attempts, delay, Backoff::Exponential),
        )?;
        let extractor = ListingExtractor::new(settings.base_url.clone())?;
        let details = DetailFetcher::new(
            fetcher.clone(),
            extractor.clone(),
            delay,
            settings.detail_fetch_max_cards,
        );

        Ok(Self {
            retention: config.progress.retention(),
            settings,
            store,
            progress,
            session,
            fetcher,
            extractor,
            details,
        })
    }

    /// Registry this orchestrator reports into.
    #[must_use]
    pub fn progress(&self) -> &ProgressRegistry {
        &self.progress
    }

    /// How long finished runs stay visible to pollers.
    #[must_use]
    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Run a scrape to completion.
    ///
    /// Never fails: errors end the run in `Failed` with whatever was gathered.
    /// Progress ends at 100 or `FAILED` and is purged after the retention delay.
    pub async fn run(&self, token: &RunToken, config: &ScrapeConfig) -> ScrapeOutcome {
        let started = Instant::now();
        let mut ctx = RunContext::new();

        let result = match config.validate() {
            Ok(()) => AssertUnwindSafe(self.drive(token, config, &mut ctx))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    Err(ScrapeError::Panicked(panic_reason(panic.as_ref())))
                }),
            Err(e) => Err(e.into()),
        };

        let elapsed = started.elapsed();
        ctx.stats.duplicates_skipped = ctx.dedup.duplicates_skipped();
        ctx.stats.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        let outcome = match result {
            Ok(()) => {
                let message = format!(
                    "Scraping completed in {}. Found {} jobs after filtering from {} total jobs scraped.",
                    format_elapsed(elapsed),
                    ctx.stats.after_filtering,
                    ctx.stats.total_found
                );
                tracing::info!(
                    "Scraping summary: Pages: {}, Total jobs: {}, After filtering: {}, Duplicates skipped: {}, Saved: {}",
                    ctx.stats.pages_scraped,
                    ctx.stats.total_found,
                    ctx.stats.after_filtering,
                    ctx.stats.duplicates_skipped,
                    ctx.stats.saved
                );
                self.progress.update(
                    token,
                    100,
                    format!("Completed: {} new jobs saved", ctx.stats.saved),
                );
                ScrapeOutcome {
                    token: token.clone(),
                    phase: RunPhase::Completed,
                    postings: ctx.postings,
                    stats: ctx.stats,
                    error: None,
                    message,
                }
            }
            Err(e) => {
                tracing::error!(run = %token, phase = %ctx.phase, "Scrape failed: {}", e);
                self.progress.update(token, FAILED, format!("Failed: {e}"));
                ScrapeOutcome {
                    token: token.clone(),
                    phase: RunPhase::Failed,
                    postings: ctx.postings,
                    stats: ctx.stats,
                    message: format!("Scraping failed: {e}"),
                    error: Some(e.to_string()),
                }
            }
        };

        self.progress.schedule_cleanup(token, self.retention);
        outcome
    }

    async fn drive(
        &self,
        token: &RunToken,
        config: &ScrapeConfig,
        ctx: &mut RunContext,
    ) -> Result<()> {
        self.progress.update(token, 0, RunPhase::Initializing.to_string());
        let pages = config.clamped_pages(self.settings.max_pages);
        let facets = facets::search_facets(config);
        let scrape_date = chrono::Local::now().date_naive();
        tracing::info!(
            run = %token,
            keywords = %config.keywords,
            location = %config.location,
            pages,
            facets = facets.len(),
            "Starting scrape"
        );

        ctx.phase = RunPhase::Connecting;
        self.progress
            .update(token, CONNECTING_PERCENT, RunPhase::Connecting.to_string());
        let jar = self.session.bootstrap().await?;
        tracing::info!("Job site session initialized successfully");

        for (index, facet) in facets.iter().copied().enumerate() {
            if index > 0 {
                sleep(self.settings.request_delay().saturating_mul(2)).await;
            }
            ctx.phase = RunPhase::Searching(index);
            self.search_facet(
                token,
                config,
                ctx,
                &jar,
                scrape_date,
                (index, facets.len()),
                facet,
                pages,
            )
            .await;
        }

        ctx.phase = RunPhase::Filtering;
        self.progress
            .update(token, FILTERING_PERCENT, RunPhase::Filtering.to_string());
        let pipeline = FilterPipeline::from_config(config);
        ctx.postings = pipeline.apply(std::mem::take(&mut ctx.postings));
        ctx.stats.after_filtering = ctx.postings.len();
        tracing::info!(
            "Filtering complete: {} jobs after filtering (from {} total jobs)",
            ctx.stats.after_filtering,
            ctx.stats.total_found
        );

        ctx.phase = RunPhase::Saving;
        self.save_all(token, config, ctx).await;

        ctx.phase = RunPhase::Completed;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn search_facet(
        &self,
        token: &RunToken,
        config: &ScrapeConfig,
        ctx: &mut RunContext,
        jar: &CookieJar,
        scrape_date: chrono::NaiveDate,
        (index, total): (usize, usize),
        facet: Option<ExperienceLevel>,
        pages: u32,
    ) {
        let label = facet.map(|level| level.label().to_string());
        if let Some(label) = &label {
            tracing::info!("Searching experience level {} ({}/{})", label, index + 1, total);
        }

        for page in 0..pages {
            tracing::info!("Scraping page {} of {}", page + 1, pages);
            ctx.stats.pages_scraped += 1;

            let url = build_search_url(
                &self.settings.base_url,
                config,
                facet,
                page,
                self.settings.results_per_page,
            );
            tracing::debug!(url = %url, "Requesting results page");

            let status = match &label {
                Some(label) => format!("Scraping page {}/{} ({label})", page + 1, pages),
                None => format!("Scraping page {}/{}", page + 1, pages),
            };

            if let Some(html) = self.fetcher.fetch(&url, jar).await {
                let extracted = self.extractor.extract(&html, scrape_date, facet);
                let cards = extracted.len();
                ctx.stats.total_found += cards;

                if cards == 0 {
                    tracing::info!("No jobs found on page {}, ending search", page + 1);
                    break;
                }

                let mut unique = ctx.dedup.retain_unseen(extracted);
                tracing::info!(
                    "Found {} jobs on page {} ({} new this run)",
                    cards,
                    page + 1,
                    unique.len()
                );

                if self.details.should_fetch(cards) {
                    for posting in &mut unique {
                        self.details.attach_description(posting, jar).await;
                    }
                } else {
                    tracing::info!(
                        "Skipping detailed job scraping for page {} as there are too many jobs ({})",
                        page + 1,
                        cards
                    );
                }
                ctx.postings.extend(unique);
            } else {
                tracing::warn!("Failed to retrieve page {} after retries", page + 1);
            }

            self.progress.update_full(
                token,
                ProgressState {
                    percent_complete: scraping_percent(index, total, page + 1, pages),
                    current_page: page + 1,
                    total_pages: pages,
                    status,
                    experience_level_index: u32::try_from(index).unwrap_or(u32::MAX),
                    total_experience_levels: u32::try_from(total).unwrap_or(u32::MAX),
                    current_experience_level: label.clone(),
                },
            );

            if page + 1 < pages {
                sleep(self.settings.request_delay()).await;
            }
        }
    }

    async fn save_all(&self, token: &RunToken, config: &ScrapeConfig, ctx: &mut RunContext) {
        let total = ctx.postings.len();
        self.progress
            .update(token, FILTERING_PERCENT, format!("Saving {total} jobs..."));

        for index in 0..total {
            let candidate = {
                let posting = &mut ctx.postings[index];
                posting.user_id.clone_from(&config.user_id);
                posting.clone()
            };

            match ctx.dedup.is_stored(self.store.as_ref(), &candidate).await {
                Ok(true) => {
                    tracing::debug!(
                        "Skipping stored duplicate: {} at {}",
                        candidate.title,
                        candidate.company
                    );
                }
                Ok(false) => match self.store.save(candidate).await {
                    Ok(saved) => {
                        tracing::debug!("Saved job: {} at {}", saved.title, saved.company);
                        ctx.postings[index] = saved;
                        ctx.stats.saved += 1;
                    }
                    Err(e) => {
                        tracing::warn!("Error saving job {}: {}", ctx.postings[index].title, e);
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        "Error checking for duplicate of {}: {}",
                        ctx.postings[index].title,
                        e
                    );
                }
            }

            self.progress.update(
                token,
                saving_percent(index + 1, total),
                format!("Saving jobs ({}/{total})", index + 1),
            );
        }

        tracing::info!(
            "Saved {} new jobs (skipped {} duplicates)",
            ctx.stats.saved,
            ctx.dedup.duplicates_skipped()
        );
    }
}

fn scraping_percent(facet_index: usize, total_facets: usize, pages_done: u32, pages: u32) -> i32 {
    let pages = u64::from(pages.max(1));
    let total = u64::try_from(total_facets.max(1)).unwrap_or(u64::MAX);
    let index = u64::try_from(facet_index).unwrap_or(u64::MAX);
    let done = index.saturating_mul(pages) + u64::from(pages_done);
    let span = u64::try_from(FILTERING_PERCENT - CONNECTING_PERCENT).unwrap_or(0);
    let within = (span * done) / (total * pages);
    CONNECTING_PERCENT + i32::try_from(within.min(span)).unwrap_or(0)
}

fn saving_percent(saved: usize, total: usize) -> i32 {
    if total == 0 {
        return FILTERING_PERCENT + SAVING_SPAN;
    }
    let span = usize::try_from(SAVING_SPAN).unwrap_or(0);
    FILTERING_PERCENT + i32::try_from(span * saved / total).unwrap_or(SAVING_SPAN)
}

async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
