//! `scrape` command.

use crate::state::AppState;
use jobscout_core::ScrapeConfig;
use jobscout_scraper::ScrapeOutcome;
use std::time::Duration;
use tracing::info;

/// Trigger a run and poll it to completion, logging each progress change.
pub async fn run_scrape(
    state: &AppState,
    request: ScrapeConfig,
    poll_interval: Duration,
) -> anyhow::Result<ScrapeOutcome> {
    let token = state.service.trigger(request)?;
    info!(run = %token, "Scrape started");

    let mut last_status = String::new();
    loop {
        if let Some(outcome) = state.service.take_outcome(&token) {
            info!(run = %token, "{}", outcome.message);
            return Ok(outcome);
        }

        let progress = state.service.poll(&token);
        if progress.status != last_status {
            info!(
                run = %token,
                percent = progress.percent_complete,
                page = progress.current_page,
                "{}",
                progress.status
            );
            last_status = progress.status;
        }

        tokio::time::sleep(poll_interval).await;
    }
}
