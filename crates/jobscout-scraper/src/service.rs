//! Fire-and-forget entry point for callers that poll.

use crate::error::{Result, ScrapeError};
use crate::orchestrator::{panic_reason, ScrapeOrchestrator, ScrapeOutcome};
use crate::progress::{ProgressRegistry, ProgressState, FAILED};
use futures::FutureExt;
use jobscout_core::{RunToken, ScrapeConfig};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Launches runs in the background and hands out progress and outcomes by token.
#[derive(Clone)]
pub struct ScrapeService {
    orchestrator: Arc<ScrapeOrchestrator>,
    outcomes: Arc<Mutex<HashMap<RunToken, ScrapeOutcome>>>,
}

impl ScrapeService {
    /// Wrap an orchestrator.
    #[must_use]
    pub fn new(orchestrator: Arc<ScrapeOrchestrator>) -> Self {
        Self {
            orchestrator,
            outcomes: Arc::default(),
        }
    }

    /// Validate the request and start a run on the current tokio runtime.
    ///
    /// Returns the run token immediately. Only validation problems are
    /// reported here; run failures surface through [`ScrapeService::poll`].
    pub fn trigger(&self, config: ScrapeConfig) -> Result<RunToken> {
        config.validate()?;
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| ScrapeError::Aborted(format!("no async runtime: {e}")))?;

        let token = RunToken::generate();
        let progress = self.orchestrator.progress().clone();
        progress.start(&token);

        let orchestrator = self.orchestrator.clone();
        let outcomes = self.outcomes.clone();
        let run_token = token.clone();

        handle.spawn(async move {
            let run = AssertUnwindSafe(orchestrator.run(&run_token, &config)).catch_unwind();
            let outcome = match run.await {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let reason = panic_reason(panic.as_ref());
                    tracing::error!(run = %run_token, "Scrape task panicked: {}", reason);
                    progress.update(&run_token, FAILED, format!("Failed: {reason}"));
                    ScrapeOutcome::aborted(run_token.clone(), reason)
                }
            };
            lock(&outcomes).insert(run_token.clone(), outcome);

            // The outcome leaves together with the progress entry.
            let purge_token = run_token.clone();
            progress.schedule_cleanup_with(&run_token, orchestrator.retention(), move || {
                lock(&outcomes).remove(&purge_token);
            });
        });

        tracing::info!(run = %token, "Scrape triggered");
        Ok(token)
    }

    /// Progress for a run, or the not-found state once purged.
    #[must_use]
    pub fn poll(&self, token: &RunToken) -> ProgressState {
        self.orchestrator.progress().get(token)
    }

    /// Remove and return a finished run's outcome.
    #[must_use]
    pub fn take_outcome(&self, token: &RunToken) -> Option<ScrapeOutcome> {
        lock(&self.outcomes).remove(token)
    }

    /// Progress registry shared with the orchestrator.
    #[must_use]
    pub fn progress(&self) -> &ProgressRegistry {
        self.orchestrator.progress()
    }
}

fn lock(
    outcomes: &Mutex<HashMap<RunToken, ScrapeOutcome>>,
) -> MutexGuard<'_, HashMap<RunToken, ScrapeOutcome>> {
    outcomes.lock().unwrap_or_else(PoisonError::into_inner)
}
