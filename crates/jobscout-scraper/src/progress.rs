//! Run-keyed progress ledger.
//!
//! The registry is written by the orchestrator and read by pollers. Locks are
//! held only for a map lookup or insert, never across an await, and readers
//! always receive a whole cloned state.

use jobscout_core::RunToken;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Percent value marking a failed run.
pub const FAILED: i32 = -1;

/// Status reported for unknown or purged run tokens.
pub const NOT_FOUND_STATUS: &str = "No scraping in progress";

/// Snapshot of one run's progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    /// 0..=100, or `FAILED`
    pub percent_complete: i32,
    /// 1-based page within the current facet
    pub current_page: u32,
    /// Pages per facet
    pub total_pages: u32,
    /// Human-readable status line
    pub status: String,
    /// 0-based index of the facet being searched
    pub experience_level_index: u32,
    /// Number of facet searches in the run
    pub total_experience_levels: u32,
    /// Label of the facet being searched, if any
    pub current_experience_level: Option<String>,
}

impl ProgressState {
    /// State for a run that has just been accepted.
    #[must_use]
    pub fn starting() -> Self {
        Self {
            status: "Initializing".to_string(),
            ..Self::default()
        }
    }

    /// Synthetic state returned for tokens the registry does not know.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            status: NOT_FOUND_STATUS.to_string(),
            ..Self::default()
        }
    }

    /// Whether the run failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.percent_complete == FAILED
    }

    /// Whether the run reached a terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.is_failed() || self.percent_complete >= 100
    }
}

#[derive(Default)]
struct Inner {
    states: RwLock<HashMap<RunToken, ProgressState>>,
    cleanups: Mutex<HashMap<RunToken, CancellationToken>>,
    shutdown: CancellationToken,
}

/// Shared, cloneable progress registry.
///
/// Percent values never move backwards while a run is healthy: a lower value
/// is raised to the stored one. `FAILED` is always accepted and is sticky
/// until the run is restarted with [`ProgressRegistry::start`].
#[derive(Clone, Default)]
pub struct ProgressRegistry {
    inner: Arc<Inner>,
}

impl ProgressRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a run at 0%, replacing any previous state and cleanup.
    pub fn start(&self, token: &RunToken) {
        self.cancel_cleanup(token);
        self.write().insert(token.clone(), ProgressState::starting());
    }

    /// Set percent and status, keeping the other fields.
    pub fn update(&self, token: &RunToken, percent: i32, status: impl Into<String>) {
        let mut states = self.write();
        let mut next = states.get(token).cloned().unwrap_or_default();
        next.percent_complete = percent;
        next.status = status.into();
        let merged = merge(states.get(token), next);
        states.insert(token.clone(), merged);
    }

    /// Replace the whole state.
    pub fn update_full(&self, token: &RunToken, state: ProgressState) {
        let mut states = self.write();
        let merged = merge(states.get(token), state);
        states.insert(token.clone(), merged);
    }

    /// Current state, or [`ProgressState::not_found`].
    #[must_use]
    pub fn get(&self, token: &RunToken) -> ProgressState {
        self.read()
            .get(token)
            .cloned()
            .unwrap_or_else(ProgressState::not_found)
    }

    /// Purge the run's state after `delay`. Rescheduling replaces the pending purge.
    pub fn schedule_cleanup(&self, token: &RunToken, delay: Duration) {
        self.schedule_cleanup_with(token, delay, || {});
    }

    /// Like [`ProgressRegistry::schedule_cleanup`], also running `on_purge`
    /// when the entry is removed. A cancelled purge never runs it.
    pub fn schedule_cleanup_with<F>(&self, token: &RunToken, delay: Duration, on_purge: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(run = %token, "No async runtime, progress cleanup not scheduled");
            return;
        };

        let cancel = self.inner.shutdown.child_token();
        if let Some(previous) = self.cleanups().insert(token.clone(), cancel.clone()) {
            previous.cancel();
        }

        let registry = self.clone();
        let token = token.clone();
        handle.spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::trace!(run = %token, "Progress cleanup cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    registry.write().remove(&token);
                    registry.cleanups().remove(&token);
                    on_purge();
                    tracing::debug!(run = %token, "Progress entry purged");
                }
            }
        });
    }

    /// Cancel a pending purge. Returns whether one was pending.
    pub fn cancel_cleanup(&self, token: &RunToken) -> bool {
        match self.cleanups().remove(token) {
            Some(cancel) => {
                cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending purge task.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.cleanups().clear();
    }

    /// Number of tracked runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no runs are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<RunToken, ProgressState>> {
        self.inner
            .states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<RunToken, ProgressState>> {
        self.inner
            .states
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn cleanups(&self) -> MutexGuard<'_, HashMap<RunToken, CancellationToken>> {
        self.inner
            .cleanups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn merge(stored: Option<&ProgressState>, mut next: ProgressState) -> ProgressState {
    if next.percent_complete == FAILED {
        return next;
    }
    next.percent_complete = next.percent_complete.clamp(0, 100);

    if let Some(previous) = stored {
        if previous.is_failed() {
            next.percent_complete = FAILED;
        } else if next.percent_complete < previous.percent_complete {
            next.percent_complete = previous.percent_complete;
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_token_is_not_found() {
        let registry = ProgressRegistry::new();
        let state = registry.get(&RunToken::generate());
        assert_eq!(state.percent_complete, 0);
        assert_eq!(state.status, NOT_FOUND_STATUS);
    }

    #[test]
    fn test_percent_never_decreases() {
        let registry = ProgressRegistry::new();
        let token = RunToken::generate();
        registry.start(&token);

        registry.update(&token, 40, "Scraping page 2/5");
        registry.update(&token, 30, "Scraping page 1/5");
        let state = registry.get(&token);
        assert_eq!(state.percent_complete, 40);
        assert_eq!(state.status, "Scraping page 1/5");

        registry.update(&token, 250, "overflow");
        assert_eq!(registry.get(&token).percent_complete, 100);
    }

    #[test]
    fn test_failure_is_sticky_until_restart() {
        let registry = ProgressRegistry::new();
        let token = RunToken::generate();
        registry.start(&token);
        registry.update(&token, 60, "Filtering jobs...");
        registry.update(&token, FAILED, "Failed: boom");
        assert!(registry.get(&token).is_failed());

        registry.update(&token, 90, "late update");
        assert!(registry.get(&token).is_failed());

        registry.start(&token);
        assert_eq!(registry.get(&token).percent_complete, 0);
    }

    #[test]
    fn test_update_full_keeps_monotonic_percent() {
        let registry = ProgressRegistry::new();
        let token = RunToken::generate();
        registry.update(&token, 50, "half");

        registry.update_full(
            &token,
            ProgressState {
                percent_complete: 20,
                current_page: 3,
                total_pages: 4,
                status: "Scraping".to_string(),
                experience_level_index: 1,
                total_experience_levels: 2,
                current_experience_level: Some("Director".to_string()),
            },
        );
        let state = registry.get(&token);
        assert_eq!(state.percent_complete, 50);
        assert_eq!(state.current_page, 3);
        assert_eq!(state.current_experience_level.as_deref(), Some("Director"));
    }

    #[tokio::test]
    async fn test_cleanup_purges_entry() {
        let registry = ProgressRegistry::new();
        let token = RunToken::generate();
        registry.start(&token);
        registry.update(&token, 100, "Completed");

        registry.schedule_cleanup(&token, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(registry.is_empty());
        assert_eq!(registry.get(&token).status, NOT_FOUND_STATUS);
    }

    #[tokio::test]
    async fn test_purge_hook_runs_only_for_the_final_schedule() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let registry = ProgressRegistry::new();
        let token = RunToken::generate();
        registry.start(&token);
        let purged = Arc::new(AtomicUsize::new(0));

        let first = purged.clone();
        registry.schedule_cleanup_with(&token, Duration::from_millis(20), move || {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let second = purged.clone();
        registry.schedule_cleanup_with(&token, Duration::from_millis(20), move || {
            second.fetch_add(10, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(registry.is_empty());
        assert_eq!(purged.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_cancelled_cleanup_keeps_entry() {
        let registry = ProgressRegistry::new();
        let token = RunToken::generate();
        registry.start(&token);

        registry.schedule_cleanup(&token, Duration::from_millis(20));
        assert!(registry.cancel_cleanup(&token));
        assert!(!registry.cancel_cleanup(&token));
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending_cleanups() {
        let registry = ProgressRegistry::new();
        let first = RunToken::generate();
        let second = RunToken::generate();
        registry.start(&first);
        registry.start(&second);
        registry.schedule_cleanup(&first, Duration::from_millis(20));
        registry.schedule_cleanup(&second, Duration::from_millis(20));

        registry.shutdown();
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_cleanup_without_runtime_is_skipped() {
        let registry = ProgressRegistry::new();
        let token = RunToken::generate();
        registry.start(&token);
        registry.schedule_cleanup(&token, Duration::ZERO);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let json = serde_json::to_value(ProgressState::starting()).expect("serialize");
        assert_eq!(json["percentComplete"], 0);
        assert_eq!(json["status"], "Initializing");
        assert!(json["currentExperienceLevel"].is_null());
    }
}
