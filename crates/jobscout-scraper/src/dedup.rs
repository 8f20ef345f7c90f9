//! Run-scoped and store-scoped duplicate detection.

use jobscout_core::{Posting, PostingStore};
use std::collections::HashSet;

/// Tracks duplicates for one run across both tiers.
///
/// The run tier keys on canonical URL; postings without a URL are always
/// admitted. The store tier asks the [`PostingStore`] for a similar posting
/// owned by the same user. Both tiers add to one skip counter.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen_urls: HashSet<String>,
    duplicates_skipped: usize,
}

impl Deduplicator {
    /// Create an empty deduplicator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a posting unless its URL was already seen this run.
    pub fn admit(&mut self, posting: &Posting) -> bool {
        match posting.url.as_deref() {
            Some(url) if !url.is_empty() => {
                if self.seen_urls.insert(url.to_string()) {
                    true
                } else {
                    self.duplicates_skipped += 1;
                    false
                }
            }
            _ => true,
        }
    }

    /// Drop run-scoped duplicates, preserving order.
    pub fn retain_unseen(&mut self, postings: Vec<Posting>) -> Vec<Posting> {
        postings.into_iter().filter(|p| self.admit(p)).collect()
    }

    /// Whether the store already has this posting for its owner; hits are counted.
    pub async fn is_stored(
        &mut self,
        store: &dyn PostingStore,
        posting: &Posting,
    ) -> jobscout_core::Result<bool> {
        let exists = store
            .exists_similar(
                &posting.title,
                &posting.company,
                posting.date_posted,
                posting.user_id.as_ref(),
            )
            .await?;
        if exists {
            self.duplicates_skipped += 1;
        }
        Ok(exists)
    }

    /// Total postings dropped by either tier.
    #[must_use]
    pub fn duplicates_skipped(&self) -> usize {
        self.duplicates_skipped
    }
}
