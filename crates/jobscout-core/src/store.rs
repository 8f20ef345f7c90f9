//! Posting store seam.
//!
//! The scraper only needs two things from persistence: a similarity check
//! and a save. Any backend implementing [`PostingStore`] can be plugged in.

use crate::error::Result;
use crate::posting::Posting;
use crate::types::UserId;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;

/// Persistence collaborator for scraped postings.
#[async_trait]
pub trait PostingStore: Send + Sync {
    /// Whether the user already has a posting with the same title and company
    /// (case-insensitive) where the posted dates match or either is unknown.
    async fn exists_similar(
        &self,
        title: &str,
        company: &str,
        date_posted: Option<NaiveDate>,
        user: Option<&UserId>,
    ) -> Result<bool>;

    /// Persist a posting, returning it with its store identifier.
    async fn save(&self, posting: Posting) -> Result<Posting>;
}

/// Returns true when two postings are the same job for dedup purposes.
#[must_use]
pub fn is_similar(
    existing: &Posting,
    title: &str,
    company: &str,
    date_posted: Option<NaiveDate>,
    user: Option<&UserId>,
) -> bool {
    existing.user_id.as_ref() == user
        && existing.title.eq_ignore_ascii_case(title)
        && existing.company.eq_ignore_ascii_case(company)
        && match (existing.date_posted, date_posted) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
}

/// In-process store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryPostingStore {
    postings: Mutex<Vec<Posting>>,
}

impl MemoryPostingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with postings.
    #[must_use]
    pub fn with_postings(postings: Vec<Posting>) -> Self {
        Self {
            postings: Mutex::new(postings),
        }
    }

    /// Snapshot of everything saved so far.
    #[must_use]
    pub fn postings(&self) -> Vec<Posting> {
        self.lock().clone()
    }

    /// Number of stored postings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Posting>> {
        // A poisoned lock still holds consistent data: writers only push.
        self.postings
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl PostingStore for MemoryPostingStore {
    async fn exists_similar(
        &self,
        title: &str,
        company: &str,
        date_posted: Option<NaiveDate>,
        user: Option<&UserId>,
    ) -> Result<bool> {
        Ok(self
            .lock()
            .iter()
            .any(|p| is_similar(p, title, company, date_posted, user)))
    }

    async fn save(&self, mut posting: Posting) -> Result<Posting> {
        if posting.id.is_none() {
            posting.id = Some(uuid::Uuid::new_v4().to_string());
        }
        self.lock().push(posting.clone());
        Ok(posting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date")
    }

    fn owned(title: &str, company: &str, posted: Option<NaiveDate>, user: &str) -> Posting {
        let mut posting = Posting::new(title, company, "Remote", day(10));
        posting.date_posted = posted;
        posting.user_id = Some(UserId::new(user).expect("valid user"));
        posting
    }

    #[tokio::test]
    async fn test_save_assigns_id() {
        let store = MemoryPostingStore::new();
        let saved = store
            .save(Posting::new("Engineer", "Acme", "", day(1)))
            .await
            .expect("save");
        assert!(saved.id.is_some());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_similarity_is_case_insensitive_and_user_scoped() {
        let store =
            MemoryPostingStore::with_postings(vec![owned("Rust Engineer", "Acme", Some(day(2)), "u1")]);
        let u1 = UserId::new("u1").expect("valid user");
        let u2 = UserId::new("u2").expect("valid user");

        assert!(store
            .exists_similar("rust engineer", "ACME", Some(day(2)), Some(&u1))
            .await
            .expect("query"));
        assert!(!store
            .exists_similar("rust engineer", "ACME", Some(day(2)), Some(&u2))
            .await
            .expect("query"));
    }

    #[tokio::test]
    async fn test_unknown_dates_match_anything() {
        let store = MemoryPostingStore::with_postings(vec![owned("Engineer", "Acme", None, "u1")]);
        let u1 = UserId::new("u1").expect("valid user");

        assert!(store
            .exists_similar("Engineer", "Acme", Some(day(9)), Some(&u1))
            .await
            .expect("query"));
    }

    #[tokio::test]
    async fn test_different_dates_do_not_match() {
        let store =
            MemoryPostingStore::with_postings(vec![owned("Engineer", "Acme", Some(day(1)), "u1")]);
        let u1 = UserId::new("u1").expect("valid user");

        assert!(!store
            .exists_similar("Engineer", "Acme", Some(day(2)), Some(&u1))
            .await
            .expect("query"));
    }
}
