//! Job posting model shared by the scraper and the store.

use crate::types::{ExperienceLevel, JobType, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Experience tier attached to a posting, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "level", rename_all = "snake_case")]
pub enum ExperienceTag {
    /// Found under this facet search; authoritative.
    Facet(ExperienceLevel),
    /// Guessed from title text (e.g. `Senior`, `Mid-level`).
    Inferred(String),
}

impl ExperienceTag {
    /// Human-readable tag.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Facet(level) => level.label(),
            Self::Inferred(label) => label,
        }
    }

    /// Whether the tag came from an active facet search.
    #[must_use]
    pub fn is_facet(&self) -> bool {
        matches!(self, Self::Facet(_))
    }
}

/// A job posting extracted from the search site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// Store identifier (assigned on save)
    pub id: Option<String>,
    /// Job title
    pub title: String,
    /// Hiring company
    pub company: String,
    /// Location text, may be empty
    pub location: String,
    /// Full description (absent until the detail page is fetched)
    pub description: Option<String>,
    /// Canonical posting URL; identity key within a run when present
    pub url: Option<String>,
    /// Date the site says the job was posted
    pub date_posted: Option<NaiveDate>,
    /// Date this posting was scraped
    pub date_scraped: NaiveDate,
    /// Experience tier
    pub experience: ExperienceTag,
    /// Employment type
    pub job_type: JobType,
    /// Owning user (assigned on save)
    pub user_id: Option<UserId>,
}

impl Posting {
    /// Create a posting with the required fields; everything else starts empty.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        date_scraped: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            company: company.into(),
            location: location.into(),
            description: None,
            url: None,
            date_posted: None,
            date_scraped,
            experience: ExperienceTag::Inferred("Mid-level".to_string()),
            job_type: JobType::FullTime,
            user_id: None,
        }
    }

    /// Set an inferred experience label unless a facet already tagged this posting.
    ///
    /// Returns `true` when the tag was changed.
    pub fn infer_experience(&mut self, label: impl Into<String>) -> bool {
        if self.experience.is_facet() {
            return false;
        }
        self.experience = ExperienceTag::Inferred(label.into());
        true
    }

    /// Whether the posting has description text to evaluate.
    #[must_use]
    pub fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date")
    }

    #[test]
    fn test_new_posting_defaults() {
        let posting = Posting::new("Engineer", "Acme", "Remote", date());
        assert!(posting.id.is_none());
        assert!(posting.description.is_none());
        assert_eq!(posting.experience.label(), "Mid-level");
        assert_eq!(posting.job_type, JobType::FullTime);
    }

    #[test]
    fn test_facet_tag_is_never_overwritten() {
        let mut posting = Posting::new("Senior Engineer", "Acme", "", date());
        posting.experience = ExperienceTag::Facet(ExperienceLevel::EntryLevel);

        assert!(!posting.infer_experience("Senior"));
        assert_eq!(
            posting.experience,
            ExperienceTag::Facet(ExperienceLevel::EntryLevel)
        );
    }

    #[test]
    fn test_inferred_tag_can_be_refined() {
        let mut posting = Posting::new("Senior Engineer", "Acme", "", date());
        assert!(posting.infer_experience("Senior"));
        assert_eq!(posting.experience.label(), "Senior");
    }

    #[test]
    fn test_blank_description_counts_as_missing() {
        let mut posting = Posting::new("Engineer", "Acme", "", date());
        posting.description = Some("   ".to_string());
        assert!(!posting.has_description());
        posting.description = Some("Build things".to_string());
        assert!(posting.has_description());
    }

    #[test]
    fn test_experience_tag_serialization() {
        let tag = ExperienceTag::Facet(ExperienceLevel::Director);
        let json = serde_json::to_value(&tag).expect("serialize tag");
        assert_eq!(json["source"], "facet");
        assert_eq!(json["level"], "DIRECTOR");
    }
}
