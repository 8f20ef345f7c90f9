//! Shared types used across JobScout.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier correlating a scrape trigger with later progress polls.
///
/// Run tokens are UUID v4 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunToken(String);

impl RunToken {
    /// Create a `RunToken` from an existing string.
    ///
    /// # Errors
    /// Returns error if the token is not a valid UUID.
    pub fn new(token: impl Into<String>) -> Result<Self, CoreError> {
        let token = token.into();
        uuid::Uuid::parse_str(&token).map_err(|e| {
            CoreError::Validation(format!("invalid run token '{token}': {e}"))
        })?;
        Ok(Self(token))
    }

    /// Create a new random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the user who owns a scrape and its postings.
///
/// The scraper never interprets it; it is only passed through to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new `UserId`.
    ///
    /// # Errors
    /// Returns error if the identifier is empty or blank.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::Validation(
                "user id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Experience-level tiers the job site exposes as a search facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    /// Internships
    Internship,
    /// Entry level / junior
    EntryLevel,
    /// Associate
    Associate,
    /// Mid-senior level
    MidSenior,
    /// Director
    Director,
    /// Executive
    Executive,
}

impl ExperienceLevel {
    /// Every tier, in the site's code order.
    pub const ALL: [Self; 6] = [
        Self::Internship,
        Self::EntryLevel,
        Self::Associate,
        Self::MidSenior,
        Self::Director,
        Self::Executive,
    ];

    /// Canonical facet name, e.g. `ENTRY_LEVEL`.
    #[must_use]
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Internship => "INTERNSHIP",
            Self::EntryLevel => "ENTRY_LEVEL",
            Self::Associate => "ASSOCIATE",
            Self::MidSenior => "MID_SENIOR",
            Self::Director => "DIRECTOR",
            Self::Executive => "EXECUTIVE",
        }
    }

    /// Human-readable label, e.g. `Entry Level`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Internship => "Internship",
            Self::EntryLevel => "Entry Level",
            Self::Associate => "Associate",
            Self::MidSenior => "Mid-Senior",
            Self::Director => "Director",
            Self::Executive => "Executive",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Employment type of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    /// Full-time
    FullTime,
    /// Part-time
    PartTime,
    /// Contract
    Contract,
    /// Temporary
    Temporary,
    /// Internship
    Internship,
    /// Volunteer
    Volunteer,
}

impl JobType {
    /// Every job type, in the site's code order.
    pub const ALL: [Self; 6] = [
        Self::FullTime,
        Self::PartTime,
        Self::Contract,
        Self::Temporary,
        Self::Internship,
        Self::Volunteer,
    ];

    /// Canonical facet name, e.g. `FULL_TIME`.
    #[must_use]
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::FullTime => "FULL_TIME",
            Self::PartTime => "PART_TIME",
            Self::Contract => "CONTRACT",
            Self::Temporary => "TEMPORARY",
            Self::Internship => "INTERNSHIP",
            Self::Volunteer => "VOLUNTEER",
        }
    }

    /// Human-readable label, e.g. `Full-time`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FullTime => "Full-time",
            Self::PartTime => "Part-time",
            Self::Contract => "Contract",
            Self::Temporary => "Temporary",
            Self::Internship => "Internship",
            Self::Volunteer => "Volunteer",
        }
    }

    /// Look up a job type by its canonical name (exact match).
    #[must_use]
    pub fn from_canonical_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.canonical_name() == name)
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
