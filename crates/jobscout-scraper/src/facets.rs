//! Facet lookup tables.
//!
//! Every lookup is total: unmapped input yields `None`. Inputs are normalized
//! (trimmed, upper-cased, `-` and spaces folded to `_`) before matching, so
//! `"Entry Level"`, `"entry-level"` and `"ENTRY_LEVEL"` are the same facet.

use jobscout_core::{ExperienceLevel, JobType, ScrapeConfig};

/// Site code for the remote work-type facet (`f_WT`).
pub const REMOTE_CODE: &str = "2";

const EXPERIENCE_CODES: [(ExperienceLevel, &str); 6] = [
    (ExperienceLevel::Internship, "1"),
    (ExperienceLevel::EntryLevel, "2"),
    (ExperienceLevel::Associate, "3"),
    (ExperienceLevel::MidSenior, "4"),
    (ExperienceLevel::Director, "5"),
    (ExperienceLevel::Executive, "6"),
];

// Aliases also cover the labels title inference produces.
const EXPERIENCE_ALIASES: [(&str, ExperienceLevel); 5] = [
    ("INTERN", ExperienceLevel::Internship),
    ("JUNIOR", ExperienceLevel::EntryLevel),
    ("ENTRY", ExperienceLevel::EntryLevel),
    ("MID_LEVEL", ExperienceLevel::MidSenior),
    ("SENIOR", ExperienceLevel::MidSenior),
];

const JOB_TYPE_CODES: [(JobType, &str); 6] = [
    (JobType::FullTime, "F"),
    (JobType::PartTime, "P"),
    (JobType::Contract, "C"),
    (JobType::Temporary, "T"),
    (JobType::Internship, "I"),
    (JobType::Volunteer, "V"),
];

// (max days, f_TPR code), checked in order
const RECENCY_CODES: [(u32, &str); 3] = [(1, "r86400"), (7, "r604800"), (30, "r2592000")];

/// Fold a caller-supplied facet name into canonical form.
#[must_use]
pub fn normalize(input: &str) -> String {
    input
        .trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Resolve a facet name, alias, inferred label or numeric code.
#[must_use]
pub fn experience_level(input: &str) -> Option<ExperienceLevel> {
    let key = normalize(input);
    ExperienceLevel::ALL
        .into_iter()
        .find(|level| level.canonical_name() == key)
        .or_else(|| {
            EXPERIENCE_ALIASES
                .iter()
                .find(|(alias, _)| *alias == key)
                .map(|(_, level)| *level)
        })
        .or_else(|| experience_from_code(&key))
}

#[must_use]
pub fn experience_code(level: ExperienceLevel) -> &'static str {
    EXPERIENCE_CODES
        .iter()
        .find(|(l, _)| *l == level)
        .map_or("", |(_, code)| code)
}

#[must_use]
pub fn experience_from_code(code: &str) -> Option<ExperienceLevel> {
    EXPERIENCE_CODES
        .iter()
        .find(|(_, c)| *c == code.trim())
        .map(|(level, _)| *level)
}

#[must_use]
pub fn job_type(input: &str) -> Option<JobType> {
    let key = normalize(input);
    JobType::from_canonical_name(&key).or_else(|| job_type_from_code(&key))
}

#[must_use]
pub fn job_type_code(job_type: JobType) -> &'static str {
    JOB_TYPE_CODES
        .iter()
        .find(|(t, _)| *t == job_type)
        .map_or("", |(_, code)| code)
}

#[must_use]
pub fn job_type_from_code(code: &str) -> Option<JobType> {
    JOB_TYPE_CODES
        .iter()
        .find(|(_, c)| *c == code.trim())
        .map(|(t, _)| *t)
}

/// `f_TPR` value for a recency window; 0 and anything over 30 days mean no filter.
#[must_use]
pub fn recency_code(days_old: u32) -> Option<&'static str> {
    if days_old == 0 {
        return None;
    }
    RECENCY_CODES
        .iter()
        .find(|(max, _)| days_old <= *max)
        .map(|(_, code)| *code)
}

/// Facets to search, in order. `None` means a single unfaceted search.
///
/// Include-list entries that do not map are skipped. With no usable include
/// list, a mappable `experience_level` gives one faceted search.
#[must_use]
pub fn search_facets(config: &ScrapeConfig) -> Vec<Option<ExperienceLevel>> {
    let mut facets: Vec<Option<ExperienceLevel>> = Vec::new();
    for name in &config.experience_levels_include {
        match experience_level(name) {
            Some(level) if !facets.contains(&Some(level)) => facets.push(Some(level)),
            Some(_) => {}
            None => tracing::warn!(facet = %name, "Ignoring unmapped experience level"),
        }
    }

    if facets.is_empty() {
        let single = config.experience_level.as_deref().and_then(experience_level);
        facets.push(single);
    }
    facets
}
