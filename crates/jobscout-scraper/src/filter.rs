use crate::facets;
use jobscout_core::{ExperienceLevel, ExperienceTag, Posting, ScrapeConfig};

/// Ordered inclusion and exclusion predicates built from a request.
///
/// Stages with an empty word list are skipped. Matching is case-insensitive
/// substring search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPipeline {
    title_include: Vec<String>,
    title_exclude: Vec<String>,
    company_exclude: Vec<String>,
    description_exclude: Vec<String>,
    experience_exclude: Vec<ExperienceLevel>,
}

impl FilterPipeline {
    pub fn from_config(config: &ScrapeConfig) -> Self {
        let mut experience_exclude = Vec::new();
        for name in &config.experience_level_exclude {
            match facets::experience_level(name) {
                Some(level) => experience_exclude.push(level),
                None if name.trim().is_empty() => {}
                None => tracing::warn!(level = %name, "Ignoring unmapped experience level exclusion"),
            }
        }

        Self {
            title_include: lowered(&config.title_include_words),
            title_exclude: lowered(&config.title_exclude_words),
            company_exclude: lowered(&config.company_exclude_words),
            description_exclude: lowered(&config.description_exclude_words),
            experience_exclude,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, postings: Vec<Posting>) -> Vec<Posting> {
        tracing::info!("Applying filters to {} jobs", postings.len());
        let mut postings = postings;

        if !self.title_include.is_empty() {
            postings = stage("Title include words", postings, |p| {
                contains_any(&p.title, &self.title_include)
            });
        }
        if !self.title_exclude.is_empty() {
            postings = stage("Title exclude words", postings, |p| {
                !contains_any(&p.title, &self.title_exclude)
            });
        }
        if !self.company_exclude.is_empty() {
            postings = stage("Company exclude words", postings, |p| {
                !contains_any(&p.company, &self.company_exclude)
            });
        }
        if !self.description_exclude.is_empty() {
            postings = stage("Description exclude words", postings, |p| {
                match p.description.as_deref() {
                    Some(text) if p.has_description() => {
                        !contains_any(text, &self.description_exclude)
                    }
                    _ => true,
                }
            });
        }
        if !self.experience_exclude.is_empty() {
            postings = stage("Experience level exclude", postings, |p| {
                tier(&p.experience).map_or(true, |level| !self.experience_exclude.contains(&level))
            });
        }

        postings
    }
}

/// A posting's experience tag in facet space. Unmapped inferred labels give `None`.
fn tier(tag: &ExperienceTag) -> Option<ExperienceLevel> {
    match tag {
        ExperienceTag::Facet(level) => Some(*level),
        ExperienceTag::Inferred(label) => facets::experience_level(label),
    }
}

fn stage(name: &str, postings: Vec<Posting>, keep: impl Fn(&Posting) -> bool) -> Vec<Posting> {
    let before = postings.len();
    let kept: Vec<Posting> = postings.into_iter().filter(|p| keep(p)).collect();
    tracing::info!("{} filter: {} -> {} jobs", name, before, kept.len());
    kept
}

fn lowered(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn contains_any(haystack: &str, lowered_words: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    lowered_words.iter().any(|w| haystack.contains(w.as_str()))
}
