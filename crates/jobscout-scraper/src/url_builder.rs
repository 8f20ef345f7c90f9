use crate::facets;
use jobscout_core::{ExperienceLevel, ScrapeConfig};
use std::fmt::Write;
use url::Url;

/// Build the results-page URL for one facet and zero-based page index.
///
/// Pure: identical inputs give byte-identical output.
pub fn build_search_url(
    base_url: &str,
    config: &ScrapeConfig,
    facet: Option<ExperienceLevel>,
    page: u32,
    results_per_page: u32,
) -> String {
    let mut url = format!(
        "{}/jobs/search?keywords={}&location={}&start={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(config.keywords.trim()),
        urlencoding::encode(config.location.trim()),
        u64::from(page) * u64::from(results_per_page),
    );

    if config.remote_only {
        let _ = write!(url, "&f_WT={}", facets::REMOTE_CODE);
    }
    if let Some(level) = facet {
        let _ = write!(url, "&f_E={}", facets::experience_code(level));
    }
    if let Some(job_type) = config.job_type.as_deref().and_then(facets::job_type) {
        let _ = write!(url, "&f_JT={}", facets::job_type_code(job_type));
    }
    if let Some(code) = facets::recency_code(config.days_old) {
        let _ = write!(url, "&f_TPR={}", urlencoding::encode(code));
    }

    url
}

/// Absolute posting URL with query and fragment removed.
///
/// Relative links resolve against `base_url`. Blank or unparseable links give `None`.
pub fn canonical_url(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut url = match Url::parse(href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(base_url).ok()?.join(href).ok()?,
        Err(_) => return None,
    };
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}
