use crate::error::{Result, ScrapeError};
use crate::url_builder::canonical_url;
use chrono::NaiveDate;
use jobscout_core::{ExperienceLevel, ExperienceTag, JobType, Posting};
use scraper::{ElementRef, Html, Selector};

const CARD: &str = "div.base-card";
const TITLE: &str = "h3.base-search-card__title";
const COMPANY: &str = "h4.base-search-card__subtitle";
const LOCATION: &str = "span.job-search-card__location";
const LINK: &str = "a.base-card__full-link";
const POSTED: &str = "time[datetime]";
const DESCRIPTION: &str = "div.description__text";

pub(crate) fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Turns results pages into partial postings and detail pages into descriptions.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    base_url: String,
    card: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    link: Selector,
    posted: Selector,
    description: Selector,
}

impl ListingExtractor {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            card: compile(CARD)?,
            title: compile(TITLE)?,
            company: compile(COMPANY)?,
            location: compile(LOCATION)?,
            link: compile(LINK)?,
            posted: compile(POSTED)?,
            description: compile(DESCRIPTION)?,
        })
    }

    /// Extract every well-formed card. Cards without title or company are skipped.
    pub fn extract(
        &self,
        html: &str,
        scrape_date: NaiveDate,
        facet: Option<ExperienceLevel>,
    ) -> Vec<Posting> {
        let document = Html::parse_document(html);
        let mut postings = Vec::new();
        let mut skipped = 0usize;

        for card in document.select(&self.card) {
            match self.parse_card(card, scrape_date, facet) {
                Some(posting) => postings.push(posting),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, "Skipped incomplete job cards");
        }
        postings
    }

    fn parse_card(
        &self,
        card: ElementRef<'_>,
        scrape_date: NaiveDate,
        facet: Option<ExperienceLevel>,
    ) -> Option<Posting> {
        let title = first_text(card, &self.title)?;
        let company = first_text(card, &self.company)?;
        let location = first_text(card, &self.location).unwrap_or_default();

        let mut posting = Posting::new(title, company, location, scrape_date);
        posting.url = card
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| canonical_url(&self.base_url, href));
        posting.date_posted = Some(
            card.select(&self.posted)
                .next()
                .and_then(|t| t.value().attr("datetime"))
                .and_then(parse_posted_date)
                .unwrap_or(scrape_date),
        );
        if let Some(level) = facet {
            posting.experience = ExperienceTag::Facet(level);
        }
        let inferred = infer_experience(&posting.title);
        posting.infer_experience(inferred);
        posting.job_type = infer_job_type(&card.text().collect::<Vec<_>>().join(" "));

        Some(posting)
    }

    /// Description text from a posting's own page, `None` when the page has none.
    pub fn description(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.description)
            .next()
            .map(text_without_buttons)
    }
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

fn parse_posted_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    raw.get(..10).unwrap_or(raw).parse().ok()
}

fn text_without_buttons(root: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_button = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root.id())
            .any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| el.name() == "button")
            });
        if !in_button {
            parts.push(text);
        }
    }
    collapse_whitespace(&parts.join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Experience label guessed from title keywords, first match wins.
pub fn infer_experience(title: &str) -> &'static str {
    const RULES: [(&[&str], &str); 5] = [
        (&["intern"], "Internship"),
        (&["senior", "sr.", "lead"], "Senior"),
        (&["junior", "jr.", "entry"], "Junior"),
        (&["principal", "director", "head of"], "Director"),
        (&["vp", "vice president", "chief"], "Executive"),
    ];

    let title = title.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| title.contains(k)))
        .map_or("Mid-level", |(_, label)| *label)
}

/// Employment type from free card text, defaulting to full-time.
pub fn infer_job_type(card_text: &str) -> JobType {
    const RULES: [(&[&str], JobType); 5] = [
        (&["full-time", "full time"], JobType::FullTime),
        (&["part-time", "part time"], JobType::PartTime),
        (&["contract"], JobType::Contract),
        (&["temporary", "temp"], JobType::Temporary),
        (&["intern"], JobType::Internship),
    ];

    let text = card_text.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map_or(JobType::FullTime, |(_, job_type)| *job_type)
}
