use crate::fetcher::PageFetcher;
use crate::parser::ListingExtractor;
use jobscout_core::Posting;
use jobscout_http::CookieJar;
use std::time::Duration;

/// Fills in descriptions from each posting's own page.
#[derive(Clone)]
pub struct DetailFetcher {
    fetcher: PageFetcher,
    extractor: ListingExtractor,
    request_delay: Duration,
    max_cards: usize,
}

impl DetailFetcher {
    pub fn new(
        fetcher: PageFetcher,
        extractor: ListingExtractor,
        request_delay: Duration,
        max_cards: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            request_delay,
            max_cards,
        }
    }

    /// Detail pages are only fetched for results pages up to the card ceiling.
    pub fn should_fetch(&self, cards_on_page: usize) -> bool {
        cards_on_page <= self.max_cards
    }

    /// Attach a description, empty when the page is missing or has none.
    ///
    /// Postings without a URL are left untouched. Returns whether text was found.
    pub async fn attach_description(&self, posting: &mut Posting, jar: &CookieJar) -> bool {
        let Some(url) = posting.url.clone() else {
            return false;
        };

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let description = match self.fetcher.fetch(&url, jar).await {
            Some(html) => self.extractor.description(&html),
            None => {
                tracing::warn!(
                    "Error getting details for job {} at {}: page unavailable",
                    posting.title,
                    posting.company
                );
                None
            }
        };

        let found = description.as_deref().is_some_and(|d| !d.is_empty());
        if found {
            tracing::debug!(title = %posting.title, "Extracted description");
        }
        posting.description = Some(description.unwrap_or_default());
        found
    }
}
