use crate::error::Result;
use crate::parser::compile;
use crate::retry::RetryPolicy;
use jobscout_http::{CookieJar, HttpTransport, PageRequest, UserAgentPool};
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;

const CHALLENGE_TITLES: [&str; 2] = ["CAPTCHA", "Security Verification"];
const CHALLENGE_BODY: &str = "unusual activity";

/// Recognizes pages served instead of content when a client is flagged as automated.
#[derive(Debug, Clone)]
pub struct ChallengeDetector {
    title: Selector,
    body: Selector,
}

impl ChallengeDetector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: compile("title")?,
            body: compile("body")?,
        })
    }

    pub fn is_challenge(&self, html: &str) -> bool {
        let document = Html::parse_document(html);

        let title: String = document
            .select(&self.title)
            .next()
            .map(|t| t.text().collect())
            .unwrap_or_default();
        if CHALLENGE_TITLES.iter().any(|marker| title.contains(marker)) {
            return true;
        }

        document
            .select(&self.body)
            .next()
            .is_some_and(|body| body.text().collect::<String>().contains(CHALLENGE_BODY))
    }
}

/// Retrying GET for results and detail pages.
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn HttpTransport>,
    agents: UserAgentPool,
    policy: RetryPolicy,
    challenge_delay: Duration,
    detector: ChallengeDetector,
}

impl PageFetcher {
    /// `policy` covers transport failures; challenge pages wait `2 × base_delay`.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        agents: UserAgentPool,
        policy: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            transport,
            agents,
            challenge_delay: policy.base_delay.saturating_mul(2),
            policy,
            detector: ChallengeDetector::new()?,
        })
    }

    /// Fetch a page body, storing response cookies in `jar`.
    ///
    /// Transport failures, non-2xx statuses and challenge pages all draw on the
    /// same attempt budget. Returns `None` once it is exhausted.
    pub async fn fetch(&self, url: &str, jar: &CookieJar) -> Option<String> {
        let mut attempts = self.policy.attempts();

        while let Some(attempt) = attempts.next_attempt().await {
            let request =
                PageRequest::new(url, self.agents.pick()).with_cookies(jar.header_for(url));

            let response = match self.transport.get(&request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("Error getting page (attempt {}): {}", attempt, e);
                    attempts.back_off();
                    continue;
                }
            };
            jar.store(
                response.final_url.as_deref().unwrap_or(url),
                &response.set_cookies,
            );

            let body = match response.error_for_status(url) {
                Ok(response) => response.body,
                Err(e) => {
                    tracing::warn!("Error getting page (attempt {}): {}", attempt, e);
                    attempts.back_off();
                    continue;
                }
            };

            if self.detector.is_challenge(&body) {
                tracing::warn!(url, attempt, "Challenge page served, backing off");
                attempts.retry_after(self.challenge_delay);
                continue;
            }

            return Some(body);
        }

        tracing::warn!(url, attempts = attempts.current(), "Giving up on page");
        None
    }
}
