#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use jobscout_core::{
    AppConfig, CoreError, ExperienceLevel, MemoryPostingStore, Posting, PostingStore,
    ScrapeConfig, UserId,
};
use jobscout_http::{HttpError, HttpTransport, PageRequest, PageResponse};
use jobscout_scraper::{build_search_url, ProgressRegistry, ScrapeOrchestrator};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const BASE: &str = "https://jobs.test";
pub const ROOT: &str = "https://jobs.test/";

/// Transport that replays scripted responses per URL and records every request.
///
/// Unscripted URLs answer 200 with a page that has no job cards.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<jobscout_http::Result<PageResponse>>>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, response: jobscout_http::Result<PageResponse>) {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn respond_html(&self, url: &str, html: impl Into<String>) {
        self.respond(url, Ok(PageResponse::ok(html)));
    }

    pub fn fail(&self, url: &str, times: usize) {
        for _ in 0..times {
            self.respond(url, Err(HttpError::Timeout(url.to_string())));
        }
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requested_urls().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, request: &PageRequest) -> jobscout_http::Result<PageResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let scripted = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&request.url)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Ok(PageResponse::ok(results_page(&[]))))
    }
}

/// In-memory store that fails for chosen titles.
///
/// `reject_save` titles fail on save, `reject_lookup` titles fail the
/// similarity check and `panic_on_save` makes every save panic.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryPostingStore,
    pub reject_save: Vec<String>,
    pub reject_lookup: Vec<String>,
    pub panic_on_save: bool,
}

#[async_trait]
impl PostingStore for FaultyStore {
    async fn exists_similar(
        &self,
        title: &str,
        company: &str,
        date_posted: Option<NaiveDate>,
        user: Option<&UserId>,
    ) -> jobscout_core::Result<bool> {
        if self.reject_lookup.iter().any(|t| t == title) {
            return Err(CoreError::Store(format!("lookup failed for {title}")));
        }
        self.inner.exists_similar(title, company, date_posted, user).await
    }

    async fn save(&self, posting: Posting) -> jobscout_core::Result<Posting> {
        if self.panic_on_save {
            panic!("store exploded");
        }
        if self.reject_save.contains(&posting.title) {
            return Err(CoreError::Store(format!("insert failed for {}", posting.title)));
        }
        self.inner.save(posting).await
    }
}

pub fn app_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.scraper.base_url = BASE.to_string();
    config.scraper.request_delay_ms = 0;
    config.scraper.max_pages = 10;
    config
}

pub fn orchestrator(
    config: &AppConfig,
    transport: Arc<ScriptedTransport>,
    store: Arc<dyn PostingStore>,
) -> ScrapeOrchestrator {
    ScrapeOrchestrator::new(config, transport, store, ProgressRegistry::new())
        .expect("orchestrator builds")
}

pub fn memory_store() -> Arc<MemoryPostingStore> {
    Arc::new(MemoryPostingStore::new())
}

pub fn request(pages: u32) -> ScrapeConfig {
    let mut config = ScrapeConfig::new("rust engineer", "Berlin");
    config.pages_requested = pages;
    config
}

pub fn search_url(config: &ScrapeConfig, facet: Option<ExperienceLevel>, page: u32) -> String {
    build_search_url(BASE, config, facet, page, 25)
}

pub fn card(title: &str, company: &str, href: &str) -> String {
    format!(
        r#"<li><div class="base-card">
            <a class="base-card__full-link" href="{href}"></a>
            <h3 class="base-search-card__title">{title}</h3>
            <h4 class="base-search-card__subtitle">{company}</h4>
            <span class="job-search-card__location">Berlin, Germany</span>
            <time datetime="2026-03-10">2 days ago</time>
        </div></li>"#
    )
}

pub fn results_page(cards: &[String]) -> String {
    format!(
        "<html><head><title>Rust jobs</title></head><body><ul class=\"jobs-search__results-list\">{}</ul></body></html>",
        cards.concat()
    )
}

pub fn detail_page(description: &str) -> String {
    format!(
        r#"<html><head><title>Job</title></head><body>
            <div class="description__text">{description}<button>Show more</button></div>
        </body></html>"#
    )
}

pub fn challenge_page() -> String {
    "<html><head><title>Security Verification</title></head><body>Checking</body></html>".to_string()
}
