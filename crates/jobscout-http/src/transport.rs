use crate::error::{HttpError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, COOKIE, SET_COOKIE, USER_AGENT};
use reqwest::redirect::Policy;
use std::time::Duration;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const MAX_REDIRECTS: usize = 10;

/// A single GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub user_agent: String,
    /// Pre-rendered `Cookie` header value
    pub cookie_header: Option<String>,
}

impl PageRequest {
    pub fn new(url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: user_agent.into(),
            cookie_header: None,
        }
    }

    #[must_use]
    pub fn with_cookies(mut self, header: Option<String>) -> Self {
        self.cookie_header = header;
        self
    }
}

/// Raw response, regardless of status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
    /// Raw `Set-Cookie` header values
    pub set_cookies: Vec<String>,
    /// URL that produced the response after redirects, when known
    pub final_url: Option<String>,
}

impl PageResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            set_cookies: Vec::new(),
            final_url: None,
        }
    }

    /// Attach `Set-Cookie` header values.
    #[must_use]
    pub fn with_set_cookies<I, S>(mut self, set_cookies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_cookies = set_cookies.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into `HttpError::Status`
    pub fn error_for_status(self, url: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpError::Status {
                url: url.to_string(),
                status: self.status,
            })
        }
    }
}

/// Stateless HTTP GET seam; session state travels in the request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: &PageRequest) -> Result<PageResponse>;
}

/// `reqwest`-backed transport with a bounded per-request timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &PageRequest) -> Result<PageResponse> {
        url::Url::parse(&request.url).map_err(|e| HttpError::InvalidUrl(format!("{}: {e}", request.url)))?;

        let mut builder = self
            .client
            .get(&request.url)
            .header(USER_AGENT, &request.user_agent)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9");

        if let Some(cookie) = request.cookie_header.as_deref() {
            builder = builder.header(COOKIE, cookie);
        }

        let response = builder.send().await.map_err(|e| classify(&request.url, &e))?;

        let status = response.status().as_u16();
        let final_url = Some(response.url().to_string());
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok().map(str::to_string))
            .collect::<Vec<_>>();
        let body = response
            .text()
            .await
            .map_err(|e| classify(&request.url, &e))?;

        tracing::debug!(url = %request.url, status, bytes = body.len(), "GET complete");

        Ok(PageResponse {
            status,
            body,
            set_cookies,
            final_url,
        })
    }
}

fn classify(url: &str, error: &reqwest::Error) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout(url.to_string())
    } else {
        HttpError::Request {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}
