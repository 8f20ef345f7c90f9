use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use std::sync::Arc;
use url::Url;

/// Session cookies owned by a single scrape run.
///
/// Backed by reqwest's cookie store, so `Max-Age`, `Expires`, `Domain` and
/// `Path` are honored. Cookies from every response are stored, and the
/// `Cookie` header for a request is built from what is still valid for its URL.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    store: Arc<Jar>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw `Set-Cookie` header values received from `url`.
    ///
    /// Unparsable URLs or header values are skipped.
    pub fn store<I, S>(&self, url: &str, set_cookies: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Ok(url) = Url::parse(url) else {
            tracing::debug!(url, "Ignoring cookies for unparsable URL");
            return;
        };
        let values: Vec<HeaderValue> = set_cookies
            .into_iter()
            .filter_map(|raw| HeaderValue::from_str(raw.as_ref()).ok())
            .collect();
        if values.is_empty() {
            return;
        }
        self.store.set_cookies(&mut values.iter(), &url);
    }

    /// Value for the `Cookie` request header to `url`, or `None` when nothing applies.
    pub fn header_for(&self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        self.store
            .cookies(&url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
            .filter(|header| !header.is_empty())
    }

    /// Value of the cookie `name` that would be sent to `url`.
    pub fn get(&self, url: &str, name: &str) -> Option<String> {
        self.header_for(url)?.split("; ").find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }
}
