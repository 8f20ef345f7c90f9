use crate::error::{Result, ScrapeError};
use crate::retry::RetryPolicy;
use jobscout_http::{CookieJar, HttpTransport, PageRequest, UserAgentPool};
use std::sync::Arc;

/// Opens an anonymous session against the site root.
#[derive(Clone)]
pub struct SessionBootstrapper {
    transport: Arc<dyn HttpTransport>,
    agents: UserAgentPool,
    root_url: String,
    policy: RetryPolicy,
}

impl SessionBootstrapper {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        agents: UserAgentPool,
        base_url: &str,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            agents,
            root_url: format!("{}/", base_url.trim_end_matches('/')),
            policy,
        }
    }

    /// Fetch the site root and collect its cookies into a fresh jar.
    ///
    /// Exhausting the retry budget is fatal for the run.
    pub async fn bootstrap(&self) -> Result<CookieJar> {
        let mut attempts = self.policy.attempts();
        let mut last_error = None;

        while let Some(attempt) = attempts.next_attempt().await {
            let request = PageRequest::new(&self.root_url, self.agents.pick());
            let response = self
                .transport
                .get(&request)
                .await
                .and_then(|response| response.error_for_status(&self.root_url));

            match response {
                Ok(response) => {
                    let jar = CookieJar::new();
                    jar.store(
                        response.final_url.as_deref().unwrap_or(&self.root_url),
                        &response.set_cookies,
                    );
                    tracing::debug!(
                        cookies = response.set_cookies.len(),
                        "Session initialized"
                    );
                    return Ok(jar);
                }
                Err(e) => {
                    tracing::warn!(
                        "Session bootstrap failed (attempt {}/{}): {}",
                        attempt,
                        attempts.max_attempts(),
                        e
                    );
                    last_error = Some(e);
                    attempts.back_off();
                }
            }
        }

        Err(ScrapeError::SessionUnavailable {
            attempts: attempts.current(),
            reason: last_error.map_or_else(|| "no attempt made".to_string(), |e| e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::Backoff;
    use async_trait::async_trait;
    use jobscout_http::{HttpError, PageResponse};
    use std::sync::Mutex;
    use std::time::Duration;

    struct Scripted {
        responses: Mutex<Vec<jobscout_http::Result<PageResponse>>>,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpTransport for Scripted {
        async fn get(&self, request: &PageRequest) -> jobscout_http::Result<PageResponse> {
            self.urls.lock().unwrap().push(request.url.clone());
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn bootstrapper(responses: Vec<jobscout_http::Result<PageResponse>>) -> (SessionBootstrapper, Arc<Scripted>) {
        let transport = Arc::new(Scripted {
            responses: Mutex::new(responses),
            urls: Mutex::new(Vec::new()),
        });
        let policy = RetryPolicy::new(3, Duration::ZERO, Backoff::Linear);
        let session = SessionBootstrapper::new(
            transport.clone(),
            UserAgentPool::default(),
            "https://jobs.example.com/",
            policy,
        );
        (session, transport)
    }

    #[tokio::test]
    async fn test_bootstrap_collects_cookies_after_retry() {
        let ok = PageResponse::ok("<html></html>").with_set_cookies(["bcookie=v=2; Path=/"]);
        let (session, transport) = bootstrapper(vec![
            Err(HttpError::Timeout("https://jobs.example.com/".to_string())),
            Ok(ok),
        ]);

        let jar = session.bootstrap().await.expect("session");
        assert_eq!(
            jar.get("https://jobs.example.com/jobs/search", "bcookie").as_deref(),
            Some("v=2")
        );
        assert_eq!(
            *transport.urls.lock().unwrap(),
            vec!["https://jobs.example.com/", "https://jobs.example.com/"]
        );
    }

    #[tokio::test]
    async fn test_bootstrap_exhaustion_is_fatal() {
        let unavailable = || -> jobscout_http::Result<PageResponse> {
            Ok(PageResponse {
                status: 503,
                ..PageResponse::default()
            })
        };
        let (session, transport) = bootstrapper(vec![unavailable(), unavailable(), unavailable()]);

        let err = session.bootstrap().await.unwrap_err();
        assert!(matches!(err, ScrapeError::SessionUnavailable { attempts: 3, .. }));
        assert_eq!(transport.urls.lock().unwrap().len(), 3);
    }
}
