use jobscout_core::CoreError;
use jobscout_http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("could not establish a session after {attempts} attempts: {reason}")]
    SessionUnavailable { attempts: u32, reason: String },

    #[error("run panicked: {0}")]
    Panicked(String),

    #[error("invalid selector {selector}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("scrape task aborted: {0}")]
    Aborted(String),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let err = ScrapeError::SessionUnavailable {
            attempts: 3,
            reason: "HTTP 503 from https://example.com/".to_string(),
        };
        assert!(err.to_string().starts_with("could not establish a session after 3 attempts"));
    }

    #[test]
    fn test_core_errors_pass_through() {
        let err: ScrapeError = CoreError::Validation("keywords and location are required".into()).into();
        assert_eq!(err.to_string(), "validation error: keywords and location are required");
    }
}
