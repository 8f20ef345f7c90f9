//! HTTP plumbing for the job-site scraper.
//!
//! Provides a plain HTTP GET transport with per-request user-agent
//! rotation and an explicit per-run cookie jar.

pub mod cookies;
pub mod error;
pub mod fingerprint;
pub mod transport;

pub use cookies::CookieJar;
pub use error::{HttpError, Result};
pub use fingerprint::UserAgentPool;
pub use transport::{HttpTransport, PageRequest, PageResponse, ReqwestTransport};
