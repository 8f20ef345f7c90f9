//! JobScout Core - Foundation crate for the JobScout scraper.
//!
//! This crate provides shared types, error handling, configuration management
//! and the posting store seam that all other JobScout crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`RunToken`, `UserId`, `ExperienceLevel`, `JobType`)
//! - [`posting`] - The scraped posting model
//! - [`scrape`] - Scrape request payload and run statistics
//! - [`store`] - `PostingStore` trait and an in-memory implementation
//!
//! # Example
//!
//! ```rust
//! use jobscout_core::{AppConfig, ScrapeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//!
//! let mut request = ScrapeConfig::new("rust developer", "Berlin");
//! request.pages_requested = 50;
//! request.validate()?;
//! assert_eq!(request.clamped_pages(config.scraper.max_pages), 10);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod posting;
pub mod scrape;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, DatabaseSettings, LoggingSettings, ProgressSettings, ScraperSettings,
    DEFAULT_USER_AGENTS,
};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use posting::{ExperienceTag, Posting};
pub use scrape::{RunStats, ScrapeConfig};
pub use store::{MemoryPostingStore, PostingStore};
pub use types::{ExperienceLevel, JobType, RunToken, UserId};
