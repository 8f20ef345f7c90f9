//! JobScout Database Layer
//!
//! Provides `SQLite` storage for scraped postings and saved scraper presets.
//! Uses `SQLx` with embedded migrations.
//!
//! # Architecture
//!
//! - **Migrations**: SQL migrations are embedded and versioned using `SQLx`
//! - **Connection Pooling**: up to 5 connections for file databases, one for `:memory:`
//! - **Store seam**: [`Database`] implements [`jobscout_core::PostingStore`]
//!
//! # Example
//!
//! ```ignore
//! use jobscout_db::Database;
//!
//! let db = Database::new("jobscout.db").await?;
//! db.run_migrations().await?;
//! let last = db.last_scrape_date(&user).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod migrations;
pub mod postings;
pub mod saved_configs;

// Re-export commonly used types
pub use error::{DatabaseError, Result};
pub use saved_configs::SavedConfig;

use async_trait::async_trait;
use chrono::NaiveDate;
use jobscout_core::{Posting, PostingStore, ScrapeConfig, UserId};
use std::path::Path;

/// High-level database interface.
#[derive(Debug, Clone)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Sqlite>,
}

impl Database {
    /// Open (or create) the database at `path`.
    ///
    /// # Arguments
    /// * `path` - Path to the database file (or `:memory:` for in-memory)
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::open_pool(path).await?;
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        Self::new(connection::MEMORY).await
    }

    /// Run all pending database migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        &self.pool
    }

    /// Postings owned by `user`, most recently scraped first.
    pub async fn list_postings(&self, user: Option<&UserId>, limit: u32) -> Result<Vec<Posting>> {
        postings::list_postings(&self.pool, user, limit).await
    }

    /// Most recent scrape date among the user's postings.
    pub async fn last_scrape_date(&self, user: &UserId) -> Result<Option<NaiveDate>> {
        postings::last_scrape_date(&self.pool, user).await
    }

    /// Store a named preset for `user`.
    pub async fn save_config(
        &self,
        user: &UserId,
        name: &str,
        config: &ScrapeConfig,
    ) -> Result<SavedConfig> {
        saved_configs::save_config(&self.pool, user, name, config).await
    }

    /// Presets of `user`, most recently used first.
    pub async fn list_configs(&self, user: &UserId) -> Result<Vec<SavedConfig>> {
        saved_configs::list_configs(&self.pool, user).await
    }

    /// Load a preset and mark it used.
    pub async fn load_config(&self, user: &UserId, id: &str) -> Result<SavedConfig> {
        saved_configs::load_config(&self.pool, user, id).await
    }

    /// Delete a preset.
    pub async fn delete_config(&self, user: &UserId, id: &str) -> Result<()> {
        saved_configs::delete_config(&self.pool, user, id).await
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl PostingStore for Database {
    async fn exists_similar(
        &self,
        title: &str,
        company: &str,
        date_posted: Option<NaiveDate>,
        user: Option<&UserId>,
    ) -> jobscout_core::Result<bool> {
        Ok(postings::exists_similar(&self.pool, title, company, date_posted, user).await?)
    }

    async fn save(&self, posting: Posting) -> jobscout_core::Result<Posting> {
        Ok(postings::insert_posting(&self.pool, posting).await?)
    }
}
