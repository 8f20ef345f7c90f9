//! Connection pool setup.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Path value that selects a private in-memory database.
pub const MEMORY: &str = ":memory:";

const MAX_CONNECTIONS: u32 = 5;

/// Open a pool for the database at `path`, creating the file if needed.
///
/// `:memory:` gives an in-memory database held by a single connection.
pub async fn open_pool(path: impl AsRef<Path>) -> Result<Pool<Sqlite>> {
    let path = path.as_ref();
    let path_str = path
        .to_str()
        .ok_or_else(|| DatabaseError::Open("invalid database path: not valid UTF-8".to_string()))?;

    let (options, max_connections) = if path_str == MEMORY {
        let options = SqliteConnectOptions::from_str(MEMORY)
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?;
        (options, 1)
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        (options, MAX_CONNECTIONS)
    };

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if max_connections == 1 {
        // The in-memory database lives only as long as its connection.
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options.foreign_keys(true))
        .await
        .map_err(|e| DatabaseError::Open(format!("failed to initialize pool: {e}")))?;

    tracing::info!("Database pool created at {}", path_str);
    Ok(pool)
}
