//! Named scraper presets per user.

use crate::error::{DatabaseError, Result};
use jobscout_core::{ScrapeConfig, UserId};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

/// A stored `ScrapeConfig` preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfig {
    /// Record identifier
    pub id: String,
    /// Owner
    pub user_id: UserId,
    /// Preset name, unique per user
    pub name: String,
    /// The stored request
    pub config: ScrapeConfig,
    /// RFC 3339 creation time
    pub created_at: String,
    /// RFC 3339 time of last load
    pub last_used: String,
}

type ConfigRow = (String, String, String, String, String, String);

/// Store a new preset. Fails with `Duplicate` if `user` already has one named `name`.
pub async fn save_config(
    pool: &Pool<Sqlite>,
    user: &UserId,
    name: &str,
    config: &ScrapeConfig,
) -> Result<SavedConfig> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DatabaseError::InvalidInput(
            "config name must not be empty".to_string(),
        ));
    }

    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM saved_configs WHERE user_id = ? AND name = ?")
            .bind(user.as_str())
            .bind(name)
            .fetch_one(pool)
            .await?;
    if existing > 0 {
        return Err(DatabaseError::Duplicate(format!(
            "A configuration named '{name}' already exists"
        )));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let saved = SavedConfig {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.clone(),
        name: name.to_string(),
        config: config.clone(),
        created_at: now.clone(),
        last_used: now,
    };

    sqlx::query(
        "INSERT INTO saved_configs (id, user_id, name, config, created_at, last_used)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&saved.id)
    .bind(saved.user_id.as_str())
    .bind(&saved.name)
    .bind(serde_json::to_string(&saved.config)?)
    .bind(&saved.created_at)
    .bind(&saved.last_used)
    .execute(pool)
    .await?;

    tracing::info!("Saved scraper config '{}' for user {}", saved.name, user);
    Ok(saved)
}

/// All presets of `user`, most recently used first.
pub async fn list_configs(pool: &Pool<Sqlite>, user: &UserId) -> Result<Vec<SavedConfig>> {
    let rows = sqlx::query_as::<_, ConfigRow>(
        "SELECT id, user_id, name, config, created_at, last_used
         FROM saved_configs
         WHERE user_id = ?
         ORDER BY last_used DESC, created_at DESC",
    )
    .bind(user.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(config_from_row).collect()
}

/// Load a preset by id and mark it as used now.
pub async fn load_config(pool: &Pool<Sqlite>, user: &UserId, id: &str) -> Result<SavedConfig> {
    let now = chrono::Utc::now().to_rfc3339();
    let result =
        sqlx::query("UPDATE saved_configs SET last_used = ? WHERE id = ? AND user_id = ?")
            .bind(&now)
            .bind(id)
            .bind(user.as_str())
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Config '{id}' not found")));
    }

    let row = sqlx::query_as::<_, ConfigRow>(
        "SELECT id, user_id, name, config, created_at, last_used
         FROM saved_configs WHERE id = ?",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    config_from_row(row)
}

/// Delete a preset. Fails with `NotFound` if `user` has no such preset.
pub async fn delete_config(pool: &Pool<Sqlite>, user: &UserId, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM saved_configs WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Config '{id}' not found")));
    }
    Ok(())
}

fn config_from_row(
    (id, user_id, name, config, created_at, last_used): ConfigRow,
) -> Result<SavedConfig> {
    Ok(SavedConfig {
        id,
        user_id: UserId::new(user_id).map_err(|e| DatabaseError::Decode(e.to_string()))?,
        name,
        config: serde_json::from_str(&config)?,
        created_at,
        last_used,
    })
}
