//! Saved configuration and history commands.

use crate::state::AppState;
use jobscout_core::{Posting, ScrapeConfig, UserId};
use jobscout_db::SavedConfig;

pub async fn list(state: &AppState, user: &str) -> anyhow::Result<Vec<SavedConfig>> {
    let user = UserId::new(user)?;
    Ok(state.database.list_configs(&user).await?)
}

pub async fn save(
    state: &AppState,
    user: &str,
    name: &str,
    request: &ScrapeConfig,
) -> anyhow::Result<SavedConfig> {
    request.validate()?;
    let user = UserId::new(user)?;
    Ok(state.database.save_config(&user, name, request).await?)
}

/// Fetch one preset and mark it as used.
pub async fn load(state: &AppState, user: &str, id: &str) -> anyhow::Result<SavedConfig> {
    let user = UserId::new(user)?;
    Ok(state.database.load_config(&user, id).await?)
}

pub async fn delete(state: &AppState, user: &str, id: &str) -> anyhow::Result<()> {
    let user = UserId::new(user)?;
    Ok(state.database.delete_config(&user, id).await?)
}

pub async fn last_scrape(
    state: &AppState,
    user: &str,
) -> anyhow::Result<Option<chrono::NaiveDate>> {
    let user = UserId::new(user)?;
    Ok(state.database.last_scrape_date(&user).await?)
}

/// Most recently scraped postings stored for `user`.
pub async fn postings(state: &AppState, user: &str, limit: u32) -> anyhow::Result<Vec<Posting>> {
    let user = UserId::new(user)?;
    Ok(state.database.list_postings(Some(&user), limit).await?)
}
