//! Command implementations.

pub mod configs;
pub mod scrape;

use anyhow::Context;
use jobscout_core::ScrapeConfig;
use std::path::Path;

/// Read a scrape request from a JSON file.
pub fn read_request(path: &Path) -> anyhow::Result<ScrapeConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request {}", path.display()))?;
    let request: ScrapeConfig = serde_json::from_str(&contents)
        .with_context(|| format!("invalid request JSON in {}", path.display()))?;
    Ok(request)
}
