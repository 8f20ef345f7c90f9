//! Configuration management for JobScout.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/jobscout/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scraper behavior (target site, pacing, retry budgets)
    pub scraper: ScraperSettings,
    /// Progress ledger settings
    pub progress: ProgressSettings,
    /// Posting store settings
    pub database: DatabaseSettings,
    /// Log output settings
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML or fail validation
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, falling back to defaults if absent.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let config: Self = if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `JOBSCOUT_BASE_URL`: Override the target site root
    /// - `JOBSCOUT_MAX_PAGES`: Override the page cap
    /// - `JOBSCOUT_REQUEST_DELAY_MS`: Override the delay between requests
    /// - `JOBSCOUT_DATABASE_PATH`: Override the posting store location
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("JOBSCOUT_BASE_URL") {
            tracing::debug!("Override scraper.base_url from env: {}", val);
            self.scraper.base_url = val;
        }

        if let Some(val) = lookup("JOBSCOUT_MAX_PAGES") {
            if let Ok(max_pages) = val.parse() {
                self.scraper.max_pages = max_pages;
                tracing::debug!("Override scraper.max_pages from env: {}", max_pages);
            }
        }

        if let Some(val) = lookup("JOBSCOUT_REQUEST_DELAY_MS") {
            if let Ok(delay) = val.parse() {
                self.scraper.request_delay_ms = delay;
                tracing::debug!("Override scraper.request_delay_ms from env: {}", delay);
            }
        }

        if let Some(val) = lookup("JOBSCOUT_DATABASE_PATH") {
            tracing::debug!("Override database.path from env: {}", val);
            self.database.path = Some(PathBuf::from(val));
        }
    }

    /// Check value constraints that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        let scraper = &self.scraper;
        let positive = [
            ("scraper.max_pages", scraper.max_pages),
            ("scraper.fetch_attempts", scraper.fetch_attempts),
            ("scraper.bootstrap_attempts", scraper.bootstrap_attempts),
            ("scraper.results_per_page", scraper.results_per_page),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if !scraper.base_url.starts_with("http://") && !scraper.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "scraper.base_url".to_string(),
                reason: format!("not an http(s) URL: '{}'", scraper.base_url),
            });
        }

        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/jobscout/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/jobscout`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Resolve the posting store path, defaulting into the data directory.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("jobscout.db")),
        }
    }

    fn project_dirs() -> ConfigResult<ProjectDirs> {
        ProjectDirs::from("com", "jobscout", "jobscout").ok_or(ConfigError::NoConfigDir)
    }
}

/// Scraper behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperSettings {
    /// Root of the job-search site (no trailing slash needed)
    pub base_url: String,
    /// Delay between consecutive requests in milliseconds
    pub request_delay_ms: u64,
    /// Hard cap on pages per facet search
    pub max_pages: u32,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Attempts for the session bootstrap request
    pub bootstrap_attempts: u32,
    /// Attempts for each page fetch
    pub fetch_attempts: u32,
    /// Detail pages are fetched only when a results page has at most this many cards
    pub detail_fetch_max_cards: usize,
    /// Cards per results page, used for the `start` offset
    pub results_per_page: u32,
    /// Desktop user agents rotated per request
    pub user_agents: Vec<String>,
}

impl ScraperSettings {
    /// Delay between consecutive requests.
    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Timeout applied to each request.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.linkedin.com".to_string(),
            request_delay_ms: 2000,
            max_pages: 10,
            request_timeout_secs: 30,
            bootstrap_attempts: 3,
            fetch_attempts: 3,
            detail_fetch_max_cards: 50,
            results_per_page: 25,
            user_agents: DEFAULT_USER_AGENTS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Desktop browser user agents used when none are configured.
pub const DEFAULT_USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// Progress ledger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    /// How long a finished run's progress stays queryable, in seconds
    pub retention_secs: u64,
}

impl ProgressSettings {
    /// Retention window as a `Duration`.
    #[must_use]
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            retention_secs: 300,
        }
    }
}

/// Posting store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file path; defaults to `<data_dir>/jobscout.db`
    pub path: Option<PathBuf>,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            default_filter: "info,jobscout=debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scraper.base_url, "https://www.linkedin.com");
        assert_eq!(config.scraper.fetch_attempts, 3);
        assert_eq!(config.scraper.detail_fetch_max_cards, 50);
        assert_eq!(config.scraper.user_agents.len(), DEFAULT_USER_AGENTS.len());
        assert_eq!(config.progress.retention_secs, 300);
        assert!(config.database.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[scraper]"));
        assert!(toml_str.contains("[progress]"));
        assert!(toml_str.contains("[logging]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.scraper.max_pages, config.scraper.max_pages);
    }

    #[test]
    fn test_config_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.scraper.max_pages = 4;
        config.scraper.request_delay_ms = 250;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.scraper.max_pages, 4);
        assert_eq!(loaded.scraper.request_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let loaded =
            AppConfig::load_from(&tmp.path().join("absent.toml")).expect("defaults when absent");
        assert_eq!(loaded.scraper.max_pages, 10);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("JOBSCOUT_MAX_PAGES", "3"),
            ("JOBSCOUT_REQUEST_DELAY_MS", "0"),
            ("JOBSCOUT_BASE_URL", "http://127.0.0.1:8080"),
            ("JOBSCOUT_DATABASE_PATH", "/tmp/jobs.db"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.scraper.max_pages, 3);
        assert_eq!(config.scraper.request_delay_ms, 0);
        assert_eq!(config.scraper.base_url, "http://127.0.0.1:8080");
        assert_eq!(
            config.database_path().expect("explicit path"),
            PathBuf::from("/tmp/jobs.db")
        );
    }

    #[test]
    fn test_unparsable_env_value_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| {
            (key == "JOBSCOUT_MAX_PAGES").then(|| "lots".to_string())
        });
        assert_eq!(config.scraper.max_pages, 10);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[scraper]
max_pages = 2

[progress]
retention_secs = 60
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.scraper.max_pages, 2);
        assert_eq!(config.progress.retention(), Duration::from_secs(60));
        // These should be defaults
        assert_eq!(config.scraper.fetch_attempts, 3);
        assert_eq!(config.logging.default_filter, "info,jobscout=debug");
    }

    #[test]
    fn test_validate_rejects_zero_page_cap() {
        let mut config = AppConfig::default();
        config.scraper.max_pages = 0;
        let err = config.validate().expect_err("zero page cap");
        assert!(err.to_string().contains("scraper.max_pages"));
    }

    #[test]
    fn test_validate_rejects_non_http_base() {
        let mut config = AppConfig::default();
        config.scraper.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }
}
