//! Application state management.

use jobscout_core::AppConfig;
use jobscout_db::Database;
use jobscout_http::ReqwestTransport;
use jobscout_scraper::{ProgressRegistry, ScrapeOrchestrator, ScrapeService};
use std::sync::Arc;

/// Everything a command needs, opened once per invocation.
pub struct AppState {
    /// Effective configuration
    pub config: AppConfig,
    /// Posting and preset storage
    pub database: Database,
    /// Background scrape runner
    pub service: ScrapeService,
}

impl AppState {
    /// Open the database, run migrations and build the scrape service.
    pub async fn open(config: AppConfig) -> anyhow::Result<Self> {
        let db_path = config.database_path()?;
        tracing::info!("Database: {}", db_path.display());

        let database = Database::new(&db_path).await?;
        database.run_migrations().await?;

        let transport = ReqwestTransport::new(config.scraper.request_timeout())?;
        let orchestrator = ScrapeOrchestrator::new(
            &config,
            Arc::new(transport),
            Arc::new(database.clone()),
            ProgressRegistry::new(),
        )?;

        Ok(Self {
            config,
            database,
            service: ScrapeService::new(Arc::new(orchestrator)),
        })
    }

    /// Cancel pending progress cleanups and close the database.
    pub async fn shutdown(self) {
        self.service.progress().shutdown();
        self.database.close().await;
    }
}
