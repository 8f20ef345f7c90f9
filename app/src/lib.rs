//! JobScout Command-Line Shell
//!
//! Thin shell that wires configuration, storage and the scraper together.
//! Core logic lives in the `crates/` directory.

pub mod commands;
pub mod state;

use clap::{Parser, Subcommand};
use jobscout_core::AppConfig;
use state::AppState;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "jobscout")]
#[command(about = "Scrape job listings into a local database")]
#[command(version)]
pub struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a scrape from a JSON request file or a saved configuration and print the outcome
    Scrape {
        /// Path to the request JSON
        #[arg(required_unless_present = "saved")]
        request: Option<PathBuf>,

        /// Run the saved configuration with this id instead of a request file
        #[arg(long, conflicts_with = "request", requires = "user")]
        saved: Option<String>,

        /// Owning user, overriding the request's `userId`
        #[arg(long)]
        user: Option<String>,

        /// Progress poll interval in milliseconds
        #[arg(long, default_value_t = 500)]
        poll_ms: u64,
    },

    /// List a user's saved configurations
    Configs {
        /// Owning user
        user: String,
    },

    /// Store a request file as a named configuration
    SaveConfig {
        /// Owning user
        user: String,
        /// Configuration name, unique per user
        name: String,
        /// Path to the request JSON
        request: PathBuf,
    },

    /// Delete a saved configuration
    DeleteConfig {
        /// Owning user
        user: String,
        /// Configuration id
        id: String,
    },

    /// List a user's stored postings, newest scrape first
    Postings {
        /// Owning user
        user: String,
        /// Maximum number of postings to print
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },

    /// Show the date of the user's most recent scrape
    LastScrape {
        /// Owning user
        user: String,
    },

    /// Write the effective configuration to the default config file
    InitConfig,
}

/// Initialize tracing subscriber for logging
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("jobscout: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging.default_filter);
    info!("Starting JobScout v{}", env!("CARGO_PKG_VERSION"));

    match execute(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Commands, config: AppConfig) -> anyhow::Result<ExitCode> {
    if matches!(command, Commands::InitConfig) {
        config.save()?;
        println!("{}", AppConfig::config_path()?.display());
        return Ok(ExitCode::SUCCESS);
    }

    let state = AppState::open(config).await?;
    let result = run_command(&state, command).await;
    state.shutdown().await;
    result
}

async fn run_command(state: &AppState, command: Commands) -> anyhow::Result<ExitCode> {
    let code = match command {
        Commands::Scrape {
            request,
            saved,
            user,
            poll_ms,
        } => {
            let mut request = match (saved, request) {
                (Some(id), _) => {
                    let owner = user.as_deref().unwrap_or_default();
                    commands::configs::load(state, owner, &id).await?.config
                }
                (None, Some(path)) => commands::read_request(&path)?,
                (None, None) => anyhow::bail!("a request file or --saved <id> is required"),
            };
            if let Some(user) = user {
                request.user_id = Some(jobscout_core::UserId::new(user)?);
            }
            let outcome =
                commands::scrape::run_scrape(state, request, Duration::from_millis(poll_ms))
                    .await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Commands::Configs { user } => {
            let configs = commands::configs::list(state, &user).await?;
            println!("{}", serde_json::to_string_pretty(&configs)?);
            ExitCode::SUCCESS
        }
        Commands::SaveConfig {
            user,
            name,
            request,
        } => {
            let request = commands::read_request(&request)?;
            let saved = commands::configs::save(state, &user, &name, &request).await?;
            println!("{}", saved.id);
            ExitCode::SUCCESS
        }
        Commands::DeleteConfig { user, id } => {
            commands::configs::delete(state, &user, &id).await?;
            ExitCode::SUCCESS
        }
        Commands::Postings { user, limit } => {
            let postings = commands::configs::postings(state, &user, limit).await?;
            println!("{}", serde_json::to_string_pretty(&postings)?);
            ExitCode::SUCCESS
        }
        Commands::LastScrape { user } => {
            match commands::configs::last_scrape(state, &user).await? {
                Some(date) => println!("{date}"),
                None => println!("never"),
            }
            ExitCode::SUCCESS
        }
        Commands::InitConfig => ExitCode::SUCCESS,
    };
    Ok(code)
}
