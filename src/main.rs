//! Pickem - command-line entry point.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use pickem::{
    AppState, NflWeek, PasswordHasher, PoolRepository, ScoringService, ServerConfig,
    create_router,
};
use std::path::PathBuf;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pickem=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            host,
            port,
            database_url,
            config,
        } => {
            let mut config = load_config(config)?;
            if let Some(host) = host {
                config = config.with_host(host);
            }
            if let Some(port) = port {
                config = config.with_port(port);
            }
            if let Some(url) = database_url {
                config = config.with_database_url(url);
            }
            run_server(config).await
        }
        Command::Migrate { database_url } => {
            let config = with_database(load_config(None)?, database_url);
            let repository = PoolRepository::new(config.database_url().clone())?;
            let applied = repository.run_migrations()?;
            info!(applied, "Database is up to date");
            Ok(())
        }
        Command::Score {
            week,
            season,
            group_id,
            database_url,
        } => {
            let config = with_database(load_config(None)?, database_url);
            run_scoring(config, NflWeek::new(season, week), group_id).await
        }
    }
}

/// Reads the optional config file, then applies the environment.
#[instrument]
fn load_config(path: Option<PathBuf>) -> Result<ServerConfig> {
    let config = match path {
        Some(path) => ServerConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    Ok(config.with_env()?)
}

fn with_database(config: ServerConfig, database_url: Option<String>) -> ServerConfig {
    match database_url {
        Some(url) => config.with_database_url(url),
        None => config,
    }
}

/// Run the HTTP API server
async fn run_server(config: ServerConfig) -> Result<()> {
    info!(database_url = %config.database_url(), "Starting pickem server");

    let repository = PoolRepository::new(config.database_url().clone())?;
    let migrate = repository.clone();
    let applied = tokio::task::spawn_blocking(move || migrate.run_migrations()).await??;
    info!(applied, "Migrations checked");

    let state = AppState::new(repository, PasswordHasher::new(*config.bcrypt_cost()));
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(addr = %addr, "Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Score one week from the command line
async fn run_scoring(config: ServerConfig, week: NflWeek, group_id: Option<i32>) -> Result<()> {
    let repository = PoolRepository::new(config.database_url().clone())?;
    let summary = tokio::task::spawn_blocking(move || {
        repository.run_migrations()?;
        ScoringService::new(repository).score_week(week, group_id)
    })
    .await??;

    info!(
        week = %week,
        games = summary.games_processed,
        picks = summary.picks_graded,
        records = summary.scores_updated,
        "Scoring complete"
    );
    println!(
        "{}: {} games, {} picks graded, {} records updated",
        week, summary.games_processed, summary.picks_graded, summary.scores_updated
    );
    Ok(())
}
