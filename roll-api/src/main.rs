use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use roll_api::{AppState, ServerConfig, logging, run_server};
use roll_core::db::{DbConfig, RepositoryRegistry};
use roll_data::SeedLoader;
use roll_db_sqlite::SqliteRepositoryFactory;

/// Property records HTTP API.
///
/// On startup the server opens (or creates) the database, runs migrations,
/// imports the CSV seed data, and only then starts accepting requests.
#[derive(Parser, Debug)]
#[command(name = "roll-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Database backend to use
    #[arg(long, default_value = "sqlite")]
    backend: String,

    /// SQLite database URL or path (created if missing)
    #[arg(short, long, default_value = "property_records.db")]
    database: String,

    /// Address to bind the HTTP listener to
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Directory containing municipalities.csv and properties.csv
    #[arg(long, default_value = "data")]
    seed_dir: PathBuf,

    /// Skip the CSV seed import (for restarts against a seeded database)
    #[arg(long, default_value_t = false)]
    skip_seed: bool,

    /// Allow requests from any origin (development only)
    #[arg(long, default_value_t = false)]
    cors_permissive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));

    let config = DbConfig {
        backend: args.backend.clone(),
        connection_string: args.database.clone(),
    };
    let repo = registry
        .create(&config)
        .await
        .with_context(|| format!("Failed to open database: {}", args.database))?;
    let repo: Arc<dyn roll_core::RollRepository> = Arc::from(repo);

    if args.skip_seed {
        info!("Seed import skipped");
    } else {
        let (municipalities, properties) = SeedLoader::import_dir(repo.as_ref(), &args.seed_dir)
            .await
            .with_context(|| {
                format!("Failed to import seed data from: {}", args.seed_dir.display())
            })?;
        info!(
            municipalities,
            properties,
            "Seed import complete"
        );
    }

    let server_config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };
    run_server(AppState::new(repo), server_config)
        .await
        .context("Server error")?;

    Ok(())
}
