//! paddock-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus the
//! environment, opens the configured store, and serves the JSON API and the
//! static client over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use paddock_core::Registry;
use paddock_server::{Backend, MigrateOutcome, ServerConfig, StoreUrl};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Paddock race-entry board server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve HTTP (the default).
  Serve,
  /// Bring the database schema up to date and exit.
  Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;
  let store_url = StoreUrl::parse(&server_cfg.database_url).context("invalid database_url")?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Migrate => migrate(&server_cfg, &store_url).await,
    Command::Serve => {
      let backend = Backend::open(&store_url, server_cfg.max_connections)
        .await
        .with_context(|| format!("failed to open {store_url}"))?;
      tracing::info!(store = %store_url, "store opened");
      serve(server_cfg, backend).await
    }
  }
}

async fn migrate(server_cfg: &ServerConfig, store_url: &StoreUrl) -> anyhow::Result<()> {
  let outcome = Backend::migrate_existing(store_url, server_cfg.max_connections)
    .await
    .with_context(|| format!("failed to migrate {store_url}"))?;

  match outcome {
    MigrateOutcome::Missing => {
      tracing::warn!(store = %store_url, "database file does not exist; nothing to migrate");
    }
    MigrateOutcome::Applied { changed: true } => {
      tracing::info!(store = %store_url, "schema upgraded");
    }
    MigrateOutcome::Applied { changed: false } => {
      tracing::info!(store = %store_url, "schema already up to date");
    }
  }
  Ok(())
}

async fn serve(server_cfg: ServerConfig, backend: Backend) -> anyhow::Result<()> {
  if server_cfg.admin_password.is_none() {
    tracing::warn!("admin_password is not set; the built-in fallback is active");
  }

  let registry = Arc::new(Registry::new(Arc::new(backend), server_cfg.registry_config()));
  let app = paddock_server::app(registry, &server_cfg.static_dir);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
