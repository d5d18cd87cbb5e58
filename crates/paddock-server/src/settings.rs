//! Runtime configuration.
//!
//! Sources, lowest precedence first: the TOML file, `PADDOCK_*` environment
//! variables, then the unprefixed `DATABASE_URL` and `ADMIN_PASSWORD`
//! variables older deployments set.

use std::{env, path::{Path, PathBuf}};

use config::{Config, ConfigError, Environment, File};
use paddock_core::{AdminSecret, RegistryConfig};
use serde::Deserialize;

fn default_host() -> String { "0.0.0.0".to_string() }

fn default_port() -> u16 { 8000 }

fn default_database_url() -> String { "sqlite://database.db".to_string() }

fn default_static_dir() -> PathBuf { PathBuf::from("static") }

fn default_max_connections() -> u32 { 5 }

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  /// `postgres://…` selects PostgreSQL; anything else is a SQLite location.
  #[serde(default = "default_database_url")]
  pub database_url:    String,
  /// Master override for every post. Falls back to
  /// [`AdminSecret::FALLBACK`] when unset.
  #[serde(default)]
  pub admin_password:  Option<String>,
  #[serde(default = "default_static_dir")]
  pub static_dir:      PathBuf,
  /// PostgreSQL pool size; ignored for SQLite.
  #[serde(default = "default_max_connections")]
  pub max_connections: u32,
}

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from(path.to_path_buf()).required(false))
      .add_source(Environment::with_prefix("PADDOCK").try_parsing(true))
      .set_override_option("database_url", env::var("DATABASE_URL").ok())?
      .set_override_option("admin_password", env::var("ADMIN_PASSWORD").ok())?
      .build()?
      .try_deserialize()
  }

  pub fn registry_config(&self) -> RegistryConfig {
    RegistryConfig {
      admin_secret: self
        .admin_password
        .as_deref()
        .map(AdminSecret::new)
        .unwrap_or_default(),
    }
  }
}
