//! Storage backend selection.
//!
//! The connection string picks one of the two [`PostStore`] implementations at
//! startup; [`Backend`] forwards every call to whichever was opened so the
//! registry and router stay generic over a single concrete type.

use std::{
  fmt,
  path::{Path, PathBuf},
};

use chrono::NaiveDate;
use paddock_core::{
  post::{NewPost, Post, PostFields, PostId},
  store::PostStore,
};
use paddock_store_postgres::PostgresStore;
use paddock_store_sqlite::SqliteStore;
use thiserror::Error;

// ─── Connection string ───────────────────────────────────────────────────────

/// Where posts live, parsed from `database_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUrl {
  /// A SQLite database file.
  Sqlite(PathBuf),
  /// A throwaway SQLite database.
  SqliteMemory,
  /// A `postgres://` or `postgresql://` URL, passed through untouched.
  Postgres(String),
}

impl StoreUrl {
  /// Accepts `postgres://…`, `postgresql://…`, `sqlite://<path>`,
  /// `sqlite:<path>`, `:memory:`, or a bare file path.
  pub fn parse(url: &str) -> Result<Self, BackendError> {
    let url = url.trim();
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
      return Ok(Self::Postgres(url.to_string()));
    }

    let path = url
      .strip_prefix("sqlite://")
      .or_else(|| url.strip_prefix("sqlite:"))
      .unwrap_or(url);

    match path {
      "" => Err(BackendError::EmptyUrl),
      ":memory:" => Ok(Self::SqliteMemory),
      p => Ok(Self::Sqlite(expand_tilde(Path::new(p)))),
    }
  }
}

/// Log-safe rendering: PostgreSQL URLs may carry credentials.
impl fmt::Display for StoreUrl {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Sqlite(path) => write!(f, "sqlite file {}", path.display()),
      Self::SqliteMemory => f.write_str("in-memory sqlite"),
      Self::Postgres(_) => f.write_str("postgres"),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum BackendError {
  #[error("database_url is empty")]
  EmptyUrl,

  #[error(transparent)]
  Sqlite(#[from] paddock_store_sqlite::Error),

  #[error(transparent)]
  Postgres(#[from] paddock_store_postgres::Error),
}

// ─── Backend ─────────────────────────────────────────────────────────────────

/// The store opened at startup.
#[derive(Clone)]
pub enum Backend {
  Sqlite(SqliteStore),
  Postgres(PostgresStore),
}

/// What [`Backend::migrate_existing`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateOutcome {
  /// The SQLite file does not exist; nothing was created.
  Missing,
  /// The schema is current. `changed` is `true` if this run altered it.
  Applied { changed: bool },
}

impl Backend {
  /// Open the store named by `url`, applying schema migrations.
  pub async fn open(url: &StoreUrl, max_connections: u32) -> Result<Self, BackendError> {
    let backend = Self::open_without_migrating(url, max_connections).await?;
    backend.migrate().await?;
    Ok(backend)
  }

  async fn open_without_migrating(
    url: &StoreUrl,
    max_connections: u32,
  ) -> Result<Self, BackendError> {
    Ok(match url {
      StoreUrl::Sqlite(path) => Self::Sqlite(SqliteStore::open_without_migrating(path).await?),
      StoreUrl::SqliteMemory => Self::Sqlite(SqliteStore::open_in_memory().await?),
      StoreUrl::Postgres(url) => {
        Self::Postgres(PostgresStore::connect_without_migrating(url, max_connections).await?)
      }
    })
  }

  /// Bring an existing store up to date. A SQLite file that does not exist
  /// is left alone rather than created.
  pub async fn migrate_existing(
    url: &StoreUrl,
    max_connections: u32,
  ) -> Result<MigrateOutcome, BackendError> {
    if let StoreUrl::Sqlite(path) = url
      && !path.exists()
    {
      return Ok(MigrateOutcome::Missing);
    }

    let backend = Self::open_without_migrating(url, max_connections).await?;
    let changed = backend.migrate().await?;
    Ok(MigrateOutcome::Applied { changed })
  }

  /// Re-run schema migrations. Returns `true` if anything changed.
  pub async fn migrate(&self) -> Result<bool, BackendError> {
    Ok(match self {
      Self::Sqlite(s) => s.migrate().await?,
      Self::Postgres(s) => s.migrate().await?,
    })
  }
}

macro_rules! dispatch {
  ($self:ident, $store:ident => $call:expr) => {
    match $self {
      Backend::Sqlite($store) => Ok($call.await?),
      Backend::Postgres($store) => Ok($call.await?),
    }
  };
}

impl PostStore for Backend {
  type Error = BackendError;

  async fn insert(&self, input: NewPost) -> Result<Post, BackendError> {
    dispatch!(self, s => s.insert(input))
  }

  async fn get(&self, id: PostId) -> Result<Option<Post>, BackendError> {
    dispatch!(self, s => s.get(id))
  }

  async fn list(&self) -> Result<Vec<Post>, BackendError> { dispatch!(self, s => s.list()) }

  async fn purge_before(&self, cutoff: NaiveDate) -> Result<u64, BackendError> {
    dispatch!(self, s => s.purge_before(cutoff))
  }

  async fn password_hash(&self, id: PostId) -> Result<Option<String>, BackendError> {
    dispatch!(self, s => s.password_hash(id))
  }

  async fn update(
    &self,
    id: PostId,
    fields: PostFields,
  ) -> Result<Option<Post>, BackendError> {
    dispatch!(self, s => s.update(id, fields))
  }

  async fn delete(&self, id: PostId) -> Result<bool, BackendError> {
    dispatch!(self, s => s.delete(id))
  }
}
