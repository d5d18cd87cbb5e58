//! Error types for `paddock-core`.

use thiserror::Error;

use crate::post::PostId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("post not found: {0}")]
  NotFound(PostId),

  /// Neither the admin override nor the post's own password matched.
  #[error("incorrect password for post {0}")]
  Forbidden(PostId),

  #[error("password hashing error: {0}")]
  Hash(String),

  #[error("blocking task failed: {0}")]
  Task(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
