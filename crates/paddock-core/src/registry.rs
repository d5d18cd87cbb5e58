//! The post registry — the only way callers create, list, change or remove
//! posts.
//!
//! The registry owns the two rules that matter:
//!
//! - **Retention.** Every listing first sweeps posts whose race date is before
//!   JST yesterday (see [`crate::retention`]).
//! - **Authorization.** Update and delete need either the post's own password
//!   (verified against its argon2 hash) or the club-wide admin override
//!   secret. A missing post is reported before any password is looked at.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq as _;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  password::{hash_password, verify_password},
  post::{NewPost, Post, PostFields, PostId},
  retention::expiry_cutoff,
  store::PostStore,
};

// ─── Admin override ──────────────────────────────────────────────────────────

/// The shared master password that authorizes edits to any post.
///
/// This is a separate authorization path from per-post hashes: the secret is
/// held in plaintext from configuration and compared in constant time. An
/// empty secret disables the override.
#[derive(Clone)]
pub struct AdminSecret(String);

impl AdminSecret {
  /// Used when no secret is configured.
  pub const FALLBACK: &'static str = "animan_admin_pass";

  pub fn new(secret: impl Into<String>) -> Self { Self(secret.into()) }

  /// Constant-time equality against `candidate`.
  pub fn matches(&self, candidate: &str) -> bool {
    if self.0.is_empty() {
      return false;
    }
    self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
  }
}

impl Default for AdminSecret {
  fn default() -> Self { Self::new(Self::FALLBACK) }
}

impl fmt::Debug for AdminSecret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("AdminSecret(<redacted>)")
  }
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Explicit registry configuration, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
  pub admin_secret: AdminSecret,
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Post lifecycle over any [`PostStore`].
pub struct Registry<S> {
  store:  Arc<S>,
  config: RegistryConfig,
}

impl<S> Registry<S>
where
  S: PostStore,
{
  pub fn new(store: Arc<S>, config: RegistryConfig) -> Self {
    Self { store, config }
  }

  /// The backing store.
  pub fn store(&self) -> &S { &self.store }

  /// Hash `password`, persist the post, and return the stored record.
  pub async fn create(&self, fields: PostFields, password: String) -> Result<Post> {
    let password_hash = run_blocking(move || hash_password(&password))
      .await?
      .map_err(|e| Error::Hash(e.to_string()))?;

    let post = self
      .store
      .insert(NewPost { fields, password_hash })
      .await
      .map_err(Error::store)?;

    info!(post_id = post.id, race_date = %post.fields.race_date, "post created");
    Ok(post)
  }

  /// Sweep expired posts, then return the rest in race order.
  pub async fn list(&self) -> Result<Vec<Post>> { self.list_as_of(Utc::now()).await }

  /// [`Registry::list`] with an explicit notion of "now".
  pub async fn list_as_of(&self, now: DateTime<Utc>) -> Result<Vec<Post>> {
    let cutoff = expiry_cutoff(now);
    let swept = self.store.purge_before(cutoff).await.map_err(Error::store)?;
    if swept > 0 {
      info!(swept, %cutoff, "expired posts removed");
    }

    let posts = self.store.list().await.map_err(Error::store)?;
    debug!(count = posts.len(), "posts listed");
    Ok(posts)
  }

  /// Replace the descriptive fields of `id` after authorizing `password`.
  pub async fn update(
    &self,
    id: PostId,
    fields: PostFields,
    password: String,
  ) -> Result<Post> {
    self.authorize(id, password).await?;

    let post = self
      .store
      .update(id, fields)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))?;

    info!(post_id = id, "post updated");
    Ok(post)
  }

  /// Remove `id` after authorizing `password`.
  pub async fn delete(&self, id: PostId, password: String) -> Result<()> {
    self.authorize(id, password).await?;

    if !self.store.delete(id).await.map_err(Error::store)? {
      return Err(Error::NotFound(id));
    }

    info!(post_id = id, "post deleted");
    Ok(())
  }

  /// `NotFound` if `id` is absent; otherwise `Forbidden` unless `password` is
  /// the admin override or matches the stored hash.
  async fn authorize(&self, id: PostId, password: String) -> Result<()> {
    let hash = self
      .store
      .password_hash(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))?;

    if self.config.admin_secret.matches(&password) {
      info!(post_id = id, "admin override used");
      return Ok(());
    }

    match run_blocking(move || verify_password(&password, &hash)).await? {
      Ok(true) => Ok(()),
      Ok(false) => {
        warn!(post_id = id, "incorrect password");
        Err(Error::Forbidden(id))
      }
      Err(e) => {
        warn!(post_id = id, error = %e, "stored password hash is unreadable");
        Err(Error::Forbidden(id))
      }
    }
  }
}

/// Run `f` on the blocking thread pool.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
  F: FnOnce() -> T + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| Error::Task(e.to_string()))
}
