//! The `PostStore` trait.
//!
//! Implemented by storage backends (`paddock-store-sqlite`,
//! `paddock-store-postgres`). The [`Registry`](crate::Registry) is written
//! against this trait only; it never names a concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::post::{NewPost, Post, PostFields, PostId};

/// Abstraction over the single `posts` table.
///
/// Every method is one atomic storage statement; concurrent writers are
/// serialised by the backend, not by callers.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PostStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new post. The store assigns `id` and `created_at`.
  fn insert(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Retrieve a post by id. Returns `None` if not found.
  fn get(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// All posts ordered by `race_date`, `racecourse`, `race_number`, then `id`.
  fn list(&self) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// Physically delete every post whose `race_date` sorts strictly before
  /// `cutoff` (as `YYYY-MM-DD` text). Returns the number of rows removed.
  fn purge_before(
    &self,
    cutoff: NaiveDate,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// The stored password hash for `id`, or `None` if the post does not exist.
  fn password_hash(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Overwrite the descriptive fields of `id`. `id`, the password hash and
  /// `created_at` are left alone. Returns `None` if the post does not exist.
  fn update(
    &self,
    id: PostId,
    fields: PostFields,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Physically delete `id`. Returns `false` if there was nothing to delete.
  fn delete(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
