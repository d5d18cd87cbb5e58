//! [`SqliteStore`] — the SQLite implementation of [`PostStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;
use tracing::info;

use paddock_core::{
  post::{NewPost, Post, PostFields, PostId},
  retention::format_race_date,
  store::PostStore,
};

use crate::{
  Result,
  encode::{POST_COLUMNS, RawPost},
  schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A post store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and bring its schema up to date.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let store = Self::open_without_migrating(path).await?;
    store.migrate().await?;
    Ok(store)
  }

  /// Open a store at `path` as-is. Call [`SqliteStore::migrate`] before use.
  pub async fn open_without_migrating(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.migrate().await?;
    Ok(store)
  }

  /// Apply the schema and pending revisions. Safe to call repeatedly.
  ///
  /// Returns `true` if the `race_name` column was added by this call.
  pub async fn migrate(&self) -> Result<bool> {
    let added = self
      .conn
      .call(|conn| Ok(schema::migrate(conn)?))
      .await?;
    if added {
      info!("sqlite: added posts.race_name");
    }
    Ok(added)
  }

  async fn query_posts(&self, sql: String) -> Result<Vec<Post>> {
    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }
}

// ─── PostStore impl ──────────────────────────────────────────────────────────

impl PostStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, input: NewPost) -> Result<Post> {
    let NewPost { fields: f, password_hash } = input;

    let raw: RawPost = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO posts (
               horse_name, club, race_date, racecourse, race_number,
               conditions, confidence, poster_name, comment, race_name, password
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             RETURNING {POST_COLUMNS}"
          ),
          rusqlite::params![
            f.horse_name,
            f.club,
            f.race_date,
            f.racecourse,
            f.race_number,
            f.conditions,
            f.confidence,
            f.poster_name,
            f.comment,
            f.race_name,
            password_hash,
          ],
          RawPost::from_row,
        )?)
      })
      .await?;

    raw.into_post()
  }

  async fn get(&self, id: PostId) -> Result<Option<Post>> {
    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
              rusqlite::params![id],
              RawPost::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn list(&self) -> Result<Vec<Post>> {
    self
      .query_posts(format!(
        "SELECT {POST_COLUMNS} FROM posts
         ORDER BY race_date ASC, racecourse ASC, race_number ASC, id ASC"
      ))
      .await
  }

  async fn purge_before(&self, cutoff: NaiveDate) -> Result<u64> {
    let cutoff_str = format_race_date(cutoff);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM posts WHERE race_date < ?1",
          rusqlite::params![cutoff_str],
        )?)
      })
      .await?;

    Ok(removed as u64)
  }

  async fn password_hash(&self, id: PostId) -> Result<Option<String>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT password FROM posts WHERE id = ?1",
                rusqlite::params![id],
                |row| row.get(0),
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn update(&self, id: PostId, fields: PostFields) -> Result<Option<Post>> {
    let f = fields;

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE posts SET
                   horse_name = ?1, club = ?2, race_date = ?3, racecourse = ?4,
                   race_number = ?5, conditions = ?6, confidence = ?7,
                   poster_name = ?8, comment = ?9, race_name = ?10
                 WHERE id = ?11
                 RETURNING {POST_COLUMNS}"
              ),
              rusqlite::params![
                f.horse_name,
                f.club,
                f.race_date,
                f.racecourse,
                f.race_number,
                f.conditions,
                f.confidence,
                f.poster_name,
                f.comment,
                f.race_name,
                id,
              ],
              RawPost::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn delete(&self, id: PostId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM posts WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;

    Ok(removed > 0)
  }
}
