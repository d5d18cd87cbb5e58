//! [`PostgresStore`] — the PostgreSQL implementation of [`PostStore`].

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{
  PgPool, Row as _,
  postgres::{PgConnectOptions, PgPoolOptions, PgRow},
};
use tracing::info;

use paddock_core::{
  post::{NewPost, Post, PostFields, PostId},
  retention::format_race_date,
  store::PostStore,
};

use crate::{
  Result,
  schema::{ADD_RACE_NAME, HAS_RACE_NAME, POST_COLUMNS, SCHEMA},
};

/// A post store backed by a PostgreSQL database.
///
/// Cloning is cheap — the pool is reference-counted.
#[derive(Clone)]
pub struct PostgresStore {
  pub(crate) pool: PgPool,
}

impl PostgresStore {
  /// Connect to `url` (a `postgres://` URL) and bring the schema up to date.
  pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
    let store = Self::connect_without_migrating(url, max_connections).await?;
    store.migrate().await?;
    Ok(store)
  }

  /// Connect without touching the schema.
  pub async fn connect_without_migrating(url: &str, max_connections: u32) -> Result<Self> {
    let options = PgConnectOptions::from_str(url)?;
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect_with(options)
      .await?;

    let connected = pool.connect_options();
    info!(
      host = connected.get_host(),
      database = connected.get_database().unwrap_or("<default>"),
      "connected to PostgreSQL"
    );

    Ok(Self { pool })
  }

  /// Apply the schema and pending revisions. Safe to call repeatedly.
  ///
  /// Returns `true` if the `race_name` column was added by this call.
  pub async fn migrate(&self) -> Result<bool> {
    for statement in SCHEMA {
      sqlx::query(statement).execute(&self.pool).await?;
    }

    let existed: bool = sqlx::query_scalar(HAS_RACE_NAME).fetch_one(&self.pool).await?;
    sqlx::query(ADD_RACE_NAME).execute(&self.pool).await?;

    if !existed {
      info!("postgres: added posts.race_name");
    }
    Ok(!existed)
  }
}

fn decode_post(row: &PgRow) -> sqlx::Result<Post> {
  let race_name: Option<String> = row.try_get("race_name")?;
  let created_at: NaiveDateTime = row.try_get("created_at")?;

  Ok(Post {
    id: row.try_get("id")?,
    fields: PostFields {
      horse_name:  row.try_get("horse_name")?,
      club:        row.try_get("club")?,
      race_date:   row.try_get("race_date")?,
      racecourse:  row.try_get("racecourse")?,
      race_number: row.try_get("race_number")?,
      conditions:  row.try_get("conditions")?,
      confidence:  row.try_get("confidence")?,
      poster_name: row.try_get("poster_name")?,
      comment:     row.try_get("comment")?,
      race_name:   race_name.unwrap_or_default(),
    },
    created_at,
  })
}

// ─── PostStore impl ──────────────────────────────────────────────────────────

impl PostStore for PostgresStore {
  type Error = crate::Error;

  async fn insert(&self, input: NewPost) -> Result<Post> {
    let NewPost { fields: f, password_hash } = input;

    let row = sqlx::query(&format!(
      "INSERT INTO posts (
         horse_name, club, race_date, racecourse, race_number,
         conditions, confidence, poster_name, comment, race_name, password
       ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
       RETURNING {POST_COLUMNS}"
    ))
    .bind(f.horse_name)
    .bind(f.club)
    .bind(f.race_date)
    .bind(f.racecourse)
    .bind(f.race_number)
    .bind(f.conditions)
    .bind(f.confidence)
    .bind(f.poster_name)
    .bind(f.comment)
    .bind(f.race_name)
    .bind(password_hash)
    .fetch_one(&self.pool)
    .await?;

    Ok(decode_post(&row)?)
  }

  async fn get(&self, id: PostId) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;

    Ok(row.as_ref().map(decode_post).transpose()?)
  }

  async fn list(&self) -> Result<Vec<Post>> {
    // "C" collation keeps racecourse order bytewise, matching SQLite.
    let rows = sqlx::query(&format!(
      "SELECT {POST_COLUMNS} FROM posts
       ORDER BY race_date ASC, racecourse COLLATE \"C\" ASC, race_number ASC, id ASC"
    ))
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.iter().map(decode_post).collect::<sqlx::Result<_>>()?)
  }

  async fn purge_before(&self, cutoff: NaiveDate) -> Result<u64> {
    let result = sqlx::query("DELETE FROM posts WHERE race_date COLLATE \"C\" < $1")
      .bind(format_race_date(cutoff))
      .execute(&self.pool)
      .await?;

    Ok(result.rows_affected())
  }

  async fn password_hash(&self, id: PostId) -> Result<Option<String>> {
    Ok(
      sqlx::query_scalar("SELECT password FROM posts WHERE id = $1")
        .bind(id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn update(&self, id: PostId, fields: PostFields) -> Result<Option<Post>> {
    let f = fields;

    let row = sqlx::query(&format!(
      "UPDATE posts SET
         horse_name = $1, club = $2, race_date = $3, racecourse = $4,
         race_number = $5, conditions = $6, confidence = $7,
         poster_name = $8, comment = $9, race_name = $10
       WHERE id = $11
       RETURNING {POST_COLUMNS}"
    ))
    .bind(f.horse_name)
    .bind(f.club)
    .bind(f.race_date)
    .bind(f.racecourse)
    .bind(f.race_number)
    .bind(f.conditions)
    .bind(f.confidence)
    .bind(f.poster_name)
    .bind(f.comment)
    .bind(f.race_name)
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.as_ref().map(decode_post).transpose()?)
  }

  async fn delete(&self, id: PostId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;

    Ok(result.rows_affected() > 0)
  }
}
