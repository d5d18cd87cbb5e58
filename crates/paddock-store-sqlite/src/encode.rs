//! Conversion between `posts` rows and domain types.
//!
//! `created_at` comes back from SQLite's `CURRENT_TIMESTAMP` as
//! `YYYY-MM-DD HH:MM:SS` text in UTC.

use chrono::NaiveDateTime;
use paddock_core::post::{CREATED_AT_FORMAT, Post, PostFields};

use crate::{Error, Result};

/// Column list shared by every statement that returns posts. Order matches
/// [`RawPost::from_row`].
pub const POST_COLUMNS: &str = "id, horse_name, club, race_date, racecourse, race_number, \
                                conditions, confidence, poster_name, comment, race_name, \
                                created_at";

// ─── created_at ──────────────────────────────────────────────────────────────

pub fn decode_created_at(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, CREATED_AT_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Raw row ─────────────────────────────────────────────────────────────────

/// A `posts` row as read from SQLite, before domain decoding.
pub struct RawPost {
  pub id:          i64,
  pub horse_name:  String,
  pub club:        String,
  pub race_date:   String,
  pub racecourse:  String,
  pub race_number: i64,
  pub conditions:  String,
  pub confidence:  i64,
  pub poster_name: Option<String>,
  pub comment:     Option<String>,
  pub race_name:   Option<String>,
  pub created_at:  Option<String>,
}

impl RawPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      horse_name:  row.get(1)?,
      club:        row.get(2)?,
      race_date:   row.get(3)?,
      racecourse:  row.get(4)?,
      race_number: row.get(5)?,
      conditions:  row.get(6)?,
      confidence:  row.get(7)?,
      poster_name: row.get(8)?,
      comment:     row.get(9)?,
      race_name:   row.get(10)?,
      created_at:  row.get(11)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    let created_at = self
      .created_at
      .as_deref()
      .ok_or_else(|| Error::DateParse(format!("post {} has no created_at", self.id)))
      .and_then(decode_created_at)?;

    Ok(Post {
      id: self.id,
      fields: PostFields {
        horse_name:  self.horse_name,
        club:        self.club,
        race_date:   self.race_date,
        racecourse:  self.racecourse,
        race_number: self.race_number,
        conditions:  self.conditions,
        confidence:  self.confidence,
        poster_name: self.poster_name,
        comment:     self.comment,
        race_name:   self.race_name.unwrap_or_default(),
      },
      created_at,
    })
  }
}
