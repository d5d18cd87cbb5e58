//! Post types — one race entry for a jointly-owned horse.
//!
//! A post is created with a password whose argon2 hash is stored alongside it.
//! The hash never leaves the store through these types: [`Post`] is the
//! outward-facing record and carries no secret.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage-assigned row identifier. Never reused.
pub type PostId = i64;

/// Outward format of [`Post::created_at`].
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── Descriptive fields ──────────────────────────────────────────────────────

fn empty_text() -> Option<String> { Some(String::new()) }

/// Everything a member can set on a post. Replaced wholesale by an update.
///
/// `race_date` is kept as the `YYYY-MM-DD` text the client sent; it is not
/// validated, and the retention sweep compares it as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFields {
  pub horse_name:  String,
  pub club:        String,
  pub race_date:   String,
  pub racecourse:  String,
  #[serde(deserialize_with = "integer::deserialize")]
  pub race_number: i64,
  pub conditions:  String,
  #[serde(deserialize_with = "integer::deserialize")]
  pub confidence:  i64,
  #[serde(default = "empty_text")]
  pub poster_name: Option<String>,
  #[serde(default = "empty_text")]
  pub comment:     Option<String>,
  /// Added by schema revision 2; empty when the poster left it out.
  #[serde(default)]
  pub race_name:   String,
}

// ─── Post ────────────────────────────────────────────────────────────────────

/// A stored post as exposed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub id:         PostId,
  #[serde(flatten)]
  pub fields:     PostFields,
  /// Store-assigned at insert (UTC); never changes.
  #[serde(with = "created_at")]
  pub created_at: NaiveDateTime,
}

// ─── NewPost ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::PostStore::insert`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub fields:        PostFields,
  /// argon2 PHC string; the plaintext never reaches the store.
  pub password_hash: String,
}

/// Integers as JSON numbers or as decimal text (`11` or `"11"`).
mod integer {
  use serde::{Deserialize, Deserializer, de};

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Repr {
    Number(i64),
    Text(String),
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Repr::deserialize(deserializer)? {
      Repr::Number(n) => Ok(n),
      Repr::Text(s) => s
        .trim()
        .parse()
        .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&s), &"an integer")),
    }
  }
}

mod created_at {
  use chrono::NaiveDateTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  use super::CREATED_AT_FORMAT;

  pub fn serialize<S: Serializer>(
    at: &NaiveDateTime,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&at.format(CREATED_AT_FORMAT))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<NaiveDateTime, D::Error> {
    let s = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&s, CREATED_AT_FORMAT).map_err(D::Error::custom)
  }
}
