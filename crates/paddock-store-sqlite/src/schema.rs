//! SQL schema for the Paddock SQLite store.
//!
//! The base table matches the first deployed revision so that existing
//! database files open unchanged. Later revisions are applied by
//! [`migrate`], each guarded so that running it again is a no-op.

use rusqlite::Connection;

/// Revision 1 DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS posts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,  -- AUTOINCREMENT: ids never reused
    horse_name  TEXT NOT NULL,
    club        TEXT NOT NULL,
    race_date   TEXT NOT NULL,                      -- YYYY-MM-DD
    racecourse  TEXT NOT NULL,
    race_number INTEGER NOT NULL,
    conditions  TEXT NOT NULL,
    confidence  INTEGER NOT NULL,
    poster_name TEXT,
    comment     TEXT,
    password    TEXT NOT NULL,                      -- argon2 PHC string
    created_at  TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS posts_race_date_idx ON posts(race_date);
";

/// Revision 2: optional race name.
const ADD_RACE_NAME: &str = "ALTER TABLE posts ADD COLUMN race_name TEXT DEFAULT ''";

pub const SCHEMA_VERSION: i64 = 2;

/// Apply the base schema and any missing revisions.
///
/// Returns `true` if the `race_name` column had to be added.
pub fn migrate(conn: &Connection) -> rusqlite::Result<bool> {
  conn.execute_batch(SCHEMA)?;

  // SQLite has no `ADD COLUMN IF NOT EXISTS`.
  let added = if has_column(conn, "posts", "race_name")? {
    false
  } else {
    conn.execute_batch(ADD_RACE_NAME)?;
    true
  };

  conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
  Ok(added)
}

fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
  conn.query_row(
    "SELECT COUNT(*) > 0 FROM pragma_table_info(?1) WHERE name = ?2",
    rusqlite::params![table, column],
    |row| row.get(0),
  )
}
