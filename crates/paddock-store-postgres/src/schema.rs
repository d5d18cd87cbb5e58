//! SQL schema for the Paddock PostgreSQL store.
//!
//! PostgreSQL cannot run several statements in one prepared query, so the
//! schema is a list applied in order. Every statement is idempotent.

pub const SCHEMA: &[&str] = &[
  "CREATE TABLE IF NOT EXISTS posts (
       id          BIGSERIAL PRIMARY KEY,
       horse_name  TEXT NOT NULL,
       club        TEXT NOT NULL,
       race_date   TEXT NOT NULL,
       racecourse  TEXT NOT NULL,
       race_number INTEGER NOT NULL,
       conditions  TEXT NOT NULL,
       confidence  INTEGER NOT NULL,
       poster_name TEXT,
       comment     TEXT,
       password    TEXT NOT NULL,
       created_at  TIMESTAMP DEFAULT CURRENT_TIMESTAMP
   )",
  "CREATE INDEX IF NOT EXISTS posts_race_date_idx ON posts(race_date)",
];

pub const HAS_RACE_NAME: &str = "SELECT EXISTS (
    SELECT 1 FROM information_schema.columns
    WHERE table_schema = current_schema()
      AND table_name = 'posts'
      AND column_name = 'race_name'
)";

/// Revision 2: optional race name.
pub const ADD_RACE_NAME: &str =
  "ALTER TABLE posts ADD COLUMN IF NOT EXISTS race_name VARCHAR(255) DEFAULT ''";

/// Column list shared by every statement that returns posts. Integer columns
/// are widened so tables created with `SERIAL`/`INTEGER` decode as `i64`.
pub const POST_COLUMNS: &str = "id::BIGINT AS id, horse_name, club, race_date, racecourse, \
                                race_number::BIGINT AS race_number, conditions, \
                                confidence::BIGINT AS confidence, poster_name, comment, \
                                race_name::TEXT AS race_name, created_at";
