//! Integration tests for `SqliteStore` and the registry on top of it, against
//! in-memory and on-disk databases.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use paddock_core::{
  AdminSecret, Error as CoreError, Registry, RegistryConfig,
  post::{NewPost, PostFields},
  retention::is_expired,
  store::PostStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn fields(race_date: &str, racecourse: &str, race_number: i64) -> PostFields {
  PostFields {
    horse_name:  "Silver Comet".into(),
    club:        "Sunrise TC".into(),
    race_date:   race_date.into(),
    racecourse:  racecourse.into(),
    race_number,
    conditions:  "Turf 1600m".into(),
    confidence:  3,
    poster_name: Some("Aki".into()),
    comment:     Some(String::new()),
    race_name:   String::new(),
  }
}

fn new_post(race_date: &str, racecourse: &str, race_number: i64) -> NewPost {
  NewPost {
    fields:        fields(race_date, racecourse, race_number),
    password_hash: "$argon2id$placeholder".into(),
  }
}

/// 2025-01-23 12:00 JST; the sweep cutoff is 2025-01-22.
fn noon_jst_jan_23() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 1, 23, 3, 0, 0).unwrap()
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_assigns_id_and_timestamp() {
  let s = store().await;

  let a = s.insert(new_post("2025-02-01", "Tokyo", 11)).await.unwrap();
  let b = s.insert(new_post("2025-02-01", "Tokyo", 12)).await.unwrap();

  assert!(a.id > 0);
  assert!(b.id > a.id);
  assert_eq!(a.fields, fields("2025-02-01", "Tokyo", 11));
  let age = Utc::now().naive_utc() - a.created_at;
  assert!(age.num_seconds().abs() < 60, "created_at: {}", a.created_at);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(42).await.unwrap().is_none());
  assert!(s.password_hash(42).await.unwrap().is_none());
}

#[tokio::test]
async fn password_hash_is_stored_verbatim() {
  let s = store().await;
  let post = s.insert(new_post("2025-02-01", "Tokyo", 11)).await.unwrap();
  assert_eq!(
    s.password_hash(post.id).await.unwrap().as_deref(),
    Some("$argon2id$placeholder"),
  );
}

#[tokio::test]
async fn list_orders_by_date_then_course_then_race() {
  let s = store().await;
  s.insert(new_post("2025-01-10", "B", 1)).await.unwrap();
  s.insert(new_post("2025-01-10", "A", 12)).await.unwrap();
  s.insert(new_post("2025-01-09", "Z", 5)).await.unwrap();
  s.insert(new_post("2025-01-10", "A", 2)).await.unwrap();

  let order: Vec<(String, String, i64)> = s
    .list()
    .await
    .unwrap()
    .into_iter()
    .map(|p| (p.fields.race_date, p.fields.racecourse, p.fields.race_number))
    .collect();

  assert_eq!(order, vec![
    ("2025-01-09".to_string(), "Z".to_string(), 5),
    ("2025-01-10".to_string(), "A".to_string(), 2),
    ("2025-01-10".to_string(), "A".to_string(), 12),
    ("2025-01-10".to_string(), "B".to_string(), 1),
  ]);
}

#[tokio::test]
async fn purge_before_is_strict() {
  let s = store().await;
  s.insert(new_post("2025-01-20", "Tokyo", 1)).await.unwrap();
  s.insert(new_post("2025-01-21", "Tokyo", 1)).await.unwrap();
  s.insert(new_post("2025-01-22", "Tokyo", 1)).await.unwrap();

  let cutoff = NaiveDate::from_ymd_opt(2025, 1, 21).unwrap();
  assert_eq!(s.purge_before(cutoff).await.unwrap(), 1);

  let dates: Vec<String> =
    s.list().await.unwrap().into_iter().map(|p| p.fields.race_date).collect();
  assert_eq!(dates, ["2025-01-21", "2025-01-22"]);
  assert!(dates.iter().all(|d| !is_expired(d, cutoff)));
}

#[tokio::test]
async fn purge_before_agrees_with_the_retention_rule() {
  let s = store().await;
  let dates = ["2024-12-31", "2025-01-09", "2025-01-10", "2025-01-11", "not-a-date", ""];
  for d in dates {
    s.insert(new_post(d, "Tokyo", 1)).await.unwrap();
  }

  let cutoff = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
  let expected: Vec<&str> = dates.iter().copied().filter(|d| !is_expired(d, cutoff)).collect();
  let removed = s.purge_before(cutoff).await.unwrap();
  assert_eq!(removed as usize, dates.len() - expected.len());

  let mut kept: Vec<String> =
    s.list().await.unwrap().into_iter().map(|p| p.fields.race_date).collect();
  kept.sort();
  let mut expected: Vec<String> = expected.into_iter().map(String::from).collect();
  expected.sort();
  assert_eq!(kept, expected);
}

#[tokio::test]
async fn update_keeps_id_hash_and_created_at() {
  let s = store().await;
  let post = s.insert(new_post("2025-02-01", "Tokyo", 11)).await.unwrap();

  let mut changed = fields("2025-02-02", "Kyoto", 9);
  changed.race_name = "Kisaragi Sho".into();
  changed.comment = None;

  let updated = s.update(post.id, changed.clone()).await.unwrap().unwrap();
  assert_eq!(updated.id, post.id);
  assert_eq!(updated.created_at, post.created_at);
  assert_eq!(updated.fields, changed);
  assert_eq!(
    s.password_hash(post.id).await.unwrap().as_deref(),
    Some("$argon2id$placeholder"),
  );
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  assert!(s.update(7, fields("2025-02-01", "Tokyo", 1)).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_reports_whether_a_row_went() {
  let s = store().await;
  let post = s.insert(new_post("2025-02-01", "Tokyo", 11)).await.unwrap();

  assert!(s.delete(post.id).await.unwrap());
  assert!(!s.delete(post.id).await.unwrap());
  assert!(s.get(post.id).await.unwrap().is_none());
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
  let s = store().await;
  let first = s.insert(new_post("2025-02-01", "Tokyo", 11)).await.unwrap();
  s.delete(first.id).await.unwrap();
  let second = s.insert(new_post("2025-02-01", "Tokyo", 11)).await.unwrap();
  assert!(second.id > first.id);
}

// ─── Migration ───────────────────────────────────────────────────────────────

/// The table as the first revision created it, before `race_name` existed.
const REVISION_1: &str = "
CREATE TABLE posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    horse_name TEXT NOT NULL,
    club TEXT NOT NULL,
    race_date TEXT NOT NULL,
    racecourse TEXT NOT NULL,
    race_number INTEGER NOT NULL,
    conditions TEXT NOT NULL,
    confidence INTEGER NOT NULL,
    poster_name TEXT,
    comment TEXT,
    password TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
INSERT INTO posts (horse_name, club, race_date, racecourse, race_number,
                   conditions, confidence, poster_name, comment, password)
VALUES ('Old Timer', 'Sunrise TC', '2099-05-05', 'Hanshin', 3,
        'Dirt 1800m', 2, NULL, 'kept', 'legacy-hash');
";

#[tokio::test]
async fn migration_adds_race_name_once_and_keeps_rows() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("database.db");

  rusqlite::Connection::open(&path)
    .unwrap()
    .execute_batch(REVISION_1)
    .unwrap();

  let s = SqliteStore::open(&path).await.unwrap();
  // `open` already migrated; running again must be a no-op.
  assert!(!s.migrate().await.unwrap());
  assert!(!s.migrate().await.unwrap());
  drop(s);

  let s = SqliteStore::open(&path).await.unwrap();
  let posts = s.list().await.unwrap();
  assert_eq!(posts.len(), 1);
  let old = &posts[0];
  assert_eq!(old.fields.horse_name, "Old Timer");
  assert_eq!(old.fields.poster_name, None);
  assert_eq!(old.fields.comment.as_deref(), Some("kept"));
  assert_eq!(old.fields.race_name, "");
  assert_eq!(s.password_hash(old.id).await.unwrap().as_deref(), Some("legacy-hash"));
}

#[tokio::test]
async fn migrate_reports_the_column_it_added() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("database.db");

  rusqlite::Connection::open(&path)
    .unwrap()
    .execute_batch(REVISION_1)
    .unwrap();

  let conn = rusqlite::Connection::open(&path).unwrap();
  assert!(crate::schema::migrate(&conn).unwrap());
  assert!(!crate::schema::migrate(&conn).unwrap());
}

// ─── Registry over SQLite ────────────────────────────────────────────────────

async fn registry() -> Registry<SqliteStore> {
  Registry::new(Arc::new(store().await), RegistryConfig {
    admin_secret: AdminSecret::new("master-key"),
  })
}

#[tokio::test]
async fn create_then_list_hides_password() {
  let r = registry().await;
  let created = r
    .create(fields("2099-01-01", "Tokyo", 11), "secret".into())
    .await
    .unwrap();

  let hash = r.store().password_hash(created.id).await.unwrap().unwrap();
  assert!(hash.starts_with("$argon2id$"));
  assert_ne!(hash, "secret");

  let listed = r.list().await.unwrap();
  assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn list_sweeps_posts_before_jst_yesterday() {
  let r = registry().await;
  let s = r.store();
  s.insert(new_post("2025-01-21", "Tokyo", 1)).await.unwrap();
  s.insert(new_post("2025-01-22", "Tokyo", 1)).await.unwrap();
  s.insert(new_post("2025-01-23", "Tokyo", 1)).await.unwrap();

  let listed = r.list_as_of(noon_jst_jan_23()).await.unwrap();
  let dates: Vec<&str> = listed.iter().map(|p| p.fields.race_date.as_str()).collect();
  assert_eq!(dates, ["2025-01-22", "2025-01-23"]);

  // Physically gone, not just filtered.
  let remaining = s.list().await.unwrap();
  assert_eq!(remaining.len(), 2);
}

#[tokio::test]
async fn update_with_own_password() {
  let r = registry().await;
  let post = r
    .create(fields("2099-01-01", "Tokyo", 11), "secret".into())
    .await
    .unwrap();
  let hash_before = r.store().password_hash(post.id).await.unwrap();

  let mut changed = fields("2099-01-02", "Kyoto", 7);
  changed.race_name = "Nikkei Shinshun Hai".into();
  let updated = r.update(post.id, changed.clone(), "secret".into()).await.unwrap();
  assert_eq!(updated.fields, changed);

  // Listing shows the new values; the hash is untouched and still works.
  assert_eq!(r.list().await.unwrap(), vec![updated]);
  assert_eq!(r.store().password_hash(post.id).await.unwrap(), hash_before);
  r.update(post.id, fields("2099-01-03", "Kyoto", 8), "secret".into())
    .await
    .unwrap();
}

#[tokio::test]
async fn update_with_wrong_password_is_forbidden_and_changes_nothing() {
  let r = registry().await;
  let post = r
    .create(fields("2099-01-01", "Tokyo", 11), "secret".into())
    .await
    .unwrap();

  let err = r
    .update(post.id, fields("2099-02-02", "Kyoto", 1), "guess".into())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(id) if id == post.id));
  assert_eq!(r.store().get(post.id).await.unwrap(), Some(post));
}

#[tokio::test]
async fn admin_secret_overrides_post_password() {
  let r = registry().await;
  let post = r
    .create(fields("2099-01-01", "Tokyo", 11), "secret".into())
    .await
    .unwrap();

  r.update(post.id, fields("2099-01-05", "Tokyo", 2), "master-key".into())
    .await
    .unwrap();
  r.delete(post.id, "master-key".into()).await.unwrap();
  assert!(r.store().get(post.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_with_own_password_then_again_is_not_found() {
  let r = registry().await;
  let post = r
    .create(fields("2099-01-01", "Tokyo", 11), "secret".into())
    .await
    .unwrap();

  r.delete(post.id, "secret".into()).await.unwrap();
  let err = r.delete(post.id, "secret".into()).await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound(id) if id == post.id));
}

#[tokio::test]
async fn delete_with_wrong_password_keeps_the_post() {
  let r = registry().await;
  let post = r
    .create(fields("2099-01-01", "Tokyo", 11), "secret".into())
    .await
    .unwrap();

  let err = r.delete(post.id, "nope".into()).await.unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(_)));
  assert!(r.store().get(post.id).await.unwrap().is_some());
}

#[tokio::test]
async fn missing_post_is_not_found_even_with_admin_secret() {
  let r = registry().await;

  let err = r
    .update(99, fields("2099-01-01", "Tokyo", 1), "master-key".into())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::NotFound(99)));

  let err = r.delete(99, "anything".into()).await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound(99)));
}

#[tokio::test]
async fn legacy_bcrypt_hash_still_authorizes_its_owner() {
  let r = registry().await;
  let legacy = bcrypt::hash("rasmuslerdorf", 4).unwrap().replacen("$2b$", "$2y$", 1);
  let post = r
    .store()
    .insert(NewPost {
      fields:        fields("2099-01-01", "Tokyo", 1),
      password_hash: legacy,
    })
    .await
    .unwrap();

  let err = r
    .update(post.id, fields("2099-01-02", "Tokyo", 2), "guess".into())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(_)));

  r.update(post.id, fields("2099-01-02", "Tokyo", 2), "rasmuslerdorf".into())
    .await
    .unwrap();
  r.delete(post.id, "rasmuslerdorf".into()).await.unwrap();
  assert!(r.store().get(post.id).await.unwrap().is_none());
}

#[tokio::test]
async fn unparseable_stored_hash_only_yields_to_the_admin() {
  let r = registry().await;
  let post = r
    .store()
    .insert(new_post("2099-01-01", "Tokyo", 1))
    .await
    .unwrap();

  let err = r.delete(post.id, "whatever".into()).await.unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(_)));
  r.delete(post.id, "master-key".into()).await.unwrap();
}
