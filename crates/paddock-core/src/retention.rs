//! The retention rule: a race stays on the board through the day after it
//! runs, measured on the Japan Standard Time calendar.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// JST is UTC+9 with no daylight saving.
pub const JST_OFFSET_HOURS: i64 = 9;

/// Date format shared by `race_date` and the sweep cutoff.
pub const RACE_DATE_FORMAT: &str = "%Y-%m-%d";

/// The calendar date in JST at instant `now`.
pub fn today_jst(now: DateTime<Utc>) -> NaiveDate {
  (now + Duration::hours(JST_OFFSET_HOURS)).date_naive()
}

/// "Yesterday" in JST. Posts whose `race_date` sorts before this are expired.
pub fn expiry_cutoff(now: DateTime<Utc>) -> NaiveDate {
  let today = today_jst(now);
  today.pred_opt().unwrap_or(today)
}

/// Render a date the way `race_date` is stored.
pub fn format_race_date(date: NaiveDate) -> String {
  date.format(RACE_DATE_FORMAT).to_string()
}

/// Whether a stored `race_date` falls before `cutoff`. Bytewise text comparison;
/// `PostStore::purge_before` removes exactly these rows.
pub fn is_expired(race_date: &str, cutoff: NaiveDate) -> bool {
  race_date < format_race_date(cutoff).as_str()
}
