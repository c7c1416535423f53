// ⏰ Join Times - explicit time handling for roster records
//
// Both rosters say when a member joined, but in different shapes:
//   game roster:      ISO-8601 string  ("2020-03-21T00:00:00.000Z")
//   community roster: epoch millis     (1616253509000)
//
// The offset a join time was written with is kept, so its calendar date is
// the one the export shows. Reading a join time never fails. Whatever can't be interpreted becomes an
// UNKNOWN join time, which sorts as the oldest and never qualifies for
// time-based checks.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// JOINED AT
// ============================================================================

/// When a member joined, if we could tell.
///
/// Ordering is chronological with unknown times first:
/// `unknown < 2020-01-01 < 2021-01-01`. Two unknown times are equal, as are
/// two spellings of the same instant in different offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinedAt(Option<DateTime<FixedOffset>>);

impl JoinedAt {
    /// Known join instant
    pub fn at(instant: DateTime<Utc>) -> Self {
        JoinedAt(Some(instant.fixed_offset()))
    }

    /// Join time could not be determined
    pub fn unknown() -> Self {
        JoinedAt(None)
    }

    /// Parse an ISO-8601 date-time as reported by the guild API.
    ///
    /// Tries RFC 3339 first, then falls back to the leading `YYYY-MM-DD`
    /// (midnight UTC) so slightly mangled exports like
    /// `"2020-03-20:T00:00:00.000Z"` still carry their date.
    pub fn from_iso(text: &str) -> Self {
        let trimmed = text.trim();

        if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
            return JoinedAt(Some(instant));
        }

        match leading_date(trimmed) {
            Some(date) => JoinedAt::from_date(date),
            None => JoinedAt::unknown(),
        }
    }

    /// Epoch timestamp in milliseconds, as chat platforms report member joins
    pub fn from_epoch_millis(millis: i64) -> Self {
        JoinedAt(DateTime::from_timestamp_millis(millis).map(|instant| instant.fixed_offset()))
    }

    /// Midnight UTC of a calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        JoinedAt(midnight_utc(date).map(|instant| instant.fixed_offset()))
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.0.map(|instant| instant.with_timezone(&Utc))
    }

    pub fn is_known(&self) -> bool {
        self.0.is_some()
    }

    /// Calendar date of the join, in the offset it was written with
    pub fn date(&self) -> Option<NaiveDate> {
        self.0.map(|instant| instant.date_naive())
    }

    /// Whole days elapsed between the join DATE and `as_of`.
    ///
    /// The join date is taken as written and measured from its midnight UTC,
    /// so neither the time of day nor the offset changes the answer. Joins after `as_of`
    /// give a negative count; unknown joins give `None`.
    pub fn whole_days_before(&self, as_of: DateTime<Utc>) -> Option<i64> {
        let midnight = midnight_utc(self.date()?)?;
        Some((as_of - midnight).num_days())
    }
}

impl From<DateTime<Utc>> for JoinedAt {
    fn from(instant: DateTime<Utc>) -> Self {
        JoinedAt::at(instant)
    }
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

fn leading_date(text: &str) -> Option<NaiveDate> {
    let prefix = text.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

// ============================================================================
// TESTS
// ============================================================================
