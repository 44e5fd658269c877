//! crates/saily_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Calendar Helpers
//=========================================================================================

/// A calendar day split into its integer parts.
///
/// Stored next to every timestamp so that day equality and day ranges can be
/// filtered without range queries on the timestamp column itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DateParts {
    pub fn to_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for DateParts {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

/// An instant together with the local calendar day it is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub at: DateTime<Utc>,
    pub day: DateParts,
}

impl Stamp {
    /// Files `at` under `day`, provided `day` is the local day of `at` in `zone`.
    pub fn checked_on_day(day: NaiveDate, at: DateTime<Utc>, zone: &Tz) -> Option<Self> {
        let stamp = Self::in_zone(at, zone);
        (stamp.day == DateParts::from(day)).then_some(stamp)
    }

    /// The local time of day of `now`, moved onto `day` (the day the user was
    /// looking at). A time skipped by a DST gap moves forward one hour.
    pub fn on_day_at_time_of(day: NaiveDate, now: DateTime<Utc>, zone: &Tz) -> Option<Self> {
        let local = day.and_time(zone.from_utc_datetime(&now.naive_utc()).time());
        let at = zone
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| {
                zone.from_local_datetime(&(local + chrono::Duration::hours(1)))
                    .earliest()
            })?
            .with_timezone(&Utc);
        Self::checked_on_day(day, at, zone)
    }

    /// Files `at` under its local calendar day in `zone`.
    pub fn in_zone(at: DateTime<Utc>, zone: &Tz) -> Self {
        let local = zone.from_utc_datetime(&at.naive_utc());
        Self {
            at,
            day: local.date_naive().into(),
        }
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    /// Builds a range, rejecting an end that precedes the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

//=========================================================================================
// Groups and Time Entries
//=========================================================================================

/// A named bucket that time entries are logged against.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Set when the group was soft-deleted; `None` means the group is active.
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl Group {
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }
}

/// A single logged work session.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub id: Uuid,
    pub owner_id: String,
    pub group_id: Uuid,
    pub start: Stamp,
    /// `None` while the session is still running.
    pub end: Option<Stamp>,
    pub description: String,
}

impl TimeEntry {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Elapsed time of a closed entry. Open entries are measured up to `now` if given.
    pub fn duration(&self, now: Option<DateTime<Utc>>) -> chrono::Duration {
        let end = match (self.end, now) {
            (Some(end), _) => end.at,
            (None, Some(now)) => now,
            (None, None) => return chrono::Duration::zero(),
        };
        (end - self.start.at).max(chrono::Duration::zero())
    }
}

//=========================================================================================
// User Settings
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

/// Per-user preferences. One record per owner.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    pub owner_id: String,
    pub theme: Theme,
}

//=========================================================================================
// AI Summaries
//=========================================================================================

/// A generated summary of the tasks logged over a range of days.
#[derive(Debug, Clone, PartialEq)]
pub struct AiSummary {
    pub id: Uuid,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub summary: String,
    pub range: DayRange,
    pub range_label: String,
}

//=========================================================================================
// Word of the Day
//=========================================================================================

/// Position of the most recently used word: how many passes over the list have
/// completed, and the index within the current pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WordCursor {
    pub cycle: i64,
    pub dataset_index: usize,
}

/// A persisted word of the day.
#[derive(Debug, Clone, PartialEq)]
pub struct WordRecord {
    pub id: Uuid,
    pub word: String,
    /// The definition payload exactly as returned by the dictionary service.
    pub details: Value,
    pub cursor: WordCursor,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_uses_local_day_of_zone() {
        // 03:30 UTC on Jan 2 is still Jan 1 in New York.
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 30, 0).unwrap();
        let stamp = Stamp::in_zone(at, &chrono_tz::America::New_York);
        assert_eq!(
            stamp.day,
            DateParts {
                year: 2025,
                month: 1,
                day: 1
            }
        );
    }

    #[test]
    fn checked_stamp_rejects_a_day_the_instant_is_not_on() {
        let zone = chrono_tz::America::New_York;
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 30, 0).unwrap();
        let jan_1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let jan_2 = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

        assert!(Stamp::checked_on_day(jan_1, at, &zone).is_some());
        assert!(Stamp::checked_on_day(jan_2, at, &zone).is_none());
    }

    #[test]
    fn past_day_keeps_the_current_local_time() {
        let zone = chrono_tz::America::New_York;
        // 14:15 local on Jun 1.
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 18, 15, 0).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let stamp = Stamp::on_day_at_time_of(day, now, &zone).unwrap();

        assert_eq!(stamp.day, DateParts::from(day));
        // Mar 10 is already on daylight time, so 14:15 local is 18:15 UTC.
        assert_eq!(stamp.at, Utc.with_ymd_and_hms(2025, 3, 10, 18, 15, 0).unwrap());
    }

    #[test]
    fn time_skipped_by_dst_moves_forward() {
        let zone = chrono_tz::America::New_York;
        // 02:30 local on Jan 15; that time does not exist on Mar 9.
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 7, 30, 0).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();

        let stamp = Stamp::on_day_at_time_of(day, now, &zone).unwrap();

        assert_eq!(stamp.day, DateParts::from(day));
        assert_eq!(stamp.at, Utc.with_ymd_and_hms(2025, 3, 9, 7, 30, 0).unwrap());
    }

    #[test]
    fn open_entry_has_zero_duration_without_now() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let entry = TimeEntry {
            id: Uuid::new_v4(),
            owner_id: "u1".to_string(),
            group_id: Uuid::new_v4(),
            start: Stamp::in_zone(start, &chrono_tz::UTC),
            end: None,
            description: String::new(),
        };
        assert!(entry.is_open());
        assert_eq!(entry.duration(None), chrono::Duration::zero());
        let now = start + chrono::Duration::minutes(45);
        assert_eq!(entry.duration(Some(now)), chrono::Duration::minutes(45));
    }

    #[test]
    fn day_range_rejects_inverted_bounds() {
        let a = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(DayRange::new(a, b).is_none());
        let range = DayRange::new(b, a).unwrap();
        assert!(range.contains(a) && range.contains(b));
    }

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("neon".parse::<Theme>().is_err());
    }
}
