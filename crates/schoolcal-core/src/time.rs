//! Time-interval utilities.
//!
//! Calendar arithmetic shared by the recurrence expander, the conflict
//! detector and the view projector:
//! - [`DateRange`]: an inclusive span of calendar days
//! - [`TimeWindow`]: a half-open `[start, end)` window in UTC
//! - [`WeekStart`]: which weekday opens a calendar week
//! - free functions for month/week boundaries, stepping and overlap tests

use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};

/// Number of days shown by a month grid (six full weeks).
pub const MONTH_GRID_DAYS: i64 = 42;

/// The weekday a calendar week starts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    /// Weeks run Sunday to Saturday.
    #[default]
    Sunday,
    /// Weeks run Monday to Sunday (ISO 8601).
    Monday,
}

impl WeekStart {
    /// Returns the first weekday of the week.
    pub fn weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
        }
    }

    /// How many days `weekday` lies after the start of its week.
    pub fn days_since(self, weekday: Weekday) -> i64 {
        match self {
            Self::Sunday => i64::from(weekday.num_days_from_sunday()),
            Self::Monday => i64::from(weekday.num_days_from_monday()),
        }
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range (inclusive).
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        assert!(start <= end, "DateRange start must be <= end");
        Self { start, end }
    }

    /// Creates a range covering a single day.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Checks if a day falls within this range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the range.
    pub fn len(&self) -> usize {
        // Non-negative by construction.
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Always false; a range holds at least one day.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over every day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// Converts the range to a half-open UTC window in the given timezone.
    pub fn to_window<Tz: TimeZone>(&self, tz: &Tz) -> TimeWindow {
        let start = local_midnight(self.start, tz);
        let end = match self.end.succ_opt() {
            Some(next) => local_midnight(next, tz),
            None => self.end.and_time(NaiveTime::MIN).and_utc() + Duration::days(1),
        };
        TimeWindow { start, end }
    }
}

/// A half-open time window `[start, end)` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a time window for a single local day.
    pub fn for_date<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        DateRange::single(date).to_window(tz)
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if an instant falls within this window.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if the half-open interval `[start, end)` overlaps this window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        overlaps(self.start, self.end, start, end)
    }
}

/// Half-open overlap test: `[s1, e1)` and `[s2, e2)` overlap iff
/// `s1 < e2 && s2 < e1`.
///
/// Back-to-back intervals (`e1 == s2`) never overlap.
pub fn overlaps<T: PartialOrd>(s1: T, e1: T, s2: T, e2: T) -> bool {
    s1 < e2 && s2 < e1
}

/// Returns the calendar date of an instant in the given timezone.
pub fn local_date<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Checks if two instants fall on the same calendar day in the given timezone.
pub fn is_same_day<Tz: TimeZone>(a: DateTime<Utc>, b: DateTime<Utc>, tz: &Tz) -> bool {
    local_date(a, tz) == local_date(b, tz)
}

/// Resolves a local wall-clock time to a UTC instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that
/// do not exist (DST spring-forward gap) move forward by one hour.
pub fn resolve_local<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Returns the first instant of a local day.
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    resolve_local(date.and_time(NaiveTime::MIN), tz)
}

/// Returns the number of days in a month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = first.and_then(|d| d.checked_add_months(Months::new(1)));
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 31,
    }
}

/// Returns the first day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// Returns the last day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date) + Duration::days(i64::from(days_in_month(date.year(), date.month())) - 1)
}

/// Returns the first day of the week containing `date`.
pub fn start_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    date - Duration::days(week_start.days_since(date.weekday()))
}

/// Returns the last day of the week containing `date`.
pub fn end_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    start_of_week(date, week_start) + Duration::days(6)
}

/// Adds (or subtracts, for negative `n`) whole days.
pub fn add_days(date: NaiveDate, n: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(n)?)
}

/// Adds (or subtracts, for negative `n`) whole weeks.
pub fn add_weeks(date: NaiveDate, n: i64) -> Option<NaiveDate> {
    add_days(date, n.checked_mul(7)?)
}

/// Adds (or subtracts, for negative `n`) calendar months.
///
/// The day of month is preserved when the target month has it and clamped to
/// the target month's last day otherwise (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, n: i64) -> Option<NaiveDate> {
    let months = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
    if n >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

/// The six-week range covering the month that contains `anchor`.
///
/// Starts on the week-start day on or before the 1st of the month.
pub fn month_grid(anchor: NaiveDate, week_start: WeekStart) -> DateRange {
    let start = start_of_week(start_of_month(anchor), week_start);
    DateRange::new(start, start + Duration::days(MONTH_GRID_DAYS - 1))
}

/// The seven-day range of the week containing `anchor`.
pub fn week_of(anchor: NaiveDate, week_start: WeekStart) -> DateRange {
    DateRange::new(
        start_of_week(anchor, week_start),
        end_of_week(anchor, week_start),
    )
}

/// The range of the month containing `anchor`.
pub fn month_of(anchor: NaiveDate) -> DateRange {
    DateRange::new(start_of_month(anchor), end_of_month(anchor))
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> CalendarResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| CalendarError::invalid_date(format!("{s:?} ({e}), expected YYYY-MM-DD")))
}
