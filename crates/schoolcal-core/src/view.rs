//! Calendar view projection.
//!
//! Every [`ViewMode`] is a different way of cutting the same filtered event
//! collection around an anchor date. All of them share one routine: pick the
//! [`DateRange`] the mode covers ([`ViewMode::period`]), attribute each event
//! to the local day its start falls on, then shape those per-day groups into
//! the mode's output structure.
//!
//! Projection is pure: identical inputs always yield equal [`ViewResult`]s.
//!
//! # Example
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use schoolcal_core::time::WeekStart;
//! use schoolcal_core::view::{project, ViewMode};
//! use schoolcal_core::Event;
//!
//! let start = Utc.with_ymd_and_hms(2024, 3, 14, 9, 0, 0).unwrap();
//! let events = vec![Event::new("1", "Pi Day", start, start + chrono::Duration::hours(1), "math")];
//! let anchor = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//!
//! let result = project(&events, ViewMode::Month, anchor, &Utc, WeekStart::Sunday);
//! assert_eq!(result.total_events(), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conflict::{Conflict, find_conflicts};
use crate::error::CalendarError;
use crate::event::{Event, sort_chronologically};
use crate::time::{DateRange, WeekStart, month_grid, month_of, week_of};

/// Event count at which a day reaches full intensity.
pub const INTENSITY_SATURATION: usize = 5;

/// Hours in a timeline day.
pub const HOURS_PER_DAY: u32 = 24;

/// Occupancy intensity of a day: `min(count / 5, 1.0)`.
pub fn intensity(count: usize) -> f64 {
    (count as f64 / INTENSITY_SATURATION as f64).min(1.0)
}

/// The supported calendar projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Six-week grid around the anchor month.
    Month,
    /// Seven days of the anchor week.
    Week,
    /// Anchor week as a 7×24 hour grid.
    Timeline,
    /// Month grid reduced to per-day intensity.
    Heatmap,
    /// Twelve month summaries of the anchor year.
    Year,
    /// Month grid for the 3-D presentation; same buckets as `Month`.
    #[serde(rename = "grid3d")]
    Grid3d,
}

impl ViewMode {
    /// All view modes.
    pub const ALL: [ViewMode; 6] = [
        Self::Month,
        Self::Week,
        Self::Timeline,
        Self::Heatmap,
        Self::Year,
        Self::Grid3d,
    ];

    /// Returns the identifier used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Week => "week",
            Self::Timeline => "timeline",
            Self::Heatmap => "heatmap",
            Self::Year => "year",
            Self::Grid3d => "grid3d",
        }
    }

    /// The range of days this mode covers around `anchor`.
    pub fn period(&self, anchor: NaiveDate, week_start: WeekStart) -> DateRange {
        match self {
            Self::Month | Self::Heatmap | Self::Grid3d => month_grid(anchor, week_start),
            Self::Week | Self::Timeline => week_of(anchor, week_start),
            Self::Year => {
                let months = months_of_year(anchor);
                DateRange::new(months[0].start, months[11].end)
            }
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CalendarError::UnknownViewMode(s.to_string()))
    }
}

/// Events, conflicts and intensity for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    /// Events starting on this day, ordered by start.
    pub events: Vec<Event>,
    /// `min(events.len() / 5, 1.0)`.
    pub intensity: f64,
    pub conflicts: Vec<Conflict>,
    /// Set on grid days that belong to a neighbouring month.
    pub outside_month: bool,
}

impl DayBucket {
    fn new(date: NaiveDate, events: Vec<Event>, outside_month: bool) -> Self {
        Self {
            date,
            intensity: intensity(events.len()),
            conflicts: find_conflicts(&events),
            events,
            outside_month,
        }
    }

    /// Number of events on this day.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Number of conflicting pairs on this day.
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }
}

/// Day buckets for a month-shaped grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// 42 buckets, six weeks starting on the week-start day.
    pub days: Vec<DayBucket>,
}

/// Day buckets for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekView {
    pub days: Vec<DayBucket>,
}

/// An event placed on the timeline, with its duration for layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub event: Event,
    /// Zero for events whose end is not after their start.
    pub duration_minutes: i64,
}

/// The events starting within one hour of a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSlot {
    pub hour: u32,
    pub entries: Vec<TimelineEntry>,
}

/// One day of the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineDay {
    pub date: NaiveDate,
    /// Exactly 24 slots, hour 0 first.
    pub slots: Vec<TimelineSlot>,
    pub conflicts: Vec<Conflict>,
}

/// A week as a 7×24 grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineView {
    pub days: Vec<TimelineDay>,
}

/// Aggregate for one month of a year view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    /// One bucket per day of the month.
    pub days: Vec<DayBucket>,
    pub total_events: usize,
}

/// Twelve month summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearView {
    pub year: i32,
    pub months: Vec<MonthSummary>,
}

/// The output of a projection, one variant per [`ViewMode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewResult {
    Month(MonthGrid),
    Week(WeekView),
    Timeline(TimelineView),
    Heatmap(MonthGrid),
    Year(YearView),
    #[serde(rename = "grid3d")]
    Grid3d(MonthGrid),
}

impl ViewResult {
    /// The mode this result was projected for.
    pub fn mode(&self) -> ViewMode {
        match self {
            Self::Month(_) => ViewMode::Month,
            Self::Week(_) => ViewMode::Week,
            Self::Timeline(_) => ViewMode::Timeline,
            Self::Heatmap(_) => ViewMode::Heatmap,
            Self::Year(_) => ViewMode::Year,
            Self::Grid3d(_) => ViewMode::Grid3d,
        }
    }

    /// All day buckets, in date order. Empty for the timeline view.
    pub fn day_buckets(&self) -> Vec<&DayBucket> {
        match self {
            Self::Month(grid) | Self::Heatmap(grid) | Self::Grid3d(grid) => {
                grid.days.iter().collect()
            }
            Self::Week(week) => week.days.iter().collect(),
            Self::Year(year) => year.months.iter().flat_map(|m| m.days.iter()).collect(),
            Self::Timeline(_) => Vec::new(),
        }
    }

    /// Day → events mapping, available for every view.
    pub fn events_by_day(&self) -> BTreeMap<NaiveDate, Vec<&Event>> {
        match self {
            Self::Timeline(timeline) => timeline
                .days
                .iter()
                .map(|day| {
                    let events = day
                        .slots
                        .iter()
                        .flat_map(|slot| slot.entries.iter().map(|entry| &entry.event))
                        .collect();
                    (day.date, events)
                })
                .collect(),
            _ => self
                .day_buckets()
                .into_iter()
                .map(|bucket| (bucket.date, bucket.events.iter().collect()))
                .collect(),
        }
    }

    /// Day → number of conflicting pairs, available for every view.
    pub fn conflict_counts(&self) -> BTreeMap<NaiveDate, usize> {
        match self {
            Self::Timeline(timeline) => timeline
                .days
                .iter()
                .map(|day| (day.date, day.conflicts.len()))
                .collect(),
            _ => self
                .day_buckets()
                .into_iter()
                .map(|bucket| (bucket.date, bucket.conflict_count()))
                .collect(),
        }
    }

    /// Total number of events placed in the result.
    pub fn total_events(&self) -> usize {
        self.events_by_day().values().map(Vec::len).sum()
    }
}

/// Projects `events` into the structure for `mode` around `anchor`.
///
/// Events are attributed to the local day (in `tz`) on which they start;
/// events starting outside the mode's period are left out.
pub fn project<Tz: TimeZone>(
    events: &[Event],
    mode: ViewMode,
    anchor: NaiveDate,
    tz: &Tz,
    week_start: WeekStart,
) -> ViewResult {
    let period = mode.period(anchor, week_start);
    let by_day = bucket_by_day(events, period, tz);
    debug!(
        %mode,
        %anchor,
        start = %period.start,
        end = %period.end,
        days_with_events = by_day.len(),
        "Projecting events"
    );

    match mode {
        ViewMode::Month => ViewResult::Month(month_grid_view(&by_day, period, anchor)),
        ViewMode::Heatmap => ViewResult::Heatmap(month_grid_view(&by_day, period, anchor)),
        ViewMode::Grid3d => ViewResult::Grid3d(month_grid_view(&by_day, period, anchor)),
        ViewMode::Week => ViewResult::Week(WeekView {
            days: day_buckets(&by_day, period, |_| false),
        }),
        ViewMode::Timeline => ViewResult::Timeline(timeline_view(&by_day, period, tz)),
        ViewMode::Year => ViewResult::Year(year_view(&by_day, anchor)),
    }
}

/// Groups the events starting within `period` by local start day.
///
/// Each group is ordered by (start, id).
fn bucket_by_day<Tz: TimeZone>(
    events: &[Event],
    period: DateRange,
    tz: &Tz,
) -> BTreeMap<NaiveDate, Vec<Event>> {
    let mut by_day: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        if !event.has_valid_interval() {
            warn!(event_id = %event.id, "Event ends at or before its start, treating as zero-duration");
        }
        let date = event.start_date(tz);
        if period.contains(date) {
            by_day.entry(date).or_default().push(event.clone());
        }
    }
    for day in by_day.values_mut() {
        sort_chronologically(day);
    }
    by_day
}

fn day_buckets(
    by_day: &BTreeMap<NaiveDate, Vec<Event>>,
    range: DateRange,
    outside: impl Fn(NaiveDate) -> bool,
) -> Vec<DayBucket> {
    range
        .days()
        .map(|date| {
            let events = by_day.get(&date).cloned().unwrap_or_default();
            DayBucket::new(date, events, outside(date))
        })
        .collect()
}

fn month_grid_view(
    by_day: &BTreeMap<NaiveDate, Vec<Event>>,
    period: DateRange,
    anchor: NaiveDate,
) -> MonthGrid {
    let (year, month) = (anchor.year(), anchor.month());
    MonthGrid {
        year,
        month,
        days: day_buckets(by_day, period, |d| d.year() != year || d.month() != month),
    }
}

fn timeline_view<Tz: TimeZone>(
    by_day: &BTreeMap<NaiveDate, Vec<Event>>,
    period: DateRange,
    tz: &Tz,
) -> TimelineView {
    let days = period
        .days()
        .map(|date| {
            let events = by_day.get(&date).map(Vec::as_slice).unwrap_or_default();
            let mut slots: Vec<TimelineSlot> = (0..HOURS_PER_DAY)
                .map(|hour| TimelineSlot {
                    hour,
                    entries: Vec::new(),
                })
                .collect();
            // Events are already in start order, so each slot stays ordered.
            for event in events {
                let hour = event.start.with_timezone(tz).hour() as usize;
                slots[hour].entries.push(TimelineEntry {
                    duration_minutes: event.duration_minutes(),
                    event: event.clone(),
                });
            }
            TimelineDay {
                date,
                slots,
                conflicts: find_conflicts(events),
            }
        })
        .collect();
    TimelineView { days }
}

fn year_view(by_day: &BTreeMap<NaiveDate, Vec<Event>>, anchor: NaiveDate) -> YearView {
    let months = months_of_year(anchor)
        .into_iter()
        .map(|range| {
            let days = day_buckets(by_day, range, |_| false);
            MonthSummary {
                year: range.start.year(),
                month: range.start.month(),
                total_events: days.iter().map(DayBucket::event_count).sum(),
                days,
            }
        })
        .collect();
    YearView {
        year: anchor.year(),
        months,
    }
}

/// The twelve month ranges of the year containing `anchor`.
fn months_of_year(anchor: NaiveDate) -> Vec<DateRange> {
    let mut first = anchor - Duration::days(i64::from(anchor.ordinal0()));
    let mut months = Vec::with_capacity(12);
    for _ in 0..12 {
        let range = month_of(first);
        first = range.end + Duration::days(1);
        months.push(range);
    }
    months
}
