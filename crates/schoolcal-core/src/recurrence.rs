//! Recurring-event expansion.
//!
//! A [`RecurrenceDefinition`] (template event, [`RecurrencePattern`] and an
//! inclusive horizon date) is expanded once, at creation time, into a list of
//! concrete [`Event`] rows that the caller persists.
//!
//! Every occurrence is computed from the template as `start + k * step` on
//! the local wall clock, never by chaining from the previous occurrence, so
//! monthly clamping (Jan 31 → Feb 29) does not drift later occurrences
//! (Mar 31 stays Mar 31).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CalendarError, CalendarResult};
use crate::event::Event;
use crate::time::{add_days, add_months, days_in_month, resolve_local};

/// Default upper bound on instances produced by one expansion.
pub const DEFAULT_MAX_OCCURRENCES: usize = 1000;

/// How often a recurring event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurrencePattern {
    /// Returns the identifier used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }

    /// Date of the `k`-th occurrence counted from `first`.
    pub fn step(&self, first: NaiveDate, k: u32) -> Option<NaiveDate> {
        let k = i64::from(k);
        match self {
            Self::Daily => add_days(first, k),
            Self::Weekly => add_days(first, k * 7),
            Self::Biweekly => add_days(first, k * 14),
            Self::Monthly => add_months(first, k),
        }
    }

    /// Number of occurrences between `first` and `horizon`, both inclusive.
    ///
    /// Computed arithmetically so that oversize requests can be rejected
    /// before anything is generated.
    pub fn occurrences_until(&self, first: NaiveDate, horizon: NaiveDate) -> usize {
        if horizon < first {
            return 0;
        }
        let days = (horizon - first).num_days();
        let steps = match self {
            Self::Daily => days,
            Self::Weekly => days / 7,
            Self::Biweekly => days / 14,
            Self::Monthly => {
                let mut months = i64::from(horizon.year() - first.year()) * 12
                    + i64::from(horizon.month())
                    - i64::from(first.month());
                let target_day = first
                    .day()
                    .min(days_in_month(horizon.year(), horizon.month()));
                if horizon.day() < target_day {
                    months -= 1;
                }
                months
            }
        };
        usize::try_from(steps).map_or(usize::MAX, |s| s.saturating_add(1))
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrencePattern {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(CalendarError::UnknownPattern(s.to_string())),
        }
    }
}

/// A one-shot request to materialize a recurring event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceDefinition {
    /// The event every instance is copied from.
    pub template: Event,
    pub pattern: RecurrencePattern,
    /// Last day (inclusive) an instance may fall on.
    pub horizon: NaiveDate,
}

impl RecurrenceDefinition {
    /// Creates a new recurrence definition.
    pub fn new(template: Event, pattern: RecurrencePattern, horizon: NaiveDate) -> Self {
        Self {
            template,
            pattern,
            horizon,
        }
    }

    /// Expands the definition into concrete events.
    ///
    /// Occurrence dates are evaluated on the local calendar of `tz`, keeping
    /// the template's local time of day and its duration. Each instance gets
    /// `parent_id` set to the template's id, an id of the form
    /// `<template-id>-<YYYYMMDD>` and a `" (<YYYY-MM-DD>)"` title suffix.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::RecurrenceOverflow`] when more than
    /// `max_occurrences` instances would be produced. Nothing is generated in
    /// that case.
    pub fn expand<Tz: TimeZone>(self, tz: &Tz, max_occurrences: usize) -> CalendarResult<Vec<Event>> {
        let Self {
            template,
            pattern,
            horizon,
        } = self;

        if !template.has_valid_interval() {
            warn!(event_id = %template.id, "Recurrence template has an invalid interval, instances will be zero-duration");
        }

        let local_start = template.start.with_timezone(tz).naive_local();
        let first = local_start.date();
        let time_of_day = local_start.time();
        let duration = template.duration();

        let requested = pattern.occurrences_until(first, horizon);
        if requested > max_occurrences {
            debug!(
                template_id = %template.id,
                %pattern,
                requested,
                cap = max_occurrences,
                "Rejecting recurrence request"
            );
            return Err(CalendarError::RecurrenceOverflow {
                requested,
                cap: max_occurrences,
            });
        }

        let mut instances = Vec::with_capacity(requested);
        for k in 0u32.. {
            let Some(date) = pattern.step(first, k) else {
                break;
            };
            if date > horizon || instances.len() >= max_occurrences {
                break;
            }
            let start = resolve_local(date.and_time(time_of_day), tz);
            instances.push(materialize(&template, date, start, start + duration));
        }

        debug!(
            template_id = %template.id,
            %pattern,
            %horizon,
            count = instances.len(),
            "Expanded recurrence"
        );
        Ok(instances)
    }
}

fn materialize(
    template: &Event,
    date: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Event {
    Event {
        id: format!("{}-{}", template.id, date.format("%Y%m%d")),
        title: format!("{} ({})", template.title, date.format("%Y-%m-%d")),
        start,
        end,
        parent_id: Some(template.id.clone()),
        ..template.clone()
    }
}
