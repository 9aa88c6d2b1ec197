//! Query surface.
//!
//! The entry points collaborators call. Each one is synchronous and pure;
//! fetching rows before the call and persisting expanded instances after it
//! are the caller's job.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::conflict::{Conflict, detect_conflicts_on};
use crate::error::{CalendarError, CalendarResult};
use crate::event::{Event, sort_chronologically};
use crate::filter::EventFilter;
use crate::recurrence::{RecurrenceDefinition, RecurrencePattern};
use crate::settings::CalendarSettings;
use crate::view::{ViewMode, ViewResult, project};

/// Filters `events` and projects them into `mode` around `anchor`.
pub fn project_events(
    events: &[Event],
    mode: ViewMode,
    anchor: NaiveDate,
    filter: &EventFilter,
    settings: &CalendarSettings,
) -> ViewResult {
    let filtered = filter.apply(events);
    project(
        &filtered,
        mode,
        anchor,
        &settings.timezone,
        settings.week_start,
    )
}

/// Like [`project_events`], taking the view mode by identifier.
///
/// # Errors
///
/// Returns [`CalendarError::UnknownViewMode`] for unsupported identifiers.
pub fn project_events_named(
    events: &[Event],
    mode: &str,
    anchor: NaiveDate,
    filter: &EventFilter,
    settings: &CalendarSettings,
) -> CalendarResult<ViewResult> {
    let mode: ViewMode = mode.parse()?;
    Ok(project_events(events, mode, anchor, filter, settings))
}

/// Conflicting pairs among the events starting on `day`.
pub fn detect_conflicts(
    events: &[Event],
    day: NaiveDate,
    settings: &CalendarSettings,
) -> Vec<Conflict> {
    let conflicts = detect_conflicts_on(events, day, &settings.timezone);
    debug!(%day, count = conflicts.len(), "Detected conflicts");
    conflicts
}

/// Materializes a recurring event up to and including `horizon`.
///
/// # Errors
///
/// Returns [`CalendarError::RecurrenceOverflow`] if the request exceeds
/// `settings.max_occurrences`.
pub fn expand_recurrence(
    template: Event,
    pattern: RecurrencePattern,
    horizon: NaiveDate,
    settings: &CalendarSettings,
) -> CalendarResult<Vec<Event>> {
    RecurrenceDefinition::new(template, pattern, horizon)
        .expand(&settings.timezone, settings.max_occurrences)
}

/// Events starting at or after `now`, soonest first, at most `limit` of them.
pub fn upcoming_events(events: &[Event], now: DateTime<Utc>, limit: Option<usize>) -> Vec<Event> {
    let mut upcoming: Vec<Event> = events.iter().filter(|e| e.start >= now).cloned().collect();
    sort_chronologically(&mut upcoming);
    if let Some(limit) = limit {
        upcoming.truncate(limit);
    }
    upcoming
}

/// Returns an [`CalendarError::InvalidInterval`] diagnostic for every event
/// that ends at or before its start.
///
/// These are warnings; the engine still accepts such events.
pub fn validate_events(events: &[Event]) -> Vec<CalendarError> {
    events
        .iter()
        .filter_map(|e| e.check_interval().err())
        .collect()
}
