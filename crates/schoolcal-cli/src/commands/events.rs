//! Event commands: projection, conflicts, recurrence expansion, upcoming.
//!
//! Each command reads its input, calls the engine and hands back a
//! serializable value; printing is left to the caller.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use schoolcal_core::time::local_date;
use schoolcal_core::{
    CalendarSettings, CategoryFilter, Conflict, Event, EventFilter, RecurrencePattern, ViewResult,
    detect_conflicts, expand_recurrence, project_events_named, upcoming_events, validate_events,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{CliError, CliResult};

/// Reads and deserializes a JSON document from `path`, or stdin for `-`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::io(path, e))?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?
    };
    serde_json::from_str(&content).map_err(|e| CliError::json(path, e))
}

/// Reads an event collection and warns about inverted intervals.
pub fn load_events(path: &Path) -> CliResult<Vec<Event>> {
    let events: Vec<Event> = read_json(path)?;
    for problem in validate_events(&events) {
        warn!(path = %path.display(), "{problem}");
    }
    debug!(path = %path.display(), count = events.len(), "Loaded events");
    Ok(events)
}

/// `schoolcal project`
pub fn project(
    events: &[Event],
    view: &str,
    anchor: Option<NaiveDate>,
    category: CategoryFilter,
    query: String,
    settings: &CalendarSettings,
) -> CliResult<ViewResult> {
    let anchor = anchor.unwrap_or_else(|| today(settings));
    let filter = EventFilter { category, query };
    Ok(project_events_named(events, view, anchor, &filter, settings)?)
}

/// `schoolcal conflicts`
pub fn conflicts(events: &[Event], day: NaiveDate, settings: &CalendarSettings) -> Vec<Conflict> {
    detect_conflicts(events, day, settings)
}

/// `schoolcal expand`
pub fn expand(
    template: Event,
    pattern: &str,
    horizon: NaiveDate,
    settings: &CalendarSettings,
) -> CliResult<Vec<Event>> {
    let pattern: RecurrencePattern = pattern.parse()?;
    Ok(expand_recurrence(template, pattern, horizon, settings)?)
}

/// `schoolcal upcoming`
pub fn upcoming(events: &[Event], now: DateTime<Utc>, limit: Option<usize>) -> Vec<Event> {
    upcoming_events(events, now, limit)
}

fn today(settings: &CalendarSettings) -> NaiveDate {
    local_date(Utc::now(), &settings.timezone)
}
