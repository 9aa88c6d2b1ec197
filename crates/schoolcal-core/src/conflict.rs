//! Time-overlap conflict detection.
//!
//! Intervals are half-open, so an event ending at 10:00 never collides with
//! one starting at 10:00. Malformed events are evaluated as
//! `[start, start)`.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::event::{Event, sort_chronologically};
use crate::time::overlaps;

/// An unordered pair of colliding events.
///
/// `first` is the member that sorts earlier by (start, id); each pair is
/// reported exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conflict {
    pub first: String,
    pub second: String,
}

impl Conflict {
    /// Creates a conflict between two event ids.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Returns `true` if the given event takes part in this conflict.
    pub fn involves(&self, event_id: &str) -> bool {
        self.first == event_id || self.second == event_id
    }

    /// Checks if this pair matches `(a, b)` in either order.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

/// Returns `true` if two events overlap in time.
pub fn events_overlap(a: &Event, b: &Event) -> bool {
    overlaps(a.start, a.effective_end(), b.start, b.effective_end())
}

/// Finds every colliding pair among `events`.
///
/// The input may be in any order. A pairwise scan is used; callers pass one
/// day's worth of events.
pub fn find_conflicts(events: &[Event]) -> Vec<Conflict> {
    let mut sorted = events.to_vec();
    sort_chronologically(&mut sorted);

    let mut conflicts = Vec::new();
    for (i, a) in sorted.iter().enumerate() {
        for b in &sorted[i + 1..] {
            // Sorted by start: nothing later can overlap `a` once `b` starts
            // at or after its end.
            if b.start >= a.effective_end() {
                break;
            }
            if events_overlap(a, b) {
                trace!(first = %a.id, second = %b.id, "Conflict detected");
                conflicts.push(Conflict::new(&a.id, &b.id));
            }
        }
    }
    conflicts
}

/// Finds conflicts among the events that start on `day` in `tz`.
pub fn detect_conflicts_on<Tz: TimeZone>(events: &[Event], day: NaiveDate, tz: &Tz) -> Vec<Conflict> {
    let on_day: Vec<Event> = events
        .iter()
        .filter(|e| e.starts_on(day, tz))
        .cloned()
        .collect();
    find_conflicts(&on_day)
}

/// Returns the existing events a candidate would collide with.
///
/// Used by creation workflows to warn before committing an event; it never
/// blocks. The candidate itself (same id) is skipped so edits don't collide
/// with their previous version.
pub fn conflicts_with<'a>(candidate: &Event, existing: &'a [Event]) -> Vec<&'a Event> {
    existing
        .iter()
        .filter(|e| e.id != candidate.id && events_overlap(candidate, e))
        .collect()
}

/// Counts, per event id, how many conflicts it takes part in.
pub fn conflict_counts(conflicts: &[Conflict]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for conflict in conflicts {
        *counts.entry(conflict.first.clone()).or_insert(0) += 1;
        *counts.entry(conflict.second.clone()).or_insert(0) += 1;
    }
    counts
}
