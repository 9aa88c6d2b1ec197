//! Engine settings.
//!
//! [`CalendarSettings`] travels with every query: the active time zone that
//! decides which day an event belongs to, the week start, and the safety cap
//! on recurrence expansion. It deserializes from the `[calendar]` table of
//! the CLI's `config.toml`.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::recurrence::DEFAULT_MAX_OCCURRENCES;
use crate::time::WeekStart;

/// Default number of memoized projections kept by the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Settings shared by all engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// IANA time zone used to attribute events to calendar days.
    pub timezone: Tz,
    /// First day of the week for month grids and week views.
    pub week_start: WeekStart,
    /// Maximum number of instances one recurrence request may produce.
    pub max_occurrences: usize,
    /// Number of projections the memoizing projector keeps.
    pub cache_capacity: usize,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            week_start: WeekStart::Sunday,
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl CalendarSettings {
    /// Creates settings for the given time zone.
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            ..Default::default()
        }
    }

    /// Builder: set the week start.
    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    /// Builder: set the recurrence cap.
    pub fn with_max_occurrences(mut self, max: usize) -> Self {
        self.max_occurrences = max;
        self
    }

    /// Builder: set the cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}
