//! Core calendar engine: events, recurrence, conflicts, filters, views

pub mod cache;
pub mod conflict;
pub mod error;
pub mod event;
pub mod filter;
pub mod query;
pub mod recurrence;
pub mod settings;
pub mod time;
pub mod tracing;
pub mod view;

pub use cache::{CacheStats, CachedProjector, ProjectionKey};
pub use conflict::{Conflict, conflicts_with, events_overlap, find_conflicts};
pub use error::{CalendarError, CalendarResult};
pub use event::{Category, Event, Visibility};
pub use filter::{CategoryFilter, EventFilter};
pub use query::{
    detect_conflicts, expand_recurrence, project_events, project_events_named, upcoming_events,
    validate_events,
};
pub use recurrence::{DEFAULT_MAX_OCCURRENCES, RecurrenceDefinition, RecurrencePattern};
pub use settings::CalendarSettings;
pub use time::{DateRange, TimeWindow, WeekStart};
pub use tracing::{LogFormat, TracingConfig, TracingError, init_tracing};
pub use view::{DayBucket, ViewMode, ViewResult};
