//! Error types for calendar engine operations.

use thiserror::Error;

/// Result type for calendar engine operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Errors produced by the calendar engine.
///
/// [`CalendarError::InvalidInterval`] is a diagnostic rather than a failure:
/// the engine keeps going and treats the offending event as zero-duration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// An event ends at or before its start.
    #[error("event {event_id} ends at or before its start")]
    InvalidInterval { event_id: String },

    /// A recurrence request would generate more instances than allowed.
    #[error("recurrence would produce {requested} occurrences, exceeding the cap of {cap}")]
    RecurrenceOverflow { requested: usize, cap: usize },

    /// The view mode identifier is not one of the supported projections.
    #[error("unknown view mode: {0}")]
    UnknownViewMode(String),

    /// The recurrence pattern identifier is not supported.
    #[error("unknown recurrence pattern: {0}")]
    UnknownPattern(String),

    /// A date could not be parsed or computed.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

impl CalendarError {
    /// Creates an invalid interval diagnostic.
    pub fn invalid_interval(event_id: impl Into<String>) -> Self {
        Self::InvalidInterval {
            event_id: event_id.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate(message.into())
    }

    /// Returns `true` if the engine continues past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidInterval { .. })
    }
}
