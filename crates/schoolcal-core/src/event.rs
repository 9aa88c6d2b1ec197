//! Event types for school calendar entries.
//!
//! - [`Event`]: one calendar row as handed over by the storage collaborator
//! - [`Category`]: the kind of school event
//! - [`Visibility`]: who may see the event

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::time::local_date;

/// The kind of school event.
///
/// Category strings the engine has no variant for are kept verbatim in
/// [`Category::Custom`], so reading and writing an event never rewrites its
/// category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Academic,
    Sports,
    Arts,
    Social,
    Meeting,
    Holiday,
    #[default]
    Other,
    /// A category outside the built-in set, as written by the caller.
    Custom(String),
}

impl Category {
    /// The built-in categories, in display order.
    pub const ALL: [Category; 7] = [
        Self::Academic,
        Self::Sports,
        Self::Arts,
        Self::Social,
        Self::Meeting,
        Self::Holiday,
        Self::Other,
    ];

    /// Returns the identifier used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Academic => "academic",
            Self::Sports => "sports",
            Self::Arts => "arts",
            Self::Social => "social",
            Self::Meeting => "meeting",
            Self::Holiday => "holiday",
            Self::Other => "other",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Returns `true` for categories outside the built-in set.
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact match against the wire identifiers; anything else stays custom.
impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .unwrap_or(Self::Custom(value))
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Custom(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Lenient parsing for typed input: built-in names match case-insensitively
/// and ignoring surrounding whitespace.
impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Ok(Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .unwrap_or_else(|| Self::Custom(needle.to_string())))
    }
}

/// Who may see an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Anyone, including families and visitors.
    #[default]
    Public,
    /// Members of the school only.
    School,
    /// The owner only.
    Private,
}

/// A school calendar event.
///
/// `end` is expected to be after `start`, but nothing enforces it: an event
/// whose end is at or before its start is treated as zero-duration (see
/// [`Event::effective_end`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier of the event row.
    pub id: String,
    /// The event title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// When the event starts.
    pub start: DateTime<Utc>,
    /// When the event ends.
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub category: Category,
    /// Where the event takes place.
    #[serde(default)]
    pub location: Option<String>,
    /// Maximum number of attendees, if limited.
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub visibility: Visibility,
    /// The template this event was generated from, for recurrence instances.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// The user that owns the event.
    pub owner_id: String,
}

impl Event {
    /// Creates a new event with required fields.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            start,
            end,
            category: Category::Other,
            location: None,
            capacity: None,
            visibility: Visibility::Public,
            parent_id: None,
            owner_id: owner_id.into(),
        }
    }

    /// Returns `true` if the event ends strictly after it starts.
    pub fn has_valid_interval(&self) -> bool {
        self.end > self.start
    }

    /// The end instant used for all interval math.
    ///
    /// Equals `end` for well-formed events and `start` otherwise.
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.end.max(self.start)
    }

    /// Returns the duration, zero for malformed intervals.
    pub fn duration(&self) -> Duration {
        self.effective_end() - self.start
    }

    /// Returns the duration of the event in minutes.
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Returns the local calendar day the event is attributed to.
    pub fn start_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        local_date(self.start, tz)
    }

    /// Checks if the event starts on the given local day.
    pub fn starts_on<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> bool {
        self.start_date(tz) == date
    }

    /// Returns `true` if this event was generated by recurrence expansion.
    pub fn is_recurrence_instance(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Returns `Err(InvalidInterval)` if the event ends at or before its start.
    pub fn check_interval(&self) -> Result<(), CalendarError> {
        if self.has_valid_interval() {
            Ok(())
        } else {
            Err(CalendarError::invalid_interval(&self.id))
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Builder method to set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Builder method to set the parent reference.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Orders events by start instant, breaking ties by id.
pub(crate) fn sort_chronologically(events: &mut [Event]) {
    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
}
