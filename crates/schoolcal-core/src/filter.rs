//! Filter pipeline applied before projection.
//!
//! Two conjunctive predicates: a category match (or the `"all"` wildcard) and
//! a case-insensitive substring query over title, description and location.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::{Category, Event};

/// Category predicate.
///
/// Plain equality against the event's category. Naming a category no event
/// carries is not an error; it just matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    /// Pass every event through.
    #[default]
    All,
    /// Keep only events of this category.
    Only(Category),
}

impl CategoryFilter {
    /// Returns `true` if the event satisfies the predicate.
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => event.category == *category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") || s.trim().is_empty() {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(filter) => filter,
            Err(never) => match never {},
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        filter.to_string()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(category) => write!(f, "{category}"),
        }
    }
}

/// Filter state supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFilter {
    pub category: CategoryFilter,
    /// Free-text query; blank means no text filtering.
    pub query: String,
}

impl EventFilter {
    /// Creates a pass-through filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: restrict to one category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = CategoryFilter::Only(category);
        self
    }

    /// Builder: set the free-text query.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Returns `true` if neither predicate is active.
    pub fn is_pass_through(&self) -> bool {
        self.category == CategoryFilter::All && self.query.trim().is_empty()
    }

    /// Returns `true` if the event satisfies every active predicate.
    pub fn matches(&self, event: &Event) -> bool {
        self.category.matches(event) && matches_query(event, &self.normalized_query())
    }

    /// Returns the events that satisfy the filter, in their original order.
    pub fn apply(&self, events: &[Event]) -> Vec<Event> {
        let needle = self.normalized_query();
        let kept: Vec<Event> = events
            .iter()
            .filter(|e| self.category.matches(e) && matches_query(e, &needle))
            .cloned()
            .collect();
        debug!(
            category = %self.category,
            query = %self.query,
            total = events.len(),
            kept = kept.len(),
            "Applied event filter"
        );
        kept
    }

    fn normalized_query(&self) -> String {
        self.query.trim().to_lowercase()
    }
}

fn matches_query(event: &Event, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let contains = |field: &str| field.to_lowercase().contains(needle);
    contains(&event.title)
        || event.description.as_deref().is_some_and(contains)
        || event.location.as_deref().is_some_and(contains)
}
