//! Memoized projection.
//!
//! Projection is a pure function of its inputs, so results can be reused for
//! as long as the caller's event collection is unchanged. The caller tags the
//! collection with a version number and bumps it whenever rows change; the
//! cache never has to guess about freshness.

use std::collections::{HashMap, VecDeque};

use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::event::Event;
use crate::filter::EventFilter;
use crate::query::project_events;
use crate::settings::CalendarSettings;
use crate::view::{ViewMode, ViewResult};

/// Everything a projection depends on besides the settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectionKey {
    /// Caller-supplied version of the event collection.
    pub version: u64,
    pub filter: EventFilter,
    pub mode: ViewMode,
    pub anchor: NaiveDate,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// A projector that remembers its most recent results.
///
/// Holds at most `capacity` results and evicts the oldest insertion first.
/// A capacity of zero disables caching.
#[derive(Debug)]
pub struct CachedProjector {
    settings: CalendarSettings,
    capacity: usize,
    entries: HashMap<ProjectionKey, ViewResult>,
    order: VecDeque<ProjectionKey>,
    stats: CacheStats,
}

impl Default for CachedProjector {
    fn default() -> Self {
        Self::new(CalendarSettings::default())
    }
}

impl CachedProjector {
    /// Creates a projector using the settings' cache capacity.
    pub fn new(settings: CalendarSettings) -> Self {
        Self {
            capacity: settings.cache_capacity,
            settings,
            entries: HashMap::new(),
            order: VecDeque::new(),
            stats: CacheStats::default(),
        }
    }

    /// Returns the settings projections are computed with.
    pub fn settings(&self) -> &CalendarSettings {
        &self.settings
    }

    /// Replaces the settings and drops every cached result.
    pub fn set_settings(&mut self, settings: CalendarSettings) {
        self.capacity = settings.cache_capacity;
        self.settings = settings;
        self.clear();
    }

    /// Projects `events`, reusing a previous result for the same key.
    ///
    /// `version` must change whenever `events` changes.
    pub fn project(
        &mut self,
        version: u64,
        events: &[Event],
        mode: ViewMode,
        anchor: NaiveDate,
        filter: &EventFilter,
    ) -> ViewResult {
        let key = ProjectionKey {
            version,
            filter: filter.clone(),
            mode,
            anchor,
        };

        if let Some(result) = self.entries.get(&key) {
            self.stats.hits += 1;
            trace!(version, %mode, %anchor, "Projection cache hit");
            return result.clone();
        }

        self.stats.misses += 1;
        let result = project_events(events, mode, anchor, filter, &self.settings);
        self.insert(key, result.clone());
        result
    }

    /// Gets a cached result by key.
    pub fn get(&self, key: &ProjectionKey) -> Option<&ViewResult> {
        self.entries.get(key)
    }

    fn insert(&mut self, key: ProjectionKey, result: ViewResult) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            trace!(version = oldest.version, mode = %oldest.mode, "Evicted cached projection");
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, result);
    }

    /// Drops every result computed for a collection version older than
    /// `version`.
    pub fn invalidate_before(&mut self, version: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.version >= version);
        self.order.retain(|key| key.version >= version);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, version, "Invalidated stale projections");
        }
        evicted
    }

    /// Clears all cached results.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.order.clear();
        debug!(count, "Cleared projection cache");
    }

    /// Returns the number of cached results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    use crate::event::Category;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn events() -> Vec<Event> {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 14, 0, 0).unwrap();
        vec![
            Event::new("1", "Field Day", start, start + Duration::hours(3), "pe")
                .with_category(Category::Sports),
            Event::new("2", "Art Show", start, start + Duration::hours(1), "art")
                .with_category(Category::Arts),
        ]
    }

    #[test]
    fn repeated_projection_hits_cache() {
        let mut projector = CachedProjector::default();
        let filter = EventFilter::new();
        let first = projector.project(1, &events(), ViewMode::Month, date(2024, 5, 1), &filter);
        let second = projector.project(1, &events(), ViewMode::Month, date(2024, 5, 1), &filter);
        assert_eq!(first, second);
        assert_eq!(projector.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(projector.len(), 1);
    }

    #[test]
    fn key_includes_filter_mode_and_anchor() {
        let mut projector = CachedProjector::default();
        let all = EventFilter::new();
        let sports = EventFilter::new().category(Category::Sports);
        let anchor = date(2024, 5, 1);

        let everything = projector.project(1, &events(), ViewMode::Month, anchor, &all);
        let only_sports = projector.project(1, &events(), ViewMode::Month, anchor, &sports);
        projector.project(1, &events(), ViewMode::Week, anchor, &all);
        projector.project(1, &events(), ViewMode::Month, date(2024, 6, 1), &all);

        assert_eq!(everything.total_events(), 2);
        assert_eq!(only_sports.total_events(), 1);
        assert_eq!(projector.stats().misses, 4);
        assert_eq!(projector.len(), 4);
    }

    #[test]
    fn new_version_recomputes() {
        let mut projector = CachedProjector::default();
        let filter = EventFilter::new();
        let anchor = date(2024, 5, 1);
        let mut rows = events();

        projector.project(1, &rows, ViewMode::Month, anchor, &filter);
        rows.pop();
        let updated = projector.project(2, &rows, ViewMode::Month, anchor, &filter);
        assert_eq!(updated.total_events(), 1);

        assert_eq!(projector.invalidate_before(2), 1);
        assert_eq!(projector.len(), 1);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let settings = CalendarSettings::default().with_cache_capacity(2);
        let mut projector = CachedProjector::new(settings);
        let filter = EventFilter::new();
        for version in 1..=3 {
            projector.project(version, &events(), ViewMode::Week, date(2024, 5, 10), &filter);
        }
        assert_eq!(projector.len(), 2);
        let oldest = ProjectionKey {
            version: 1,
            filter: filter.clone(),
            mode: ViewMode::Week,
            anchor: date(2024, 5, 10),
        };
        assert!(projector.get(&oldest).is_none());
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let settings = CalendarSettings::default().with_cache_capacity(0);
        let mut projector = CachedProjector::new(settings);
        let filter = EventFilter::new();
        projector.project(1, &events(), ViewMode::Year, date(2024, 5, 10), &filter);
        projector.project(1, &events(), ViewMode::Year, date(2024, 5, 10), &filter);
        assert!(projector.is_empty());
        assert_eq!(projector.stats().misses, 2);
    }

    #[test]
    fn changing_settings_clears() {
        let mut projector = CachedProjector::default();
        projector.project(1, &events(), ViewMode::Month, date(2024, 5, 1), &EventFilter::new());
        projector.set_settings(CalendarSettings::new(chrono_tz::Asia::Tokyo));
        assert!(projector.is_empty());
        assert_eq!(projector.settings().timezone, chrono_tz::Asia::Tokyo);
    }
}
