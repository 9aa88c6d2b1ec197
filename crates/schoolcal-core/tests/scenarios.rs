//! End-to-end scenarios through the public query surface.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use schoolcal_core::{
    CachedProjector, CalendarError, CalendarSettings, Category, Conflict, Event, EventFilter,
    RecurrencePattern, ViewMode, ViewResult, WeekStart, detect_conflicts, expand_recurrence,
    project_events, project_events_named,
};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn event(id: &str, title: &str, start: DateTime<Utc>, minutes: i64) -> Event {
    Event::new(id, title, start, start + Duration::minutes(minutes), "staff")
}

#[test]
fn boundary_touching_events_do_not_conflict() {
    let settings = CalendarSettings::default();
    let day = date(2024, 9, 12);
    let touching = vec![
        event("a", "Math", utc(2024, 9, 12, 9, 0), 60),
        event("b", "Reading", utc(2024, 9, 12, 10, 0), 60),
    ];
    assert!(detect_conflicts(&touching, day, &settings).is_empty());

    let overlapping = vec![
        event("a", "Math", utc(2024, 9, 12, 9, 0), 90),
        event("b", "Reading", utc(2024, 9, 12, 10, 0), 60),
    ];
    assert_eq!(
        detect_conflicts(&overlapping, day, &settings),
        vec![Conflict::new("a", "b")]
    );
}

#[test]
fn weekly_club_expands_and_lands_in_month_view() {
    let settings = CalendarSettings::default();
    let template = event("chess", "Chess Club", utc(2024, 1, 4, 15, 30), 60)
        .with_category(Category::Social);
    let instances =
        expand_recurrence(template, RecurrencePattern::Weekly, date(2024, 1, 25), &settings).unwrap();

    let dates: Vec<NaiveDate> = instances.iter().map(|e| e.start.date_naive()).collect();
    assert_eq!(
        dates,
        vec![date(2024, 1, 4), date(2024, 1, 11), date(2024, 1, 18), date(2024, 1, 25)]
    );
    assert!(instances.iter().all(|e| e.duration() == Duration::minutes(60)));
    assert!(instances.iter().all(|e| e.parent_id.as_deref() == Some("chess")));

    let month = project_events(
        &instances,
        ViewMode::Month,
        date(2024, 1, 15),
        &EventFilter::new(),
        &settings,
    );
    let by_day = month.events_by_day();
    for d in &dates {
        assert_eq!(by_day[d].len(), 1);
    }
    assert_eq!(month.total_events(), 4);
}

#[test]
fn monthly_recurrence_clamps_to_month_end() {
    let settings = CalendarSettings::default();
    let template = event("board", "Board Meeting", utc(2024, 1, 31, 18, 0), 120)
        .with_category(Category::Meeting);
    let instances =
        expand_recurrence(template, RecurrencePattern::Monthly, date(2024, 4, 30), &settings).unwrap();
    let days: Vec<(u32, u32)> = instances
        .iter()
        .map(|e| (e.start.month(), e.start.day()))
        .collect();
    assert_eq!(days, vec![(1, 31), (2, 29), (3, 31), (4, 30)]);
}

#[test]
fn horizon_before_start_yields_nothing() {
    let settings = CalendarSettings::default();
    let template = event("t", "Tryouts", utc(2024, 5, 1, 16, 0), 90);
    let instances =
        expand_recurrence(template, RecurrencePattern::Daily, date(2024, 4, 30), &settings).unwrap();
    assert!(instances.is_empty());
}

#[test]
fn runaway_recurrence_is_rejected() {
    let settings = CalendarSettings::default();
    let template = event("t", "Attendance", utc(2024, 1, 1, 8, 0), 15);
    let err = expand_recurrence(template, RecurrencePattern::Daily, date(2030, 1, 1), &settings)
        .unwrap_err();
    assert!(matches!(err, CalendarError::RecurrenceOverflow { cap: 1000, .. }));
}

#[test]
fn heatmap_intensity_saturates() {
    let settings = CalendarSettings::default();
    let mut events = Vec::new();
    for i in 0..2 {
        events.push(event(&format!("two-{i}"), "Lab", utc(2024, 3, 5, 9 + i, 0), 30));
    }
    for i in 0..7 {
        events.push(event(&format!("seven-{i}"), "Recital", utc(2024, 3, 6, 9 + i, 0), 30));
    }

    let result = project_events(
        &events,
        ViewMode::Heatmap,
        date(2024, 3, 1),
        &EventFilter::new(),
        &settings,
    );
    let intensity = |d: NaiveDate| {
        result
            .day_buckets()
            .into_iter()
            .find(|b| b.date == d)
            .map(|b| b.intensity)
            .unwrap()
    };
    assert_eq!(intensity(date(2024, 3, 4)), 0.0);
    assert!((intensity(date(2024, 3, 5)) - 0.4).abs() < f64::EPSILON);
    assert_eq!(intensity(date(2024, 3, 6)), 1.0);
}

#[test]
fn month_grid_respects_week_start() {
    let anchor = date(2024, 9, 15);
    let sunday = project_events(&[], ViewMode::Month, anchor, &EventFilter::new(), &CalendarSettings::default());
    let monday_settings = CalendarSettings::default().with_week_start(WeekStart::Monday);
    let monday = project_events(&[], ViewMode::Month, anchor, &EventFilter::new(), &monday_settings);

    let sunday_days = sunday.day_buckets();
    let monday_days = monday.day_buckets();
    assert_eq!(sunday_days.len(), 42);
    assert_eq!(monday_days.len(), 42);
    // September 2024 starts on a Sunday.
    assert_eq!(sunday_days[0].date, date(2024, 9, 1));
    assert_eq!(monday_days[0].date, date(2024, 8, 26));
    assert!(monday_days[0].outside_month);
}

#[test]
fn year_view_counts_per_month() {
    let settings = CalendarSettings::default();
    let events = vec![
        event("1", "Orientation", utc(2024, 8, 20, 9, 0), 120),
        event("2", "Homecoming", utc(2024, 10, 4, 19, 0), 180),
        event("3", "Winter Concert", utc(2024, 12, 12, 18, 0), 90),
        event("4", "Next Year", utc(2025, 1, 7, 9, 0), 60),
    ];
    let result = project_events(&events, ViewMode::Year, date(2024, 6, 1), &EventFilter::new(), &settings);
    let ViewResult::Year(year) = &result else {
        panic!("expected a year view, got {:?}", result.mode());
    };
    assert_eq!(year.year, 2024);
    assert_eq!(year.months.len(), 12);
    let totals: Vec<usize> = year.months.iter().map(|m| m.total_events).collect();
    assert_eq!(totals, vec![0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1]);
}

#[test]
fn timeline_places_events_by_local_hour() {
    let settings = CalendarSettings::new(chrono_tz::America::New_York);
    // 13:00 UTC is 09:00 EDT.
    let events = vec![event("1", "Assembly", utc(2024, 10, 1, 13, 0), 45)];
    let result = project_events(&events, ViewMode::Timeline, date(2024, 10, 1), &EventFilter::new(), &settings);
    let ViewResult::Timeline(timeline) = &result else {
        panic!("expected a timeline, got {:?}", result.mode());
    };
    assert_eq!(timeline.days.len(), 7);
    let day = timeline.days.iter().find(|d| d.date == date(2024, 10, 1)).unwrap();
    assert_eq!(day.slots.len(), 24);
    assert_eq!(day.slots[9].entries.len(), 1);
    assert_eq!(day.slots[9].entries[0].duration_minutes, 45);
}

#[test]
fn unknown_view_mode_is_rejected() {
    let err = project_events_named(
        &[],
        "agenda",
        date(2024, 1, 1),
        &EventFilter::new(),
        &CalendarSettings::default(),
    )
    .unwrap_err();
    assert_eq!(err, CalendarError::UnknownViewMode("agenda".to_string()));
    assert_eq!(err.to_string(), "unknown view mode: agenda");
}

#[test]
fn view_result_json_is_tagged() {
    let result = project_events(
        &[],
        ViewMode::Grid3d,
        date(2024, 2, 1),
        &EventFilter::new(),
        &CalendarSettings::default(),
    );
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["view"], "grid3d");
    assert_eq!(json["year"], 2024);
    assert_eq!(json["month"], 2);
    assert_eq!(json["days"].as_array().unwrap().len(), 42);

    let back: ViewResult = serde_json::from_value(json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn week_projection_json_snapshot() {
    let events = vec![
        event("1", "Science Fair", utc(2024, 3, 8, 17, 0), 120)
            .with_category(Category::Academic)
            .with_location("Gym"),
        event("2", "Trip Briefing", utc(2024, 3, 8, 18, 30), 60)
            .with_category(Category::Custom("field_trip".to_string())),
    ];
    let result = project_events(
        &events,
        ViewMode::Week,
        date(2024, 3, 8),
        &EventFilter::new(),
        &CalendarSettings::default(),
    );

    insta::assert_json_snapshot!(result, { ".days[].events[].owner_id" => "[owner]" }, @r###"
    {
      "view": "week",
      "days": [
        {
          "date": "2024-03-03",
          "events": [],
          "intensity": 0.0,
          "conflicts": [],
          "outside_month": false
        },
        {
          "date": "2024-03-04",
          "events": [],
          "intensity": 0.0,
          "conflicts": [],
          "outside_month": false
        },
        {
          "date": "2024-03-05",
          "events": [],
          "intensity": 0.0,
          "conflicts": [],
          "outside_month": false
        },
        {
          "date": "2024-03-06",
          "events": [],
          "intensity": 0.0,
          "conflicts": [],
          "outside_month": false
        },
        {
          "date": "2024-03-07",
          "events": [],
          "intensity": 0.0,
          "conflicts": [],
          "outside_month": false
        },
        {
          "date": "2024-03-08",
          "events": [
            {
              "id": "1",
              "title": "Science Fair",
              "description": null,
              "start": "2024-03-08T17:00:00Z",
              "end": "2024-03-08T19:00:00Z",
              "category": "academic",
              "location": "Gym",
              "capacity": null,
              "visibility": "public",
              "parent_id": null,
              "owner_id": "[owner]"
            },
            {
              "id": "2",
              "title": "Trip Briefing",
              "description": null,
              "start": "2024-03-08T18:30:00Z",
              "end": "2024-03-08T19:30:00Z",
              "category": "field_trip",
              "location": null,
              "capacity": null,
              "visibility": "public",
              "parent_id": null,
              "owner_id": "[owner]"
            }
          ],
          "intensity": 0.4,
          "conflicts": [
            {
              "first": "1",
              "second": "2"
            }
          ],
          "outside_month": false
        },
        {
          "date": "2024-03-09",
          "events": [],
          "intensity": 0.0,
          "conflicts": [],
          "outside_month": false
        }
      ]
    }
    "###);
}

#[test]
fn cached_projection_matches_direct_projection() {
    let settings = CalendarSettings::default();
    let events = vec![
        event("1", "Soccer", utc(2024, 4, 2, 15, 0), 90).with_category(Category::Sports),
        event("2", "Art Club", utc(2024, 4, 2, 15, 30), 60).with_category(Category::Arts),
    ];
    let filter = EventFilter::new().query("club");
    let mut projector = CachedProjector::new(settings.clone());
    for _ in 0..3 {
        let cached = projector.project(7, &events, ViewMode::Week, date(2024, 4, 2), &filter);
        let direct = project_events(&events, ViewMode::Week, date(2024, 4, 2), &filter, &settings);
        assert_eq!(cached, direct);
    }
    assert_eq!(projector.stats().hits, 2);
}
