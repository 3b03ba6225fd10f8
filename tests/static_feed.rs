mod common;

use chrono::NaiveDate;
use transloc_gtfs::config::Lookups;
use transloc_gtfs::error::FeedError;
use transloc_gtfs::static_feed::{StaticFeedBuilder, StaticTable};

fn fall_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()
}

#[tokio::test]
async fn test_agency_table() {
    let source = common::campus();
    let lookups = Lookups::default();
    let builder = StaticFeedBuilder::new(&source, &lookups, fall_day());

    let csv = builder.render(StaticTable::Agency, "643").await.unwrap();
    assert_eq!(
        csv,
        "agency_id,agency_name,agency_url,agency_timezone\n\
         643,Rochester Institute of Technology,https://www.rit.edu,America/New_York\n"
    );
}

#[tokio::test]
async fn test_routes_table_maps_type_and_blanks_missing_names() {
    let source = common::campus();
    let lookups = Lookups::default();
    let builder = StaticFeedBuilder::new(&source, &lookups, fall_day());

    let csv = builder.render(StaticTable::Routes, "643").await.unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("route_id,agency_id,route_short_name,route_long_name,route_type,route_color,route_text_color")
    );
    assert_eq!(lines.next(), Some("4001,643,,Gleason Loop,3,F76902,FFFFFF"));
    assert_eq!(csv.lines().count(), 6);
}

#[tokio::test]
async fn test_trips_skip_routes_without_pages() {
    let source = common::campus();
    let lookups = Lookups::default();
    let builder = StaticFeedBuilder::new(&source, &lookups, fall_day());

    let csv = builder.render(StaticTable::Trips, "643").await.unwrap();
    // 4004 has no page at all and 4005's page cannot be fetched
    assert_eq!(
        csv,
        "route_id,service_id,trip_id\n\
         4001,weekday-2024-fall,4001\n\
         4002,weekend-2024-fall,4002\n\
         4003,weekday-2024-fall,4003\n"
    );
}

#[tokio::test]
async fn test_stop_times_isolate_failing_routes() {
    let source = common::campus();
    let lookups = Lookups::default();
    let builder = StaticFeedBuilder::new(&source, &lookups, fall_day());

    let csv = builder.render(StaticTable::StopTimes, "643").await.unwrap();
    // 4003 names a stop that does not exist and is left out
    assert_eq!(
        csv,
        "trip_id,arrival_time,departure_time,stop_id,stop_sequence,timepoint\n\
         4001,22:50:00,22:50:00,10,0,1\n\
         4001,23:05:00,23:05:00,11,1,1\n\
         4001,23:20:00,23:20:00,12,2,1\n\
         4001,23:40:00,23:40:00,10,3,1\n\
         4001,24:10:00,24:10:00,12,4,1\n\
         4001,24:25:00,24:25:00,12,5,1\n\
         4002,10:00:00,10:00:00,13,0,1\n\
         4002,10:15:00,10:15:00,10,1,1\n"
    );
}

#[tokio::test]
async fn test_unparseable_time_fails_the_table() {
    let source = common::bad_time();
    let lookups = Lookups::default();
    let builder = StaticFeedBuilder::new(&source, &lookups, fall_day());

    let err = builder
        .render(StaticTable::StopTimes, "643")
        .await
        .unwrap_err();
    match err {
        FeedError::InvalidTime { route_id, source } => {
            assert_eq!(route_id, "4006");
            assert_eq!(source.0, "noon");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_calendar_covers_both_seasons() {
    let source = common::campus();
    let lookups = Lookups::default();
    let builder = StaticFeedBuilder::new(&source, &lookups, fall_day());

    let csv = builder.render(StaticTable::Calendar, "643").await.unwrap();
    assert_eq!(
        csv,
        "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
         weekday-2024-fall,1,1,1,1,1,0,0,20240901,20241214\n\
         weekend-2024-fall,0,0,0,0,0,1,1,20240901,20241214\n\
         weekday-2024-spring,1,1,1,1,1,0,0,20240114,20240514\n\
         weekend-2024-spring,0,0,0,0,0,1,1,20240114,20240514\n"
    );
}

#[tokio::test]
async fn test_spring_service_ids_before_fall() {
    let source = common::campus();
    let lookups = Lookups::default();
    let today = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    let builder = StaticFeedBuilder::new(&source, &lookups, today);

    let csv = builder.render(StaticTable::Trips, "643").await.unwrap();
    assert!(csv.contains("4001,weekday-2025-spring,4001\n"));
    assert!(csv.contains("4002,weekend-2025-spring,4002\n"));
}

#[tokio::test]
async fn test_render_is_deterministic() {
    let source = common::campus();
    let lookups = Lookups::default();
    let builder = StaticFeedBuilder::new(&source, &lookups, fall_day());

    for table in StaticTable::ALL {
        let first = builder.render(table, "643").await.unwrap();
        let second = builder.render(table, "643").await.unwrap();
        assert_eq!(first, second, "{table} changed between renders");
    }
}

#[tokio::test]
async fn test_list_failure_is_upstream_error() {
    let mut source = common::campus();
    source.lists_unavailable = true;
    let lookups = Lookups::default();
    let builder = StaticFeedBuilder::new(&source, &lookups, fall_day());

    for table in [StaticTable::Stops, StaticTable::StopTimes] {
        let err = builder.render(table, "643").await.unwrap_err();
        assert!(matches!(err, FeedError::Upstream(_)));
    }
    // calendar needs nothing from upstream
    assert!(builder.render(StaticTable::Calendar, "643").await.is_ok());
}
