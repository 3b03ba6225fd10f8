//! Shared in-memory upstream for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use transloc_gtfs::upstream::{
    Agency, ArrivalEstimate, Route, Stop, TransitSource, VehicleFeed, VehicleReport,
};

pub const LOOP_URL: &str = "https://pages.test/gleason-loop";
pub const UNKNOWN_STOP_URL: &str = "https://pages.test/henrietta";
pub const BAD_TIME_URL: &str = "https://pages.test/bad-time";
pub const MISSING_URL: &str = "https://pages.test/gone";
pub const WEEKEND_URL: &str = "https://www.rit.edu/parking/12-weekend-retail-shuttle";

#[derive(Default)]
pub struct FakeSource {
    pub agencies: Vec<Agency>,
    pub routes: Vec<Route>,
    pub stops: Vec<Stop>,
    /// `None` makes the vehicle call fail.
    pub vehicles: Option<VehicleFeed>,
    pub pages: HashMap<String, String>,
    /// Makes the agency, route and stop lists fail.
    pub lists_unavailable: bool,
}

#[async_trait]
impl TransitSource for FakeSource {
    async fn agencies(&self, _agency_id: &str) -> Result<Vec<Agency>> {
        self.list(&self.agencies)
    }

    async fn routes(&self, _agency_id: &str) -> Result<Vec<Route>> {
        self.list(&self.routes)
    }

    async fn stops(&self, _agency_id: &str) -> Result<Vec<Stop>> {
        self.list(&self.stops)
    }

    async fn vehicles(&self, _agency_id: &str) -> Result<VehicleFeed> {
        self.vehicles
            .clone()
            .ok_or_else(|| anyhow!("HTTP 503 Service Unavailable"))
    }

    async fn schedule_page(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("HTTP 404 for {url}"))
    }
}

impl FakeSource {
    fn list<T: Clone>(&self, items: &[T]) -> Result<Vec<T>> {
        if self.lists_unavailable {
            bail!("HTTP 500 Internal Server Error");
        }
        Ok(items.to_vec())
    }
}

fn some(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn route(id: &str, long_name: &str, url: Option<&str>) -> Route {
    Route {
        id: some(id),
        agency_id: some("643"),
        short_name: None,
        long_name: some(long_name),
        kind: some("bus"),
        color: some("F76902"),
        text_color: some("FFFFFF"),
        url: url.map(str::to_string),
    }
}

fn stop(id: &str, name: &str, lat: f64, lon: f64) -> Stop {
    Stop {
        id: some(id),
        name: some(name),
        code: None,
        position: Some([lat, lon]),
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// Campus agency with a spread of routes covering every per-route outcome.
pub fn campus() -> FakeSource {
    let pages = [
        (LOOP_URL, include_str!("../fixtures/route_loop.html")),
        (WEEKEND_URL, include_str!("../fixtures/route_weekend.html")),
        (UNKNOWN_STOP_URL, include_str!("../fixtures/route_unknown_stop.html")),
    ];

    FakeSource {
        agencies: vec![Agency {
            id: some("643"),
            long_name: some("Rochester Institute of Technology"),
            short_name: some("RIT"),
            url: some("https://www.rit.edu"),
            timezone: some("America/New_York"),
        }],
        routes: vec![
            route("4001", "Gleason Loop", Some(LOOP_URL)),
            // no url upstream, found through the override table
            route("4002", "12-Retail Weekend", None),
            route("4003", "Henrietta Express", Some(UNKNOWN_STOP_URL)),
            route("4004", "Special Events", None),
            route("4005", "Park Point", Some(MISSING_URL)),
        ],
        stops: vec![
            stop("10", "Gleason Circle", 43.0845, -77.6742),
            stop("11", "LBJ", 43.0860, -77.6680),
            stop("12", "Perkins Road", 43.0790, -77.6620),
            stop("13", "Market Place Mall", 43.0890, -77.6130),
        ],
        vehicles: Some(VehicleFeed {
            vehicles: vec![
                VehicleReport {
                    id: "77".to_string(),
                    vehicle_id: some("bus-1204"),
                    position: Some([43.0846, -77.6741]),
                    heading: Some(90.0),
                    speed: Some(20.0),
                    last_updated_on: Some(at(1_727_800_000)),
                    route_id: some("4001"),
                    trip_id: None,
                    arrival_estimates: vec![ArrivalEstimate {
                        stop_id: some("11"),
                        arrival_at: Some(at(1_727_800_300)),
                    }],
                },
                VehicleReport {
                    id: "78".to_string(),
                    route_id: some("4002"),
                    ..Default::default()
                },
            ],
            generated_on: Some(at(1_727_800_010)),
        }),
        pages: pages
            .into_iter()
            .map(|(url, html)| (url.to_string(), html.to_string()))
            .collect(),
        lists_unavailable: false,
    }
}

/// A single route whose timetable holds a time that cannot be parsed.
pub fn bad_time() -> FakeSource {
    let mut source = campus();
    source.routes = vec![route("4006", "Night Owl", Some(BAD_TIME_URL))];
    source.pages.insert(
        BAD_TIME_URL.to_string(),
        include_str!("../fixtures/route_bad_time.html").to_string(),
    );
    source
}
