//! Rows of the static GTFS tables and their projection from upstream records.

use serde::Serialize;
use tracing::warn;

use crate::config::Lookups;
use crate::error::FeedError;
use crate::schedule::{ServiceId, ServiceWindow, Timetable};
use crate::upstream::{Agency, Route, Stop};

/// A row type with a fixed column layout. Field order must match `COLUMNS`.
pub trait GtfsRecord: Serialize {
    const FILE: &'static str;
    const COLUMNS: &'static [&'static str];
}

fn required<T: Clone>(
    value: &Option<T>,
    table: &'static str,
    field: &'static str,
    index: usize,
) -> Result<T, FeedError> {
    value
        .clone()
        .ok_or_else(|| FeedError::missing(table, field, index))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgencyRecord {
    pub agency_id: String,
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
}

impl GtfsRecord for AgencyRecord {
    const FILE: &'static str = "agency.txt";
    const COLUMNS: &'static [&'static str] =
        &["agency_id", "agency_name", "agency_url", "agency_timezone"];
}

impl AgencyRecord {
    pub fn from_upstream(agency: &Agency, index: usize) -> Result<Self, FeedError> {
        Ok(Self {
            agency_id: required(&agency.id, Self::FILE, "agency_id", index)?,
            agency_name: required(&agency.long_name, Self::FILE, "agency_name", index)?,
            agency_url: required(&agency.url, Self::FILE, "agency_url", index)?,
            agency_timezone: required(&agency.timezone, Self::FILE, "agency_timezone", index)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRecord {
    pub route_id: String,
    pub agency_id: String,
    pub route_short_name: Option<String>,
    pub route_long_name: String,
    pub route_type: Option<u16>,
    pub route_color: Option<String>,
    pub route_text_color: Option<String>,
}

impl GtfsRecord for RouteRecord {
    const FILE: &'static str = "routes.txt";
    const COLUMNS: &'static [&'static str] = &[
        "route_id",
        "agency_id",
        "route_short_name",
        "route_long_name",
        "route_type",
        "route_color",
        "route_text_color",
    ];
}

impl RouteRecord {
    /// An upstream type with no code in `lookups` renders as an empty `route_type`.
    pub fn from_upstream(route: &Route, index: usize, lookups: &Lookups) -> Result<Self, FeedError> {
        let route_id = required(&route.id, Self::FILE, "route_id", index)?;
        let route_type = route
            .kind
            .as_deref()
            .and_then(|kind| lookups.route_type_code(kind));
        if route_type.is_none() {
            warn!(route_id = %route_id, kind = ?route.kind, "Unmapped route type");
        }

        Ok(Self {
            agency_id: required(&route.agency_id, Self::FILE, "agency_id", index)?,
            route_short_name: route.short_name.clone(),
            route_long_name: required(&route.long_name, Self::FILE, "route_long_name", index)?,
            route_type,
            route_color: route.color.clone(),
            route_text_color: route.text_color.clone(),
            route_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopRecord {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_code: Option<String>,
    pub stop_lat: f64,
    pub stop_lon: f64,
}

impl GtfsRecord for StopRecord {
    const FILE: &'static str = "stops.txt";
    const COLUMNS: &'static [&'static str] =
        &["stop_id", "stop_name", "stop_code", "stop_lat", "stop_lon"];
}

impl StopRecord {
    pub fn from_upstream(stop: &Stop, index: usize) -> Result<Self, FeedError> {
        let [stop_lat, stop_lon] = required(&stop.position, Self::FILE, "stop_lat", index)?;
        Ok(Self {
            stop_id: required(&stop.id, Self::FILE, "stop_id", index)?,
            stop_name: required(&stop.name, Self::FILE, "stop_name", index)?,
            stop_code: stop.code.clone(),
            stop_lat,
            stop_lon,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarRecord {
    pub service_id: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    pub start_date: String,
    pub end_date: String,
}

impl GtfsRecord for CalendarRecord {
    const FILE: &'static str = "calendar.txt";
    const COLUMNS: &'static [&'static str] = &[
        "service_id",
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
        "start_date",
        "end_date",
    ];
}

impl CalendarRecord {
    pub fn new(service_id: ServiceId, window: ServiceWindow) -> Self {
        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] =
            service_id.day_type.weekdays().map(u8::from);
        Self {
            service_id: service_id.to_string(),
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
            start_date: window.start.format("%Y%m%d").to_string(),
            end_date: window.end.format("%Y%m%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
}

impl GtfsRecord for TripRecord {
    const FILE: &'static str = "trips.txt";
    const COLUMNS: &'static [&'static str] = &["route_id", "service_id", "trip_id"];
}

impl TripRecord {
    /// Each route runs as a single trip that shares the route's id.
    pub fn for_route(route_id: &str, service_id: ServiceId) -> Self {
        Self {
            route_id: route_id.to_string(),
            service_id: service_id.to_string(),
            trip_id: route_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopTimeRecord {
    pub trip_id: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    pub timepoint: u8,
}

impl GtfsRecord for StopTimeRecord {
    const FILE: &'static str = "stop_times.txt";
    const COLUMNS: &'static [&'static str] = &[
        "trip_id",
        "arrival_time",
        "departure_time",
        "stop_id",
        "stop_sequence",
        "timepoint",
    ];
}

impl StopTimeRecord {
    /// Flattens a timetable row by row, then column by column. The sequence
    /// counts every emitted time across the whole table, starting at 0.
    pub fn from_timetable(trip_id: &str, table: &Timetable) -> Vec<Self> {
        let mut records = Vec::new();
        let mut sequence = 0u32;
        for row in &table.rows {
            for (column, times) in row.iter().enumerate() {
                let Some(stop) = table.stops.get(column) else {
                    continue;
                };
                for time in times {
                    records.push(Self {
                        trip_id: trip_id.to_string(),
                        arrival_time: time.clone(),
                        departure_time: time.clone(),
                        stop_id: stop.id.clone(),
                        stop_sequence: sequence,
                        timepoint: 1,
                    });
                    sequence += 1;
                }
            }
        }
        records
    }
}
