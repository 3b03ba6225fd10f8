//! Static GTFS tables assembled from upstream JSON and scraped timetables.

pub mod records;
pub mod render;

pub use records::{
    AgencyRecord, CalendarRecord, GtfsRecord, RouteRecord, StopRecord, StopTimeRecord, TripRecord,
};
pub use render::render;

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use futures::future::join_all;
use thiserror::Error;
use tracing::{Instrument, debug, info, instrument, warn};

use crate::config::Lookups;
use crate::error::FeedError;
use crate::schedule::{
    DayType, ScheduleError, Season, SeasonWindows, ServiceId, StopIndex, TimetableExtractor,
    day_type,
};
use crate::upstream::{Route, TransitSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticTable {
    Agency,
    Routes,
    Stops,
    Calendar,
    Trips,
    StopTimes,
}

impl StaticTable {
    pub const ALL: [StaticTable; 6] = [
        StaticTable::Agency,
        StaticTable::Routes,
        StaticTable::Stops,
        StaticTable::Calendar,
        StaticTable::Trips,
        StaticTable::StopTimes,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            StaticTable::Agency => AgencyRecord::FILE,
            StaticTable::Routes => RouteRecord::FILE,
            StaticTable::Stops => StopRecord::FILE,
            StaticTable::Calendar => CalendarRecord::FILE,
            StaticTable::Trips => TripRecord::FILE,
            StaticTable::StopTimes => StopTimeRecord::FILE,
        }
    }
}

impl fmt::Display for StaticTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown schedule table `{0}`")]
pub struct UnknownTable(pub String);

impl FromStr for StaticTable {
    type Err = UnknownTable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StaticTable::ALL
            .into_iter()
            .find(|table| table.file_name() == s)
            .ok_or_else(|| UnknownTable(s.to_string()))
    }
}

/// A route whose schedule page was fetched.
struct SchedulePage {
    route_id: String,
    html: String,
}

/// Builds static tables for one request.
///
/// Every table re-reads upstream; nothing is cached between calls. Routes whose
/// schedule page is missing or unusable are left out of `trips.txt` and
/// `stop_times.txt` without failing the response.
pub struct StaticFeedBuilder<'a> {
    source: &'a dyn TransitSource,
    lookups: &'a Lookups,
    today: NaiveDate,
}

impl<'a> StaticFeedBuilder<'a> {
    pub fn new(source: &'a dyn TransitSource, lookups: &'a Lookups, today: NaiveDate) -> Self {
        Self {
            source,
            lookups,
            today,
        }
    }

    fn windows(&self) -> SeasonWindows {
        SeasonWindows::containing(self.today)
    }

    /// Season shared by trips and stop times within this request.
    pub fn season(&self) -> Season {
        self.windows().select(self.today)
    }

    fn service_id(&self, day_type: DayType) -> ServiceId {
        ServiceId {
            day_type,
            year: self.today.year(),
            season: self.season(),
        }
    }

    #[instrument(skip(self))]
    pub async fn agencies(&self, agency_id: &str) -> Result<Vec<AgencyRecord>, FeedError> {
        let agencies = self.source.agencies(agency_id).await?;
        agencies
            .iter()
            .enumerate()
            .map(|(index, agency)| AgencyRecord::from_upstream(agency, index))
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn routes(&self, agency_id: &str) -> Result<Vec<RouteRecord>, FeedError> {
        let routes = self.source.routes(agency_id).await?;
        routes
            .iter()
            .enumerate()
            .map(|(index, route)| RouteRecord::from_upstream(route, index, self.lookups))
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn stops(&self, agency_id: &str) -> Result<Vec<StopRecord>, FeedError> {
        let stops = self.source.stops(agency_id).await?;
        stops
            .iter()
            .enumerate()
            .map(|(index, stop)| StopRecord::from_upstream(stop, index))
            .collect()
    }

    /// Weekday and weekend service for the fall and spring windows.
    pub fn calendars(&self) -> Vec<CalendarRecord> {
        let windows = self.windows();
        [Season::Fall, Season::Spring]
            .into_iter()
            .flat_map(|season| {
                [DayType::Weekday, DayType::Weekend]
                    .into_iter()
                    .map(move |day_type| {
                        CalendarRecord::new(
                            ServiceId {
                                day_type,
                                year: windows.year,
                                season,
                            },
                            windows.window(season),
                        )
                    })
            })
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn trips(&self, agency_id: &str) -> Result<Vec<TripRecord>, FeedError> {
        let routes = self.source.routes(agency_id).await?;
        let pages = self.schedule_pages(&routes).await;

        let trips: Vec<_> = pages
            .into_iter()
            .flatten()
            .map(|page| {
                let service_id = self.service_id(day_type(&page.html, self.lookups));
                TripRecord::for_route(&page.route_id, service_id)
            })
            .collect();
        info!(routes = routes.len(), trips = trips.len(), "Built trips");
        Ok(trips)
    }

    #[instrument(skip(self))]
    pub async fn stop_times(&self, agency_id: &str) -> Result<Vec<StopTimeRecord>, FeedError> {
        let (routes, stops) = futures::try_join!(
            self.source.routes(agency_id),
            self.source.stops(agency_id)
        )?;
        let index = StopIndex::from_stops(&stops);
        let extractor = TimetableExtractor::new(self.lookups, &index);

        let pages = self.schedule_pages(&routes).await;

        let mut stop_times = Vec::new();
        for page in pages.into_iter().flatten() {
            match extractor.extract(&page.html) {
                Ok(table) => {
                    let records = StopTimeRecord::from_timetable(&page.route_id, &table);
                    debug!(route_id = %page.route_id, stop_times = records.len(), "Extracted timetable");
                    stop_times.extend(records);
                }
                Err(ScheduleError::InvalidTime(source)) => {
                    return Err(FeedError::InvalidTime {
                        route_id: page.route_id,
                        source,
                    });
                }
                Err(e) => {
                    warn!(route_id = %page.route_id, error = %e, "Skipping route timetable");
                }
            }
        }
        info!(
            routes = routes.len(),
            stop_times = stop_times.len(),
            "Built stop times"
        );
        Ok(stop_times)
    }

    /// Renders `table` for `agency_id` as CSV.
    pub async fn render(&self, table: StaticTable, agency_id: &str) -> Result<String, FeedError> {
        match table {
            StaticTable::Agency => render(&self.agencies(agency_id).await?),
            StaticTable::Routes => render(&self.routes(agency_id).await?),
            StaticTable::Stops => render(&self.stops(agency_id).await?),
            StaticTable::Calendar => render(&self.calendars()),
            StaticTable::Trips => render(&self.trips(agency_id).await?),
            StaticTable::StopTimes => render(&self.stop_times(agency_id).await?),
        }
    }

    /// Explicit URL first, then the override table keyed by long name.
    pub fn schedule_url<'r>(&'r self, route: &'r Route) -> Option<&'r str> {
        route
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| {
                route
                    .long_name
                    .as_deref()
                    .and_then(|name| self.lookups.schedule_override(name))
            })
    }

    /// Fetches every route's schedule page concurrently. The result is in route
    /// order; routes without a page, or whose fetch failed, are `None`.
    async fn schedule_pages(&self, routes: &[Route]) -> Vec<Option<SchedulePage>> {
        join_all(routes.iter().map(|route| {
            let span = tracing::info_span!("route", route_id = ?route.id);
            self.schedule_page(route).instrument(span)
        }))
        .await
    }

    async fn schedule_page(&self, route: &Route) -> Option<SchedulePage> {
        let Some(route_id) = route.id.clone() else {
            warn!("Route has no id");
            return None;
        };
        let Some(url) = self.schedule_url(route) else {
            debug!("No schedule page for route");
            return None;
        };

        match self.source.schedule_page(url).await {
            Ok(html) => Some(SchedulePage { route_id, html }),
            Err(e) => {
                warn!(url, error = %e, "Schedule page fetch failed");
                None
            }
        }
    }
}
