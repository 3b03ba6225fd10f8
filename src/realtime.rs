//! Live vehicle data mapped onto trip updates and vehicle positions.
//!
//! Everything here is plain data; [`crate::feed`] turns it into protobuf
//! messages.

use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

use crate::upstream::{TransitSource, VehicleFeed, VehicleReport};

pub const METERS_PER_SECOND_PER_MPH: f32 = 0.44704;

pub fn mph_to_meters_per_second(mph: f32) -> f32 {
    mph * METERS_PER_SECOND_PER_MPH
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRef {
    pub route_id: Option<String>,
    pub trip_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTimeUpdate {
    pub stop_id: String,
    pub arrival: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripUpdate {
    pub vehicle_id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub stop_time_updates: Vec<StopTimeUpdate>,
    pub trip: TripRef,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehiclePosition {
    pub vehicle_id: String,
    pub position: Option<Coordinates>,
    pub bearing: Option<f32>,
    /// Meters per second.
    pub speed: Option<f32>,
    pub timestamp: Option<DateTime<Utc>>,
    pub trip: TripRef,
}

/// One feed entity; `id` is the reporting vehicle's id.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity<T> {
    pub id: String,
    pub payload: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeFeed<T> {
    pub generated_at: DateTime<Utc>,
    pub entities: Vec<Entity<T>>,
}

fn trip_ref(report: &VehicleReport) -> TripRef {
    TripRef {
        route_id: report.route_id.clone(),
        trip_id: report.trip_id.clone(),
    }
}

pub fn trip_update(report: &VehicleReport) -> TripUpdate {
    TripUpdate {
        vehicle_id: report.vehicle_id.clone().unwrap_or_else(|| report.id.clone()),
        timestamp: report.last_updated_on,
        stop_time_updates: report
            .arrival_estimates
            .iter()
            .filter_map(|estimate| {
                Some(StopTimeUpdate {
                    stop_id: estimate.stop_id.clone()?,
                    arrival: estimate.arrival_at,
                })
            })
            .collect(),
        trip: trip_ref(report),
    }
}

pub fn vehicle_position(report: &VehicleReport) -> VehiclePosition {
    VehiclePosition {
        vehicle_id: report.id.clone(),
        position: report.position.map(|[latitude, longitude]| Coordinates {
            latitude,
            longitude,
        }),
        bearing: report.heading,
        speed: report.speed.map(mph_to_meters_per_second),
        timestamp: report.last_updated_on,
        trip: trip_ref(report),
    }
}

/// The vehicles for one request together with the feed generation time.
#[derive(Debug, Clone, Default)]
pub struct VehicleSnapshot {
    pub generated_at: DateTime<Utc>,
    pub vehicles: Vec<VehicleReport>,
}

impl VehicleSnapshot {
    /// An upstream failure becomes an empty snapshot, and a missing generation
    /// time falls back to `now`.
    pub fn from_upstream(result: anyhow::Result<VehicleFeed>, now: DateTime<Utc>) -> Self {
        let feed = result.unwrap_or_else(|e| {
            warn!(error = %e, "Error retrieving vehicles, emitting an empty feed");
            VehicleFeed::default()
        });
        let generated_at = feed.generated_on.unwrap_or_else(|| {
            warn!("No feed timestamp provided, using the current time instead");
            now
        });
        Self {
            generated_at,
            vehicles: feed.vehicles,
        }
    }

    fn feed<T>(&self, build: impl Fn(&VehicleReport) -> T) -> RealtimeFeed<T> {
        RealtimeFeed {
            generated_at: self.generated_at,
            entities: self
                .vehicles
                .iter()
                .map(|report| Entity {
                    id: report.id.clone(),
                    payload: build(report),
                })
                .collect(),
        }
    }

    pub fn trip_updates(&self) -> RealtimeFeed<TripUpdate> {
        self.feed(trip_update)
    }

    pub fn vehicle_positions(&self) -> RealtimeFeed<VehiclePosition> {
        self.feed(vehicle_position)
    }
}

#[instrument(skip(source))]
pub async fn fetch_snapshot(source: &dyn TransitSource, agency_id: &str) -> VehicleSnapshot {
    VehicleSnapshot::from_upstream(source.vehicles(agency_id).await, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::ArrivalEstimate;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn report() -> VehicleReport {
        VehicleReport {
            id: "77".to_string(),
            vehicle_id: Some("bus-1204".to_string()),
            position: Some([43.084, -77.674]),
            heading: Some(270.0),
            speed: Some(10.0),
            last_updated_on: Some(at(1_725_364_800)),
            route_id: Some("4001".to_string()),
            trip_id: None,
            arrival_estimates: vec![
                ArrivalEstimate {
                    stop_id: Some("12".to_string()),
                    arrival_at: Some(at(1_725_365_100)),
                },
                ArrivalEstimate {
                    stop_id: None,
                    arrival_at: Some(at(1_725_365_400)),
                },
                ArrivalEstimate {
                    stop_id: Some("14".to_string()),
                    arrival_at: Some(at(1_725_365_700)),
                },
            ],
        }
    }

    #[test]
    fn test_speed_conversion() {
        assert!((mph_to_meters_per_second(10.0) - 4.4704).abs() < 1e-5);
        assert_eq!(mph_to_meters_per_second(0.0), 0.0);
    }

    #[test]
    fn test_trip_update() {
        let update = trip_update(&report());
        assert_eq!(update.vehicle_id, "bus-1204");
        assert_eq!(update.timestamp, Some(at(1_725_364_800)));
        let stops: Vec<_> = update.stop_time_updates.iter().map(|u| u.stop_id.as_str()).collect();
        assert_eq!(stops, ["12", "14"]);
        assert_eq!(update.trip.route_id.as_deref(), Some("4001"));
        assert!(update.trip.trip_id.is_none());
    }

    #[test]
    fn test_trip_update_falls_back_to_id() {
        let mut report = report();
        report.vehicle_id = None;
        assert_eq!(trip_update(&report).vehicle_id, "77");
    }

    #[test]
    fn test_vehicle_position() {
        let position = vehicle_position(&report());
        assert_eq!(position.vehicle_id, "77");
        assert_eq!(
            position.position,
            Some(Coordinates {
                latitude: 43.084,
                longitude: -77.674
            })
        );
        assert_eq!(position.bearing, Some(270.0));
        assert!((position.speed.unwrap() - 4.4704).abs() < 1e-5);
    }

    #[test]
    fn test_upstream_error_gives_empty_snapshot() {
        let now = at(1_725_000_000);
        let snapshot = VehicleSnapshot::from_upstream(Err(anyhow::anyhow!("503")), now);
        assert!(snapshot.vehicles.is_empty());
        assert_eq!(snapshot.generated_at, now);
        assert!(snapshot.trip_updates().entities.is_empty());
        assert!(snapshot.vehicle_positions().entities.is_empty());
    }

    #[test]
    fn test_generation_time_prefers_upstream() {
        let feed = VehicleFeed {
            vehicles: vec![report()],
            generated_on: Some(at(1_725_364_810)),
        };
        let snapshot = VehicleSnapshot::from_upstream(Ok(feed), at(0));
        assert_eq!(snapshot.generated_at, at(1_725_364_810));

        let updates = snapshot.trip_updates();
        assert_eq!(updates.entities.len(), 1);
        assert_eq!(updates.entities[0].id, "77");
    }
}
