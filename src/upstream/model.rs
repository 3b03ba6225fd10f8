//! Records returned by the vehicle-tracking API.
//!
//! Fields are optional wherever upstream has been seen to omit them; the feed
//! builders decide which ones are required.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::serde_helpers::{id, lenient_vec, option_id, option_timestamp};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Agency {
    #[serde(default, deserialize_with = "option_id")]
    pub id: Option<String>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub url: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Route {
    #[serde(default, deserialize_with = "option_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "option_id")]
    pub agency_id: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    /// Vehicle type, e.g. `"bus"`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
    /// Schedule page for the route, when upstream knows one.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Stop {
    #[serde(default, deserialize_with = "option_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "option_id")]
    pub code: Option<String>,
    /// `[latitude, longitude]`
    pub position: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArrivalEstimate {
    #[serde(default, deserialize_with = "option_id")]
    pub stop_id: Option<String>,
    #[serde(default, deserialize_with = "option_timestamp")]
    pub arrival_at: Option<DateTime<Utc>>,
}

/// One live vehicle as reported by the tracking API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleReport {
    #[serde(deserialize_with = "id")]
    pub id: String,
    /// Hardware identifier; some agencies report it separately from `id`.
    #[serde(default, deserialize_with = "option_id")]
    pub vehicle_id: Option<String>,
    /// `[latitude, longitude]`
    pub position: Option<[f64; 2]>,
    pub heading: Option<f32>,
    /// Miles per hour.
    pub speed: Option<f32>,
    #[serde(default, deserialize_with = "option_timestamp")]
    pub last_updated_on: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "option_id")]
    pub route_id: Option<String>,
    #[serde(default, deserialize_with = "option_id")]
    pub trip_id: Option<String>,
    #[serde(default)]
    pub arrival_estimates: Vec<ArrivalEstimate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleFeed {
    /// Vehicles that fail to decode are dropped rather than failing the feed.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub vehicles: Vec<VehicleReport>,
    #[serde(default, deserialize_with = "option_timestamp")]
    pub generated_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AgencyList {
    #[serde(default)]
    pub agencies: Vec<Agency>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RouteList {
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StopList {
    #[serde(default)]
    pub stops: Vec<Stop>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_route() {
        let route: Route = serde_json::from_str(
            r#"{
                "id": 4001, "agency_id": 643, "short_name": "1",
                "long_name": "1-Park Point", "type": "bus",
                "color": "f36e21", "text_color": "ffffff", "url": null
            }"#,
        )
        .unwrap();
        assert_eq!(route.id.as_deref(), Some("4001"));
        assert_eq!(route.agency_id.as_deref(), Some("643"));
        assert_eq!(route.kind.as_deref(), Some("bus"));
        assert!(route.url.is_none());
    }

    #[test]
    fn test_deserialize_vehicle_feed() {
        let feed: VehicleFeed = serde_json::from_str(
            r#"{
                "generated_on": "2024-09-03T12:00:00+00:00",
                "vehicles": [{
                    "id": 77, "position": [43.08, -77.67], "heading": 90,
                    "speed": 20.0, "last_updated_on": "2024-09-03T11:59:50+00:00",
                    "route_id": 4001,
                    "arrival_estimates": [{"stop_id": 12, "arrival_at": "2024-09-03T12:05:00+00:00"}]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(feed.vehicles.len(), 1);
        let vehicle = &feed.vehicles[0];
        assert_eq!(vehicle.id, "77");
        assert_eq!(vehicle.heading, Some(90.0));
        assert_eq!(vehicle.arrival_estimates[0].stop_id.as_deref(), Some("12"));
        assert!(feed.generated_on.is_some());
    }

    #[test]
    fn test_missing_vehicles_is_empty() {
        let feed: VehicleFeed = serde_json::from_str("{}").unwrap();
        assert!(feed.vehicles.is_empty());
        assert!(feed.generated_on.is_none());
    }

    #[test]
    fn test_malformed_vehicle_does_not_drop_the_rest() {
        let feed: VehicleFeed = serde_json::from_str(
            r#"{
                "generated_on": 1725364800,
                "vehicles": [
                    {"id": 77, "route_id": 4001, "last_updated_on": 1725364790},
                    {"id": 78, "last_updated_on": "not a time"},
                    {"route_id": 4001}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(feed.vehicles.len(), 1);
        assert_eq!(feed.vehicles[0].id, "77");
        assert_eq!(feed.generated_on.unwrap().timestamp(), 1725364800);
    }
}
