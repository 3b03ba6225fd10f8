//! Assembly of GTFS-Realtime feed messages.
//!
//! The only place that touches the generated protobuf types; encoding itself is
//! left to `prost`.

use chrono::{DateTime, Utc};
use prost::Message;

use crate::gtfs_rt::{self, feed_header::Incrementality, trip_update};
use crate::realtime::{RealtimeFeed, TripRef, TripUpdate, VehiclePosition};

pub const GTFS_REALTIME_VERSION: &str = "2.0";

/// Converts a realtime payload into the body of a [`gtfs_rt::FeedEntity`].
pub trait ToEntity {
    fn to_entity(&self, id: String) -> gtfs_rt::FeedEntity;
}

fn unix(time: DateTime<Utc>) -> u64 {
    u64::try_from(time.timestamp()).unwrap_or(0)
}

pub fn header(generated_at: DateTime<Utc>) -> gtfs_rt::FeedHeader {
    gtfs_rt::FeedHeader {
        gtfs_realtime_version: GTFS_REALTIME_VERSION.to_string(),
        incrementality: Some(Incrementality::FullDataset as i32),
        timestamp: Some(unix(generated_at)),
        feed_version: None,
    }
}

fn trip_descriptor(trip: &TripRef) -> gtfs_rt::TripDescriptor {
    gtfs_rt::TripDescriptor {
        trip_id: trip.trip_id.clone(),
        route_id: trip.route_id.clone(),
        ..Default::default()
    }
}

fn vehicle_descriptor(id: &str) -> gtfs_rt::VehicleDescriptor {
    gtfs_rt::VehicleDescriptor {
        id: Some(id.to_string()),
        ..Default::default()
    }
}

impl ToEntity for TripUpdate {
    fn to_entity(&self, id: String) -> gtfs_rt::FeedEntity {
        let stop_time_update = self
            .stop_time_updates
            .iter()
            .map(|update| trip_update::StopTimeUpdate {
                stop_id: Some(update.stop_id.clone()),
                arrival: Some(trip_update::StopTimeEvent {
                    time: update.arrival.map(|t| t.timestamp()),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect();

        gtfs_rt::FeedEntity {
            id,
            trip_update: Some(gtfs_rt::TripUpdate {
                trip: trip_descriptor(&self.trip),
                vehicle: Some(vehicle_descriptor(&self.vehicle_id)),
                stop_time_update,
                timestamp: self.timestamp.map(unix),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl ToEntity for VehiclePosition {
    fn to_entity(&self, id: String) -> gtfs_rt::FeedEntity {
        let position = self.position.map(|coords| gtfs_rt::Position {
            latitude: coords.latitude as f32,
            longitude: coords.longitude as f32,
            bearing: self.bearing,
            speed: self.speed,
            odometer: None,
        });

        gtfs_rt::FeedEntity {
            id,
            vehicle: Some(gtfs_rt::VehiclePosition {
                trip: Some(trip_descriptor(&self.trip)),
                vehicle: Some(vehicle_descriptor(&self.vehicle_id)),
                position,
                timestamp: self.timestamp.map(unix),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Wraps a realtime feed in a full-dataset [`gtfs_rt::FeedMessage`].
pub fn assemble<T: ToEntity>(feed: &RealtimeFeed<T>) -> gtfs_rt::FeedMessage {
    gtfs_rt::FeedMessage {
        header: header(feed.generated_at),
        entity: feed
            .entities
            .iter()
            .map(|entity| entity.payload.to_entity(entity.id.clone()))
            .collect(),
    }
}

pub fn encode(message: &gtfs_rt::FeedMessage) -> Vec<u8> {
    message.encode_to_vec()
}
