//! Field coverage of a GTFS-Realtime feed, reported by the `inspect` command.

use serde::Serialize;

use crate::gtfs_rt::FeedMessage;

#[derive(Debug, Default, Serialize)]
pub struct FeedSummary {
    pub gtfs_realtime_version: String,
    pub timestamp: Option<u64>,
    pub total_entities: usize,

    // trip updates
    pub trip_updates: usize,
    pub stop_time_updates: usize,
    pub with_trip_id: usize,
    pub with_route_id: usize,

    // vehicle positions
    pub vehicles: usize,
    pub with_position: usize,
    pub with_bearing: usize,
    pub with_speed: usize,
    pub with_timestamp: usize,
}

impl FeedSummary {
    pub fn from_feed(feed: &FeedMessage) -> Self {
        let mut s = FeedSummary {
            gtfs_realtime_version: feed.header.gtfs_realtime_version.clone(),
            timestamp: feed.header.timestamp,
            total_entities: feed.entity.len(),
            ..Default::default()
        };

        for e in &feed.entity {
            if let Some(update) = &e.trip_update {
                s.trip_updates += 1;
                s.stop_time_updates += update.stop_time_update.len();

                if update.trip.trip_id.is_some() {
                    s.with_trip_id += 1;
                }
                if update.trip.route_id.is_some() {
                    s.with_route_id += 1;
                }
            }

            if let Some(v) = &e.vehicle {
                s.vehicles += 1;

                if let Some(pos) = &v.position {
                    s.with_position += 1;
                    if pos.bearing.is_some() {
                        s.with_bearing += 1;
                    }
                    if pos.speed.is_some() {
                        s.with_speed += 1;
                    }
                }

                if v.timestamp.is_some() {
                    s.with_timestamp += 1;
                }
            }
        }

        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn position_pct(&self) -> f64 {
        Self::pct(self.with_position, self.vehicles)
    }
}
