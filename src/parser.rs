//! Decoding of GTFS-Realtime feeds, used to inspect what the service emitted.

use anyhow::{Context, Result};
use prost::Message;

use crate::gtfs_rt::FeedMessage;

/// Decodes a protobuf-encoded [`FeedMessage`].
///
/// # Errors
///
/// Returns an error if the bytes are not valid protobuf for a `FeedMessage`.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage> {
    FeedMessage::decode(bytes).context("Not a GTFS-Realtime FeedMessage")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::{FeedEntity, FeedHeader, VehiclePosition};

    #[test]
    fn test_parse_empty_bytes_returns_default_feed() {
        // protobuf has no framing, so nothing decodes to all defaults
        let feed = parse_feed(&[]).unwrap();
        assert_eq!(feed.header.gtfs_realtime_version, "");
        assert!(feed.entity.is_empty());
    }

    #[test]
    fn test_parse_invalid_bytes() {
        assert!(parse_feed(&[0xFF, 0xFE, 0x00, 0x01]).is_err());
    }

    #[test]
    fn test_parse_vehicle_feed() {
        let feed = FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: "2.0".to_string(),
                timestamp: Some(1_725_364_800),
                ..Default::default()
            },
            entity: vec![FeedEntity {
                id: "77".to_string(),
                vehicle: Some(VehiclePosition::default()),
                ..Default::default()
            }],
        };

        let parsed = parse_feed(&feed.encode_to_vec()).unwrap();
        assert_eq!(parsed.header.timestamp, Some(1_725_364_800));
        assert_eq!(parsed.entity[0].id, "77");
        assert!(parsed.entity[0].vehicle.is_some());
    }
}
