use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::info;

use super::AppState;
use crate::error::FeedError;
use crate::feed::{ToEntity, assemble, encode};
use crate::realtime::{RealtimeFeed, fetch_snapshot};
use crate::upstream::validate_agency_id;

const PROTOBUF: &str = "application/x-protobuf";

fn protobuf<T: ToEntity>(agency_id: &str, kind: &str, feed: &RealtimeFeed<T>) -> Response {
    let bytes = encode(&assemble(feed));
    info!(
        agency_id,
        kind,
        entities = feed.entities.len(),
        bytes = bytes.len(),
        "Encoded realtime feed"
    );
    ([(header::CONTENT_TYPE, PROTOBUF)], bytes).into_response()
}

/// `GET /tripupdates/{agency_id}`
pub async fn trip_updates(
    State(state): State<Arc<AppState>>,
    Path(agency_id): Path<String>,
) -> Result<Response, FeedError> {
    let agency_id = validate_agency_id(&agency_id)?;
    let snapshot = fetch_snapshot(state.source.as_ref(), agency_id).await;
    Ok(protobuf(agency_id, "trip_updates", &snapshot.trip_updates()))
}

/// `GET /vehiclepositions/{agency_id}`
pub async fn vehicle_positions(
    State(state): State<Arc<AppState>>,
    Path(agency_id): Path<String>,
) -> Result<Response, FeedError> {
    let agency_id = validate_agency_id(&agency_id)?;
    let snapshot = fetch_snapshot(state.source.as_ref(), agency_id).await;
    Ok(protobuf(
        agency_id,
        "vehicle_positions",
        &snapshot.vehicle_positions(),
    ))
}
