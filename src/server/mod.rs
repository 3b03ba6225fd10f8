//! HTTP surface: static GTFS tables and GTFS-Realtime feeds per agency.

mod error;
mod realtime;
mod schedule;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Lookups;
use crate::upstream::TransitSource;

pub struct AppState {
    pub source: Arc<dyn TransitSource>,
    pub lookups: Lookups,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schedule/{agency_id}/{file}", get(schedule::static_table))
        .route("/tripupdates/{agency_id}", get(realtime::trip_updates))
        .route("/vehiclepositions/{agency_id}", get(realtime::vehicle_positions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(bind_addr: &str, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;

    info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, router(state))
        .await
        .context("Server terminated")
}

async fn health() -> &'static str {
    "OK"
}
