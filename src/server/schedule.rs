use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Local;
use tracing::warn;

use super::AppState;
use crate::error::FeedError;
use crate::static_feed::{StaticFeedBuilder, StaticTable};
use crate::upstream::validate_agency_id;

/// `GET /schedule/{agency_id}/{file}`
pub async fn static_table(
    State(state): State<Arc<AppState>>,
    Path((agency_id, file)): Path<(String, String)>,
) -> Result<Response, FeedError> {
    let table = match file.parse::<StaticTable>() {
        Ok(table) => table,
        Err(e) => {
            warn!(error = %e, "Unknown static table requested");
            return Ok((StatusCode::NOT_FOUND, e.to_string()).into_response());
        }
    };
    let agency_id = validate_agency_id(&agency_id)?;

    let builder = StaticFeedBuilder::new(
        state.source.as_ref(),
        &state.lookups,
        Local::now().date_naive(),
    );
    let body = builder.render(table, agency_id).await?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}
