use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::error::FeedError;

impl FeedError {
    pub fn status(&self) -> StatusCode {
        match self {
            FeedError::MissingAgencyId | FeedError::InvalidAgencyId(_) => StatusCode::BAD_REQUEST,
            FeedError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Feed request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "Feed request rejected");
        }
        (status, self.to_string()).into_response()
    }
}
