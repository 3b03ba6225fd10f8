//! Errors that abort a whole feed response.
//!
//! Failures confined to a single route (no schedule page, fetch failure, a
//! timetable that does not line up with the stop list) never surface here; the
//! static feed builder logs them and drops the route instead.

use thiserror::Error;

use crate::schedule::time::TimeParseError;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Agency ID must be defined")]
    MissingAgencyId,
    #[error("Invalid agency ID: {0}")]
    InvalidAgencyId(String),
    #[error("Upstream request failed: {0:#}")]
    Upstream(#[from] anyhow::Error),
    #[error("{table}: record {index} is missing required field `{field}`")]
    MissingField {
        table: &'static str,
        field: &'static str,
        index: usize,
    },
    #[error("Route {route_id}: {source}")]
    InvalidTime {
        route_id: String,
        #[source]
        source: TimeParseError,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl FeedError {
    pub fn missing(table: &'static str, field: &'static str, index: usize) -> Self {
        FeedError::MissingField {
            table,
            field,
            index,
        }
    }
}
