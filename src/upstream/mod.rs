//! Upstream data sources: agency metadata, live vehicles and schedule pages.

mod model;
mod serde_helpers;
mod transloc;

pub use model::{Agency, ArrivalEstimate, Route, Stop, VehicleFeed, VehicleReport};
pub use transloc::TranslocClient;

use anyhow::Result;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::FeedError;
use crate::fetch::BasicClient;
use crate::fetch::auth::ApiKey;

/// Abstraction over everything the feed builders read from the outside world.
#[async_trait::async_trait]
pub trait TransitSource: Send + Sync {
    async fn agencies(&self, agency_id: &str) -> Result<Vec<Agency>>;

    async fn routes(&self, agency_id: &str) -> Result<Vec<Route>>;

    async fn stops(&self, agency_id: &str) -> Result<Vec<Stop>>;

    /// Current vehicle snapshot for the agency.
    async fn vehicles(&self, agency_id: &str) -> Result<VehicleFeed>;

    /// Raw HTML of a route's schedule page.
    async fn schedule_page(&self, url: &str) -> Result<String>;
}

/// Builds the TransLoc-backed source described by `settings`.
///
/// The API key, when configured, is only attached to calls against the TransLoc API.
pub fn from_settings(settings: &Settings) -> Result<Arc<dyn TransitSource>> {
    let timeout = settings.request_timeout;
    let pages = BasicClient::with_timeout(timeout)?;
    let source: Arc<dyn TransitSource> = match &settings.api_key {
        Some(key) => {
            let api = ApiKey::new(BasicClient::with_timeout(timeout)?, &settings.api_key_header, key)?;
            Arc::new(TranslocClient::new(
                api,
                pages,
                &settings.base_url,
                &settings.vehicle_url,
            ))
        }
        None => Arc::new(TranslocClient::new(
            BasicClient::with_timeout(timeout)?,
            pages,
            &settings.base_url,
            &settings.vehicle_url,
        )),
    };
    Ok(source)
}

/// Agency ids are decimal digits; anything else is rejected before going upstream.
pub fn validate_agency_id(agency_id: &str) -> Result<&str, FeedError> {
    let agency_id = agency_id.trim();
    if agency_id.is_empty() {
        return Err(FeedError::MissingAgencyId);
    }
    if !agency_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FeedError::InvalidAgencyId(agency_id.to_string()));
    }
    Ok(agency_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_agency_id() {
        assert_eq!(validate_agency_id("643").unwrap(), "643");
        assert_eq!(validate_agency_id(" 643 ").unwrap(), "643");
        assert!(matches!(
            validate_agency_id(""),
            Err(FeedError::MissingAgencyId)
        ));
        assert!(matches!(
            validate_agency_id("64a"),
            Err(FeedError::InvalidAgencyId(id)) if id == "64a"
        ));
        assert!(matches!(
            validate_agency_id("1&agencies=2"),
            Err(FeedError::InvalidAgencyId(_))
        ));
    }

    #[test]
    fn test_from_settings_rejects_bad_header() {
        let settings = Settings::from_lookup(|key| match key {
            "TRANSLOC_API_KEY" => Some("secret".to_string()),
            "TRANSLOC_API_KEY_HEADER" => Some("bad header".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(from_settings(&settings).is_err());
        assert!(from_settings(&Settings::from_lookup(|_| None).unwrap()).is_ok());
    }
}
