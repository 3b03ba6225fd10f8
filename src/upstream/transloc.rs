use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, instrument};

use super::TransitSource;
use super::model::{Agency, AgencyList, Route, RouteList, Stop, StopList, VehicleFeed};
use crate::fetch::{HttpClient, fetch_json, fetch_text};

/// [`TransitSource`] backed by the TransLoc feed API.
///
/// `api` is used for the JSON endpoints and may carry credentials;
/// `pages` fetches third-party schedule pages and never does.
pub struct TranslocClient<A, P> {
    api: A,
    pages: P,
    base_url: String,
    vehicle_url: String,
}

impl<A: HttpClient, P: HttpClient> TranslocClient<A, P> {
    pub fn new(api: A, pages: P, base_url: &str, vehicle_url: &str) -> Self {
        Self {
            api,
            pages,
            base_url: base_url.trim_end_matches('/').to_string(),
            vehicle_url: vehicle_url.to_string(),
        }
    }

    fn endpoint(&self, path: &str, agency_id: &str) -> Result<String> {
        agency_url(&format!("{}{}", self.base_url, path), agency_id)
    }
}

/// Appends the `agencies` filter the API expects on every call.
fn agency_url(url: &str, agency_id: &str) -> Result<String> {
    let mut url = Url::parse(url)?;
    url.query_pairs_mut().append_pair("agencies", agency_id);
    Ok(url.into())
}

#[async_trait]
impl<A: HttpClient, P: HttpClient> TransitSource for TranslocClient<A, P> {
    #[instrument(skip(self))]
    async fn agencies(&self, agency_id: &str) -> Result<Vec<Agency>> {
        let url = self.endpoint("/agencies", agency_id)?;
        let list: AgencyList = fetch_json(&self.api, &url).await?;
        debug!(count = list.agencies.len(), "Fetched agencies");
        Ok(list.agencies)
    }

    #[instrument(skip(self))]
    async fn routes(&self, agency_id: &str) -> Result<Vec<Route>> {
        let url = self.endpoint("/routes", agency_id)?;
        let list: RouteList = fetch_json(&self.api, &url).await?;
        debug!(count = list.routes.len(), "Fetched routes");
        Ok(list.routes)
    }

    #[instrument(skip(self))]
    async fn stops(&self, agency_id: &str) -> Result<Vec<Stop>> {
        let url = self.endpoint("/stops", agency_id)?;
        let list: StopList = fetch_json(&self.api, &url).await?;
        debug!(count = list.stops.len(), "Fetched stops");
        Ok(list.stops)
    }

    #[instrument(skip(self))]
    async fn vehicles(&self, agency_id: &str) -> Result<VehicleFeed> {
        let url = agency_url(&self.vehicle_url, agency_id)?;
        let feed: VehicleFeed = fetch_json(&self.api, &url).await?;
        debug!(count = feed.vehicles.len(), "Fetched vehicles");
        Ok(feed)
    }

    #[instrument(skip(self))]
    async fn schedule_page(&self, url: &str) -> Result<String> {
        let page = fetch_text(&self.pages, url).await?;
        debug!(bytes = page.len(), "Fetched schedule page");
        Ok(page)
    }
}
