//! HTTP fetching behind the [`HttpClient`] seam.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Result, bail};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Issues a GET for `url` and returns the response, failing on non-success status.
pub async fn fetch_response<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<reqwest::Response> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    debug!(url, status = status.as_u16(), "Upstream response");
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("GET {url} returned status {status}: {body}");
    }
    Ok(resp)
}

pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Bytes> {
    let resp = fetch_response(client, url).await?;
    Ok(resp.bytes().await?)
}

pub async fn fetch_text<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<String> {
    let resp = fetch_response(client, url).await?;
    Ok(resp.text().await?)
}

pub async fn fetch_json<T, C>(client: &C, url: &str) -> Result<T>
where
    T: DeserializeOwned,
    C: HttpClient + ?Sized,
{
    let bytes = fetch_bytes(client, url).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
