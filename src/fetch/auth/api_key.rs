use crate::fetch::client::HttpClient;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// The header is attached to every request, including schedule page fetches,
/// so only wrap the client used for the vehicle-tracking API.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    key: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Fails if `header_name` or `key` cannot be used in an HTTP header.
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())?;
        let mut key = HeaderValue::from_str(key)?;
        key.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            key,
        })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.key.clone());
        self.inner.execute(req).await
    }
}
