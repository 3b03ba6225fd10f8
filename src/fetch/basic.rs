use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use super::client::HttpClient;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Unauthenticated client with this service's user agent.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// A client without a request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self(builder.build()?))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
