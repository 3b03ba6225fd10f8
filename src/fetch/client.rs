use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport seam for everything fetched over HTTP; decorators such as
/// [`ApiKey`](super::auth::ApiKey) wrap another client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
