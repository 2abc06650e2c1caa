use crate::error::{ConfigError, FetchError};
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Thin wrapper over `reqwest::Client` with the user agent and timeout
/// fixed at construction. No retries: callers fall through to their next
/// source instead.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let inner = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            // Accept cookies so consent-gated pages work
            .cookie_store(true)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self { inner })
    }

    /// GET a page as text. Non-success statuses come back as `Ok(None)`.
    pub async fn get_text(&self, url: Url) -> Result<Option<String>, reqwest::Error> {
        debug!("GET {}", url);

        let resp = self
            .inner
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            debug!("GET returned {}", status);
            return Ok(None);
        }

        Ok(Some(resp.text().await?))
    }

    /// POST a JSON body with bearer auth and decode the JSON reply.
    pub async fn post_json<B, T>(&self, url: Url, bearer: &str, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);

        let resp = self
            .inner
            .post(url)
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        Ok(resp.json::<T>().await?)
    }
}
