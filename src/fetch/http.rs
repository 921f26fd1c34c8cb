//! reqwest-backed content source

use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::Duration;

use super::errors::FetchError;
use super::source::ContentSource;
use crate::utils::USER_AGENT;

/// Plain HTTP GET content source
#[derive(Clone)]
pub struct HttpContentSource {
    client: reqwest::Client,
}

impl HttpContentSource {
    /// Build a source with its own connection pool
    ///
    /// # Errors
    /// Fails if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, timeout, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::request(
                url,
                format!("Request failed with status code {}", status.as_u16()),
            ));
        }

        response.text().await.map_err(|e| classify(url, timeout, &e))
    }
}

fn classify(url: &str, timeout: Duration, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else {
        FetchError::request(url, error.to_string())
    }
}

impl ContentSource for HttpContentSource {
    fn fetch<'a>(&'a self, url: &'a str, timeout: Duration) -> BoxFuture<'a, Result<String, FetchError>> {
        self.get(url, timeout).boxed()
    }
}
