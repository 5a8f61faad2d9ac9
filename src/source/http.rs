//! HTTP transport built on [`reqwest::blocking`].

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::Fetcher;
use crate::error::FetchError;

const USER_AGENT: &str = concat!("f1viewer/", env!("CARGO_PKG_VERSION"));

/// Fetches endpoint bodies over HTTP with a per-request timeout.
///
/// The underlying [`Client`] keeps a connection pool, so one instance should
/// be shared by every fetch (it is cheap to clone).
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    fn map_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            FetchError::Network(format!("connection failed: {e}"))
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().map_err(|e| self.map_error(e))?;
        debug!(bytes = body.len(), url, "fetched");
        Ok(body.to_vec())
    }
}
