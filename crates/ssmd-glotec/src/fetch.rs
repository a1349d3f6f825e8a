//! HTTP retrieval of the listing and snapshot files

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use crate::error::{GlotecError, Result};

/// Fetches the full body of a URL
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// reqwest based fetcher with a fixed timeout and User-Agent
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        debug!(url = %url, "GET request");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(GlotecError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!(url = %url, bytes = body.len(), "GET complete");
        Ok(body)
    }
}
