// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// A body delivered as a sequence of byte chunks of arbitrary size.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

/// Anything that can open a streaming GET for a URL.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Start a request and return the body as a chunk stream.
    ///
    /// Errors before the first chunk (connection, non-2xx status) are returned
    /// here; errors while reading surface as stream items.
    async fn fetch(&self, url: &str) -> Result<ByteStream>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page and parse it as HTML.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<Html> {
    let text = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(Html::parse_document(&text))
}

/// `Fetch` implementation backed by reqwest.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(create_client(config)?))
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<ByteStream> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP status {status}")));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(AppError::from));
        Ok(stream.boxed())
    }
}
