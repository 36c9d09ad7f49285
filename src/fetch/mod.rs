// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::{path::PathBuf, time::Duration};
use tracing::debug;
use url::Url;

/// Fetches the modem status page over HTTP with one reused client.
#[derive(Debug, Clone)]
pub struct StatusFetcher {
    client: Client,
    url: Url,
}

impl StatusFetcher {
    /// The whole request, connect through body read, is bounded by `timeout`.
    /// The modem sits on the local segment, so system proxies are bypassed.
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn fetch_status(&self) -> Result<String> {
        debug!(url = %self.url, "fetching status page");
        self.client
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", self.url))?
            .text()
            .await
            .with_context(|| format!("Reading text from {}", self.url))
    }
}

/// Where a collection pass reads the status page from.
#[derive(Debug, Clone)]
pub enum PageSource {
    Http(StatusFetcher),
    /// A saved copy of the page, for offline runs.
    File(PathBuf),
}

impl PageSource {
    pub async fn load(&self) -> Result<String> {
        match self {
            PageSource::Http(fetcher) => fetcher.fetch_status().await,
            PageSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading status page from {}", path.display())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            PageSource::Http(fetcher) => fetcher.url().to_string(),
            PageSource::File(path) => path.display().to_string(),
        }
    }
}
