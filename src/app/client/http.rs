//! Core HTTP operations
//!
//! Thin wrappers over the shared `reqwest` client that translate transport
//! failures and non-success statuses into the error type of the calling stage.
//! Requests are issued one at a time and never retried.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Response};
use url::Url;

use crate::errors::{
    DownloadError, DownloadResult, MetadataError, MetadataResult, ScrapeResult, SearchError,
};

/// HTTP operations handler
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
    request_timeout: Duration,
}

impl HttpHandler {
    /// Creates a new HttpHandler around a configured client
    pub fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    /// Fetches the text of a web page
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on transport failure or a non-success status
    pub async fn get_page(&self, url: &Url) -> ScrapeResult<String> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::ServerError {
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await?;
        tracing::debug!("Fetched page {} ({} bytes)", url, text.len());
        Ok(text)
    }

    /// Issues a HEAD request and returns the response headers
    ///
    /// # Errors
    ///
    /// Returns `MetadataError` on invalid URL, transport failure or a
    /// non-success status
    pub async fn head(&self, url: &str) -> MetadataResult<HeaderMap> {
        let parsed = Url::parse(url).map_err(|e| MetadataError::InvalidUrl {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        let response = self
            .client
            .head(parsed)
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MetadataError::ServerError {
                status: response.status().as_u16(),
            });
        }

        tracing::debug!("HEAD {} -> {}", url, response.status());
        Ok(response.headers().clone())
    }

    /// Starts a GET request whose body the caller streams
    ///
    /// No total timeout applies, so large files are not cut off.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` on invalid URL, transport failure or a
    /// non-success status
    pub async fn get_stream(&self, url: &str) -> DownloadResult<Response> {
        let parsed = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        let response = self.client.get(parsed).send().await?;

        if !response.status().is_success() {
            return Err(DownloadError::ServerError {
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}
