//! HTTP client for the catalog site
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `cookies`: Netscape `cookies.txt` import for the operator's session
//! - `http`: page, HEAD and streaming GET requests
//! - `download`: streamed file downloads with atomic renames

use std::path::Path;

use async_trait::async_trait;
use indicatif::ProgressBar;
use reqwest::header::HeaderMap;
use url::Url;

use crate::constants::catalog;
use crate::errors::{CookieError, DownloadResult, MetadataResult, ScrapeResult, SearchError};

pub mod config;
pub mod cookies;
pub mod download;
pub mod http;

pub use config::ClientConfig;
pub use cookies::{load_cookie_jar, NetscapeCookie};

use download::DownloadHandler;
use http::HttpHandler;

/// Per-file network operations used after the search stage
///
/// The metadata fetcher and the downloader only talk to the network through
/// this trait, so tests can substitute a double that never opens a socket.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    /// Fetch the response headers for a download link
    async fn fetch_headers(&self, url: &str) -> MetadataResult<HeaderMap>;

    /// Stream a download link to `destination`, returning bytes written
    async fn download_file(
        &self,
        url: &str,
        destination: &Path,
        progress: &ProgressBar,
    ) -> DownloadResult<u64>;
}

/// HTTP client for the catalog
///
/// Carries the operator's session cookies on every request.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http_handler: HttpHandler,
    search_url: Url,
}

impl CatalogClient {
    /// Creates a client for the default catalog endpoint
    ///
    /// # Errors
    ///
    /// Returns `CookieError` if the cookie file cannot be read or the HTTP
    /// client cannot be built
    pub fn new(config: &ClientConfig, cookie_file: &Path) -> Result<Self, CookieError> {
        let search_url =
            Url::parse(catalog::SEARCH_URL).expect("Default search URL should be valid");
        Self::with_search_url(config, cookie_file, search_url)
    }

    /// Creates a client for a specific search endpoint
    ///
    /// # Errors
    ///
    /// Returns `CookieError` if the cookie file cannot be read or the HTTP
    /// client cannot be built
    pub fn with_search_url(
        config: &ClientConfig,
        cookie_file: &Path,
        search_url: Url,
    ) -> Result<Self, CookieError> {
        let jar = load_cookie_jar(cookie_file)?;
        let client = config.build_http_client(jar)?;
        let http_handler = HttpHandler::new(client, config.request_timeout);

        tracing::info!("Created catalog client for {}", search_url);

        Ok(Self {
            http_handler,
            search_url,
        })
    }

    /// URL of the listing page for a search term
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidUrl` if the endpoint cannot carry a query
    pub fn search_page_url(&self, term: &str) -> ScrapeResult<Url> {
        let mut url = self.search_url.clone();
        if url.cannot_be_a_base() {
            return Err(SearchError::InvalidUrl {
                url: url.to_string(),
                error: "URL cannot carry query parameters".to_string(),
            });
        }
        url.query_pairs_mut().append_pair(catalog::SEARCH_PARAM, term);
        Ok(url)
    }

    /// Fetches the listing page HTML for a search term
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on transport failure or a non-success status
    pub async fn search_page(&self, term: &str) -> ScrapeResult<String> {
        let url = self.search_page_url(term)?;
        self.http_handler.get_page(&url).await
    }

    /// Get the search endpoint
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Absolute URL for a download link as scraped
    ///
    /// Links that are already absolute are returned unchanged; relative ones
    /// are resolved against the search endpoint.
    pub fn resolve_link(&self, link: &str) -> String {
        match Url::parse(link) {
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .search_url
                .join(link)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| link.to_string()),
            _ => link.to_string(),
        }
    }
}

#[async_trait]
impl CatalogTransport for CatalogClient {
    async fn fetch_headers(&self, url: &str) -> MetadataResult<HeaderMap> {
        self.http_handler.head(&self.resolve_link(url)).await
    }

    async fn download_file(
        &self,
        url: &str,
        destination: &Path,
        progress: &ProgressBar,
    ) -> DownloadResult<u64> {
        let download_handler = DownloadHandler::new(&self.http_handler);
        download_handler
            .download_file(&self.resolve_link(url), destination, progress)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn client() -> CatalogClient {
        let temp_dir = TempDir::new().unwrap();
        CatalogClient::new(&ClientConfig::default(), &temp_dir.path().join("cookies.txt"))
            .unwrap()
    }

    #[test]
    fn test_search_page_url_encodes_term() {
        let url = client().search_page_url("doctor who & co").unwrap();
        assert_eq!(url.host_str(), Some("audiovault.net"));
        assert_eq!(url.path(), "/shows");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("search".to_string(), "doctor who & co".to_string())]
        );
    }

    #[test]
    fn test_search_url_keeps_existing_query() {
        let temp_dir = TempDir::new().unwrap();
        let base = Url::parse("http://127.0.0.1:9/shows?sort=new").unwrap();
        let client = CatalogClient::with_search_url(
            &ClientConfig::default(),
            &temp_dir.path().join("cookies.txt"),
            base,
        )
        .unwrap();

        let url = client.search_page_url("demo").unwrap();
        assert_eq!(url.query(), Some("sort=new&search=demo"));
    }

    #[test]
    fn test_resolve_link() {
        let client = client();
        assert_eq!(
            client.resolve_link("/download/2"),
            "https://audiovault.net/download/2"
        );
        assert_eq!(
            client.resolve_link("files/ep 1.mp3"),
            "https://audiovault.net/files/ep%201.mp3"
        );
        assert_eq!(client.resolve_link("http://X.example"), "http://X.example");
    }
}
