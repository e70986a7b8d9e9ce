//! Data models for AudioVault Fetcher
//!
//! This module defines the row types that flow through the workflow: scraped
//! search results, the file metadata collected for them, and the download
//! status recorded in the ledger.

use std::fmt;
use std::str::FromStr;

use reqwest::header::{
    HeaderMap, HeaderName, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED,
};
use serde::{Deserialize, Serialize};

use crate::constants::units;

/// One row scraped from the catalog's result table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The query that produced this row
    pub search_term: String,
    /// Site-assigned identifier, as displayed
    pub id: String,
    /// Display title
    pub name: String,
    /// Absolute download URL taken from the row's link cell
    pub download_link: String,
    /// Whether the row is marked for download
    pub download: bool,
    /// 1-based position within the search term's partition, 0 until the
    /// ledger numbers it
    pub show_item_id: u32,
}

impl SearchResult {
    /// Create an unmarked, unnumbered result row
    pub fn new(
        search_term: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
        download_link: impl Into<String>,
    ) -> Self {
        Self {
            search_term: search_term.into(),
            id: id.into(),
            name: name.into(),
            download_link: download_link.into(),
            download: false,
            show_item_id: 0,
        }
    }
}

/// Header-derived metadata for a candidate file
///
/// Every field is optional: a failed or partial HEAD response simply leaves
/// the corresponding fields empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Size in bytes from `Content-Length`
    pub content_length: Option<u64>,
    /// Raw `Content-Type` value
    pub content_type: Option<String>,
    /// Raw `Last-Modified` value
    pub last_modified: Option<String>,
    /// File name from the `Content-Disposition` `filename=` parameter
    pub filename: Option<String>,
}

impl FileMetadata {
    /// Extract metadata from response headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_str = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.trim().to_string())
        };

        Self {
            content_length: header_str(CONTENT_LENGTH).and_then(|value| value.parse().ok()),
            content_type: header_str(CONTENT_TYPE),
            last_modified: header_str(LAST_MODIFIED),
            filename: header_str(CONTENT_DISPOSITION)
                .and_then(|value| parse_content_disposition_filename(&value)),
        }
    }

    /// Whether no header produced a value
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Size in mebibytes rounded to two decimals
    pub fn size_mb(&self) -> Option<f64> {
        self.content_length
            .map(|bytes| (bytes as f64 / units::BYTES_PER_MB * 100.0).round() / 100.0)
    }
}

/// Parse the `filename=` parameter of a `Content-Disposition` value.
///
/// Surrounding quotes are stripped; `filename*=` (RFC 5987) is not consulted.
pub fn parse_content_disposition_filename(header: &str) -> Option<String> {
    let start = header.find("filename=")?;
    let rest = &header[start + "filename=".len()..];

    let name = match rest.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next().unwrap_or(""),
        None => rest.split(';').next().unwrap_or(""),
    };

    let name = name.trim().trim_matches('"');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Download outcome recorded for each ledger row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// Not processed by the downloader (unmarked, or not reached yet)
    #[default]
    NotStarted,
    /// Destination already existed
    Skipped,
    /// Transfer completed
    Success,
    /// Server refused the transfer
    Fail,
    /// Transfer broke part way through
    Incomplete,
}

impl DownloadStatus {
    /// All statuses in display order
    pub const ALL: [DownloadStatus; 5] = [
        DownloadStatus::NotStarted,
        DownloadStatus::Skipped,
        DownloadStatus::Success,
        DownloadStatus::Fail,
        DownloadStatus::Incomplete,
    ];

    /// Ledger representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::NotStarted => "not_started",
            DownloadStatus::Skipped => "skipped",
            DownloadStatus::Success => "success",
            DownloadStatus::Fail => "fail",
            DownloadStatus::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DownloadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown download status: {}", s))
    }
}

/// A search result enriched with metadata and download status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    /// Scraped row and its marking state
    pub result: SearchResult,
    /// Metadata from the HEAD request
    pub metadata: FileMetadata,
    /// Download outcome
    pub downloaded: DownloadStatus,
}

impl LedgerRow {
    /// Wrap a scraped result with empty metadata
    pub fn new(result: SearchResult) -> Self {
        Self {
            result,
            metadata: FileMetadata::default(),
            downloaded: DownloadStatus::NotStarted,
        }
    }

    /// File name to save under: the server-provided name, else the last
    /// segment of the download link
    pub fn target_filename(&self) -> Option<String> {
        self.metadata
            .filename
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| filename_from_link(&self.result.download_link))
    }
}

/// Last non-empty path segment of a link, without query or fragment
///
/// Relative links are read as written.
fn filename_from_link(link: &str) -> Option<String> {
    match url::Url::parse(link) {
        Ok(url) => url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .last()
            .map(str::to_string),
        Err(url::ParseError::RelativeUrlWithoutBase) => link
            .split(['?', '#'])
            .next()?
            .split('/')
            .filter(|segment| !segment.is_empty())
            .last()
            .map(str::to_string),
        Err(_) => None,
    }
}
