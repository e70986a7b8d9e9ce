//! Application constants for AudioVault Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names for configuration overrides
pub mod env {
    /// Overrides the cookie jar path
    pub const COOKIE_FILE: &str = "AUDIOVAULT_COOKIE_FILE";

    /// Overrides the CSV ledger path
    pub const OUTPUT_CSV: &str = "AUDIOVAULT_OUTPUT_CSV";

    /// Overrides the download root directory
    pub const DOWNLOAD_ROOT: &str = "AUDIOVAULT_DOWNLOAD_ROOT";

    /// Overrides the catalog search endpoint
    pub const SEARCH_URL: &str = "AUDIOVAULT_SEARCH_URL";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "AudioVault-Fetcher/0.1.0 (Catalog Download Tool)";

    /// Default timeout for search and HEAD requests
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Maximum number of redirects to follow
    pub const MAX_REDIRECTS: usize = 10;
}

/// Catalog service URLs and query parameters
pub mod catalog {
    /// Listing endpoint searched by term
    pub const SEARCH_URL: &str = "https://audiovault.net/shows";

    /// Query parameter carrying the search term
    pub const SEARCH_PARAM: &str = "search";
}

/// Web scraping CSS selectors
pub mod selectors {
    /// First results table on the listing page
    pub const TABLE: &str = "table";

    /// Body section of the results table
    pub const TABLE_BODY: &str = "tbody";

    /// Result rows inside the table body
    pub const ROW: &str = "tr";

    /// Cells inside a result row
    pub const CELL: &str = "td";

    /// Download anchor inside the link cell
    pub const ANCHOR: &str = "a[href]";
}

/// File and path defaults
pub mod files {
    /// Default cookie jar exported from a logged-in browser session
    pub const DEFAULT_COOKIE_FILE: &str = "cookies.txt";

    /// Default CSV ledger path
    pub const DEFAULT_OUTPUT_CSV: &str = "search_results_with_metadata.csv";

    /// Download directory created under the working directory
    pub const DEFAULT_DOWNLOAD_DIR: &str = "download";

    /// Suffix for in-flight downloads, renamed away on completion
    pub const PARTIAL_FILE_SUFFIX: &str = ".part";

    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "audiovault-fetcher.toml";

    /// Directory under the user config dir holding `config.toml`
    pub const CONFIG_DIR_NAME: &str = "audiovault-fetcher";
}

/// Progress reporting
pub mod progress {
    /// Columns reserved for the text portion of the progress line
    pub const RESERVED_TEXT_WIDTH: usize = 50;

    /// Smallest bar drawn on narrow terminals
    pub const MIN_BAR_WIDTH: usize = 10;

    /// Terminal width assumed when it cannot be detected
    pub const FALLBACK_COLUMNS: usize = 80;

    /// Filled bar character
    pub const FILLED_CHAR: char = '#';

    /// Empty bar character
    pub const EMPTY_CHAR: char = '.';
}

/// Size units
pub mod units {
    /// Bytes per mebibyte, used for the `Size (MB)` column
    pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
}

// Re-export commonly used constants for convenience
pub use catalog::SEARCH_URL as DEFAULT_SEARCH_URL;
pub use files::{DEFAULT_COOKIE_FILE, DEFAULT_DOWNLOAD_DIR, DEFAULT_OUTPUT_CSV};
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
