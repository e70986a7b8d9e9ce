//! Error types for AudioVault Fetcher
//!
//! Each workflow stage has its own error enum. Most of them are absorbed by the
//! stage that produced them (a failed search yields no rows, a failed HEAD
//! request yields empty metadata, a failed transfer yields a row status); only
//! environment failures such as an unwritable ledger travel up to `main`.

use std::path::PathBuf;
use thiserror::Error;

/// Search request and result-page parsing errors
#[derive(Error, Debug)]
pub enum SearchError {
    /// HTTP request failed
    #[error("Search request failed")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("Search request returned HTTP {status}")]
    ServerError { status: u16 },

    /// Search endpoint could not be combined with the term
    #[error("Invalid search URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// CSS selector error
    #[error("Invalid CSS selector: {selector}")]
    InvalidSelector { selector: String },
}

/// HEAD request errors while collecting file metadata
#[derive(Error, Debug)]
pub enum MetadataError {
    /// HTTP request failed
    #[error("Metadata request failed")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("Metadata request returned HTTP {status}")]
    ServerError { status: u16 },

    /// Download link is not a valid URL
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },
}

/// File transfer errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request failed
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations
    #[error("File I/O error")]
    Io(#[from] std::io::Error),

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Server returned error status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Partial file could not be moved into place
    #[error("Could not rename {temp_path} to {final_path}")]
    RenameFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },

    /// Neither the metadata nor the link yields a file name
    #[error("No file name available for {url}")]
    MissingFilename { url: String },
}

impl DownloadError {
    /// Whether the server refused the transfer outright, as opposed to a
    /// transfer that broke part way through
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DownloadError::ServerError { .. }
                | DownloadError::InvalidUrl { .. }
                | DownloadError::MissingFilename { .. }
        )
    }
}

/// CSV ledger persistence errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// CSV encoding or decoding failed
    #[error("CSV error in ledger {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// I/O error writing or reading the ledger
    #[error("Ledger I/O error: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Interactive prompt errors
#[derive(Error, Debug)]
pub enum PromptError {
    /// Terminal read or write failed
    #[error("Terminal I/O error")]
    Io(#[from] std::io::Error),

    /// Input closed before an answer was given
    #[error("Input closed while waiting for: {question}")]
    InputClosed { question: String },
}

/// Cookie jar loading errors
#[derive(Error, Debug)]
pub enum CookieError {
    /// Cookie file could not be read
    #[error("Failed to read cookie file: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client construction failed
    #[error("Failed to build HTTP client")]
    Client(#[from] reqwest::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be rendered as TOML
    #[error("Failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// User config directory is unknown on this platform
    #[error("Could not determine user config directory")]
    NoConfigDir,

    /// I/O error reading or writing the config file
    #[error("Config file I/O error: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Ledger error
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Prompt error
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// Cookie error
    #[error(transparent)]
    Cookie(#[from] CookieError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Ledger(_) => "ledger",
            AppError::Prompt(_) => "prompt",
            AppError::Cookie(_) => "cookie",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Search result type alias
pub type ScrapeResult<T> = std::result::Result<T, SearchError>;

/// Metadata result type alias
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Ledger result type alias
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Prompt result type alias
pub type PromptResult<T> = std::result::Result<T, PromptError>;

/// Config result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
