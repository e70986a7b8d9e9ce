//! Core application logic for AudioVault Fetcher
//!
//! This module contains the workflow stages: catalog search, metadata
//! collection, interactive marking and downloading, plus the ledger they all
//! share.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use audiovault_fetcher::app::{
//!     add_metadata_to_ledger, fetch_results, CatalogClient, ClientConfig, Ledger,
//!     ProgressReporter, Selection,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CatalogClient::new(&ClientConfig::default(), Path::new("cookies.txt"))?;
//! let results = fetch_results(&client, "doctor who").await;
//!
//! let mut ledger = Ledger::from_results(results);
//! add_metadata_to_ledger(&mut ledger, &client, &ProgressReporter::hidden()).await;
//! ledger.mark("doctor who", &Selection::IncludeKeyword("special".to_string()));
//! ledger.save_csv(Path::new("search_results_with_metadata.csv"))?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod downloader;
pub mod ledger;
pub mod metadata;
pub mod models;
pub mod progress;
pub mod search;
pub mod selection;

// Re-export main public API
pub use client::{CatalogClient, CatalogTransport, ClientConfig};
pub use downloader::{download_files_with_progress, DownloadSummary};
pub use ledger::{Ledger, Selection};
pub use metadata::{add_metadata_to_ledger, fetch_file_metadata};
pub use models::{DownloadStatus, FileMetadata, LedgerRow, SearchResult};
pub use progress::ProgressReporter;
pub use search::{fetch_results, parse_results_table};
pub use selection::{prompt_search_terms, review_and_mark, Prompt, ScriptedPrompt};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        let config = ClientConfig::default();
        assert!(config.tcp_nodelay);
        assert_eq!(DownloadStatus::default(), DownloadStatus::NotStarted);
    }
}
