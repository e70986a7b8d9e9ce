//! Prelude module for AudioVault Fetcher Library
//!
//! Re-exports the items needed to drive the workflow from another program
//! with a single `use audiovault_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use audiovault_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::default();
//!     let client = CatalogClient::with_search_url(
//!         &config.client.to_runtime_config(),
//!         &config.paths.cookie_file,
//!         config.search_url()?,
//!     )?;
//!
//!     let mut ledger = Ledger::from_results(fetch_results(&client, "demo").await);
//!     add_metadata_to_ledger(&mut ledger, &client, &ProgressReporter::hidden()).await;
//!     ledger.mark("demo", &Selection::All);
//!     download_files_with_progress(
//!         &mut ledger,
//!         &client,
//!         &config.paths.download_root,
//!         &config.paths.output_csv,
//!         &ProgressReporter::hidden(),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Workflow stages and the types they pass along
pub use crate::app::{
    add_metadata_to_ledger, download_files_with_progress, fetch_file_metadata, fetch_results,
    review_and_mark, CatalogClient, CatalogTransport, ClientConfig, DownloadStatus,
    DownloadSummary, FileMetadata, Ledger, LedgerRow, ProgressReporter, Prompt, ScriptedPrompt,
    SearchResult, Selection,
};

// Configuration
pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{
    DEFAULT_COOKIE_FILE, DEFAULT_DOWNLOAD_DIR, DEFAULT_OUTPUT_CSV, DEFAULT_SEARCH_URL, USER_AGENT,
};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};

pub use tokio;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        let _client_config = ClientConfig::default();
        let config = AppConfig::default();

        assert_eq!(config.paths.output_csv, PathBuf::from(DEFAULT_OUTPUT_CSV));
        assert_eq!(DEFAULT_SEARCH_URL, "https://audiovault.net/shows");
        assert!(ScriptedPrompt::new(["1"]).remaining() == 1);
    }
}
