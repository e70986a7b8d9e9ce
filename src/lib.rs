//! AudioVault Fetcher Library
//!
//! Searches the AudioVault catalog, collects file metadata for the results,
//! lets an operator mark files per search term and downloads them one at a
//! time, keeping a CSV ledger of every outcome.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        assert_eq!(DEFAULT_OUTPUT_CSV, "search_results_with_metadata.csv");
        assert_eq!(env::COOKIE_FILE, "AUDIOVAULT_COOKIE_FILE");
        assert!(USER_AGENT.contains("AudioVault-Fetcher"));
    }

    #[test]
    fn test_error_types() {
        let config_error = errors::ConfigError::NoConfigDir;
        let app_error = AppError::Config(config_error);

        assert_eq!(app_error.category(), "config");
    }
}
