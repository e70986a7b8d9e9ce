//! Command-line argument parsing for AudioVault Fetcher
//!
//! This module defines the CLI structure using clap derive macros: the
//! interactive search-and-download workflow, ledger reports and config file
//! management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// AudioVault Fetcher - search the catalog and download marked files
#[derive(Parser, Debug)]
#[command(
    name = "audiovault_fetcher",
    version,
    about = "Search the AudioVault catalog and download selected files",
    long_about = "Searches the AudioVault catalog for one or more terms, collects file metadata,
lets you mark results for download per term, then downloads them one at a time while
recording every outcome in a CSV ledger."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search, mark and download files
    Search(SearchArgs),

    /// Summarize a ledger CSV from a previous run
    Report(ReportArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the search command
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Search terms; prompted for when omitted
    #[arg(value_name = "TERMS")]
    pub terms: Vec<String>,

    /// Netscape cookies.txt with the catalog session
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// CSV ledger to write
    #[arg(long, value_name = "FILE")]
    pub output_csv: Option<PathBuf>,

    /// Root directory for downloaded files
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Disable progress lines
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the report command
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Ledger CSV to read (defaults to the configured output file)
    #[arg(value_name = "CSV")]
    pub csv: Option<PathBuf>,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,

        /// Where to write (defaults to the per-user config file)
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },

    /// Print the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level requested on the command line, if any
    pub fn requested_log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        self.requested_log_level().unwrap_or(tracing::Level::WARN)
    }
}

impl SearchArgs {
    /// Search terms given on the command line, split on commas and trimmed
    pub fn search_terms(&self) -> Vec<String> {
        self.terms
            .iter()
            .flat_map(|term| term.split(','))
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with(global: GlobalArgs) -> Cli {
        Cli {
            global,
            command: Commands::Config(ConfigArgs {
                action: ConfigAction::Show,
            }),
        }
    }

    #[test]
    fn test_log_level() {
        let cli_quiet = cli_with(GlobalArgs {
            quiet: true,
            very_verbose: true,
            ..Default::default()
        });
        let cli_verbose = cli_with(GlobalArgs {
            verbose: true,
            ..Default::default()
        });
        let cli_default = cli_with(GlobalArgs::default());

        assert_eq!(cli_quiet.log_level(), tracing::Level::ERROR);
        assert_eq!(cli_verbose.log_level(), tracing::Level::INFO);
        assert_eq!(cli_default.log_level(), tracing::Level::WARN);
        assert_eq!(cli_default.requested_log_level(), None);
    }

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::try_parse_from([
            "audiovault_fetcher",
            "-v",
            "search",
            "doctor who",
            "sherlock",
            "--download-dir",
            "/media/audio",
            "--no-progress",
        ])
        .unwrap();

        assert!(cli.global.verbose);
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.search_terms(), vec!["doctor who", "sherlock"]);
                assert_eq!(args.download_dir, Some(PathBuf::from("/media/audio")));
                assert!(args.no_progress);
                assert!(args.cookies.is_none());
            }
            other => panic!("Expected search command, got {:?}", other),
        }
    }

    #[test]
    fn test_search_terms_split_on_commas() {
        let args = SearchArgs {
            terms: vec!["a, b".to_string(), " ".to_string(), "c".to_string()],
            ..Default::default()
        };
        assert_eq!(args.search_terms(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_config_init() {
        let cli =
            Cli::try_parse_from(["audiovault_fetcher", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigArgs {
                action: ConfigAction::Init {
                    force: true,
                    path: None
                }
            })
        ));
    }
}
