//! AudioVault Fetcher CLI application
//!
//! Command-line interface for searching the AudioVault catalog and
//! downloading marked files.

use std::process;

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

// Import CLI modules through the library (module is public but not re-exported)
use audiovault_fetcher::cli::{handle_config, handle_report, handle_search, Cli, Commands};
use audiovault_fetcher::config::AppConfig;
use audiovault_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        error!("Run stopped by {} error: {}", e.category(), e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    // `config init` must work even when the existing file is broken
    let config: Result<AppConfig> = AppConfig::load(cli.global.config.clone())
        .await
        .map_err(Into::into);

    init_logging(&cli, config.as_ref().ok());

    info!("AudioVault Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Search(args) => {
            info!("Executing search command");
            handle_search(args, config?).await
        }
        Commands::Report(args) => {
            info!("Executing report command");
            handle_report(args, config?).await
        }
        Commands::Config(args) => {
            info!("Executing config command");
            handle_config(args, config).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings, falling back to the
/// configured level
fn init_logging(cli: &Cli, config: Option<&AppConfig>) {
    let log_level = cli
        .requested_log_level()
        .or_else(|| config.and_then(|config| config.logging.level.parse().ok()))
        .unwrap_or_else(|| cli.log_level());

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("audiovault_fetcher={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .with_writer(std::io::stderr)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
