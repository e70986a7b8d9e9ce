//! Command handlers for AudioVault Fetcher CLI
//!
//! This module implements the main command handlers that coordinate between
//! CLI arguments, configuration and the core application functionality.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::app::{
    add_metadata_to_ledger, download_files_with_progress, fetch_results, prompt_search_terms,
    review_and_mark, CatalogClient, DownloadStatus, DownloadSummary, Ledger, ProgressReporter,
    Prompt,
};
use crate::cli::prompt::ConsolePrompt;
use crate::cli::{ConfigAction, ConfigArgs, ReportArgs, SearchArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Output locations for one search run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowPaths {
    /// CSV ledger rewritten at every checkpoint
    pub output_csv: PathBuf,
    /// Root for `<search_term>/<filename>`
    pub download_root: PathBuf,
}

/// Apply search flags on top of the loaded configuration
pub fn apply_search_overrides(config: &mut AppConfig, args: &SearchArgs) {
    if let Some(path) = &args.cookies {
        config.paths.cookie_file = path.clone();
    }
    if let Some(path) = &args.output_csv {
        config.paths.output_csv = path.clone();
    }
    if let Some(path) = &args.download_dir {
        config.paths.download_root = path.clone();
    }
    if args.no_progress {
        config.progress.enabled = false;
    }
}

/// Handle the search command
///
/// Runs the whole workflow: search, metadata, marking and downloading.
pub async fn handle_search(args: SearchArgs, mut config: AppConfig) -> Result<()> {
    apply_search_overrides(&mut config, &args);

    let client = CatalogClient::with_search_url(
        &config.client.to_runtime_config(),
        &config.paths.cookie_file,
        config.search_url()?,
    )?;
    let reporter = ProgressReporter::new(config.progress.enabled);
    let paths = WorkflowPaths {
        output_csv: config.paths.output_csv.clone(),
        download_root: config.paths.download_root.clone(),
    };

    let mut prompt = ConsolePrompt::new();
    let mut terms = args.search_terms();
    if terms.is_empty() {
        terms = prompt_search_terms(&mut prompt)?;
    }
    if terms.is_empty() {
        return Err(AppError::generic("No search terms given"));
    }

    run_search_workflow(&client, &terms, &mut prompt, &paths, &reporter).await?;
    Ok(())
}

/// Run the search workflow for a list of terms
///
/// Returns the download summary, or `None` when nothing was marked.
pub async fn run_search_workflow<P>(
    client: &CatalogClient,
    terms: &[String],
    prompt: &mut P,
    paths: &WorkflowPaths,
    reporter: &ProgressReporter,
) -> Result<Option<DownloadSummary>>
where
    P: Prompt + ?Sized,
{
    let start_time = Instant::now();

    let mut results = Vec::new();
    for term in terms {
        results.extend(fetch_results(client, term).await);
    }

    let mut ledger = Ledger::from_results(results);
    println!(
        "🔍 Found {} results for {} search term(s)",
        ledger.len(),
        terms.len()
    );

    if ledger.is_empty() {
        ledger.save_csv(&paths.output_csv)?;
        println!("No results to review.");
        return Ok(None);
    }

    add_metadata_to_ledger(&mut ledger, client, reporter).await;

    review_and_mark(&mut ledger, prompt)?;
    ledger.save_csv(&paths.output_csv)?;
    info!("Ledger saved to {}", paths.output_csv.display());

    println!();
    println!(
        "Total size of selected files for download: {:.2} MB",
        ledger.selected_size_mb()
    );

    if !ledger.any_marked() {
        println!("No files were marked for download. Skipping download step.");
        return Ok(None);
    }

    let summary = download_files_with_progress(
        &mut ledger,
        client,
        &paths.download_root,
        &paths.output_csv,
        reporter,
    )
    .await?;

    println!("\n📊 Download Summary:");
    println!("  Downloaded: {}", summary.success);
    println!("  Skipped (already present): {}", summary.skipped);
    println!("  Failed: {}", summary.fail);
    println!("  Incomplete: {}", summary.incomplete);
    println!(
        "  Data written: {:.2} MB",
        summary.bytes_written as f64 / crate::constants::units::BYTES_PER_MB
    );
    println!("  Total time: {:?}", start_time.elapsed());
    println!("  Ledger: {}", paths.output_csv.display());

    if summary.has_failures() {
        warn!("Download run completed with failures: {}", summary);
    }

    Ok(Some(summary))
}

/// Handle the report command
pub async fn handle_report(args: ReportArgs, config: AppConfig) -> Result<()> {
    let path = args.csv.unwrap_or(config.paths.output_csv);
    let ledger = Ledger::load_csv(&path)?;

    print!("{}", render_report(&ledger, &path));
    Ok(())
}

/// Per-status summary of a ledger
pub fn render_report(ledger: &Ledger, path: &Path) -> String {
    let counts = ledger.status_counts();

    let mut report = format!("📋 Ledger: {}\n", path.display());
    report.push_str(&format!("  Rows: {}\n", ledger.len()));
    report.push_str(&format!("  Search terms: {}\n", ledger.terms().len()));
    report.push_str(&format!("  Marked for download: {}\n", ledger.marked_count()));
    report.push_str(&format!(
        "  Selected size: {:.2} MB\n",
        ledger.selected_size_mb()
    ));
    for status in DownloadStatus::ALL {
        report.push_str(&format!(
            "  {}: {}\n",
            status,
            counts.get(&status).copied().unwrap_or(0)
        ));
    }
    report
}

/// Handle configuration commands
pub async fn handle_config(args: ConfigArgs, config: Result<AppConfig>) -> Result<()> {
    match args.action {
        ConfigAction::Init { force, path } => {
            let path = match path {
                Some(path) => path,
                None => AppConfig::default_config_path()?,
            };
            AppConfig::init(&path, force).await?;

            println!("📁 Created default configuration file:");
            println!("   {}", path.display());
            println!("   You can customize settings by editing this file.");
            Ok(())
        }
        ConfigAction::Show => {
            print!("{}", config?.to_toml()?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{FileMetadata, SearchResult, Selection};

    #[test]
    fn test_search_overrides_win() {
        let mut config = AppConfig::default();
        let args = SearchArgs {
            cookies: Some(PathBuf::from("/tmp/c.txt")),
            download_dir: Some(PathBuf::from("/tmp/dl")),
            no_progress: true,
            ..Default::default()
        };

        apply_search_overrides(&mut config, &args);
        assert_eq!(config.paths.cookie_file, PathBuf::from("/tmp/c.txt"));
        assert_eq!(config.paths.download_root, PathBuf::from("/tmp/dl"));
        assert_eq!(
            config.paths.output_csv,
            AppConfig::default().paths.output_csv
        );
        assert!(!config.progress.enabled);
    }

    #[test]
    fn test_render_report() {
        let mut ledger = Ledger::from_results(vec![
            SearchResult::new("demo", "1", "Episode", "http://x/ep1"),
            SearchResult::new("demo", "2", "Other", "http://x/ep2"),
        ]);
        ledger.set_metadata(
            0,
            FileMetadata {
                content_length: Some(2 * 1024 * 1024),
                ..Default::default()
            },
        );
        ledger.mark("demo", &Selection::IncludeIds(vec![1]));
        ledger.rows_mut()[0].downloaded = DownloadStatus::Success;

        let report = render_report(&ledger, Path::new("ledger.csv"));
        assert!(report.contains("Rows: 2"));
        assert!(report.contains("Marked for download: 1"));
        assert!(report.contains("Selected size: 2.00 MB"));
        assert!(report.contains("success: 1"));
        assert!(report.contains("not_started: 1"));
        assert!(report.contains("incomplete: 0"));
    }
}
