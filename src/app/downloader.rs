//! Sequential downloader for marked ledger rows
//!
//! Marked rows are fetched one at a time into
//! `<download_root>/<search_term>/<filename>`. Every row's outcome is
//! recorded in the ledger, and the ledger is written back to its CSV file
//! after each row so an interrupted run still leaves an accurate record.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::app::client::CatalogTransport;
use crate::app::ledger::Ledger;
use crate::app::models::{DownloadStatus, LedgerRow};
use crate::app::progress::{ProgressReporter, DOWNLOAD_LABEL};
use crate::errors::{AppError, DownloadError, Result};

/// Outcome counts of a download run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub attempted: usize,
    pub success: usize,
    pub skipped: usize,
    pub fail: usize,
    pub incomplete: usize,
    pub bytes_written: u64,
}

impl DownloadSummary {
    fn record(&mut self, status: DownloadStatus, bytes: u64) {
        self.attempted += 1;
        self.bytes_written += bytes;
        match status {
            DownloadStatus::Success => self.success += 1,
            DownloadStatus::Skipped => self.skipped += 1,
            DownloadStatus::Fail => self.fail += 1,
            DownloadStatus::Incomplete => self.incomplete += 1,
            DownloadStatus::NotStarted => {}
        }
    }

    /// Whether any row ended in `fail` or `incomplete`
    pub fn has_failures(&self) -> bool {
        self.fail + self.incomplete > 0
    }
}

impl fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed: {} downloaded, {} skipped, {} failed, {} incomplete",
            self.attempted, self.success, self.skipped, self.fail, self.incomplete
        )
    }
}

/// Replace characters that would let a name leave its directory
pub fn sanitize_path_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Directory that holds one search term's files
pub fn term_directory(download_root: &Path, search_term: &str) -> PathBuf {
    download_root.join(sanitize_path_component(search_term))
}

/// Download every marked row, checkpointing the ledger after each one
///
/// All statuses are reset to `not_started` first, so unmarked rows keep that
/// status. Transfer failures are recorded per row and never stop the run.
///
/// # Errors
///
/// Returns an error if a term directory cannot be created or the ledger CSV
/// cannot be written.
pub async fn download_files_with_progress<T>(
    ledger: &mut Ledger,
    transport: &T,
    download_root: &Path,
    output_csv: &Path,
    reporter: &ProgressReporter,
) -> Result<DownloadSummary>
where
    T: CatalogTransport + ?Sized,
{
    ledger.reset_statuses();

    let marked: Vec<usize> = ledger
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row.result.download)
        .map(|(index, _)| index)
        .collect();
    let total = marked.len();
    let mut summary = DownloadSummary::default();

    info!(
        "Downloading {} marked files into {}",
        total,
        download_root.display()
    );

    for (position, index) in marked.into_iter().enumerate() {
        let row = ledger.rows()[index].clone();
        reporter.report(DOWNLOAD_LABEL, &row.result.search_term, position, total);

        let (status, bytes) = download_row(&row, transport, download_root, reporter).await?;
        ledger.rows_mut()[index].downloaded = status;
        summary.record(status, bytes);

        ledger.save_csv(output_csv)?;
        reporter.report(DOWNLOAD_LABEL, &row.result.search_term, position + 1, total);
    }
    reporter.finish_line();

    info!("Download run finished: {}", summary);
    Ok(summary)
}

async fn download_row<T>(
    row: &LedgerRow,
    transport: &T,
    download_root: &Path,
    reporter: &ProgressReporter,
) -> Result<(DownloadStatus, u64)>
where
    T: CatalogTransport + ?Sized,
{
    let link = &row.result.download_link;

    let Some(filename) = row.target_filename() else {
        let e = DownloadError::MissingFilename { url: link.clone() };
        warn!("{}", e);
        return Ok((DownloadStatus::Fail, 0));
    };

    let directory = term_directory(download_root, &row.result.search_term);
    tokio::fs::create_dir_all(&directory).await.map_err(|e| {
        error!("Failed to create directory {}: {}", directory.display(), e);
        AppError::Io(e)
    })?;

    let destination = directory.join(sanitize_path_component(&filename));
    if destination.exists() {
        info!("Skipping {}: already exists", destination.display());
        return Ok((DownloadStatus::Skipped, 0));
    }

    debug!("Downloading {} to {}", link, destination.display());
    let progress = reporter.file_bar(&filename, row.metadata.content_length);

    let outcome = match transport.download_file(link, &destination, &progress).await {
        Ok(bytes) => (DownloadStatus::Success, bytes),
        Err(e) if e.is_rejection() => {
            warn!("Download of {} rejected: {}", link, e);
            (DownloadStatus::Fail, 0)
        }
        Err(e) => {
            warn!("Download of {} did not complete: {}", link, e);
            (DownloadStatus::Incomplete, 0)
        }
    };
    progress.finish_and_clear();

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_component() {
        assert_eq!(sanitize_path_component("ep1.mp3"), "ep1.mp3");
        assert_eq!(sanitize_path_component("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_path_component(r"a\b"), "a_b");
        assert_eq!(sanitize_path_component(".."), "_");
        assert_eq!(sanitize_path_component("  "), "_");
    }

    #[test]
    fn test_term_directory_stays_under_root() {
        let root = Path::new("/data/download");
        let directory = term_directory(root, "doctor/who");
        assert_eq!(directory, PathBuf::from("/data/download/doctor_who"));
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = DownloadSummary::default();
        summary.record(DownloadStatus::Success, 10);
        summary.record(DownloadStatus::Skipped, 0);
        summary.record(DownloadStatus::Incomplete, 0);

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.bytes_written, 10);
        assert!(summary.has_failures());
        assert_eq!(
            summary.to_string(),
            "3 processed: 1 downloaded, 1 skipped, 0 failed, 1 incomplete"
        );
    }
}
