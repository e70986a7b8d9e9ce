//! Selection ledger
//!
//! The ledger is the ordered sequence of every scraped row together with its
//! metadata, marking state and download status. Rows are grouped into
//! partitions by search term; all marking operations act on one partition at
//! a time and assign every row in it.
//!
//! The ledger is persisted as a flat CSV file. Each checkpoint rewrites the
//! whole file through a temporary sibling that is renamed into place.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::models::{DownloadStatus, FileMetadata, LedgerRow, SearchResult};
use crate::constants::units;
use crate::errors::{LedgerError, LedgerResult};

/// A complete assignment of the `download` flag for one partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Mark every row
    All,
    /// Unmark every row
    None,
    /// Mark exactly the listed show item IDs
    IncludeIds(Vec<u32>),
    /// Mark everything except the listed show item IDs
    ExcludeIds(Vec<u32>),
    /// Mark rows whose name contains the keyword (case-insensitive)
    IncludeKeyword(String),
    /// Mark rows whose name does not contain the keyword (case-insensitive)
    ExcludeKeyword(String),
}

impl Selection {
    /// Decide the `download` flag for a single row
    pub fn wants(&self, result: &SearchResult) -> bool {
        match self {
            Selection::All => true,
            Selection::None => false,
            Selection::IncludeIds(ids) => ids.contains(&result.show_item_id),
            Selection::ExcludeIds(ids) => !ids.contains(&result.show_item_id),
            Selection::IncludeKeyword(keyword) => name_contains(&result.name, keyword),
            Selection::ExcludeKeyword(keyword) => !name_contains(&result.name, keyword),
        }
    }
}

fn name_contains(name: &str, keyword: &str) -> bool {
    name.to_lowercase().contains(&keyword.to_lowercase())
}

/// Ordered collection of ledger rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    rows: Vec<LedgerRow>,
}

impl Ledger {
    /// Build a ledger from scraped rows, numbering each search term's rows
    /// 1..N in scrape order
    pub fn from_results(results: Vec<SearchResult>) -> Self {
        let mut counters: HashMap<String, u32> = HashMap::new();

        let rows = results
            .into_iter()
            .map(|mut result| {
                let counter = counters.entry(result.search_term.clone()).or_insert(0);
                *counter += 1;
                result.show_item_id = *counter;
                result.download = false;
                LedgerRow::new(result)
            })
            .collect();

        Self { rows }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the ledger has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in ledger order
    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    /// Mutable access to all rows in ledger order
    pub fn rows_mut(&mut self) -> &mut [LedgerRow] {
        &mut self.rows
    }

    /// Distinct search terms in order of first appearance
    pub fn terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for row in &self.rows {
            if !terms.contains(&row.result.search_term) {
                terms.push(row.result.search_term.clone());
            }
        }
        terms
    }

    /// Rows belonging to one search term, in ledger order
    pub fn partition<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a LedgerRow> + 'a {
        self.rows
            .iter()
            .filter(move |row| row.result.search_term == term)
    }

    /// Ledger indices of one search term's rows, in ledger order
    pub fn partition_indices(&self, term: &str) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.result.search_term == term)
            .map(|(index, _)| index)
            .collect()
    }

    /// Apply a selection to every row of a partition, returning how many rows
    /// end up marked
    pub fn mark(&mut self, term: &str, selection: &Selection) -> usize {
        let mut marked = 0;
        for row in self
            .rows
            .iter_mut()
            .filter(|row| row.result.search_term == term)
        {
            row.result.download = selection.wants(&row.result);
            if row.result.download {
                marked += 1;
            }
        }
        debug!("Marked {} rows for '{}' with {:?}", marked, term, selection);
        marked
    }

    /// Attach metadata to the row at `index`
    pub fn set_metadata(&mut self, index: usize, metadata: FileMetadata) {
        if let Some(row) = self.rows.get_mut(index) {
            row.metadata = metadata;
        }
    }

    /// Whether any row is marked for download
    pub fn any_marked(&self) -> bool {
        self.rows.iter().any(|row| row.result.download)
    }

    /// Number of rows marked for download
    pub fn marked_count(&self) -> usize {
        self.rows.iter().filter(|row| row.result.download).count()
    }

    /// Total size of marked rows in MB; rows without a known size count as 0
    pub fn selected_size_mb(&self) -> f64 {
        let bytes: u64 = self
            .rows
            .iter()
            .filter(|row| row.result.download)
            .filter_map(|row| row.metadata.content_length)
            .sum();
        bytes as f64 / units::BYTES_PER_MB
    }

    /// Reset every row's download status
    pub fn reset_statuses(&mut self) {
        for row in &mut self.rows {
            row.downloaded = DownloadStatus::NotStarted;
        }
    }

    /// Count rows per download status
    pub fn status_counts(&self) -> HashMap<DownloadStatus, usize> {
        let mut counts = HashMap::new();
        for row in &self.rows {
            *counts.entry(row.downloaded).or_insert(0) += 1;
        }
        counts
    }

    /// Rewrite the whole ledger to a CSV file
    pub fn save_csv(&self, path: &Path) -> LedgerResult<()> {
        let temp_path = temp_path_for(path);

        {
            let file = File::create(&temp_path).map_err(|source| LedgerError::Io {
                path: temp_path.clone(),
                source,
            })?;
            let mut writer = csv::Writer::from_writer(file);
            for row in &self.rows {
                writer
                    .serialize(LedgerRecord::from(row))
                    .map_err(|source| LedgerError::Csv {
                        path: path.to_path_buf(),
                        source,
                    })?;
            }
            if self.rows.is_empty() {
                writer
                    .write_record(LedgerRecord::HEADER)
                    .map_err(|source| LedgerError::Csv {
                        path: path.to_path_buf(),
                        source,
                    })?;
            }
            writer.flush().map_err(|source| LedgerError::Io {
                path: temp_path.clone(),
                source,
            })?;
        }

        fs::rename(&temp_path, path).map_err(|source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Ledger checkpoint written: {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Load a ledger previously written by [`Ledger::save_csv`]
    pub fn load_csv(path: &Path) -> LedgerResult<Self> {
        let file = File::open(path).map_err(|source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = csv::Reader::from_reader(file);

        let mut rows = Vec::new();
        for record in reader.deserialize::<LedgerRecord>() {
            let record = record.map_err(|source| LedgerError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            rows.push(LedgerRow::from(record));
        }

        Ok(Self { rows })
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Flat CSV shape of a ledger row
#[derive(Debug, Serialize, Deserialize)]
struct LedgerRecord {
    search_term: String,
    id: String,
    name: String,
    download_link: String,
    download: bool,
    show_item_id: u32,
    content_length: Option<u64>,
    content_type: Option<String>,
    last_modified: Option<String>,
    filename: Option<String>,
    downloaded: DownloadStatus,
}

impl LedgerRecord {
    const HEADER: [&'static str; 11] = [
        "search_term",
        "id",
        "name",
        "download_link",
        "download",
        "show_item_id",
        "content_length",
        "content_type",
        "last_modified",
        "filename",
        "downloaded",
    ];
}

impl From<&LedgerRow> for LedgerRecord {
    fn from(row: &LedgerRow) -> Self {
        Self {
            search_term: row.result.search_term.clone(),
            id: row.result.id.clone(),
            name: row.result.name.clone(),
            download_link: row.result.download_link.clone(),
            download: row.result.download,
            show_item_id: row.result.show_item_id,
            content_length: row.metadata.content_length,
            content_type: row.metadata.content_type.clone(),
            last_modified: row.metadata.last_modified.clone(),
            filename: row.metadata.filename.clone(),
            downloaded: row.downloaded,
        }
    }
}

impl From<LedgerRecord> for LedgerRow {
    fn from(record: LedgerRecord) -> Self {
        Self {
            result: SearchResult {
                search_term: record.search_term,
                id: record.id,
                name: record.name,
                download_link: record.download_link,
                download: record.download,
                show_item_id: record.show_item_id,
            },
            metadata: FileMetadata {
                content_length: record.content_length,
                content_type: record.content_type,
                last_modified: record.last_modified,
                filename: record.filename,
            },
            downloaded: record.downloaded,
        }
    }
}
