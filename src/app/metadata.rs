//! File metadata collection
//!
//! One HEAD request per scraped download link. Failures never stop the run:
//! the row simply keeps empty metadata.

use tracing::{debug, info, warn};

use crate::app::client::CatalogTransport;
use crate::app::ledger::Ledger;
use crate::app::models::FileMetadata;
use crate::app::progress::{ProgressReporter, METADATA_LABEL};

/// Fetch header metadata for one download link
pub async fn fetch_file_metadata<T>(transport: &T, url: &str) -> FileMetadata
where
    T: CatalogTransport + ?Sized,
{
    match transport.fetch_headers(url).await {
        Ok(headers) => {
            let metadata = FileMetadata::from_headers(&headers);
            debug!("Metadata for {}: {:?}", url, metadata);
            metadata
        }
        Err(e) => {
            warn!("Error fetching metadata for {}: {}", url, e);
            FileMetadata::default()
        }
    }
}

/// Enrich every ledger row with metadata for its download link
///
/// Terms are visited in order of first appearance and rows in ledger order.
/// Each result is written into the row it was requested for. Returns the
/// number of rows that received any metadata.
pub async fn add_metadata_to_ledger<T>(
    ledger: &mut Ledger,
    transport: &T,
    reporter: &ProgressReporter,
) -> usize
where
    T: CatalogTransport + ?Sized,
{
    let total = ledger.len();
    let mut current = 0;
    let mut enriched = 0;

    for term in ledger.terms() {
        for index in ledger.partition_indices(&term) {
            let link = ledger.rows()[index].result.download_link.clone();
            let metadata = fetch_file_metadata(transport, &link).await;
            if !metadata.is_empty() {
                enriched += 1;
            }
            ledger.set_metadata(index, metadata);

            current += 1;
            reporter.report(METADATA_LABEL, &term, current, total);
        }
    }
    reporter.finish_line();

    info!("Collected metadata for {} of {} rows", enriched, total);
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::SearchResult;
    use crate::errors::{DownloadError, DownloadResult, MetadataError, MetadataResult};
    use async_trait::async_trait;
    use indicatif::ProgressBar;
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_DISPOSITION, CONTENT_LENGTH};
    use std::path::Path;
    use std::sync::Mutex;

    /// Answers HEAD requests from the trailing path segment of the link
    struct HeaderStub {
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CatalogTransport for HeaderStub {
        async fn fetch_headers(&self, url: &str) -> MetadataResult<HeaderMap> {
            self.requested.lock().unwrap().push(url.to_string());
            if url.ends_with("missing") {
                return Err(MetadataError::ServerError { status: 404 });
            }

            let name = url.rsplit('/').next().unwrap_or_default();
            let mut headers = HeaderMap::new();
            headers.insert(
                CONTENT_LENGTH,
                HeaderValue::from_str(&name.len().to_string()).unwrap(),
            );
            headers.insert(
                CONTENT_DISPOSITION,
                HeaderValue::from_str(&format!("attachment; filename=\"{}.mp3\"", name))
                    .unwrap(),
            );
            Ok(headers)
        }

        async fn download_file(
            &self,
            _url: &str,
            _destination: &Path,
            _progress: &ProgressBar,
        ) -> DownloadResult<u64> {
            Err(DownloadError::ServerError { status: 500 })
        }
    }

    fn stub() -> HeaderStub {
        HeaderStub {
            requested: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_failed_head_gives_empty_metadata() {
        let metadata = fetch_file_metadata(&stub(), "http://x/missing").await;
        assert!(metadata.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_lands_on_its_own_row() {
        let mut ledger = Ledger::from_results(vec![
            SearchResult::new("alpha", "1", "A1", "http://x/a"),
            SearchResult::new("beta", "2", "B1", "http://x/bbb"),
            SearchResult::new("alpha", "3", "A2", "http://x/missing"),
            SearchResult::new("alpha", "4", "A3", "http://x/aaaa"),
        ]);
        let transport = stub();

        let enriched =
            add_metadata_to_ledger(&mut ledger, &transport, &ProgressReporter::hidden()).await;
        assert_eq!(enriched, 3);

        let requested = transport.requested.lock().unwrap().clone();
        assert_eq!(
            requested,
            vec![
                "http://x/a",
                "http://x/missing",
                "http://x/aaaa",
                "http://x/bbb"
            ]
        );

        let rows = ledger.rows();
        assert_eq!(rows[0].metadata.filename.as_deref(), Some("a.mp3"));
        assert_eq!(rows[0].metadata.content_length, Some(1));
        assert_eq!(rows[1].metadata.filename.as_deref(), Some("bbb.mp3"));
        assert!(rows[2].metadata.is_empty());
        assert_eq!(rows[3].metadata.content_length, Some(4));
    }
}
