//! File download operations with streaming and atomic writes
//!
//! Bodies are streamed chunk by chunk into `<destination>.part` and renamed
//! into place once the last chunk is written, so an interrupted transfer never
//! leaves a file that looks complete.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::app::client::http::HttpHandler;
use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// File download operations handler
pub struct DownloadHandler<'a> {
    http_handler: &'a HttpHandler,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler with the given HTTP handler
    pub fn new(http_handler: &'a HttpHandler) -> Self {
        Self { http_handler }
    }

    /// Streams a file to `destination`, returning the number of bytes written
    ///
    /// The parent directory must already exist. The partial file is removed
    /// when the transfer fails.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid or the server rejects the request
    /// - The connection breaks while streaming
    /// - File I/O operations fail
    pub async fn download_file(
        &self,
        url: &str,
        destination: &Path,
        progress: &ProgressBar,
    ) -> DownloadResult<u64> {
        let temp_path = partial_path(destination);

        match self.download_attempt(url, &temp_path, progress).await {
            Ok(written) => {
                tokio::fs::rename(&temp_path, destination)
                    .await
                    .map_err(|_e| DownloadError::RenameFailed {
                        temp_path: temp_path.clone(),
                        final_path: destination.to_path_buf(),
                    })?;
                tracing::info!(
                    "Downloaded {} ({} bytes)",
                    destination.display(),
                    written
                );
                Ok(written)
            }
            Err(e) => {
                if temp_path.exists() {
                    let _ = tokio::fs::remove_file(&temp_path).await;
                }
                Err(e)
            }
        }
    }

    async fn download_attempt(
        &self,
        url: &str,
        temp_path: &Path,
        progress: &ProgressBar,
    ) -> DownloadResult<u64> {
        let mut response = self.http_handler.get_stream(url).await?;

        if let Some(length) = response.content_length() {
            progress.set_length(length);
        }

        let mut file = File::create(temp_path).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            progress.set_position(written);
        }

        file.flush().await?;
        progress.finish_and_clear();

        Ok(written)
    }
}

/// Path of the in-flight file for a destination
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(files::PARTIAL_FILE_SUFFIX);
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_partial_path_keeps_extension() {
        let path = partial_path(Path::new("/tmp/demo/ep1.mp3"));
        assert_eq!(path, PathBuf::from("/tmp/demo/ep1.mp3.part"));
    }

    #[test]
    fn test_partial_path_no_extension() {
        let path = partial_path(Path::new("/tmp/demo/episode"));
        assert!(path.to_string_lossy().ends_with("episode.part"));
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_files() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("ep1.mp3");

        let http_handler = HttpHandler::new(reqwest::Client::new(), Duration::from_secs(5));
        let handler = DownloadHandler::new(&http_handler);

        let result = handler
            .download_file("not a url", &destination, &ProgressBar::hidden())
            .await;

        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
        assert!(!destination.exists());
        assert!(!partial_path(&destination).exists());
    }
}
