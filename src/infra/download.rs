//! HTTP download functionality
//!
//! Fetches upstream pages as text and source archives to disk, with
//! progress reporting, SHA256 checksums and retry with exponential backoff.

use async_trait::async_trait;
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::defaults;
use crate::core::sync::UpstreamFetcher;
use crate::error::DownloadError;

/// Progress callback type for download progress reporting
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Download result containing file path and metadata
#[derive(Debug)]
pub struct DownloadResult {
    /// Path to the downloaded file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// SHA256 checksum of the downloaded content
    pub checksum: String,
}

/// Download manager for fetching pages and files with retry
#[derive(Debug, Clone)]
pub struct DownloadManager {
    /// HTTP client
    client: reqwest::Client,
    /// Maximum attempts per request
    max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds)
    base_delay_ms: u64,
}

impl DownloadManager {
    /// Create a new download manager
    pub fn new() -> Self {
        Self::with_config(defaults::MAX_DOWNLOAD_RETRIES, defaults::RETRY_BASE_DELAY_MS)
    }

    /// Create a download manager with custom settings
    pub fn with_config(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            client: build_client(defaults::REQUEST_TIMEOUT_SECS),
            max_retries: max_retries.max(1),
            base_delay_ms,
        }
    }

    /// Replace the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = build_client(timeout_secs);
        self
    }

    /// Get max retries
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fetch a page as text with retry logic
    pub async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        self.retrying(url, || self.fetch_text_once(url)).await
    }

    /// Download a file with retry logic
    ///
    /// # Arguments
    /// * `url` - URL to download from
    /// * `dest` - Destination path
    /// * `progress` - Optional progress callback (`bytes_downloaded`, `total_bytes`)
    ///
    /// # Returns
    /// Download result with path, size, and checksum
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<DownloadResult, DownloadError> {
        let result = self
            .retrying(url, || self.download_once(url, dest, progress.as_ref()))
            .await;

        if result.is_err() {
            // Clean up partial download on failure
            let _ = tokio::fs::remove_file(dest).await;
        }

        result
    }

    async fn retrying<T, F, Fut>(&self, url: &str, mut attempt: F) -> Result<T, DownloadError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DownloadError>>,
    {
        let mut attempts = 0;
        let mut last_error = None;
        let mut delay_ms = self.base_delay_ms;

        while attempts < self.max_retries {
            attempts += 1;

            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::debug!("Attempt {attempts}/{} for {url} failed: {e}", self.max_retries);
                    last_error = Some(e);

                    if attempts < self.max_retries {
                        // Exponential backoff with cap at 30 seconds
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(30_000);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DownloadError::MaxRetriesExceeded {
            url: url.to_string(),
            retries: self.max_retries,
        }))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DownloadError::NetworkError {
                url: url.to_string(),
                error: format!("HTTP {}", response.status()),
            });
        }

        Ok(response)
    }

    async fn fetch_text_once(&self, url: &str) -> Result<String, DownloadError> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })
    }

    /// Single download attempt without retry
    async fn download_once(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<&ProgressCallback>,
    ) -> Result<DownloadResult, DownloadError> {
        let response = self.get(url).await?;
        let total_size = response.content_length().unwrap_or(0);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        let mut file = File::create(dest)
            .await
            .map_err(|e| DownloadError::IoError {
                path: dest.to_path_buf(),
                error: e.to_string(),
            })?;

        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: dest.to_path_buf(),
                    error: e.to_string(),
                })?;

            hasher.update(&chunk);
            downloaded += chunk.len() as u64;

            if let Some(cb) = progress {
                cb(downloaded, total_size);
            }
        }

        file.flush().await.map_err(|e| DownloadError::IoError {
            path: dest.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(DownloadResult {
            path: dest.to_path_buf(),
            size: downloaded,
            checksum: hex::encode(hasher.finalize()),
        })
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamFetcher for DownloadManager {
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        DownloadManager::fetch_text(self, url).await
    }
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA256 checksum of a file
pub fn file_checksum(path: &Path) -> Result<String, DownloadError> {
    let content = std::fs::read(path).map_err(|e| DownloadError::IoError {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    Ok(compute_checksum(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // ============================================
    // Unit Tests - Checksums
    // ============================================

    #[test]
    fn test_compute_checksum() {
        assert_eq!(
            compute_checksum(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_compute_checksum_empty() {
        assert_eq!(
            compute_checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_file_checksum() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("config");
        std::fs::write(&file_path, b"hello world").unwrap();

        assert_eq!(
            file_checksum(&file_path).unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_file_checksum_missing_file() {
        let result = file_checksum(Path::new("/nonexistent/file.txt"));
        assert!(matches!(result, Err(DownloadError::IoError { .. })));
    }

    #[test]
    fn test_download_manager_settings() {
        assert_eq!(DownloadManager::new().max_retries(), 3);
        assert_eq!(DownloadManager::with_config(5, 500).max_retries(), 5);
        assert_eq!(DownloadManager::with_config(0, 500).max_retries(), 1);
    }

    // ============================================
    // Async Tests - Page fetching
    // ============================================

    #[tokio::test]
    async fn test_fetch_text_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/packages/core/x86_64/linux/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<meta itemprop="version" content="6.2.arch1-1"/>"#),
            )
            .mount(&mock_server)
            .await;

        let manager = DownloadManager::with_config(1, 10);
        let body = manager
            .fetch_text(&format!("{}/packages/core/x86_64/linux/", mock_server.uri()))
            .await
            .unwrap();

        assert!(body.contains("6.2.arch1-1"));
    }

    #[tokio::test]
    async fn test_fetch_text_retries_then_fails() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(&mock_server)
            .await;

        let manager = DownloadManager::with_config(2, 10);
        let result = manager
            .fetch_text(&format!("{}/missing", mock_server.uri()))
            .await;

        match result {
            Err(DownloadError::NetworkError { error, .. }) => assert!(error.contains("404")),
            other => panic!("Expected NetworkError, got: {other:?}"),
        }
    }

    // ============================================
    // Async Tests - File downloads
    // ============================================

    #[tokio::test]
    async fn test_download_success() {
        let mock_server = MockServer::start().await;
        let content = b"test file content";

        Mock::given(method("GET"))
            .and(path("/linux-6.2.tar.xz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("nested").join("linux-6.2.tar.xz");
        let manager = DownloadManager::new();

        let result = manager
            .download(&format!("{}/linux-6.2.tar.xz", mock_server.uri()), &dest, None)
            .await
            .unwrap();

        assert_eq!(result.checksum, compute_checksum(content));
        assert_eq!(result.size, content.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), content);
    }

    #[tokio::test]
    async fn test_download_with_progress_callback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/progress.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"progress".to_vec()))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("progress.txt");
        let manager = DownloadManager::new();

        let progress_called = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let progress_called_clone = progress_called.clone();

        let progress: ProgressCallback = Box::new(move |downloaded, _total| {
            if downloaded > 0 {
                progress_called_clone.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        });

        let result = manager
            .download(
                &format!("{}/progress.txt", mock_server.uri()),
                &dest,
                Some(progress),
            )
            .await;

        assert!(result.is_ok());
        assert!(progress_called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_download_retry_on_failure() {
        let mock_server = MockServer::start().await;
        let content = b"retry content";

        // First two requests fail, third succeeds
        Mock::given(method("GET"))
            .and(path("/retry.txt"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/retry.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("retry.txt");
        let manager = DownloadManager::with_config(3, 10);

        let result = manager
            .download(&format!("{}/retry.txt", mock_server.uri()), &dest, None)
            .await
            .unwrap();

        assert_eq!(result.checksum, compute_checksum(content));
    }

    #[tokio::test]
    async fn test_download_max_retries_exceeded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/fail.txt"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("fail.txt");
        let manager = DownloadManager::with_config(3, 10);

        let result = manager
            .download(&format!("{}/fail.txt", mock_server.uri()), &dest, None)
            .await;

        assert!(result.is_err());
        assert!(!dest.exists());
    }

    // ============================================
    // Property-Based Tests
    // ============================================

    fn data_strategy() -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(any::<u8>(), 0..1000)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// File and in-memory checksums agree
        #[test]
        fn prop_file_checksum_matches_memory(data in data_strategy()) {
            let temp = TempDir::new().unwrap();
            let file_path = temp.path().join("test.bin");
            std::fs::write(&file_path, &data).unwrap();

            prop_assert_eq!(file_checksum(&file_path).unwrap(), compute_checksum(&data));
        }

        /// Checksum is always 64 hex characters
        #[test]
        fn prop_checksum_format(data in data_strategy()) {
            let checksum = compute_checksum(&data);
            prop_assert_eq!(checksum.len(), 64);
            prop_assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
