//! Download workers and outcome classification.
//!
//! Each file ends in exactly one of four buckets: already present on disk,
//! completed, authentication failure (terminal for that file), or failed
//! after the fixed retry count. Failures never abort sibling downloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::credentials::Credentials;

/// Configuration for the download batch.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Attempts per file before giving up.
    pub max_retries: u32,
    /// Fixed wait between attempts.
    pub retry_delay: Duration,
    /// HTTP request timeout.
    pub request_timeout: Duration,
    /// Directory for completed downloads.
    pub output_dir: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            request_timeout: Duration::from_secs(600),
            output_dir: PathBuf::from("."),
        }
    }
}

/// Result of one fetch attempt.
#[derive(Debug)]
pub enum FetchStatus {
    /// Body written to the destination path.
    Success,
    /// HTTP 401; retrying cannot help.
    Unauthorized,
    /// Transient failure (network error or unexpected status).
    Error(String),
}

/// Final classification for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The target file already existed on disk.
    AlreadyPresent,
    /// Download completed.
    Completed,
    /// Authentication failed (HTTP 401).
    AuthFailed,
    /// All retry attempts exhausted.
    Failed,
}

/// One fetch attempt against the archive. Sits behind a trait so the
/// classification logic is testable without a network.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> FetchStatus;
}

/// Authenticated reqwest-backed fetcher. Each worker builds its own session.
pub struct HttpFetch {
    client: Client,
    credentials: Credentials,
}

impl HttpFetch {
    /// Build a session with the archive credentials.
    pub fn new(credentials: Credentials, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .user_agent("atmos-pipelines-downloader")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            credentials,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn fetch(&self, url: &str, dest: &Path) -> FetchStatus {
        let response = match self
            .client
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return FetchStatus::Error(format!("request failed: {e}")),
        };

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return FetchStatus::Unauthorized,
            status => return FetchStatus::Error(format!("HTTP {status}")),
        }

        // Stream to a partial file, rename into place when complete
        let partial = dest.with_extension("partial");
        let mut file = match fs::File::create(&partial).await {
            Ok(file) => file,
            Err(e) => return FetchStatus::Error(format!("cannot create {}: {e}", partial.display())),
        };

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(file);
                    fs::remove_file(&partial).await.ok();
                    return FetchStatus::Error(format!("stream error: {e}"));
                }
            };
            if let Err(e) = file.write_all(&chunk).await {
                drop(file);
                fs::remove_file(&partial).await.ok();
                return FetchStatus::Error(format!("write error: {e}"));
            }
        }

        if let Err(e) = file.flush().await {
            return FetchStatus::Error(format!("flush error: {e}"));
        }
        drop(file);

        if let Err(e) = fs::rename(&partial, dest).await {
            return FetchStatus::Error(format!("rename error: {e}"));
        }
        FetchStatus::Success
    }
}

/// Derive the target filename from a URL: the `LABEL=` query parameter when
/// present, the last path segment otherwise.
pub fn filename_from_url(url: &str) -> String {
    if let Some(label_part) = url.split("LABEL=").nth(1) {
        if let Some(name) = label_part.split('&').next() {
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .split('?')
        .next()
        .unwrap_or(url)
        .to_string()
}

/// Download one file with the fixed retry policy.
pub async fn download_one<F: Fetch>(
    fetcher: &F,
    config: &FetchConfig,
    url: &str,
) -> (String, DownloadOutcome) {
    let filename = filename_from_url(url);
    let dest = config.output_dir.join(&filename);

    if dest.exists() {
        info!(file = %filename, "Already exists, skipping");
        return (filename, DownloadOutcome::AlreadyPresent);
    }

    for attempt in 1..=config.max_retries {
        info!(file = %filename, attempt, "Starting download");

        match fetcher.fetch(url, &dest).await {
            FetchStatus::Success => {
                info!(file = %filename, "Completed");
                return (filename, DownloadOutcome::Completed);
            }
            FetchStatus::Unauthorized => {
                warn!(file = %filename, "Authentication failed (401)");
                return (filename, DownloadOutcome::AuthFailed);
            }
            FetchStatus::Error(reason) => {
                warn!(file = %filename, attempt, max = config.max_retries, %reason, "Attempt failed");
            }
        }

        if attempt < config.max_retries {
            tokio::time::sleep(config.retry_delay).await;
        }
    }

    warn!(file = %filename, retries = config.max_retries, "Giving up");
    (filename, DownloadOutcome::Failed)
}

/// Tally of a finished batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub already_present: usize,
    pub completed: usize,
    pub auth_failed: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::AlreadyPresent => self.already_present += 1,
            DownloadOutcome::Completed => self.completed += 1,
            DownloadOutcome::AuthFailed => self.auth_failed += 1,
            DownloadOutcome::Failed => self.failed += 1,
        }
    }
}

/// Run the whole URL list through a fixed-size worker pool.
///
/// `make_fetcher` is called once per file so every worker owns its session;
/// a session that cannot be built counts as a failure for that file only.
/// Results are reported as they finish; completion order is unspecified.
pub async fn run_batch<F, M>(
    urls: &[String],
    config: &FetchConfig,
    make_fetcher: M,
    max_concurrent: usize,
) -> BatchSummary
where
    F: Fetch,
    M: Fn() -> Result<F>,
{
    let results = stream::iter(urls)
        .map(|url| {
            let fetcher = make_fetcher();
            let config = config.clone();
            async move {
                match fetcher {
                    Ok(fetcher) => download_one(&fetcher, &config, url).await,
                    Err(e) => {
                        warn!(url = %url, error = %e, "Could not build session");
                        (filename_from_url(url), DownloadOutcome::Failed)
                    }
                }
            }
        })
        .buffer_unordered(max_concurrent.max(1))
        .collect::<Vec<_>>()
        .await;

    let mut summary = BatchSummary::default();
    for (_, outcome) in results {
        summary.record(outcome);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_filename_from_label_url() {
        let url = "https://archive.example/daac-bin/OTF/HTTP_services.cgi?\
                   FILENAME=%2Fdata%2Ffile.nc4&LABEL=MERRA2_400.tavg3_3d.20230115.SUB.nc&FLAGS=1";
        assert_eq!(
            filename_from_url(url),
            "MERRA2_400.tavg3_3d.20230115.SUB.nc"
        );
    }

    #[test]
    fn test_filename_from_plain_url() {
        assert_eq!(
            filename_from_url("https://archive.example/data/2023/granule.nc4?download=1"),
            "granule.nc4"
        );
    }

    /// Scripted fetcher driving every classification path.
    struct MockFetch {
        attempts: AtomicU32,
    }

    #[async_trait]
    impl Fetch for MockFetch {
        async fn fetch(&self, url: &str, dest: &Path) -> FetchStatus {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if url.contains("ok") {
                std::fs::write(dest, b"data").unwrap();
                FetchStatus::Success
            } else if url.contains("denied") {
                FetchStatus::Unauthorized
            } else {
                FetchStatus::Error("boom".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_outcome_classification() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig {
            max_retries: 3,
            retry_delay: Duration::from_millis(1),
            request_timeout: Duration::from_secs(1),
            output_dir: dir.path().to_path_buf(),
        };

        // One file already on disk
        std::fs::write(dir.path().join("present.nc"), b"cached").unwrap();

        let urls = vec![
            "https://archive.example/present.nc".to_string(),
            "https://archive.example/ok.nc".to_string(),
            "https://archive.example/denied.nc".to_string(),
            "https://archive.example/flaky.nc".to_string(),
        ];

        let summary = run_batch(
            &urls,
            &config,
            || {
                Ok(MockFetch {
                    attempts: AtomicU32::new(0),
                })
            },
            4,
        )
        .await;

        // Exactly one of each classification
        assert_eq!(
            summary,
            BatchSummary {
                already_present: 1,
                completed: 1,
                auth_failed: 1,
                failed: 1,
            }
        );
        assert!(dir.path().join("ok.nc").exists());
        assert!(!dir.path().join("flaky.nc").exists());
    }

    #[tokio::test]
    async fn test_retry_count_is_fixed() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig {
            max_retries: 3,
            retry_delay: Duration::from_millis(1),
            request_timeout: Duration::from_secs(1),
            output_dir: dir.path().to_path_buf(),
        };

        let fetcher = MockFetch {
            attempts: AtomicU32::new(0),
        };
        let (_, outcome) =
            download_one(&fetcher, &config, "https://archive.example/flaky.nc").await;

        assert_eq!(outcome, DownloadOutcome::Failed);
        assert_eq!(fetcher.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig {
            max_retries: 3,
            retry_delay: Duration::from_millis(1),
            request_timeout: Duration::from_secs(1),
            output_dir: dir.path().to_path_buf(),
        };

        let fetcher = MockFetch {
            attempts: AtomicU32::new(0),
        };
        let (_, outcome) =
            download_one(&fetcher, &config, "https://archive.example/denied.nc").await;

        assert_eq!(outcome, DownloadOutcome::AuthFailed);
        // No retries after a 401
        assert_eq!(fetcher.attempts.load(Ordering::SeqCst), 1);
    }
}
