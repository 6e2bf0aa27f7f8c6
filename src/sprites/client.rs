//! ArchiveClient - downloads the sprite archive over HTTP.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use super::error::SpriteError;
use super::retry::{
    calculate_backoff, is_transient_network_error, is_transient_status, DEFAULT_BACKOFF_BASE,
    DEFAULT_BACKOFF_MAX, DEFAULT_NETWORK_RETRIES,
};

/// Zip of the pokesprite repository's master branch.
pub const DEFAULT_ARCHIVE_URL: &str =
    "https://github.com/msikma/pokesprite/archive/refs/heads/master.zip";

/// Default timeout for the whole download (5 minutes; the archive is large).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for fetching the sprite archive.
pub struct ArchiveClient {
    url: String,
    http_client: reqwest::Client,
}

impl ArchiveClient {
    /// Create a client for [`DEFAULT_ARCHIVE_URL`].
    pub fn new() -> Result<Self, SpriteError> {
        Self::with_url(DEFAULT_ARCHIVE_URL.to_string())
    }

    /// Create a client for a custom archive URL (mirrors, tests).
    pub fn with_url(url: String) -> Result<Self, SpriteError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .user_agent(concat!("pokesprite/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { url, http_client })
    }

    /// Get the archive URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the archive to `dest`.
    ///
    /// The body is streamed to `<dest>.part` and renamed into place once
    /// complete, so an interrupted download never leaves a truncated
    /// archive at `dest`.
    ///
    /// # Returns
    /// The number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `SpriteError::HttpError` if the request fails,
    /// `SpriteError::Status` for a non-success response and
    /// `SpriteError::IoError` if writing to disk fails.
    pub async fn download(&self, dest: &Path) -> Result<u64, SpriteError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        log::info!("Downloading sprite archive from {}", self.url);
        let response = self.http_client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(SpriteError::Status {
                status: response.status().as_u16(),
                url: self.url.clone(),
            });
        }

        let partial = partial_path(dest);
        let written = match write_body(response, &partial).await {
            Ok(written) => written,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };
        tokio::fs::rename(&partial, dest).await?;

        log::info!("Sprite archive saved to {} ({} bytes)", dest.display(), written);
        Ok(written)
    }

    /// Download with the default retry policy.
    ///
    /// See [`download_with_retry_config`](Self::download_with_retry_config).
    pub async fn download_with_retry(&self, dest: &Path) -> Result<u64, SpriteError> {
        self.download_with_retry_config(
            dest,
            DEFAULT_NETWORK_RETRIES,
            DEFAULT_BACKOFF_BASE,
            DEFAULT_BACKOFF_MAX,
        )
        .await
    }

    /// Download, retrying transient failures with exponential backoff.
    ///
    /// Connection errors, timeouts, interrupted bodies and 502/503/504
    /// responses are retried up to `max_attempts` attempts in total. Other
    /// errors are returned immediately.
    ///
    /// # Errors
    ///
    /// Returns `SpriteError::NetworkError` once the attempts are exhausted.
    pub async fn download_with_retry_config(
        &self,
        dest: &Path,
        max_attempts: u32,
        backoff_base: Duration,
        backoff_max: Duration,
    ) -> Result<u64, SpriteError> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.download(dest).await {
                Ok(written) => return Ok(written),
                Err(e) if is_retryable(&e) => {
                    if attempt >= max_attempts {
                        log::error!(
                            "Archive download failed after {} attempts: {}",
                            attempt,
                            e
                        );
                        return Err(SpriteError::NetworkError {
                            message: e.to_string(),
                            attempts: attempt,
                        });
                    }

                    let delay = calculate_backoff(attempt - 1, backoff_base, backoff_max);
                    log::warn!(
                        "Archive download failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempt,
                        max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

async fn write_body(response: reqwest::Response, path: &Path) -> Result<u64, SpriteError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

fn is_retryable(error: &SpriteError) -> bool {
    match error {
        SpriteError::HttpError(e) => is_transient_network_error(e),
        SpriteError::Status { status, .. } => is_transient_status(*status),
        _ => false,
    }
}
