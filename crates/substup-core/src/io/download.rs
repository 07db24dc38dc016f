//! Streaming download with SHA-256 computed over the wire.
//!
//! The archive is hashed while it is written, so by the time the last byte
//! lands on disk the integrity verdict is already known. Verification fails
//! closed: a file that does not hash to the published digest never survives
//! to the extraction step.
//!
//! Failures are split into two classes. Transport errors and short bodies
//! are transient and retried with backoff; a digest mismatch on a fully
//! received body is permanent for that URL and is never retried, since
//! refetching identical bytes would reproduce the identical mismatch.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use substup_schema::Sha256Digest;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::Reporter;

/// Maximum fetch attempts for transient failures.
const MAX_ATTEMPTS: u32 = 3;

/// Base delay before a retry; doubles per attempt.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Request timeout for a single fetch.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before `Content-Length` bytes arrived. Retryable.
    #[error("truncated download: received {received} of {announced} bytes")]
    Truncated { received: u64, announced: u64 },

    /// The complete body hashed to something other than the published
    /// digest. Not retryable.
    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
}

impl DownloadError {
    /// Whether retrying the same URL can possibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Io(_) | Self::Truncated { .. })
    }
}

/// Build the HTTP client used for artifact downloads.
pub fn client() -> Result<Client, DownloadError> {
    Ok(Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(crate::USER_AGENT)
        .build()?)
}

/// Download `url` to `dest`, verifying the received bytes against `expected`.
///
/// The body is streamed into `dest` with a `.part` suffix and renamed into
/// place only after the digest check passes. Transient failures are retried
/// up to three times with exponential backoff; a digest mismatch aborts
/// immediately and removes the partial file.
pub async fn download_and_verify<R: Reporter>(
    client: &Client,
    url: &str,
    dest: &Path,
    expected: &Sha256Digest,
    reporter: &R,
) -> Result<(), DownloadError> {
    let part = dest.with_extension("part");
    let mut last_error = None;

    for attempt in 1..=MAX_ATTEMPTS {
        if attempt > 1 {
            let delay = RETRY_DELAY * 2u32.pow(attempt - 2);
            reporter.info(&format!("retrying download (attempt {attempt}/{MAX_ATTEMPTS})"));
            tokio::time::sleep(delay).await;
        }

        match fetch_once(client, url, &part, expected, reporter).await {
            Ok(()) => {
                tokio::fs::rename(&part, dest).await?;
                return Ok(());
            }
            Err(error) => {
                let _ = tokio::fs::remove_file(&part).await;
                if !error.is_transient() {
                    reporter.failed(&error.to_string());
                    return Err(error);
                }
                tracing::debug!(%url, attempt, error = %error, "download attempt failed");
                last_error = Some(error);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| std::io::Error::other("download retries exhausted").into()))
}

/// One fetch attempt: stream, hash, then classify the outcome.
async fn fetch_once<R: Reporter>(
    client: &Client,
    url: &str,
    dest: &Path,
    expected: &Sha256Digest,
    reporter: &R,
) -> Result<(), DownloadError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let response = client.get(url).send().await?.error_for_status()?;
    let announced = response.content_length();

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha256::new();
    let mut received: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
        received += chunk.len() as u64;
        reporter.downloading(received, announced);
    }

    file.flush().await?;
    drop(file);

    let actual = hex::encode(hasher.finalize());
    classify(received, announced, &actual, expected)
}

/// Decide whether a completed stream is intact, truncated, or tampered.
///
/// A short body is reported as [`DownloadError::Truncated`] even though its
/// digest also differs: truncation is the transient condition and must win
/// the classification so the caller retries instead of giving up.
fn classify(
    received: u64,
    announced: Option<u64>,
    actual: &str,
    expected: &Sha256Digest,
) -> Result<(), DownloadError> {
    if let Some(announced) = announced
        && received < announced
    {
        return Err(DownloadError::Truncated {
            received,
            announced,
        });
    }

    if !expected.matches(actual) {
        return Err(DownloadError::DigestMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }

    Ok(())
}
