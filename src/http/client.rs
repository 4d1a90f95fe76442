//! HTTP client for release-asset downloads.
//!
//! Every failure is final: the release host is a static file server, so a
//! failed request is surfaced to the caller as-is, with no retry and no
//! alternative URL probing.

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use std::io::Write;

use crate::error::FetchError;

/// Thin wrapper over a reqwest Client for streamed GET downloads.
#[derive(Clone, Default)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Streams a GET response into the writer produced by `create_writer`.
    ///
    /// The response status is checked before any byte of the body is
    /// consumed, so an error page is never written out as archive data and
    /// no writer is created for a failed request. Returns the number of
    /// bytes written.
    #[tracing::instrument(skip(self, create_writer))]
    pub async fn download_to<W, F>(&self, url: &str, create_writer: F) -> Result<u64>
    where
        W: Write,
        F: FnOnce() -> Result<W>,
    {
        debug!("GET {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::DownloadFailed {
                status: status.as_u16(),
            }
            .into());
        }

        let mut writer = create_writer()?;
        let mut downloaded_bytes: u64 = 0;

        // Chunk sizes are whatever the transport hands back; memory use stays
        // bounded either way.
        while let Some(chunk) = response.chunk().await.map_err(FetchError::Network)? {
            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
        }

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }
}
