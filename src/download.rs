//! Streamed download of a release asset to a temp-directory path.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;

use crate::http::HttpClient;
use crate::locator::AssetLocator;
use crate::runtime::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    InFlight,
    Complete,
    Failed,
}

/// One download in progress. Created per invocation and dropped once the
/// unpacker has consumed the completed file.
#[derive(Debug)]
pub struct DownloadJob {
    pub locator: AssetLocator,
    pub temp_path: PathBuf,
    pub status: JobStatus,
}

impl DownloadJob {
    /// The temp path is keyed by the asset filename, so re-running the same
    /// fetch overwrites the previous file instead of piling up copies.
    pub fn new<R: Runtime>(runtime: &R, locator: AssetLocator) -> Self {
        let temp_path = runtime.temp_dir().join(&locator.filename);
        Self {
            locator,
            temp_path,
            status: JobStatus::Pending,
        }
    }
}

/// Fetches the asset into the temp directory and returns the downloaded
/// file's path. A failed transfer removes the partial file before the error
/// propagates, so a later run never sees a truncated archive.
#[tracing::instrument(skip(runtime, http_client))]
pub async fn fetch<R: Runtime>(
    runtime: &R,
    http_client: &HttpClient,
    locator: &AssetLocator,
) -> Result<PathBuf> {
    let mut job = DownloadJob::new(runtime, locator.clone());
    debug!("downloading {} to {:?}", job.locator.url, job.temp_path);

    job.status = JobStatus::InFlight;
    let temp_path = job.temp_path.clone();
    let result = http_client
        .download_to(&job.locator.url, || {
            runtime
                .create_file(&temp_path)
                .with_context(|| format!("Failed to create temporary file at {:?}", temp_path))
        })
        .await;

    match result {
        Ok(bytes) => {
            job.status = JobStatus::Complete;
            info!("downloaded {} bytes to {:?}", bytes, job.temp_path);
            Ok(job.temp_path)
        }
        Err(e) => {
            job.status = JobStatus::Failed;
            if runtime.exists(&job.temp_path) {
                // Best effort; the error we report is the download failure
                let _ = runtime.remove_file(&job.temp_path);
            }
            Err(e)
        }
    }
}
