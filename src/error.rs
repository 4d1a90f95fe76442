//! Typed errors for the fetch pipeline.
//!
//! Every error here is fatal to the run: there is no retry and no fallback
//! scheme anywhere in the pipeline. Errors are carried inside the `anyhow`
//! chain so callers can downcast to inspect the concrete kind.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// OS or architecture could not be determined and was not configured.
    /// Raised before any network activity.
    #[error("could not determine target {0}; pass --{0} explicitly")]
    UnresolvedTarget(&'static str),

    /// No explicit version was given and the companion manifest is missing
    /// or does not contain a `version = "X.Y.Z"` declaration.
    #[error("version not found: {0}")]
    VersionNotFound(String),

    /// The release host answered with a non-success HTTP status.
    #[error("failed to download, status: {status}")]
    DownloadFailed { status: u16 },

    /// Transport-level failure (DNS, connection refused, reset).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The downloaded archive is not a valid ZIP or cannot be written
    /// to the destination.
    #[error("failed to extract archive: {0}")]
    ExtractionFailed(String),
}
