//! The install pipeline: probe, resolve, locate, fetch, unpack.
//!
//! Strictly sequential; each step's failure is final and propagates to the
//! caller untouched. Explicit configuration always wins over host detection.

use anyhow::Result;
use log::info;
use std::path::PathBuf;

use crate::archive::{InstallResult, unpack};
use crate::download::fetch;
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::locator::{DEFAULT_BASE_URL, TagScheme, build_locator};
use crate::platform::{PlatformArch, PlatformOs, PlatformTarget, resolve_arch, resolve_os};
use crate::runtime::Runtime;
use crate::version::{default_manifest_path, resolve_version};

/// Inputs to one install run, produced by the CLI layer.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Target OS; detected from the host when unset.
    pub platform: Option<PlatformOs>,
    /// Target architecture; detected from the host when unset.
    pub arch: Option<PlatformArch>,
    /// Version to fetch; read from the companion manifest when unset.
    pub version: Option<String>,
    /// Destination directory for extraction.
    pub output: PathBuf,
    /// Release host override, mainly for tests.
    pub base_url: Option<String>,
}

/// Runs the full pipeline and returns where the artifact landed.
#[tracing::instrument(skip(runtime, options))]
pub async fn install<R: Runtime>(runtime: &R, options: InstallOptions) -> Result<InstallResult> {
    let os = options
        .platform
        .or_else(resolve_os)
        .ok_or(FetchError::UnresolvedTarget("platform"))?;
    let arch = options
        .arch
        .or_else(|| resolve_arch(runtime))
        .ok_or(FetchError::UnresolvedTarget("arch"))?;
    let target = PlatformTarget { os, arch };

    let version = resolve_version(runtime, options.version.as_deref(), &default_manifest_path())?;

    let base_url = options.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let locator = build_locator(&target, &version, base_url, TagScheme::default());

    info!(
        "downloading livekit-ffi v{} for {}-{}",
        version, target.os, target.arch
    );

    let http_client = HttpClient::default();
    let archive_path = fetch(runtime, &http_client, &locator).await?;

    let result = unpack(runtime, &archive_path, &options.output);
    if result.is_err() {
        // A bad archive is useless; drop it so the next run re-downloads
        let _ = runtime.remove_file(&archive_path);
    }
    let result = result?;

    info!("downloaded to {}", result.output_path.display());

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_fixtures::zip_bytes;
    use crate::runtime::RealRuntime;
    use tempfile::tempdir;

    fn options(
        os: PlatformOs,
        arch: PlatformArch,
        version: &str,
        output: PathBuf,
        base_url: &str,
    ) -> InstallOptions {
        InstallOptions {
            platform: Some(os),
            arch: Some(arch),
            version: Some(version.to_string()),
            output,
            base_url: Some(base_url.to_string()),
        }
    }

    #[tokio::test]
    async fn test_install_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let body = zip_bytes(&[("bin/tool", "v1 payload")]).unwrap();
        let mock = server
            .mock(
                "GET",
                "/rust-sdks/livekit-ffi@9.0.1/ffi-ios-x86_64.zip",
            )
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let output = dir.path().join("ffi");

        let result = install(
            &RealRuntime,
            options(
                PlatformOs::Ios,
                PlatformArch::X86_64,
                "9.0.1",
                output.clone(),
                &server.url(),
            ),
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(result.extracted_entry_count, 1);
        assert!(result.output_path.is_absolute());
        assert_eq!(
            std::fs::read_to_string(output.join("bin/tool")).unwrap(),
            "v1 payload"
        );
    }

    #[tokio::test]
    async fn test_install_rerun_overwrites_previous_artifact() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempdir().unwrap();
        let output = dir.path().join("ffi");

        let first = server
            .mock("GET", "/rust-sdks/livekit-ffi@9.0.2/ffi-ios-arm64.zip")
            .with_status(200)
            .with_body(zip_bytes(&[("bin/tool", "first")]).unwrap())
            .create_async()
            .await;
        install(
            &RealRuntime,
            options(
                PlatformOs::Ios,
                PlatformArch::Arm64,
                "9.0.2",
                output.clone(),
                &server.url(),
            ),
        )
        .await
        .unwrap();
        first.assert_async().await;

        let second = server
            .mock("GET", "/rust-sdks/livekit-ffi@9.0.3/ffi-ios-arm64.zip")
            .with_status(200)
            .with_body(zip_bytes(&[("bin/tool", "second")]).unwrap())
            .create_async()
            .await;
        install(
            &RealRuntime,
            options(
                PlatformOs::Ios,
                PlatformArch::Arm64,
                "9.0.3",
                output.clone(),
                &server.url(),
            ),
        )
        .await
        .unwrap();
        second.assert_async().await;

        // Second content replaces the first at the same path, nothing else left
        assert_eq!(
            std::fs::read_to_string(output.join("bin/tool")).unwrap(),
            "second"
        );
        assert_eq!(std::fs::read_dir(&output).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_install_download_failure_skips_extraction() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/rust-sdks/livekit-ffi@9.0.4/ffi-android-x86_64.zip",
            )
            .with_status(404)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let output = dir.path().join("ffi");

        let err = install(
            &RealRuntime,
            options(
                PlatformOs::Android,
                PlatformArch::X86_64,
                "9.0.4",
                output.clone(),
                &server.url(),
            ),
        )
        .await
        .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::DownloadFailed { status: 404 })
        ));
        // Extraction never ran
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_install_corrupt_archive_is_extraction_failed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                "/rust-sdks/livekit-ffi@9.0.5/ffi-android-arm64.zip",
            )
            .with_status(200)
            .with_body("200 OK but not a zip")
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let output = dir.path().join("ffi");

        let err = install(
            &RealRuntime,
            options(
                PlatformOs::Android,
                PlatformArch::Arm64,
                "9.0.5",
                output.clone(),
                &server.url(),
            ),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::ExtractionFailed(_))
        ));
        // The corrupt download is not left around for a later run
        assert!(!std::env::temp_dir().join("ffi-android-arm64.zip").exists());
    }
}
