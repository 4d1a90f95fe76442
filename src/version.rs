//! Version resolution for the FFI artifact.
//!
//! An explicitly configured version always wins. Without one, the version is
//! read out of the companion `livekit-ffi/Cargo.toml` manifest that ships
//! next to this crate, matching the first `version = "X.Y.Z"` declaration.

use anyhow::Result;
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::FetchError;
use crate::runtime::Runtime;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"version\s*=\s*"(\d+\.\d+\.\d+)""#).unwrap());

/// Default location of the companion manifest, relative to the crate root.
pub fn default_manifest_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("livekit-ffi")
        .join("Cargo.toml")
}

/// Resolves the version to fetch: the explicit value unchanged when given,
/// otherwise the dotted-triple version declared in the manifest.
#[tracing::instrument(skip(runtime, manifest_path))]
pub fn resolve_version<R: Runtime>(
    runtime: &R,
    explicit: Option<&str>,
    manifest_path: &Path,
) -> Result<String> {
    if let Some(version) = explicit
        && !version.is_empty()
    {
        return Ok(version.to_string());
    }

    debug!("no explicit version, reading {}", manifest_path.display());

    let contents = runtime.read_to_string(manifest_path).map_err(|_| {
        FetchError::VersionNotFound(format!("cannot read {}", manifest_path.display()))
    })?;

    let version = VERSION_RE
        .captures(&contents)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| {
            FetchError::VersionNotFound(format!(
                "no version declaration in {}",
                manifest_path.display()
            ))
        })?;

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_version_returned_unchanged() {
        let runtime = RealRuntime;
        // Manifest path must not be touched when a version is given
        let version =
            resolve_version(&runtime, Some("1.2.3"), Path::new("/nonexistent/Cargo.toml"))
                .unwrap();
        assert_eq!(version, "1.2.3");
    }

    #[test]
    fn test_explicit_version_not_validated() {
        let runtime = RealRuntime;
        let version = resolve_version(
            &runtime,
            Some("not-a-semver"),
            Path::new("/nonexistent/Cargo.toml"),
        )
        .unwrap();
        assert_eq!(version, "not-a-semver");
    }

    #[test]
    fn test_version_parsed_from_manifest() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("Cargo.toml");
        fs::write(
            &manifest,
            "[package]\nname = \"livekit-ffi\"\nversion = \"0.12.43\"\nedition = \"2021\"\n",
        )
        .unwrap();

        let version = resolve_version(&RealRuntime, None, &manifest).unwrap();
        assert_eq!(version, "0.12.43");
    }

    #[test]
    fn test_empty_explicit_falls_back_to_manifest() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("Cargo.toml");
        fs::write(&manifest, "version = \"2.0.1\"\n").unwrap();

        let version = resolve_version(&RealRuntime, Some(""), &manifest).unwrap();
        assert_eq!(version, "2.0.1");
    }

    #[test]
    fn test_missing_manifest_is_version_not_found() {
        let dir = tempdir().unwrap();
        let result = resolve_version(&RealRuntime, None, &dir.path().join("Cargo.toml"));

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::VersionNotFound(_))
        ));
    }

    #[test]
    fn test_manifest_without_version_is_version_not_found() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("Cargo.toml");
        fs::write(&manifest, "[package]\nname = \"livekit-ffi\"\n").unwrap();

        let result = resolve_version(&RealRuntime, None, &manifest);

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::VersionNotFound(_))
        ));
    }

    #[test]
    fn test_partial_version_does_not_match() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("Cargo.toml");
        fs::write(&manifest, "version = \"1.2\"\n").unwrap();

        let result = resolve_version(&RealRuntime, None, &manifest);
        assert!(result.is_err());
    }

    #[test]
    fn test_first_match_wins() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("Cargo.toml");
        fs::write(
            &manifest,
            "version = \"3.1.4\"\n[dependencies]\nlog = { version = \"0.4.29\" }\n",
        )
        .unwrap();

        let version = resolve_version(&RealRuntime, None, &manifest).unwrap();
        assert_eq!(version, "3.1.4");
    }
}
