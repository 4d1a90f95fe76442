//! Deterministic mapping from (os, arch, version) to a release asset.
//!
//! The release tag layout has changed once already (flat `ffi-v{version}`
//! tags gave way to scoped package tags), so the tag shape is data selected
//! by [`TagScheme`] rather than a second code path.

use crate::platform::PlatformTarget;

/// Release-asset host for the prebuilt FFI binaries.
pub const DEFAULT_BASE_URL: &str = "https://github.com/livekit/client-sdk-rust/releases/download";

/// Package name embedded in scoped release tags.
const FFI_PACKAGE: &str = "livekit-ffi";

/// Scope prefix for the current monorepo release tags.
const TAG_SCOPE: &str = "rust-sdks";

/// Release tag naming scheme. Exactly one scheme is in effect per build;
/// the locator never probes multiple schemes for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagScheme {
    /// Current scheme: `rust-sdks/livekit-ffi@{version}`
    #[default]
    ScopedPackage,
    /// Legacy scheme: `ffi-v{version}`
    FlatTag,
}

impl TagScheme {
    fn release_tag(&self, version: &str) -> String {
        match self {
            TagScheme::ScopedPackage => format!("{}/{}@{}", TAG_SCOPE, FFI_PACKAGE, version),
            TagScheme::FlatTag => format!("ffi-v{}", version),
        }
    }
}

/// The (filename, url) pair identifying one downloadable release artifact.
/// Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocator {
    pub filename: String,
    pub url: String,
}

/// Builds the asset locator for a target and version. Pure function: no I/O,
/// identical inputs always yield identical outputs.
pub fn build_locator(
    target: &PlatformTarget,
    version: &str,
    base_url: &str,
    scheme: TagScheme,
) -> AssetLocator {
    let filename = format!("ffi-{}-{}.zip", target.os, target.arch);
    let url = format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        scheme.release_tag(version),
        filename
    );
    AssetLocator { filename, url }
}
