//! Host platform detection and normalization.
//!
//! Derives the default (os, arch) pair for the running machine. Explicit
//! configuration always takes precedence; detection only fills the gaps.
//! Inside a cibuildwheel macOS build the architecture being compiled for can
//! differ from the host's native one, so a separate override path reads the
//! compiler arch flags instead of trusting the machine architecture.

use clap::ValueEnum;
use log::{debug, info};
use std::fmt;

use crate::runtime::Runtime;

/// Environment flag set by cibuildwheel inside wheel-building containers.
pub const ENV_CIBUILDWHEEL: &str = "CIBUILDWHEEL";

/// Compiler architecture flags consulted during macOS cross-compilation.
pub const ENV_ARCHFLAGS: &str = "ARCHFLAGS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformOs {
    Macos,
    Linux,
    Windows,
    Ios,
    Android,
}

impl fmt::Display for PlatformOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformOs::Macos => "macos",
            PlatformOs::Linux => "linux",
            PlatformOs::Windows => "windows",
            PlatformOs::Ios => "ios",
            PlatformOs::Android => "android",
        };
        f.write_str(name)
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArch {
    #[value(name = "x86_64")]
    X86_64,
    Arm64,
    Armv7,
}

impl fmt::Display for PlatformArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformArch::X86_64 => "x86_64",
            PlatformArch::Arm64 => "arm64",
            PlatformArch::Armv7 => "armv7",
        };
        f.write_str(name)
    }
}

/// A fully resolved (os, arch) pair. Both fields are guaranteed non-empty
/// by construction; an undetectable value never reaches this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTarget {
    pub os: PlatformOs,
    pub arch: PlatformArch,
}

/// Classifies a raw platform identifier into a supported desktop OS.
/// Mobile targets are valid configuration values but are never auto-detected.
pub fn classify_os(raw: &str) -> Option<PlatformOs> {
    match raw {
        "windows" => Some(PlatformOs::Windows),
        "macos" => Some(PlatformOs::Macos),
        "linux" => Some(PlatformOs::Linux),
        _ => None,
    }
}

/// Detects the OS of the running host.
pub fn resolve_os() -> Option<PlatformOs> {
    classify_os(std::env::consts::OS)
}

/// Normalizes a raw machine-architecture string through the alias table.
/// Unrecognized values stay unresolved; the caller decides whether that
/// is fatal.
pub fn normalize_arch(raw: &str) -> Option<PlatformArch> {
    match raw.to_lowercase().as_str() {
        "amd64" | "x86_64" => Some(PlatformArch::X86_64),
        "arm64" | "aarch64" => Some(PlatformArch::Arm64),
        "armv7" | "armv7l" => Some(PlatformArch::Armv7),
        _ => None,
    }
}

/// Detects the architecture of the running host, applying the cibuildwheel
/// override when it is in effect.
pub fn resolve_arch<R: Runtime>(runtime: &R) -> Option<PlatformArch> {
    let detected = normalize_arch(std::env::consts::ARCH);
    debug!("initial arch: {:?}", detected);

    if let Some(forced) = cibuildwheel_override(runtime, resolve_os()) {
        return Some(forced);
    }

    detected
}

/// When cibuildwheel cross-compiles a macOS wheel, the host arch is not the
/// arch being built for; ARCHFLAGS carries the truth. Returns None when the
/// override does not apply.
fn cibuildwheel_override<R: Runtime>(
    runtime: &R,
    os: Option<PlatformOs>,
) -> Option<PlatformArch> {
    if os != Some(PlatformOs::Macos) {
        return None;
    }

    let flagged = runtime
        .env_var(ENV_CIBUILDWHEEL)
        .map(|v| !v.is_empty())
        .unwrap_or(false);
    if !flagged {
        return None;
    }

    let archflags = runtime.env_var(ENV_ARCHFLAGS).unwrap_or_default();
    info!("cibuildwheel is being used, archflags: {}", archflags);

    if archflags.contains("arm64") {
        Some(PlatformArch::Arm64)
    } else {
        Some(PlatformArch::X86_64)
    }
}
