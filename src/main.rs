use anyhow::Result;
use clap::Parser;
use ffi_fetch::install::{InstallOptions, install};
use ffi_fetch::platform::{PlatformArch, PlatformOs};
use ffi_fetch::runtime::RealRuntime;
use std::path::PathBuf;

/// ffi-fetch - prebuilt livekit-ffi downloader
///
/// Downloads a prebuilt livekit-ffi binary from the GitHub releases of
/// livekit/client-sdk-rust and unpacks it into the output directory. Used by
/// the language bindings as a pre-build step; platform and architecture are
/// autodetected by default to keep CI invocations simple.
// No auto --version flag: that id is taken by the artifact version argument
#[derive(Parser, Debug)]
#[command(author, about)]
struct Cli {
    /// Target platform (autodetected when omitted)
    #[arg(long, value_enum)]
    platform: Option<PlatformOs>,

    /// Target architecture (autodetected when omitted)
    #[arg(long, value_enum)]
    arch: Option<PlatformArch>,

    /// Version to download (read from livekit-ffi/Cargo.toml when omitted)
    #[arg(long)]
    version: Option<String>,

    /// Output path
    #[arg(long, short, value_name = "PATH")]
    output: PathBuf,

    /// Release host URL (defaults to the GitHub release store)
    #[arg(long = "base-url", value_name = "URL", hide = true)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    install(
        &runtime,
        InstallOptions {
            platform: cli.platform,
            arch: cli.arch,
            version: cli.version,
            output: cli.output,
            base_url: cli.base_url,
        },
    )
    .await?;

    Ok(())
}
