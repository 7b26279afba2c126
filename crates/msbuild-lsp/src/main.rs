//! msbuild-lsp binary - language server for MSBuild project files over stdio

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use msbuild_lsp_core::ServerConfig;

const DEFAULT_FILTER: &str = "msbuild_lsp=info,msbuild_lsp_core=info";

#[derive(Parser, Debug)]
#[command(name = "msbuild-lsp", version)]
#[command(about = "Language server for MSBuild project files")]
struct Args {
    /// Log level for this server's crates (overrides RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Directory containing SDKs as <root>/<Name>/Sdk/Sdk.props.
    /// Can be specified multiple times; replaces MSBUILD_SDKS_PATH.
    #[arg(long = "sdk-root", value_name = "DIR")]
    sdk_roots: Vec<PathBuf>,

    /// Local package folder laid out as <root>/<id>/<version>/.
    /// Can be specified multiple times; replaces the default NuGet cache.
    #[arg(long = "package-source", value_name = "DIR")]
    package_sources: Vec<PathBuf>,
}

impl Args {
    fn filter(&self) -> EnvFilter {
        match &self.log_level {
            Some(level) => EnvFilter::new(format!(
                "msbuild_lsp={level},msbuild_lsp_core={level}"
            )),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
        }
    }

    fn config(&self) -> ServerConfig {
        let mut config = ServerConfig::from_env();
        if !self.sdk_roots.is_empty() {
            config.sdk_roots = self.sdk_roots.clone();
        }
        if !self.package_sources.is_empty() {
            config.package_sources = self.package_sources.clone();
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::registry()
        .with(args.filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = args.config();
    info!(
        sdk_roots = ?config.sdk_roots,
        package_sources = ?config.package_sources,
        "starting msbuild-lsp"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(msbuild_lsp::run_server(config));

    Ok(())
}
