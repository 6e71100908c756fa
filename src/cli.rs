//! Command line utilities.

use std::path::PathBuf;

use anyhow::{Context, Result};
pub use clap::Parser;
use clap::Args;
use tracing::{debug, info};

use crate::Config;

/// Command line usage description.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Command line options.
    #[command(flatten)]
    pub opts: Opts,
}

/// Command line options.
#[derive(Debug, Args, Clone, Default)]
pub struct Opts {
    /// Configuration file [default: "prebuild.toml" if it exists]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Site directory [default: "site"]
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Cache directory [default: "cache"]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Maximum number of files processed concurrently [default: 50]
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// WebP encoding quality, from 0 to 100 [default: 80]
    #[arg(long)]
    pub quality: Option<f32>,
}

/// Run the `build` command.
pub async fn build(opts: &Opts) -> Result<()> {
    let config = Config::from_opts(opts).context("loading configuration")?;

    println!("Source:      {}", config.input_dir.display());
    println!("Destination: {}", config.output_dir.display());

    let summary = crate::build(&config).await?;

    for (handler, count) in summary.count_by_handler() {
        debug!("{}: {} files", handler.tag(), count);
    }

    info!(
        "Wrote {} files in {:.2} seconds",
        summary.num_files(),
        summary.duration.as_secs_f64()
    );

    println!("Build complete.");

    Ok(())
}
