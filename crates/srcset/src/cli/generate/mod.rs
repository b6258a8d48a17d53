//! The `srcset generate` command.

mod batch;
mod setup;
pub mod types;

pub use types::OutputFormat;

use clap::Args;
use srcset_core::{Config, OutputFormat as CoreOutputFormat, Srcset};
use std::path::PathBuf;

use batch::generate_batch;
use setup::setup_generator;

/// Arguments for the `generate` command.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Source references relative to the input dir (scans the input dir when omitted)
    pub srcs: Vec<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory source references are resolved against
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory variants are written under
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Base URL the output dir is served from
    #[arg(long)]
    pub public_path: Option<String>,

    /// Candidate widths, comma separated (e.g. 480,1024,1920)
    #[arg(short, long, value_delimiter = ',')]
    pub widths: Option<Vec<u32>>,

    /// Encoder quality
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub quality: Option<u32>,

    /// Disable WebP variants
    #[arg(long)]
    pub no_webp: bool,

    /// Disable AVIF variants
    #[arg(long)]
    pub no_avif: bool,

    /// Compute names and sizes without writing any files
    #[arg(long)]
    pub skip_generation: bool,

    /// Disable the placeholder
    #[arg(long)]
    pub no_placeholder: bool,

    /// Write the placeholder as files instead of inlining a data URI
    #[arg(long, conflicts_with = "no_placeholder")]
    pub file_placeholder: bool,

    /// Maximum codec and filesystem operations in flight (0 = unbounded)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Output format (defaults to the config's `output.format`)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Everything a run needs, assembled by [`setup_generator`].
pub(crate) struct GenerateContext {
    pub srcset: Srcset,
    pub output_format: CoreOutputFormat,
    pub pretty: bool,
}

/// Execute the generate command.
///
/// `config` is the configuration loaded at startup; `--config` replaces it.
pub async fn execute(args: GenerateArgs, config: Config) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => config,
    };
    let ctx = setup_generator(&args, config)?;

    let srcs = if args.srcs.is_empty() {
        let input_dir = ctx.srcset.config().input_dir();
        let sources = ctx.srcset.discover();
        if sources.is_empty() {
            tracing::warn!("No supported image files found under {:?}", input_dir);
            return Ok(());
        }
        tracing::info!("Found {} image(s) under {:?}", sources.len(), input_dir);
        sources.into_iter().map(|source| source.src).collect()
    } else {
        args.srcs.clone()
    };

    let summary = generate_batch(&ctx, &args, &srcs).await?;
    if summary.failed > 0 {
        anyhow::bail!("{} of {} source(s) failed", summary.failed, srcs.len());
    }
    Ok(())
}
