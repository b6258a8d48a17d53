//! srcset CLI - responsive image variants and `srcset` attributes.
//!
//! Resizes each source image into a ladder of widths, re-encodes the
//! variants as WebP and AVIF, builds a small placeholder, and prints the
//! attributes a responsive `<img>` component needs.
//!
//! # Usage
//!
//! ```bash
//! # Generate variants for one source (relative to the input dir)
//! srcset generate /photos/cat.jpg
//!
//! # Generate variants for every image under the input dir
//! srcset generate --output images.jsonl
//!
//! # View configuration
//! srcset config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// srcset - responsive image variants, placeholders and srcset attributes.
#[derive(Parser, Debug)]
#[command(name = "srcset")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate variants and attributes for source images
    Generate(cli::generate::GenerateArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match srcset_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `srcset config path`."
            );
            srcset_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("srcset v{}", srcset_core::VERSION);

    match cli.command {
        Commands::Generate(args) => cli::generate::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
