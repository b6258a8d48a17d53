//! Generator setup: config overrides, validation, output format.

use srcset_core::{Config, OutputFormat as CoreOutputFormat, Srcset};

use super::{GenerateArgs, GenerateContext};

/// Apply CLI overrides to `config` and assemble the generator.
pub fn setup_generator(args: &GenerateArgs, mut config: Config) -> anyhow::Result<GenerateContext> {
    apply_overrides(args, &mut config);
    config.validate()?;

    let input_dir = config.input_dir();
    if !input_dir.is_dir() {
        anyhow::bail!(
            "Input directory does not exist: {:?}\n\n  Hint: Pass --input-dir or set paths.input_dir in the config file.",
            input_dir
        );
    }

    let output_format = match args.format {
        Some(format) => format.into(),
        None => CoreOutputFormat::parse(&config.output.format).ok_or_else(|| {
            anyhow::anyhow!("Unknown output format {:?}", config.output.format)
        })?,
    };
    let pretty = args.pretty || config.output.pretty;

    tracing::debug!(
        input_dir = ?input_dir,
        output_dir = ?config.output_dir(),
        webp = config.images.webp,
        avif = config.images.avif,
        concurrency = config.queue.concurrency,
        "Generator configured"
    );

    Ok(GenerateContext {
        srcset: Srcset::new(config),
        output_format,
        pretty,
    })
}

fn apply_overrides(args: &GenerateArgs, config: &mut Config) {
    if let Some(dir) = &args.input_dir {
        config.paths.input_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.paths.output_dir = dir.clone();
    }
    if let Some(public_path) = &args.public_path {
        config.paths.public_path = Some(public_path.clone());
    }
    if let Some(widths) = &args.widths {
        config.images.widths = Some(widths.clone());
    }
    if let Some(quality) = args.quality {
        config.images.quality = Some(quality);
    }
    if args.no_webp {
        config.images.webp = false;
    }
    if args.no_avif {
        config.images.avif = false;
    }
    if args.skip_generation {
        config.images.skip_generation = true;
    }
    if args.no_placeholder {
        config.placeholder.enabled = false;
    }
    if args.file_placeholder {
        config.placeholder.embed = false;
    }
    if let Some(concurrency) = args.concurrency {
        config.queue.concurrency = concurrency;
    }
}
