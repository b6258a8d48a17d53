//! Batch generation: one source after another over a shared queue, with
//! progress and streaming output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use srcset_core::{GeneratedRecord, OutputFormat as CoreOutputFormat, OutputWriter};

use super::{GenerateArgs, GenerateContext};

/// Counts reported after a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: u64,
    pub failed: u64,
    /// Distinct queue operations actually executed
    pub executions: usize,
}

/// Generate every source in `srcs`, writing records as they complete.
///
/// A failing source is logged and counted; the rest still run.
pub async fn generate_batch(
    ctx: &GenerateContext,
    args: &GenerateArgs,
    srcs: &[String],
) -> anyhow::Result<BatchSummary> {
    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, ctx.output_format, ctx.pretty);

    // A JSON array needs every record before anything is written
    let collect = ctx.output_format == CoreOutputFormat::Json && srcs.len() > 1;
    let mut collected: Vec<GeneratedRecord> = Vec::new();

    let progress = create_progress_bar(srcs.len() as u64);
    let mut summary = BatchSummary::default();
    let start_time = Instant::now();

    for src in srcs {
        progress.set_message(src.clone());
        match ctx.srcset.generate(src).await {
            Ok(record) => {
                summary.succeeded += 1;
                if collect {
                    collected.push(record);
                } else {
                    writer.write(&record)?;
                }
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!("Failed: {} - {}", src, e);
            }
        }
        progress.inc(1);
    }

    if collect {
        writer.write_all(&collected)?;
    }
    writer.flush()?;
    progress.finish_and_clear();

    summary.executions = ctx.srcset.queue().executions();
    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }
    if srcs.len() > 1 {
        print_summary(&summary, start_time.elapsed());
    }

    Ok(summary)
}

/// Progress bar on stderr; hidden for a single source.
fn create_progress_bar(total: u64) -> ProgressBar {
    if total <= 1 {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

fn print_summary(summary: &BatchSummary, elapsed: Duration) {
    let total = summary.succeeded + summary.failed;
    let rate = if elapsed.as_secs_f64() > 0.0 {
        total as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("    Operations:   {:>8}", summary.executions);
    eprintln!("  ------------------------------------");
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} src/sec", rate);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::generate::setup::setup_generator;
    use crate::cli::generate::OutputFormat;
    use srcset_core::Config;
    use std::path::Path;

    fn write_png(path: &Path, width: u32, height: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::DynamicImage::new_rgb8(width, height)
            .save(path)
            .unwrap();
    }

    fn args_for(root: &Path, output: &Path) -> GenerateArgs {
        GenerateArgs {
            input_dir: Some(root.join("static")),
            output_dir: Some(root.join("static/g")),
            widths: Some(vec![16]),
            no_avif: true,
            no_webp: true,
            no_placeholder: true,
            output: Some(output.to_path_buf()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_batch_streams_jsonl_and_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("static/a.png"), 32, 16);
        let output = dir.path().join("out.jsonl");
        let args = GenerateArgs {
            format: Some(OutputFormat::Jsonl),
            ..args_for(dir.path(), &output)
        };
        let ctx = setup_generator(&args, Config::default()).unwrap();

        let srcs = vec!["a.png".to_string(), "missing.png".to_string()];
        let summary = generate_batch(&ctx, &args, &srcs).await.unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        let written = std::fs::read_to_string(&output).unwrap();
        let records: Vec<GeneratedRecord> = written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].src, "a.png");
        assert_eq!(records[0].attributes.aspectratio, 2.0);
    }

    #[tokio::test]
    async fn test_batch_json_writes_one_array() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("static/a.png"), 32, 16);
        write_png(&dir.path().join("static/b.png"), 16, 16);
        let output = dir.path().join("out.json");
        let args = GenerateArgs {
            format: Some(OutputFormat::Json),
            ..args_for(dir.path(), &output)
        };
        let ctx = setup_generator(&args, Config::default()).unwrap();

        let srcs = vec!["a.png".to_string(), "b.png".to_string()];
        generate_batch(&ctx, &args, &srcs).await.unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let records: Vec<GeneratedRecord> = serde_json::from_str(&written).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].src, "b.png");
    }

    #[tokio::test]
    async fn test_batch_attribute_lines() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("static/nested/a.png"), 32, 16);
        let output = dir.path().join("out.txt");
        let args = GenerateArgs {
            format: Some(OutputFormat::Attrs),
            skip_generation: true,
            ..args_for(dir.path(), &output)
        };
        let ctx = setup_generator(&args, Config::default()).unwrap();

        generate_batch(&ctx, &args, &["/nested/a.png".to_string()])
            .await
            .unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("/nested/a.png: srcset=\"/g/nested/a."));
        assert!(written.contains("aspectratio=\"2\""));
        assert!(!dir.path().join("static/g").exists());
    }
}
