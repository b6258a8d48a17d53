//! Pipeline orchestration - one source image to every variant list.

use std::path::Path;
use std::time::Instant;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{GeneratedImage, ProcessImageOutput};

use super::multi::{resize_multiple, ResizeMultipleOptions};
use super::naming::VariantNaming;
use super::queue::WorkQueue;
use super::require_path;
use super::widths::width_ladder;

/// Options for controlling variant generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessImageOptions {
    /// Candidate widths; `None` uses [`DEFAULT_WIDTHS`](super::widths::DEFAULT_WIDTHS)
    pub widths: Option<Vec<u32>>,
    /// Encoder quality; `None` uses the codec default
    pub quality: Option<u32>,
    /// Also produce WebP variants
    pub webp: bool,
    /// Also produce AVIF variants
    pub avif: bool,
    /// Compute names and projected sizes without writing anything
    pub skip_generation: bool,
}

impl Default for ProcessImageOptions {
    fn default() -> Self {
        Self {
            widths: None,
            quality: None,
            webp: true,
            avif: true,
            skip_generation: false,
        }
    }
}

/// Generate (or project) every variant of `input_file` into `output_dir`.
///
/// The output directory, the source metadata and the content hash are
/// resolved concurrently; then the primary, WebP and AVIF ladders are
/// produced concurrently. The first failure aborts the whole call.
pub async fn process_image(
    queue: &WorkQueue,
    input_file: &Path,
    output_dir: &Path,
    options: &ProcessImageOptions,
) -> PipelineResult<ProcessImageOutput> {
    require_path(input_file, "Input file")?;
    require_path(output_dir, "Output directory")?;

    let start = Instant::now();
    tracing::debug!("Processing: {:?}", input_file);

    let ensure_output_dir = async {
        if !options.skip_generation && !queue.exists(output_dir).await? {
            queue.create_dir_all(output_dir).await?;
        }
        Ok::<_, PipelineError>(())
    };
    let ((), metadata, content_hash) = tokio::try_join!(
        ensure_output_dir,
        queue.metadata(input_file),
        queue.content_hash(input_file),
    )?;
    tracing::trace!("  Prepare: {:?}", start.elapsed());

    let dimensions = metadata
        .dimensions()
        .ok_or_else(|| PipelineError::DimensionsUndetermined(input_file.to_path_buf()))?;
    let aspect_ratio = f64::from(dimensions.width) / f64::from(dimensions.height);

    let ladder = ResizeMultipleOptions {
        widths: width_ladder(dimensions.width, options.widths.as_deref()),
        quality: options.quality,
        aspect_ratio,
        skip_generation: options.skip_generation,
    };
    tracing::trace!("  Widths: {:?}", ladder.widths);

    let naming = VariantNaming::for_source(input_file, &content_hash);
    let webp_naming = naming.with_extension(".webp");
    let avif_naming = naming.with_extension(".avif");

    let (images, webp_images, avif_images) = tokio::try_join!(
        resize_multiple(queue, input_file, output_dir, &ladder, |r| {
            naming.filename(r)
        }),
        variants(options.webp, || {
            resize_multiple(queue, input_file, output_dir, &ladder, |r| {
                webp_naming.filename(r)
            })
        }),
        variants(options.avif, || {
            resize_multiple(queue, input_file, output_dir, &ladder, |r| {
                avif_naming.filename(r)
            })
        }),
    )?;

    tracing::debug!(
        "Processed {:?}: {} widths, webp={}, avif={} in {:?}",
        input_file,
        ladder.widths.len(),
        !webp_images.is_empty(),
        !avif_images.is_empty(),
        start.elapsed()
    );

    Ok(ProcessImageOutput {
        images,
        webp_images,
        avif_images,
        aspect_ratio,
    })
}

/// Run `produce` only when the format is enabled.
async fn variants<F, Fut>(enabled: bool, produce: F) -> PipelineResult<Vec<GeneratedImage>>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = PipelineResult<Vec<GeneratedImage>>>,
{
    if enabled {
        produce().await
    } else {
        Ok(Vec::new())
    }
}
