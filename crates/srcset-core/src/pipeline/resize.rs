//! Single-width resize step.

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::GeneratedImage;

use super::codec::ResizeParams;
use super::queue::WorkQueue;
use super::require_path;

/// Make sure `output_file` holds `input_file` resized to `width`.
///
/// An existing output is reused as-is and only its dimensions are read.
/// The returned image always carries the dimensions of the encoded file.
pub async fn ensure_resize(
    queue: &WorkQueue,
    input_file: &Path,
    output_file: &Path,
    width: u32,
    quality: Option<u32>,
) -> PipelineResult<GeneratedImage> {
    require_path(input_file, "Input file")?;
    require_path(output_file, "Output file")?;

    let metadata = if queue.exists(output_file).await? {
        tracing::trace!("Reusing existing variant: {:?}", output_file);
        queue.metadata(output_file).await?
    } else {
        tracing::trace!("Generating {}w variant: {:?}", width, output_file);
        queue
            .resize_to_file(
                input_file,
                ResizeParams::with_quality(width, quality),
                output_file,
            )
            .await?
    };

    let dimensions = metadata
        .dimensions()
        .ok_or_else(|| PipelineError::DimensionsUndetermined(output_file.to_path_buf()))?;
    Ok(GeneratedImage::encoded(output_file, dimensions))
}
