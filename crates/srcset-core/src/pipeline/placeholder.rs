//! Low-resolution placeholders embedded as data URIs.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

use super::codec::ResizeParams;
use super::queue::WorkQueue;
use super::require_path;
use super::widths::PLACEHOLDER_WIDTH;

/// MIME type for a codec format name.
///
/// Only formats the codec can emit are known; anything else maps to an
/// empty string.
pub fn mime_type(format: &str) -> &'static str {
    match format {
        "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "tiff" => "image/tiff",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "",
    }
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Resize `input_file` to the placeholder width in memory and inline it.
///
/// Metadata and the resize run concurrently through the queue. Nothing is
/// written to disk.
pub async fn create_placeholder(queue: &WorkQueue, input_file: &Path) -> PipelineResult<String> {
    require_path(input_file, "Input file")?;
    tracing::debug!("Creating placeholder: {:?}", input_file);

    let (metadata, bytes) = tokio::try_join!(
        queue.metadata(input_file),
        queue.resize_to_buffer(input_file, ResizeParams::width(PLACEHOLDER_WIDTH)),
    )?;

    let format = metadata
        .format
        .ok_or_else(|| PipelineError::FormatUndetermined(input_file.to_path_buf()))?;
    Ok(data_uri(mime_type(&format), &bytes))
}
