//! Image codec trait and resize parameters.
//!
//! The [`ImageCodec`] trait covers the three things the pipeline needs from
//! pixel-level code: identify, resize-to-file, and resize-to-buffer. The
//! production implementation is [`RustCodec`](super::rust_codec::RustCodec);
//! tests use a recording mock so orchestration can be checked without
//! encoding anything.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PipelineResult;
use crate::types::ImageMetadata;

/// Parameters for a resize.
///
/// When `height` is absent the codec keeps the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResizeParams {
    pub width: u32,
    pub height: Option<u32>,
    pub quality: Option<u32>,
}

impl ResizeParams {
    /// Resize to a width, keeping the aspect ratio and the codec's default quality.
    pub fn width(width: u32) -> Self {
        Self {
            width,
            height: None,
            quality: None,
        }
    }

    /// Resize to a width with an optional encoder quality.
    pub fn with_quality(width: u32, quality: Option<u32>) -> Self {
        Self {
            width,
            height: None,
            quality,
        }
    }
}

/// Pixel-level collaborator: reads metadata and performs resizes.
#[async_trait]
pub trait ImageCodec: Send + Sync {
    /// Read width, height and format without a full decode where possible.
    async fn metadata(&self, path: &Path) -> PipelineResult<ImageMetadata>;

    /// Resize `input` and write it to `output`; the format follows the
    /// output extension. Returns what was actually encoded.
    async fn resize_to_file(
        &self,
        input: &Path,
        params: &ResizeParams,
        output: &Path,
    ) -> PipelineResult<ImageMetadata>;

    /// Resize `input` in memory, re-encoding in the source format.
    async fn resize_to_buffer(&self, input: &Path, params: &ResizeParams)
        -> PipelineResult<Vec<u8>>;
}
