//! Variant generation pipeline.
//!
//! - **queue**: deduplicating, optionally bounded executor every stage runs through
//! - **codec** / **fs**: collaborator traits, with `RustCodec` and `LocalFs`
//! - **hash** / **naming**: content-addressed filenames
//! - **widths**: width ladder derivation
//! - **resize** / **multi**: single-width step and the per-ladder fan-out
//! - **processor**: one source to primary, WebP and AVIF variant lists
//! - **placeholder**: inline data-URI previews
//! - **discovery**: find sources under the input directory

pub mod codec;
pub mod discovery;
pub mod fs;
pub mod hash;
pub mod multi;
pub mod naming;
pub mod placeholder;
pub mod processor;
pub mod queue;
pub mod resize;
pub mod rust_codec;
pub mod widths;

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

// Re-exports for convenient access
pub use codec::{ImageCodec, ResizeParams};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use fs::{FileSystem, LocalFs};
pub use multi::{resize_multiple, ResizeMultipleOptions};
pub use naming::{FilenameRequest, VariantNaming};
pub use placeholder::create_placeholder;
pub use processor::{process_image, ProcessImageOptions};
pub use queue::{Operation, Outcome, WorkQueue};
pub use resize::ensure_resize;
pub use rust_codec::RustCodec;
pub use widths::{width_ladder, DEFAULT_WIDTHS, PLACEHOLDER_WIDTH};

/// Reject an empty path argument.
pub(crate) fn require_path(path: &Path, what: &str) -> PipelineResult<()> {
    if path.as_os_str().is_empty() {
        return Err(PipelineError::InvalidArgument(format!("{what} is required")));
    }
    Ok(())
}
