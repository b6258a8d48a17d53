//! srcset core - responsive image variant generation.
//!
//! Takes one source image and produces resized variants at several widths,
//! optional WebP/AVIF re-encodes, and a low-resolution placeholder, then
//! describes them as `srcset` attributes for markup.
//!
//! # Architecture
//!
//! ```text
//! src → metadata + content hash → width ladder → resize × formats → URLs → attributes
//! ```
//!
//! Every filesystem and codec call goes through one [`WorkQueue`], which runs
//! each distinct operation at most once, so repeated sources and repeated runs
//! inside one process never redo work. Filenames embed a hash of the source
//! bytes and of the resize options, so an existing file is always safe to reuse.
//!
//! # Usage
//!
//! ```rust,ignore
//! use srcset_core::{Config, Srcset};
//!
//! #[tokio::main]
//! async fn main() -> srcset_core::Result<()> {
//!     let srcset = Srcset::new(Config::load()?);
//!     let record = srcset.generate("/photos/cat.jpg").await?;
//!     println!("{}", record.attributes.srcset);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod attributes;
pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod url;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

// Re-exports for convenient access
pub use attributes::{component_attributes, srcset, AttributeInput, ComponentAttributes};
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, Result, SrcsetError};
pub use generate::{generate_component_attributes, GenerateOptions};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    create_placeholder, ensure_resize, process_image, resize_multiple, width_ladder,
    DiscoveredFile, FileDiscovery, FileSystem, ImageCodec, LocalFs, ProcessImageOptions,
    ResizeParams, RustCodec, WorkQueue,
};
pub use types::{Dimensions, GeneratedImage, GeneratedRecord, ImageMetadata, ProcessImageOutput};
pub use url::{resolve_path, PublicPathStrategy, UrlContext, UrlStrategy};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configured generator - the main entry point for batch use.
///
/// Owns one [`WorkQueue`] for its whole lifetime, so every source generated
/// through it shares deduplicated work.
pub struct Srcset {
    config: Config,
    queue: Arc<WorkQueue>,
}

impl Srcset {
    /// Create a generator over the local disk and the pure-Rust codec.
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing srcset v{}", VERSION);
        let queue = Arc::new(WorkQueue::local(config.queue.concurrency));
        Self { config, queue }
    }

    /// Create a generator over an existing queue.
    pub fn with_queue(config: Config, queue: Arc<WorkQueue>) -> Self {
        Self { config, queue }
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared work queue.
    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    /// Generation options for `src`, taken from the configuration.
    pub fn options_for(&self, src: &str) -> GenerateOptions {
        let config = &self.config;
        GenerateOptions {
            src: src.to_string(),
            input_dir: config.input_dir(),
            output_dir: config.output_dir(),
            webp: config.images.webp,
            avif: config.images.avif,
            widths: config.images.widths.clone(),
            quality: config.images.quality,
            skip_generation: config.images.skip_generation,
            skip_placeholder: !config.placeholder.enabled,
            embed_placeholder: config.placeholder.embed,
            url_strategy: config.paths.public_path.as_ref().map(|public_path| {
                Arc::new(PublicPathStrategy::new(public_path.as_str())) as Arc<dyn UrlStrategy>
            }),
        }
    }

    /// Generate variants and attributes for one source reference.
    pub async fn generate(&self, src: &str) -> Result<GeneratedRecord> {
        let attributes = generate_component_attributes(&self.queue, &self.options_for(src)).await?;
        Ok(GeneratedRecord {
            src: src.to_string(),
            attributes,
        })
    }

    /// All supported sources under the input directory, excluding the
    /// output directory.
    pub fn discover(&self) -> Vec<DiscoveredFile> {
        FileDiscovery::new(self.config.images.supported_formats.clone())
            .excluding(self.config.output_dir())
            .discover(&self.config.input_dir())
    }
}
