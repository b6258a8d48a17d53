//! Error types for the srcset variant generation pipeline.
//!
//! Errors are organized by concern to provide clear, actionable messages
//! that include relevant context (file paths, widths, offending values).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Top-level error type for srcset operations.
#[derive(Error, Debug)]
pub enum SrcsetError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while generating variants.
///
/// Every variant is `Clone` because a failed operation is cached by the
/// [`WorkQueue`](crate::pipeline::WorkQueue) and handed to every caller that
/// asks for the same operation again.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// A required path or string input was empty
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The codec could not report width and height
    #[error("Could not determine image dimensions for {0}")]
    DimensionsUndetermined(PathBuf),

    /// The codec could not report the image format
    #[error("Could not determine image format for {0}")]
    FormatUndetermined(PathBuf),

    /// A filename generator returned an empty name
    #[error("Output filename not provided for {input} at width {width}")]
    FilenameRequired { input: PathBuf, width: u32 },

    /// A URL strategy returned an empty URL
    #[error("URL strategy returned an empty src for path {0}")]
    EmptyUrl(String),

    /// Filesystem error other than "not found" on an existence check
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Decoding or encoding failed
    #[error("Codec error for {path}: {message}")]
    Codec { path: PathBuf, message: String },

    /// A blocking task or the concurrency limiter failed
    #[error("Task failed for {path}: {message}")]
    Task { path: PathBuf, message: String },
}

impl PipelineError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }

    /// Build a codec error from anything displayable.
    pub fn codec(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::Codec {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Convenience type alias for srcset results.
pub type Result<T> = std::result::Result<T, SrcsetError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
