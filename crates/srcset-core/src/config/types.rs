//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where sources live and where variants go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root that source references are relative to
    pub input_dir: PathBuf,

    /// Root that variants are written under (mirrors the source layout)
    pub output_dir: PathBuf,

    /// Base URL the output directory is served from. When unset, URLs are
    /// derived by stripping `input_dir` from the variant path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("static"),
            output_dir: PathBuf::from("static/g"),
            public_path: None,
        }
    }
}

/// Variant generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Candidate widths; unset uses 480, 1024, 1920, 2560
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widths: Option<Vec<u32>>,

    /// Encoder quality (1-100); unset uses the codec default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,

    /// Produce WebP variants
    pub webp: bool,

    /// Produce AVIF variants
    pub avif: bool,

    /// Compute names and sizes without writing files
    pub skip_generation: bool,

    /// Extensions picked up when scanning the input directory
    pub supported_formats: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            widths: None,
            quality: None,
            webp: true,
            avif: true,
            skip_generation: false,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "tif".to_string(),
                "tiff".to_string(),
                "gif".to_string(),
            ],
        }
    }
}

/// Placeholder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    /// Generate a placeholder at all
    pub enabled: bool,

    /// Inline as a data URI (true) or write 64px files (false)
    pub embed: bool,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            embed: true,
        }
    }
}

/// Work queue settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Max operations in flight; 0 = unbounded
    pub concurrency: usize,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json", "jsonl" or "attrs")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "jsonl".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
