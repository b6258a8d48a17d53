//! Core data types for the srcset variant generation pipeline.
//!
//! These types describe what the codec reports about an image and what the
//! pipeline produces for it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::attributes::ComponentAttributes;

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// What the codec reports about an image file.
///
/// Every field is optional: a codec that cannot determine a value leaves it
/// empty and the pipeline decides whether that is fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Height in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Format name ("jpeg", "png", "webp", "avif", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ImageMetadata {
    /// Metadata with known dimensions and format.
    pub fn new(width: u32, height: u32, format: impl Into<String>) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            format: Some(format.into()),
        }
    }

    /// Width and height, if both are known and non-zero.
    pub fn dimensions(&self) -> Option<Dimensions> {
        match (self.width, self.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => {
                Some(Dimensions { width, height })
            }
            _ => None,
        }
    }
}

/// One generated (or, in skip mode, projected) variant file.
///
/// `height` is fractional because projected variants derive it from the
/// aspect ratio, rounded to two decimals. Generated variants always carry the
/// integer height of the encoded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// On-disk path, or a public URL once resolved
    pub path: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: f64,
}

impl GeneratedImage {
    /// A variant that exists on disk with the given encoded dimensions.
    pub fn encoded(path: &Path, dimensions: Dimensions) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            width: dimensions.width,
            height: f64::from(dimensions.height),
        }
    }

    /// A variant that was never written, sized from the source aspect ratio.
    pub fn projected(path: &Path, width: u32, aspect_ratio: f64) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            width,
            height: projected_height(width, aspect_ratio),
        }
    }

    /// Copy of this image pointing at a different path.
    pub fn with_path(&self, path: String) -> Self {
        Self {
            path,
            width: self.width,
            height: self.height,
        }
    }
}

/// `width / aspect_ratio` rounded to two decimals.
pub fn projected_height(width: u32, aspect_ratio: f64) -> f64 {
    ((f64::from(width) / aspect_ratio + f64::EPSILON) * 100.0).round() / 100.0
}

/// Result of running the pipeline for one source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessImageOutput {
    /// Variants in the source format
    pub images: Vec<GeneratedImage>,

    /// WebP variants (empty when disabled)
    pub webp_images: Vec<GeneratedImage>,

    /// AVIF variants (empty when disabled)
    pub avif_images: Vec<GeneratedImage>,

    /// Source width divided by source height
    pub aspect_ratio: f64,
}

/// One line of CLI output: a source reference and its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRecord {
    /// Source reference as given (relative to the input directory)
    pub src: String,

    /// Attributes for embedding in markup
    pub attributes: ComponentAttributes,
}
