//! Final attribute record for markup.

use serde::{Deserialize, Serialize};

use crate::types::{GeneratedImage, ProcessImageOutput};

/// Attributes handed to the image component.
///
/// Optional fields are omitted from JSON when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentAttributes {
    pub srcset: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcsetwebp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcsetavif: Option<String>,

    /// Inline data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    pub aspectratio: f64,

    /// On-disk placeholder URLs, path only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholdersrc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholderwebp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholderavif: Option<String>,
}

impl ComponentAttributes {
    /// Render as `name="value"` pairs separated by spaces, skipping absent
    /// and empty values.
    pub fn to_attribute_string(&self) -> String {
        let aspectratio = self.aspectratio.to_string();
        let fields: [(&str, Option<&str>); 8] = [
            ("srcset", Some(self.srcset.as_str())),
            ("srcsetwebp", self.srcsetwebp.as_deref()),
            ("srcsetavif", self.srcsetavif.as_deref()),
            ("placeholder", self.placeholder.as_deref()),
            ("aspectratio", Some(aspectratio.as_str())),
            ("placeholdersrc", self.placeholdersrc.as_deref()),
            ("placeholderwebp", self.placeholderwebp.as_deref()),
            ("placeholderavif", self.placeholderavif.as_deref()),
        ];

        fields
            .iter()
            .filter_map(|(name, value)| match value {
                Some(value) if !value.is_empty() => Some(format!("{name}=\"{}\"", escape(value))),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn escape(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Everything the assembler needs, with paths already turned into URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInput {
    pub images: Vec<GeneratedImage>,
    pub webp_images: Vec<GeneratedImage>,
    pub avif_images: Vec<GeneratedImage>,
    pub aspect_ratio: f64,
    pub placeholder: Option<String>,
    pub placeholder_image: Option<GeneratedImage>,
    pub placeholder_webp: Option<GeneratedImage>,
    pub placeholder_avif: Option<GeneratedImage>,
}

impl AttributeInput {
    pub fn new(output: ProcessImageOutput) -> Self {
        Self {
            images: output.images,
            webp_images: output.webp_images,
            avif_images: output.avif_images,
            aspect_ratio: output.aspect_ratio,
            placeholder: None,
            placeholder_image: None,
            placeholder_webp: None,
            placeholder_avif: None,
        }
    }

    /// Attach an inline placeholder.
    pub fn with_placeholder(mut self, data_uri: Option<String>) -> Self {
        self.placeholder = data_uri;
        self
    }

    /// Attach on-disk placeholders: the first image of each list.
    pub fn with_placeholder_images(mut self, output: Option<ProcessImageOutput>) -> Self {
        if let Some(output) = output {
            self.placeholder_image = output.images.into_iter().next();
            self.placeholder_webp = output.webp_images.into_iter().next();
            self.placeholder_avif = output.avif_images.into_iter().next();
        }
        self
    }
}

/// `"<path> <width>w"` entries joined by `", "`, or bare paths.
pub fn srcset(images: &[GeneratedImage], path_only: bool) -> String {
    images
        .iter()
        .map(|image| {
            if path_only {
                image.path.clone()
            } else {
                format!("{} {}w", image.path, image.width)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_empty_srcset(images: &[GeneratedImage]) -> Option<String> {
    (!images.is_empty()).then(|| srcset(images, false))
}

fn placeholder_path(image: Option<&GeneratedImage>) -> Option<String> {
    image.map(|image| srcset(std::slice::from_ref(image), true))
}

/// Build the final attribute record.
pub fn component_attributes(input: &AttributeInput) -> ComponentAttributes {
    ComponentAttributes {
        srcset: srcset(&input.images, false),
        srcsetwebp: non_empty_srcset(&input.webp_images),
        srcsetavif: non_empty_srcset(&input.avif_images),
        placeholder: input.placeholder.clone(),
        aspectratio: input.aspect_ratio,
        placeholdersrc: placeholder_path(input.placeholder_image.as_ref()),
        placeholderwebp: placeholder_path(input.placeholder_webp.as_ref()),
        placeholderavif: placeholder_path(input.placeholder_avif.as_ref()),
    }
}
