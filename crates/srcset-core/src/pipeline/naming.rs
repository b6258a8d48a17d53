//! Content-addressed variant filenames.

use std::path::Path;

use super::hash::{options_hash, VariantOptions, OPTIONS_HASH_LEN};

/// What a filename generator is asked to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilenameRequest<'a> {
    pub width: u32,
    pub quality: Option<u32>,
    pub input_file: &'a Path,
}

/// Default filename scheme: `<base>.<options hash>.<content hash><ext>`.
///
/// `ext` includes the leading dot and is empty for sources without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantNaming {
    base: String,
    extension: String,
    content_hash: String,
}

impl VariantNaming {
    /// Naming for variants in the source's own format.
    pub fn for_source(input_file: &Path, content_hash: &str) -> Self {
        let base = input_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = input_file
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Self {
            base,
            extension,
            content_hash: content_hash.to_string(),
        }
    }

    /// Same base and hash, different extension (e.g. `".webp"`).
    pub fn with_extension(&self, extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
            ..self.clone()
        }
    }

    pub fn filename(&self, request: &FilenameRequest<'_>) -> String {
        let options = VariantOptions {
            width: request.width,
            quality: request.quality,
        };
        format!(
            "{}.{}.{}{}",
            self.base,
            options_hash(&options.fields(), Some(OPTIONS_HASH_LEN)),
            self.content_hash,
            self.extension
        )
    }
}
