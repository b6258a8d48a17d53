//! Content and options hashing for content-addressed variant filenames.

use blake3::Hasher as Blake3Hasher;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Hex characters kept from the content digest (128 bits).
pub const CONTENT_HASH_LEN: usize = 32;

/// Hex characters of the options digest embedded in filenames.
pub const OPTIONS_HASH_LEN: usize = 7;

/// Generate a BLAKE3 hash of file contents.
///
/// Streams the file so large sources are never loaded whole. The digest is
/// truncated to [`CONTENT_HASH_LEN`] hex characters.
pub fn content_hash(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Blake3Hasher::new();

    let mut buffer = [0u8; 65536];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().as_str()[..CONTENT_HASH_LEN].to_string())
}

/// Generate the content hash of an in-memory buffer.
pub fn content_hash_from_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().as_str()[..CONTENT_HASH_LEN].to_string()
}

/// Resize options that take part in variant filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantOptions {
    pub width: u32,
    pub quality: Option<u32>,
}

impl VariantOptions {
    /// Every field in declaration order; an absent value renders empty.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("width", self.width.to_string()),
            (
                "quality",
                self.quality.map(|q| q.to_string()).unwrap_or_default(),
            ),
        ]
    }
}

/// Hash an options record rendered as `key=value` pairs joined by commas.
///
/// With `truncate = Some(n)` only the first `n` hex characters are kept;
/// `None` or `Some(0)` returns the full digest.
pub fn options_hash(fields: &[(&str, String)], truncate: Option<usize>) -> String {
    let serialized = fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",");
    let digest = blake3::hash(serialized.as_bytes()).to_hex();
    let digest = digest.as_str();

    match truncate {
        Some(len) if len > 0 && len < digest.len() => digest[..len].to_string(),
        _ => digest.to_string(),
    }
}
