//! Source discovery: find images under the input directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Discovers source images in a directory tree.
pub struct FileDiscovery {
    supported_formats: Vec<String>,
    exclude: Option<PathBuf>,
}

/// A source image found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Path relative to the discovery root, `/`-separated
    pub src: String,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a discovery that accepts the given extensions (case-insensitive).
    pub fn new(supported_formats: Vec<String>) -> Self {
        Self {
            supported_formats,
            exclude: None,
        }
    }

    /// Skip everything under `dir`. Used to keep generated variants out of
    /// the results when the output directory lives inside the input directory.
    pub fn excluding(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exclude = Some(dir.into());
        self
    }

    /// Recursively find all supported files under `root`, sorted by path.
    pub fn discover(&self, root: &Path) -> Vec<DiscoveredFile> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry.path()));

        for entry in walker.filter_map(|e| e.ok()) {
            let entry_path = entry.path();
            if !entry.file_type().is_file() || !self.is_supported(entry_path) {
                continue;
            }
            let Ok(relative) = entry_path.strip_prefix(root) else {
                continue;
            };
            if let Ok(meta) = entry.metadata() {
                files.push(DiscoveredFile {
                    path: entry_path.to_path_buf(),
                    src: relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/"),
                    size: meta.len(),
                });
            }
        }

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!("Discovered {} source images under {:?}", files.len(), root);
        files
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude
            .as_deref()
            .is_some_and(|exclude| path.starts_with(exclude))
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}
