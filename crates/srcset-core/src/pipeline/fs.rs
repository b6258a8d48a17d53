//! Filesystem collaborator: existence checks, directory creation, hashing.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

use super::hash;

/// Filesystem operations routed through the work queue.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Whether `path` exists. "Not found" is `false`; any other error is fatal.
    async fn exists(&self, path: &Path) -> PipelineResult<bool>;

    /// Create `path` and all missing parents.
    async fn create_dir_all(&self, path: &Path) -> PipelineResult<()>;

    /// Content hash of the file at `path`.
    async fn content_hash(&self, path: &Path) -> PipelineResult<String>;
}

/// The local disk, via `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl FileSystem for LocalFs {
    async fn exists(&self, path: &Path) -> PipelineResult<bool> {
        match tokio::fs::metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PipelineError::io(path, e)),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> PipelineResult<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| PipelineError::io(path, e))
    }

    async fn content_hash(&self, path: &Path) -> PipelineResult<String> {
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || hash::content_hash(&owned))
            .await
            .map_err(|e| PipelineError::Task {
                path: path.to_path_buf(),
                message: format!("Task join error: {e}"),
            })?
            .map_err(|e| PipelineError::io(path, e))
    }
}
