//! Recording mock for the codec and filesystem collaborators.
//!
//! Keeps an in-memory file table, records every call, and can inject
//! failures and artificial latency so orchestration can be tested without
//! touching disk or encoding pixels.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::codec::{ImageCodec, ResizeParams};
use crate::pipeline::fs::FileSystem;
use crate::pipeline::hash;
use crate::types::ImageMetadata;

/// A collaborator call, as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedOp {
    Exists(String),
    CreateDir(String),
    Metadata(String),
    ContentHash(String),
    ResizeToFile {
        input: String,
        output: String,
        width: u32,
        quality: Option<u32>,
    },
    ResizeToBuffer {
        input: String,
        width: u32,
    },
}

impl RecordedOp {
    pub fn is_codec_write(&self) -> bool {
        matches!(
            self,
            RecordedOp::ResizeToFile { .. } | RecordedOp::ResizeToBuffer { .. }
        )
    }
}

/// In-memory codec + filesystem.
#[derive(Default)]
pub struct MockBackend {
    operations: Mutex<Vec<RecordedOp>>,
    files: Mutex<HashMap<String, ImageMetadata>>,
    dirs: Mutex<HashSet<String>>,
    failures: Mutex<HashSet<String>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Register an existing image with known metadata.
    pub fn add_image(&self, path: &str, width: u32, height: u32, format: &str) {
        self.add_file(path, ImageMetadata::new(width, height, format));
    }

    /// Register an existing file with arbitrary (possibly incomplete) metadata.
    pub fn add_file(&self, path: &str, metadata: ImageMetadata) {
        self.files.lock().unwrap().insert(path.to_string(), metadata);
    }

    /// Make every call that touches `path` fail with a codec error.
    pub fn fail_on(&self, path: &str) {
        self.failures.lock().unwrap().insert(path.to_string());
    }

    pub fn get_operations(&self) -> Vec<RecordedOp> {
        self.operations.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&RecordedOp) -> bool) -> usize {
        self.operations
            .lock()
            .unwrap()
            .iter()
            .filter(|op| predicate(op))
            .count()
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    pub fn dir_exists(&self, path: &str) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, op: RecordedOp, paths: &[&Path]) -> PipelineResult<()> {
        self.operations.lock().unwrap().push(op);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failures = self.failures.lock().unwrap();
        match paths.iter().find(|p| failures.contains(&key(p))) {
            Some(path) => Err(PipelineError::codec(path, "injected failure")),
            None => Ok(()),
        }
    }

    fn lookup(&self, path: &Path) -> PipelineResult<ImageMetadata> {
        self.files.lock().unwrap().get(&key(path)).cloned().ok_or_else(|| {
            PipelineError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            )
        })
    }
}

#[async_trait]
impl ImageCodec for MockBackend {
    async fn metadata(&self, path: &Path) -> PipelineResult<ImageMetadata> {
        self.enter(RecordedOp::Metadata(key(path)), &[path]).await?;
        self.lookup(path)
    }

    async fn resize_to_file(
        &self,
        input: &Path,
        params: &ResizeParams,
        output: &Path,
    ) -> PipelineResult<ImageMetadata> {
        self.enter(
            RecordedOp::ResizeToFile {
                input: key(input),
                output: key(output),
                width: params.width,
                quality: params.quality,
            },
            &[input, output],
        )
        .await?;

        let source = self.lookup(input)?;
        let dimensions = source
            .dimensions()
            .ok_or_else(|| PipelineError::DimensionsUndetermined(input.to_path_buf()))?;
        let height = params.height.unwrap_or_else(|| {
            let scaled = f64::from(params.width) * f64::from(dimensions.height)
                / f64::from(dimensions.width);
            (scaled.round() as u32).max(1)
        });
        let format = output
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map(|ext| if ext == "jpg" { "jpeg".to_string() } else { ext })
            .unwrap_or_default();

        let written = ImageMetadata::new(params.width, height, format);
        self.files.lock().unwrap().insert(key(output), written.clone());
        Ok(written)
    }

    async fn resize_to_buffer(
        &self,
        input: &Path,
        params: &ResizeParams,
    ) -> PipelineResult<Vec<u8>> {
        self.enter(
            RecordedOp::ResizeToBuffer {
                input: key(input),
                width: params.width,
            },
            &[input],
        )
        .await?;
        self.lookup(input)?;
        Ok(format!("mock:{}:{}", key(input), params.width).into_bytes())
    }
}

#[async_trait]
impl FileSystem for MockBackend {
    async fn exists(&self, path: &Path) -> PipelineResult<bool> {
        self.enter(RecordedOp::Exists(key(path)), &[path]).await?;
        let path = key(path);
        Ok(self.files.lock().unwrap().contains_key(&path)
            || self.dirs.lock().unwrap().contains(&path))
    }

    async fn create_dir_all(&self, path: &Path) -> PipelineResult<()> {
        self.enter(RecordedOp::CreateDir(key(path)), &[path]).await?;
        self.dirs.lock().unwrap().insert(key(path));
        Ok(())
    }

    async fn content_hash(&self, path: &Path) -> PipelineResult<String> {
        self.enter(RecordedOp::ContentHash(key(path)), &[path]).await?;
        self.lookup(path)?;
        Ok(hash::content_hash_from_bytes(key(path).as_bytes()))
    }
}
