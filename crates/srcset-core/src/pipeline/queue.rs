//! Deduplicating work queue.
//!
//! Every filesystem and codec call in the pipeline goes through a
//! [`WorkQueue`]. Each call is described by an [`Operation`] whose signature
//! is `name|<canonical JSON of its arguments>`. The first call for a
//! signature creates a shared future and stores it under the signature before
//! it can start; every later call gets a clone of the same future. The
//! operation therefore runs at most once per queue, and every caller observes
//! the same outcome, failures included. Entries are never evicted.
//!
//! Each operation runs on its own tokio task, so it finishes and releases its
//! semaphore permit even when every caller has stopped waiting (a sibling
//! failing inside a `try_join!` drops the others). Concurrency is bounded by
//! an optional semaphore acquired inside that task, so a cache hit never
//! re-enters the limiter.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;

use crate::error::{PipelineError, PipelineResult};
use crate::types::ImageMetadata;

use super::codec::{ImageCodec, ResizeParams};
use super::fs::{FileSystem, LocalFs};
use super::rust_codec::RustCodec;

/// Arguments for operations on a single path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathArgs {
    pub path: PathBuf,
}

/// Arguments for a resize written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResizeToFileArgs {
    pub input: PathBuf,
    pub params: ResizeParams,
    pub output: PathBuf,
}

/// Arguments for an in-memory resize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResizeToBufferArgs {
    pub input: PathBuf,
    pub params: ResizeParams,
}

/// Every operation the queue knows how to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Exists(PathArgs),
    CreateDir(PathArgs),
    ReadMetadata(PathArgs),
    ContentHash(PathArgs),
    ResizeToFile(ResizeToFileArgs),
    ResizeToBuffer(ResizeToBufferArgs),
}

impl Operation {
    /// Stable operation identity, the first half of the signature.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Exists(_) => "exists",
            Operation::CreateDir(_) => "create_dir",
            Operation::ReadMetadata(_) => "read_metadata",
            Operation::ContentHash(_) => "content_hash",
            Operation::ResizeToFile(_) => "resize_to_file",
            Operation::ResizeToBuffer(_) => "resize_to_buffer",
        }
    }

    /// The dedup key: `name|<field-ordered JSON of the arguments>`.
    pub fn signature(&self) -> PipelineResult<String> {
        let args = match self {
            Operation::Exists(args)
            | Operation::CreateDir(args)
            | Operation::ReadMetadata(args)
            | Operation::ContentHash(args) => serde_json::to_string(args),
            Operation::ResizeToFile(args) => serde_json::to_string(args),
            Operation::ResizeToBuffer(args) => serde_json::to_string(args),
        }
        .map_err(|e| {
            PipelineError::InvalidArgument(format!(
                "cannot serialize {} arguments for {}: {e}",
                self.name(),
                self.path().display()
            ))
        })?;
        Ok(format!("{}|{}", self.name(), args))
    }

    /// The path the operation is about, for error context.
    pub fn path(&self) -> &Path {
        match self {
            Operation::Exists(args)
            | Operation::CreateDir(args)
            | Operation::ReadMetadata(args)
            | Operation::ContentHash(args) => &args.path,
            Operation::ResizeToFile(args) => &args.output,
            Operation::ResizeToBuffer(args) => &args.input,
        }
    }

    async fn run(self, codec: &dyn ImageCodec, fs: &dyn FileSystem) -> PipelineResult<Outcome> {
        match self {
            Operation::Exists(args) => fs.exists(&args.path).await.map(Outcome::Exists),
            Operation::CreateDir(args) => fs
                .create_dir_all(&args.path)
                .await
                .map(|()| Outcome::Created),
            Operation::ReadMetadata(args) => {
                codec.metadata(&args.path).await.map(Outcome::Metadata)
            }
            Operation::ContentHash(args) => fs.content_hash(&args.path).await.map(Outcome::Hash),
            Operation::ResizeToFile(args) => codec
                .resize_to_file(&args.input, &args.params, &args.output)
                .await
                .map(Outcome::Written),
            Operation::ResizeToBuffer(args) => codec
                .resize_to_buffer(&args.input, &args.params)
                .await
                .map(|bytes| Outcome::Bytes(Arc::new(bytes))),
        }
    }
}

/// Result of a queued operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Exists(bool),
    Created,
    Metadata(ImageMetadata),
    Hash(String),
    Written(ImageMetadata),
    Bytes(Arc<Vec<u8>>),
}

/// A queued operation. Cloning shares the same underlying execution.
pub type Task = Shared<BoxFuture<'static, PipelineResult<Outcome>>>;

/// Deduplicating, optionally bounded executor for pipeline operations.
pub struct WorkQueue {
    codec: Arc<dyn ImageCodec>,
    fs: Arc<dyn FileSystem>,
    limiter: Option<Arc<Semaphore>>,
    tasks: Mutex<HashMap<String, Task>>,
    executions: Arc<AtomicUsize>,
}

impl WorkQueue {
    /// Create a queue over the given collaborators.
    ///
    /// `concurrency` caps how many operations run at once; 0 means unbounded.
    pub fn new(codec: Arc<dyn ImageCodec>, fs: Arc<dyn FileSystem>, concurrency: usize) -> Self {
        Self {
            codec,
            fs,
            limiter: (concurrency > 0).then(|| Arc::new(Semaphore::new(concurrency))),
            tasks: Mutex::new(HashMap::new()),
            executions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue over the local disk and the pure-Rust codec.
    pub fn local(concurrency: usize) -> Self {
        Self::new(Arc::new(RustCodec::new()), Arc::new(LocalFs), concurrency)
    }

    /// Return the task for `op`, spawning it if this signature is new.
    ///
    /// The lookup and the insert happen under one lock, so two near-simultaneous
    /// calls for the same signature always share one execution. Must be called
    /// from within a tokio runtime.
    pub fn enqueue(&self, op: Operation) -> PipelineResult<Task> {
        let key = op.signature()?;
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(task) = tasks.get(&key) {
            tracing::trace!("queue hit: {key}");
            return Ok(task.clone());
        }

        tracing::trace!("queue miss: {key}");
        let task = self.task_for(op);
        tasks.insert(key, task.clone());
        Ok(task)
    }

    fn task_for(&self, op: Operation) -> Task {
        let codec = Arc::clone(&self.codec);
        let fs = Arc::clone(&self.fs);
        let limiter = self.limiter.clone();
        let executions = Arc::clone(&self.executions);
        let path = op.path().to_path_buf();

        let handle = tokio::spawn(async move {
            let _permit = match limiter {
                Some(semaphore) => Some(semaphore.acquire_owned().await.map_err(|e| {
                    PipelineError::Task {
                        path: op.path().to_path_buf(),
                        message: format!("concurrency limiter closed: {e}"),
                    }
                })?),
                None => None,
            };
            executions.fetch_add(1, Ordering::Relaxed);
            op.run(codec.as_ref(), fs.as_ref()).await
        });

        handle
            .map(move |joined| {
                joined.unwrap_or_else(|e| {
                    Err(PipelineError::Task {
                        path,
                        message: format!("Task join error: {e}"),
                    })
                })
            })
            .boxed()
            .shared()
    }

    /// Number of distinct signatures seen so far.
    pub fn len(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been queued yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of operations that have actually started executing.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::Relaxed)
    }

    /// Whether `path` exists.
    pub async fn exists(&self, path: &Path) -> PipelineResult<bool> {
        match self.enqueue(Operation::Exists(path_args(path)))?.await? {
            Outcome::Exists(found) => Ok(found),
            other => Err(unexpected(path, "exists", &other)),
        }
    }

    /// Create `path` recursively.
    pub async fn create_dir_all(&self, path: &Path) -> PipelineResult<()> {
        match self.enqueue(Operation::CreateDir(path_args(path)))?.await? {
            Outcome::Created => Ok(()),
            other => Err(unexpected(path, "create_dir", &other)),
        }
    }

    /// Codec metadata for `path`.
    pub async fn metadata(&self, path: &Path) -> PipelineResult<ImageMetadata> {
        match self.enqueue(Operation::ReadMetadata(path_args(path)))?.await? {
            Outcome::Metadata(metadata) => Ok(metadata),
            other => Err(unexpected(path, "read_metadata", &other)),
        }
    }

    /// Content hash of the file at `path`.
    pub async fn content_hash(&self, path: &Path) -> PipelineResult<String> {
        match self.enqueue(Operation::ContentHash(path_args(path)))?.await? {
            Outcome::Hash(hash) => Ok(hash),
            other => Err(unexpected(path, "content_hash", &other)),
        }
    }

    /// Resize `input` into `output`, returning the encoded metadata.
    pub async fn resize_to_file(
        &self,
        input: &Path,
        params: ResizeParams,
        output: &Path,
    ) -> PipelineResult<ImageMetadata> {
        let op = Operation::ResizeToFile(ResizeToFileArgs {
            input: input.to_path_buf(),
            params,
            output: output.to_path_buf(),
        });
        match self.enqueue(op)?.await? {
            Outcome::Written(metadata) => Ok(metadata),
            other => Err(unexpected(output, "resize_to_file", &other)),
        }
    }

    /// Resize `input` in memory.
    pub async fn resize_to_buffer(
        &self,
        input: &Path,
        params: ResizeParams,
    ) -> PipelineResult<Arc<Vec<u8>>> {
        let op = Operation::ResizeToBuffer(ResizeToBufferArgs {
            input: input.to_path_buf(),
            params,
        });
        match self.enqueue(op)?.await? {
            Outcome::Bytes(bytes) => Ok(bytes),
            other => Err(unexpected(input, "resize_to_buffer", &other)),
        }
    }
}

impl std::fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("tasks", &self.len())
            .field("executions", &self.executions())
            .field(
                "permits_available",
                &self.limiter.as_ref().map(|s| s.available_permits()),
            )
            .finish()
    }
}

fn path_args(path: &Path) -> PathArgs {
    PathArgs {
        path: path.to_path_buf(),
    }
}

fn unexpected(path: &Path, op: &str, outcome: &Outcome) -> PipelineError {
    PipelineError::Task {
        path: path.to_path_buf(),
        message: format!("{op} produced an unexpected outcome: {outcome:?}"),
    }
}
