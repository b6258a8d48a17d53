//! Fan-out of one source across a width ladder.

use futures_util::future::try_join_all;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::types::GeneratedImage;

use super::naming::FilenameRequest;
use super::queue::WorkQueue;
use super::require_path;
use super::resize::ensure_resize;

/// Options for [`resize_multiple`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeMultipleOptions {
    /// Target widths, already derived from the source width
    pub widths: Vec<u32>,
    pub quality: Option<u32>,
    /// Source width / height, used for projected heights
    pub aspect_ratio: f64,
    /// Only compute paths and projected sizes
    pub skip_generation: bool,
}

/// Produce one variant per width in `options.widths`.
///
/// Every filename is computed before any work starts; an empty name from
/// `filename` fails the whole call. With `skip_generation` no filesystem or
/// codec call is made and heights are projected from the aspect ratio.
/// Otherwise all widths are resized concurrently and the first failure wins.
pub async fn resize_multiple<F>(
    queue: &WorkQueue,
    input_file: &Path,
    output_dir: &Path,
    options: &ResizeMultipleOptions,
    filename: F,
) -> PipelineResult<Vec<GeneratedImage>>
where
    F: Fn(&FilenameRequest<'_>) -> String,
{
    require_path(input_file, "Input file")?;
    require_path(output_dir, "Output directory")?;

    let targets = options
        .widths
        .iter()
        .map(|&width| {
            let name = filename(&FilenameRequest {
                width,
                quality: options.quality,
                input_file,
            });
            if name.is_empty() {
                return Err(PipelineError::FilenameRequired {
                    input: input_file.to_path_buf(),
                    width,
                });
            }
            Ok((width, output_dir.join(name)))
        })
        .collect::<PipelineResult<Vec<(u32, PathBuf)>>>()?;

    if options.skip_generation {
        return Ok(targets
            .iter()
            .map(|(width, path)| GeneratedImage::projected(path, *width, options.aspect_ratio))
            .collect());
    }

    try_join_all(
        targets
            .iter()
            .map(|(width, path)| ensure_resize(queue, input_file, path, *width, options.quality)),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockBackend, RecordedOp};
    use std::sync::Arc;

    fn setup() -> (Arc<MockBackend>, WorkQueue) {
        let backend = Arc::new(MockBackend::new());
        backend.add_image("in/cat.jpg", 1600, 800, "jpeg");
        let queue = WorkQueue::new(backend.clone(), backend.clone(), 0);
        (backend, queue)
    }

    fn options(widths: &[u32], skip_generation: bool) -> ResizeMultipleOptions {
        ResizeMultipleOptions {
            widths: widths.to_vec(),
            quality: None,
            aspect_ratio: 2.0,
            skip_generation,
        }
    }

    fn by_width(request: &FilenameRequest<'_>) -> String {
        format!("cat.{}.jpg", request.width)
    }

    #[tokio::test]
    async fn test_one_variant_per_width_in_order() {
        let (backend, queue) = setup();
        let images = resize_multiple(
            &queue,
            Path::new("in/cat.jpg"),
            Path::new("out"),
            &options(&[480, 1024, 1600], false),
            by_width,
        )
        .await
        .unwrap();

        let widths: Vec<u32> = images.iter().map(|i| i.width).collect();
        assert_eq!(widths, vec![480, 1024, 1600]);
        assert_eq!(images[0].path, Path::new("out").join("cat.480.jpg").to_string_lossy());
        assert_eq!(images[1].height, 512.0);
        assert_eq!(backend.count(RecordedOp::is_codec_write), 3);
    }

    #[tokio::test]
    async fn test_skip_generation_touches_nothing() {
        let (backend, queue) = setup();
        let images = resize_multiple(
            &queue,
            Path::new("in/cat.jpg"),
            Path::new("out"),
            &options(&[800], true),
            by_width,
        )
        .await
        .unwrap();

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].width, 800);
        assert_eq!(images[0].height, 400.0);
        assert!(backend.get_operations().is_empty());
        assert_eq!(queue.executions(), 0);
    }

    #[tokio::test]
    async fn test_empty_filename_fails_before_any_work() {
        let (backend, queue) = setup();
        let err = resize_multiple(
            &queue,
            Path::new("in/cat.jpg"),
            Path::new("out"),
            &options(&[480, 1024], false),
            |request| {
                if request.width == 1024 {
                    String::new()
                } else {
                    by_width(request)
                }
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::FilenameRequired { width: 1024, .. }
        ));
        assert!(backend.get_operations().is_empty());
    }

    #[tokio::test]
    async fn test_first_failure_propagates() {
        let (backend, queue) = setup();
        let failing = Path::new("out").join("cat.1024.jpg");
        backend.fail_on(&failing.to_string_lossy());

        let err = resize_multiple(
            &queue,
            Path::new("in/cat.jpg"),
            Path::new("out"),
            &options(&[480, 1024], false),
            by_width,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::Codec { .. }));
    }

    #[tokio::test]
    async fn test_filename_generator_sees_quality_and_input() {
        let (_backend, queue) = setup();
        let mut opts = options(&[480], true);
        opts.quality = Some(55);

        let images = resize_multiple(
            &queue,
            Path::new("in/cat.jpg"),
            Path::new("out"),
            &opts,
            |request| {
                assert_eq!(request.input_file, Path::new("in/cat.jpg"));
                format!("cat.q{}.jpg", request.quality.unwrap_or_default())
            },
        )
        .await
        .unwrap();
        assert!(images[0].path.ends_with("cat.q55.jpg"));
    }
}
