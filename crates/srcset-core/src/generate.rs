//! Top-level entry point: source reference in, attribute record out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::attributes::{component_attributes, AttributeInput, ComponentAttributes};
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::placeholder::create_placeholder;
use crate::pipeline::processor::{process_image, ProcessImageOptions};
use crate::pipeline::queue::WorkQueue;
use crate::pipeline::widths::PLACEHOLDER_WIDTH;
use crate::types::{GeneratedImage, ProcessImageOutput};
use crate::url::{resolve_path, UrlContext, UrlStrategy};

/// Options for [`generate_component_attributes`].
#[derive(Clone)]
pub struct GenerateOptions {
    /// Source reference, relative to `input_dir` (a leading `/` is allowed)
    pub src: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub webp: bool,
    pub avif: bool,
    pub widths: Option<Vec<u32>>,
    pub quality: Option<u32>,
    pub skip_generation: bool,
    pub skip_placeholder: bool,
    /// Inline the placeholder as a data URI instead of writing files
    pub embed_placeholder: bool,
    pub url_strategy: Option<Arc<dyn UrlStrategy>>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            src: String::new(),
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            webp: true,
            avif: true,
            widths: None,
            quality: None,
            skip_generation: false,
            skip_placeholder: false,
            embed_placeholder: true,
            url_strategy: None,
        }
    }
}

impl std::fmt::Debug for GenerateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateOptions")
            .field("src", &self.src)
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("webp", &self.webp)
            .field("avif", &self.avif)
            .field("widths", &self.widths)
            .field("quality", &self.quality)
            .field("skip_generation", &self.skip_generation)
            .field("skip_placeholder", &self.skip_placeholder)
            .field("embed_placeholder", &self.embed_placeholder)
            .field("url_strategy", &self.url_strategy.is_some())
            .finish()
    }
}

impl GenerateOptions {
    fn pipeline_options(&self, widths: Option<Vec<u32>>) -> ProcessImageOptions {
        ProcessImageOptions {
            widths,
            quality: self.quality,
            webp: self.webp,
            avif: self.avif,
            skip_generation: self.skip_generation,
        }
    }

    /// `input_dir/src`
    pub fn input_file(&self) -> PathBuf {
        self.input_dir.join(relative(&self.src))
    }

    /// `output_dir/dirname(src)`
    pub fn output_dir_for_src(&self) -> PathBuf {
        match Path::new(relative(&self.src)).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.output_dir.join(parent),
            _ => self.output_dir.clone(),
        }
    }

    fn url_context(&self) -> UrlContext {
        UrlContext {
            input_dir: self.input_dir.to_string_lossy().into_owned(),
            output_dir: self.output_dir.to_string_lossy().into_owned(),
            src: self.src.clone(),
        }
    }
}

/// `src` without leading separators, so joining never escapes the base dir.
fn relative(src: &str) -> &str {
    src.trim_start_matches(['/', '\\'])
}

/// Generate every variant of `options.src` and describe them for markup.
///
/// The main pipeline and the placeholder (inline or on disk) run
/// concurrently on the shared queue. All paths in the result are URLs.
pub async fn generate_component_attributes(
    queue: &WorkQueue,
    options: &GenerateOptions,
) -> PipelineResult<ComponentAttributes> {
    if options.src.is_empty() {
        return Err(PipelineError::InvalidArgument("Src is required".into()));
    }
    if options.input_dir.as_os_str().is_empty() {
        return Err(PipelineError::InvalidArgument("Input dir is required".into()));
    }
    if options.output_dir.as_os_str().is_empty() {
        return Err(PipelineError::InvalidArgument("Output dir is required".into()));
    }

    let input_file = options.input_file();
    let output_dir = options.output_dir_for_src();
    let main_options = options.pipeline_options(options.widths.clone());
    let placeholder_options = options.pipeline_options(Some(vec![PLACEHOLDER_WIDTH]));
    let inline_placeholder = !options.skip_placeholder && options.embed_placeholder;
    let file_placeholder = !options.skip_placeholder && !options.embed_placeholder;

    let (output, placeholder, placeholder_images) = tokio::try_join!(
        process_image(queue, &input_file, &output_dir, &main_options),
        async {
            if inline_placeholder {
                create_placeholder(queue, &input_file).await.map(Some)
            } else {
                Ok(None)
            }
        },
        async {
            if file_placeholder {
                process_image(queue, &input_file, &output_dir, &placeholder_options)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        },
    )?;

    let context = options.url_context();
    let strategy = options.url_strategy.as_deref();
    let output = to_urls(output, &context, strategy)?;
    let placeholder_images = placeholder_images
        .map(|images| to_urls(images, &context, strategy))
        .transpose()?;

    Ok(component_attributes(
        &AttributeInput::new(output)
            .with_placeholder(placeholder)
            .with_placeholder_images(placeholder_images),
    ))
}

fn to_urls(
    output: ProcessImageOutput,
    context: &UrlContext,
    strategy: Option<&dyn UrlStrategy>,
) -> PipelineResult<ProcessImageOutput> {
    let map = |images: Vec<GeneratedImage>| {
        images
            .iter()
            .map(|image| {
                resolve_path(&image.path, context, strategy).map(|url| image.with_path(url))
            })
            .collect::<PipelineResult<Vec<_>>>()
    };

    Ok(ProcessImageOutput {
        images: map(output.images)?,
        webp_images: map(output.webp_images)?,
        avif_images: map(output.avif_images)?,
        aspect_ratio: output.aspect_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockBackend, RecordedOp};
    use crate::url::PublicPathStrategy;

    fn setup() -> (Arc<MockBackend>, WorkQueue) {
        let backend = Arc::new(MockBackend::new());
        backend.add_image("static/photos/cat.jpg", 3000, 1500, "jpeg");
        let queue = WorkQueue::new(backend.clone(), backend.clone(), 0);
        (backend, queue)
    }

    fn options(src: &str) -> GenerateOptions {
        GenerateOptions {
            src: src.into(),
            input_dir: "static".into(),
            output_dir: "static/g".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_paths_from_src() {
        let opts = options("/photos/cat.jpg");
        assert_eq!(opts.input_file(), Path::new("static/photos/cat.jpg"));
        assert_eq!(opts.output_dir_for_src(), Path::new("static/g/photos"));

        let opts = options("cat.jpg");
        assert_eq!(opts.output_dir_for_src(), Path::new("static/g"));
    }

    #[tokio::test]
    async fn test_generates_attributes_with_inline_placeholder() {
        let (backend, queue) = setup();
        let attributes = generate_component_attributes(&queue, &options("/photos/cat.jpg"))
            .await
            .unwrap();

        let entries: Vec<&str> = attributes.srcset.split(", ").collect();
        assert_eq!(entries.len(), 5);
        assert!(entries[0].starts_with("/g/photos/cat."));
        assert!(entries[0].ends_with(".jpg 480w"));
        assert!(entries[4].ends_with(" 3000w"));
        assert!(attributes.srcsetwebp.is_some());
        assert!(attributes.srcsetavif.is_some());
        assert_eq!(attributes.aspectratio, 2.0);
        assert!(attributes
            .placeholder
            .as_deref()
            .is_some_and(|p| p.starts_with("data:image/jpeg;base64,")));
        assert!(attributes.placeholdersrc.is_none());
        assert!(backend.dir_exists("static/g/photos"));
    }

    #[tokio::test]
    async fn test_file_placeholder_mode() {
        let (backend, queue) = setup();
        let opts = GenerateOptions {
            embed_placeholder: false,
            avif: false,
            ..options("photos/cat.jpg")
        };
        let attributes = generate_component_attributes(&queue, &opts).await.unwrap();

        assert!(attributes.placeholder.is_none());
        let src = attributes.placeholdersrc.unwrap();
        assert!(src.starts_with("g/photos/cat."));
        assert!(src.ends_with(".jpg"));
        assert!(attributes.placeholderwebp.unwrap().ends_with(".webp"));
        assert!(attributes.placeholderavif.is_none());
        assert!(attributes.srcsetavif.is_none());
        assert_eq!(
            backend.count(|op| matches!(op, RecordedOp::ResizeToBuffer { .. })),
            0
        );
        assert_eq!(
            backend.count(|op| matches!(op, RecordedOp::ResizeToFile { width: 64, .. })),
            2
        );
    }

    #[tokio::test]
    async fn test_skip_placeholder() {
        let (_backend, queue) = setup();
        let opts = GenerateOptions {
            skip_placeholder: true,
            ..options("photos/cat.jpg")
        };
        let attributes = generate_component_attributes(&queue, &opts).await.unwrap();
        assert!(attributes.placeholder.is_none());
        assert!(attributes.placeholdersrc.is_none());
    }

    #[tokio::test]
    async fn test_url_strategy_sees_output_relative_paths() {
        let (_backend, queue) = setup();
        let opts = GenerateOptions {
            url_strategy: Some(Arc::new(PublicPathStrategy::new("https://cdn.test"))),
            widths: Some(vec![480]),
            ..options("photos/cat.jpg")
        };
        let attributes = generate_component_attributes(&queue, &opts).await.unwrap();
        assert!(attributes.srcset.starts_with("https://cdn.test/photos/cat."));
    }

    #[tokio::test]
    async fn test_empty_url_fails() {
        let (_backend, queue) = setup();
        let strategy = |_: &str, _: &UrlContext| String::new();
        let opts = GenerateOptions {
            url_strategy: Some(Arc::new(strategy)),
            ..options("photos/cat.jpg")
        };
        let err = generate_component_attributes(&queue, &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyUrl(_)));
    }

    #[tokio::test]
    async fn test_required_options() {
        let (_backend, queue) = setup();
        for opts in [
            options(""),
            GenerateOptions {
                input_dir: PathBuf::new(),
                ..options("a.jpg")
            },
            GenerateOptions {
                output_dir: PathBuf::new(),
                ..options("a.jpg")
            },
        ] {
            let err = generate_component_attributes(&queue, &opts)
                .await
                .unwrap_err();
            assert!(matches!(err, PipelineError::InvalidArgument(_)));
        }
    }

    #[tokio::test]
    async fn test_shared_queue_dedups_across_calls() {
        let (backend, queue) = setup();
        let opts = options("photos/cat.jpg");
        let first = generate_component_attributes(&queue, &opts).await.unwrap();
        let writes = backend.count(RecordedOp::is_codec_write);
        let second = generate_component_attributes(&queue, &opts).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.count(RecordedOp::is_codec_write), writes);
    }
}
