//! Pure-Rust codec built on the `image` crate.
//!
//! | Operation | Implementation |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only); AVIF via `avif-parse` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode JPEG | `JpegEncoder::new_with_quality` |
//! | Encode AVIF | `AvifEncoder::new_with_speed_quality` (rav1e) |
//! | Encode WebP | `image`'s lossless WebP encoder (quality is ignored) |
//!
//! AVIF sources cannot be resized: only the AVIF encoder is compiled in.

use async_trait::async_trait;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use crate::error::{PipelineError, PipelineResult};
use crate::types::ImageMetadata;

use super::codec::{ImageCodec, ResizeParams};

/// Encoder quality used when a resize does not request one.
pub const DEFAULT_QUALITY: u32 = 80;

/// rav1e speed preset (1 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Codec backed by the `image` crate. All CPU work runs on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageCodec for RustCodec {
    async fn metadata(&self, path: &Path) -> PipelineResult<ImageMetadata> {
        let owned = path.to_path_buf();
        blocking(path, move || identify(&owned)).await
    }

    async fn resize_to_file(
        &self,
        input: &Path,
        params: &ResizeParams,
        output: &Path,
    ) -> PipelineResult<ImageMetadata> {
        let input = input.to_path_buf();
        let target = output.to_path_buf();
        let params = *params;
        let start = Instant::now();

        let metadata = blocking(output, move || {
            let output = target;
            let format = ImageFormat::from_path(&output).map_err(|_| {
                PipelineError::codec(&output, "cannot choose an encoder for this extension")
            })?;
            let (source, _) = decode(&input)?;
            let resized = resize(&source, &params);
            let bytes = encode(&resized, format, params.quality, &output)?;
            std::fs::write(&output, bytes).map_err(|e| PipelineError::io(&output, e))?;

            let (width, height) = resized.dimensions();
            Ok(ImageMetadata {
                width: Some(width),
                height: Some(height),
                format: format_name(format).map(str::to_string),
            })
        })
        .await?;

        tracing::trace!(
            "Encoded {:?} at {:?}w in {:?}",
            metadata.format,
            metadata.width,
            start.elapsed()
        );
        Ok(metadata)
    }

    async fn resize_to_buffer(
        &self,
        input: &Path,
        params: &ResizeParams,
    ) -> PipelineResult<Vec<u8>> {
        let source_path = input.to_path_buf();
        let params = *params;

        blocking(input, move || {
            let input = source_path;
            let (source, format) = decode(&input)?;
            let format = format.ok_or_else(|| PipelineError::FormatUndetermined(input.clone()))?;
            let resized = resize(&source, &params);
            encode(&resized, format, params.quality, &input)
        })
        .await
    }
}

/// Lowercase format name as reported in [`ImageMetadata::format`].
pub fn format_name(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("jpeg"),
        ImageFormat::Png => Some("png"),
        ImageFormat::WebP => Some("webp"),
        ImageFormat::Avif => Some("avif"),
        ImageFormat::Gif => Some("gif"),
        ImageFormat::Tiff => Some("tiff"),
        ImageFormat::Bmp => Some("bmp"),
        ImageFormat::Ico => Some("ico"),
        _ => None,
    }
}

async fn blocking<T, F>(path: &Path, work: F) -> PipelineResult<T>
where
    F: FnOnce() -> PipelineResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PipelineError::Task {
            path: path.to_path_buf(),
            message: format!("Task join error: {e}"),
        })?
}

type FileReader = ImageReader<std::io::BufReader<std::fs::File>>;

/// Open `path`, detecting the format by content and falling back to the
/// extension.
fn open(path: &Path) -> PipelineResult<(FileReader, Option<ImageFormat>)> {
    let mut reader = ImageReader::open(path)
        .map_err(|e| PipelineError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| PipelineError::io(path, e))?;

    let format = match reader.format() {
        Some(format) => Some(format),
        None => {
            let format = ImageFormat::from_path(path).ok();
            if let Some(format) = format {
                reader.set_format(format);
            }
            format
        }
    };
    Ok((reader, format))
}

/// Read dimensions and format from the header.
fn identify(path: &Path) -> PipelineResult<ImageMetadata> {
    let (reader, format) = open(path)?;
    let Some(format) = format else {
        tracing::debug!("Unrecognized image format: {:?}", path);
        return Ok(ImageMetadata::default());
    };

    let (width, height) = if format == ImageFormat::Avif {
        avif_dimensions(path)?
    } else {
        reader
            .into_dimensions()
            .map_err(|e| PipelineError::codec(path, e))?
    };

    Ok(ImageMetadata {
        width: Some(width),
        height: Some(height),
        format: format_name(format).map(str::to_string),
    })
}

/// Dimensions from the AVIF container, without decoding AV1.
fn avif_dimensions(path: &Path) -> PipelineResult<(u32, u32)> {
    let data = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;
    let avif = avif_parse::read_avif(&mut Cursor::new(&data))
        .map_err(|e| PipelineError::codec(path, format!("Failed to parse AVIF: {e:?}")))?;
    let meta = avif
        .primary_item_metadata()
        .map_err(|e| PipelineError::codec(path, format!("Failed to read AVIF metadata: {e:?}")))?;
    Ok((meta.max_frame_width.get(), meta.max_frame_height.get()))
}

fn decode(path: &Path) -> PipelineResult<(DynamicImage, Option<ImageFormat>)> {
    let (reader, format) = open(path)?;
    if format == Some(ImageFormat::Avif) {
        return Err(PipelineError::codec(path, "AVIF decoding is not supported"));
    }
    let image = reader.decode().map_err(|e| PipelineError::codec(path, e))?;
    Ok((image, format))
}

fn resize(image: &DynamicImage, params: &ResizeParams) -> DynamicImage {
    let (src_width, src_height) = image.dimensions();
    let width = params.width.max(1);
    let height = params.height.unwrap_or_else(|| {
        let scaled = f64::from(width) * f64::from(src_height) / f64::from(src_width.max(1));
        (scaled.round() as u32).max(1)
    });
    image.resize_exact(width, height, FilterType::Lanczos3)
}

fn encode(
    image: &DynamicImage,
    format: ImageFormat,
    quality: Option<u32>,
    path: &Path,
) -> PipelineResult<Vec<u8>> {
    let quality = quality.unwrap_or(DEFAULT_QUALITY).clamp(1, 100) as u8;
    let mut buffer = Vec::new();

    let result = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality)),
        ImageFormat::Avif => DynamicImage::ImageRgba8(image.to_rgba8()).write_with_encoder(
            AvifEncoder::new_with_speed_quality(&mut buffer, AVIF_SPEED, quality),
        ),
        ImageFormat::WebP => DynamicImage::ImageRgba8(image.to_rgba8())
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::WebP),
        other => image.write_to(&mut Cursor::new(&mut buffer), other),
    };

    result.map_err(|e| PipelineError::codec(path, e))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_fixture(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        DynamicImage::new_rgb8(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn test_format_name() {
        assert_eq!(format_name(ImageFormat::Jpeg), Some("jpeg"));
        assert_eq!(format_name(ImageFormat::WebP), Some("webp"));
        assert_eq!(format_name(ImageFormat::Avif), Some("avif"));
        assert_eq!(format_name(ImageFormat::Qoi), None);
    }

    #[test]
    fn test_resize_keeps_aspect_ratio() {
        let image = DynamicImage::new_rgb8(300, 100);
        let resized = resize(&image, &ResizeParams::width(64));
        assert_eq!(resized.dimensions(), (64, 21));
    }

    #[test]
    fn test_resize_height_never_zero() {
        let image = DynamicImage::new_rgb8(1000, 1);
        let resized = resize(&image, &ResizeParams::width(10));
        assert_eq!(resized.dimensions(), (10, 1));
    }

    #[tokio::test]
    async fn test_metadata_reads_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "a.png", 120, 80);

        let metadata = RustCodec.metadata(&path).await.unwrap();
        assert_eq!(metadata, ImageMetadata::new(120, 80, "png"));
    }

    #[tokio::test]
    async fn test_format_detected_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_fixture(dir.path(), "a.png", 16, 16);
        let misnamed = dir.path().join("a.jpg");
        std::fs::copy(&png, &misnamed).unwrap();

        let metadata = RustCodec.metadata(&misnamed).await.unwrap();
        assert_eq!(metadata.format.as_deref(), Some("png"));
    }

    #[tokio::test]
    async fn test_metadata_unknown_format_has_no_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"plain text, not pixels").unwrap();

        let metadata = RustCodec.metadata(&path).await.unwrap();
        assert!(metadata.dimensions().is_none());
        assert!(metadata.format.is_none());
    }

    #[tokio::test]
    async fn test_metadata_corrupt_file_is_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"plain text, not pixels").unwrap();

        let err = RustCodec.metadata(&path).await.unwrap_err();
        assert!(matches!(err, PipelineError::Codec { .. }));
    }

    #[tokio::test]
    async fn test_metadata_missing_file() {
        let err = RustCodec
            .metadata(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[tokio::test]
    async fn test_resize_to_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(dir.path(), "a.png", 200, 100);

        let jpeg = dir.path().join("a.100.jpg");
        let written = RustCodec
            .resize_to_file(&input, &ResizeParams::with_quality(100, Some(70)), &jpeg)
            .await
            .unwrap();
        assert_eq!(written, ImageMetadata::new(100, 50, "jpeg"));
        assert_eq!(
            RustCodec.metadata(&jpeg).await.unwrap(),
            ImageMetadata::new(100, 50, "jpeg")
        );

        let webp = dir.path().join("a.100.webp");
        RustCodec
            .resize_to_file(&input, &ResizeParams::width(100), &webp)
            .await
            .unwrap();
        assert_eq!(&std::fs::read(&webp).unwrap()[0..4], b"RIFF");
    }

    #[tokio::test]
    async fn test_avif_round_trip_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(dir.path(), "a.png", 80, 40);
        let avif = dir.path().join("a.40.avif");

        let written = RustCodec
            .resize_to_file(&input, &ResizeParams::width(40), &avif)
            .await
            .unwrap();
        assert_eq!(written, ImageMetadata::new(40, 20, "avif"));
        assert_eq!(
            RustCodec.metadata(&avif).await.unwrap(),
            ImageMetadata::new(40, 20, "avif")
        );
    }

    #[tokio::test]
    async fn test_resize_to_file_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(dir.path(), "a.png", 20, 20);

        let err = RustCodec
            .resize_to_file(&input, &ResizeParams::width(10), &dir.path().join("a.xyz"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Codec { .. }));
    }

    #[tokio::test]
    async fn test_resize_to_buffer_keeps_source_format() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(dir.path(), "a.png", 640, 320);

        let bytes = RustCodec
            .resize_to_buffer(&input, &ResizeParams::width(64))
            .await
            .unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (64, 32));
        assert!(!dir.path().join("a.64.png").exists());
    }
}
