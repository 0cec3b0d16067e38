use anyhow::{Context, Result, bail};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Pixel};
use img_parts::Bytes;
use serde::Serialize;
use std::ffi::OsString;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::metadata::detect_blocks_in;
use crate::pipeline::ImageKind;

/// The outcome of cleaning one image.
///
/// A failure never aborts a batch: the error text is carried here and the
/// caller moves on to the next file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrubResult {
    pub input: PathBuf,
    /// Where the cleaned copy was (or would have been) written.
    pub output: Option<PathBuf>,
    pub error: Option<String>,
}

impl ScrubResult {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Base name of the input, as shown in status lines.
    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}

/// Path of the cleaned copy when no output path is given: `suffix` is
/// inserted before the final extension, in the same directory.
///
/// ```rust
/// use metaclean::scrub::default_output_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     default_output_path(Path::new("shots/photo.jpg"), "_cleaned"),
///     PathBuf::from("shots/photo_cleaned.jpg")
/// );
/// ```
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(input.file_stem().unwrap_or_default());
    name.push(suffix);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}

/// Write a metadata-free copy of the image at `input`.
///
/// The image is decoded, its pixel buffer copied into a brand new image of
/// the same color type and size, and that image is encoded to `output`
/// (or [`default_output_path`] when `None`). The container format follows
/// the output path's extension.
///
/// # Example
///
/// ```rust,no_run
/// use metaclean::config::OutputConfig;
/// use metaclean::scrub::scrub_image;
/// use std::path::Path;
///
/// let result = scrub_image(Path::new("photo.jpg"), None, &OutputConfig::default());
/// match result.error {
///     None => println!("Wrote {}", result.output.unwrap().display()),
///     Some(err) => eprintln!("Failed: {err}"),
/// }
/// ```
pub fn scrub_image(input: &Path, output: Option<&Path>, options: &OutputConfig) -> ScrubResult {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input, &options.suffix),
    };

    let error = match write_clean_copy(input, &output, options) {
        Ok(()) => None,
        Err(e) => {
            log::debug!("Scrub failed for {}: {e:#}", input.display());
            Some(format!("{e:#}"))
        }
    };

    ScrubResult {
        input: input.to_path_buf(),
        output: Some(output),
        error,
    }
}

fn write_clean_copy(input: &Path, output: &Path, options: &OutputConfig) -> Result<()> {
    let source = ImageReader::open(input)
        .context("Failed to open image")?
        .with_guessed_format()
        .context("Failed to read image header")?
        .decode()
        .context("Failed to decode image")?;

    log::debug!(
        "Decoded {}: {:?} {}x{}",
        input.display(),
        source.color(),
        source.width(),
        source.height()
    );

    let clean = rebuild_from_pixels(&source)?;
    drop(source);

    let format = ImageFormat::from_path(output)
        .with_context(|| format!("Cannot infer image format from {}", output.display()))?;
    let bytes = Bytes::from(encode(&clean, format, options.jpeg_quality)?);

    if options.verify_output {
        match ImageKind::from_format(format) {
            Some(kind) => {
                let blocks = detect_blocks_in(bytes.clone(), kind)
                    .context("Failed to verify cleaned image")?;
                if !blocks.is_clean() {
                    bail!(
                        "Cleaned image still carries metadata: {}",
                        blocks.present().join(", ")
                    );
                }
            }
            None => log::debug!("No metadata verification for {format:?} output"),
        }
    }

    std::fs::write(output, &bytes).context("Failed to write cleaned image")?;
    log::debug!("Wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

/// Copy the pixel buffer of `image` into a new image of the same color type
/// and dimensions. Nothing but samples crosses over.
pub fn rebuild_from_pixels(image: &DynamicImage) -> Result<DynamicImage> {
    Ok(match image {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(copy_pixels(buf)?),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(copy_pixels(buf)?),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(copy_pixels(buf)?),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(copy_pixels(buf)?),
        DynamicImage::ImageLuma16(buf) => DynamicImage::ImageLuma16(copy_pixels(buf)?),
        DynamicImage::ImageLumaA16(buf) => DynamicImage::ImageLumaA16(copy_pixels(buf)?),
        DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb16(copy_pixels(buf)?),
        DynamicImage::ImageRgba16(buf) => DynamicImage::ImageRgba16(copy_pixels(buf)?),
        DynamicImage::ImageRgb32F(buf) => DynamicImage::ImageRgb32F(copy_pixels(buf)?),
        DynamicImage::ImageRgba32F(buf) => DynamicImage::ImageRgba32F(copy_pixels(buf)?),
        other => bail!("Unsupported pixel layout: {:?}", other.color()),
    })
}

fn copy_pixels<P: Pixel>(
    source: &ImageBuffer<P, Vec<P::Subpixel>>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    let (width, height) = source.dimensions();
    ImageBuffer::from_raw(width, height, source.as_raw().to_vec())
        .context("Pixel buffer does not match image dimensions")
}

fn encode(image: &DynamicImage, format: ImageFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality);
            image
                .write_with_encoder(encoder)
                .context("Failed to encode JPEG")?;
        }
        _ => image
            .write_to(&mut buf, format)
            .with_context(|| format!("Failed to encode {format:?}"))?,
    }
    Ok(buf.into_inner())
}
