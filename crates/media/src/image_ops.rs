//! Image decode/encode helpers shared by the rotator and the legacy
//! thumbnail path.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, codecs::jpeg::JpegEncoder};

use crate::{Error, Result};

/// Bounding box for legacy thumbnails.
pub const THUMBNAIL_MAX_WIDTH: u32 = 512;
pub const THUMBNAIL_MAX_HEIGHT: u32 = 384;

/// JPEG quality for thumbnails (0-100).
pub const THUMBNAIL_JPEG_QUALITY: u8 = 85;

/// Image metadata.
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
}

/// Get metadata about an image without fully decoding it.
pub fn get_image_metadata(data: &[u8]) -> Result<ImageMetadata> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;

    let format = reader.format();
    let (width, height) = reader.into_dimensions().map_err(Error::Decode)?;

    Ok(ImageMetadata {
        width,
        height,
        format,
    })
}

/// Decode an in-memory image, guessing the format from its magic bytes.
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()
        .map_err(Error::Decode)
}

/// Encode image as JPEG with the given quality.
///
/// JPEG has no alpha channel and no 16-bit depth, so anything other than
/// 8-bit gray or RGB is flattened to RGB first.
pub fn encode_jpeg_with_quality(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut output = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut output, quality);
    let written = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img.write_with_encoder(encoder),
        _ => DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder),
    };
    written.map_err(Error::Encode)?;
    Ok(output.into_inner())
}

/// Shrink image to fit within the bounding box, preserving aspect ratio.
/// Images already inside the box are returned unchanged.
pub fn resize_to_fit(img: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (width, height) = img.dimensions();

    if width <= max_width && height <= max_height {
        return img.clone();
    }

    let ratio = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let new_width = ((width as f64 * ratio).round() as u32).max(1);
    let new_height = ((height as f64 * ratio).round() as u32).max(1);

    img.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

/// Build a JPEG thumbnail that fits the legacy thumbnail box.
pub fn make_thumbnail(data: &[u8]) -> Result<Vec<u8>> {
    let img = decode(data)?;
    let thumb = resize_to_fit(&img, THUMBNAIL_MAX_WIDTH, THUMBNAIL_MAX_HEIGHT);
    encode_jpeg_with_quality(&thumb, THUMBNAIL_JPEG_QUALITY)
}

/// MIME type guessed from the image's magic bytes, for sources whose
/// extension says nothing.
pub fn sniff_media_type(data: &[u8]) -> Option<&'static str> {
    let format = image::guess_format(data).ok()?;
    format_to_media_type(format)
}

fn format_to_media_type(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Tiff => Some("image/tiff"),
        _ => None,
    }
}
