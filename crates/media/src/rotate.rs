//! Bitmap rotation with lossy re-encoding.

use image::DynamicImage;

use crate::{Error, Result, image_ops};

/// Quality used when re-encoding a rotated image.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Rotate `source` clockwise by `degrees` and re-encode it as JPEG at maximum
/// quality.
///
/// Returns `Ok(None)` for `0`, without decoding anything: the caller keeps
/// its original bytes. See [`rotate_if_needed_with_quality`].
pub fn rotate_if_needed(source: &[u8], degrees: u16) -> Result<Option<Vec<u8>>> {
    rotate_if_needed_with_quality(source, degrees, MAX_JPEG_QUALITY)
}

/// Like [`rotate_if_needed`] with an explicit JPEG quality (1-100).
///
/// Only 0, 90, 180 and 270 are accepted. Width and height swap for 90 and
/// 270. Undecodable input fails with [`Error::Decode`].
pub fn rotate_if_needed_with_quality(
    source: &[u8],
    degrees: u16,
    quality: u8,
) -> Result<Option<Vec<u8>>> {
    let rotate: fn(&DynamicImage) -> DynamicImage = match degrees {
        0 => return Ok(None),
        90 => DynamicImage::rotate90,
        180 => DynamicImage::rotate180,
        270 => DynamicImage::rotate270,
        other => {
            return Err(Error::invalid_input(format!(
                "unsupported rotation of {other} degrees"
            )));
        },
    };

    let img = image_ops::decode(source)?;
    let rotated = rotate(&img);
    image_ops::encode_jpeg_with_quality(&rotated, quality).map(Some)
}
