//! Transcode images to WebP.
//!
//! This module uses [`image`] to decode and [`webp`] to encode.

use image::DynamicImage;
use thiserror::Error;

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Decoder error.
    #[error(transparent)]
    Decode(#[from] image::ImageError),
    /// Encoder error.
    #[error("failed to encode WebP image: {0}")]
    Encode(String),
}

/// Re-encode an image to lossy WebP.
///
/// The input format is guessed from its content. `quality` ranges from `0`
/// (smallest) to `100` (best).
pub fn encode_webp(input: &[u8], quality: f32) -> Result<Vec<u8>, ImageError> {
    let image = image::load_from_memory(input)?;

    // The encoder only accepts 8-bit RGB(A) pixels
    let image = match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
        image if image.color().has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
        image => DynamicImage::ImageRgb8(image.to_rgb8()),
    };

    let encoder = webp::Encoder::from_image(&image)
        .map_err(|error| ImageError::Encode(error.to_string()))?;

    let output = encoder
        .encode_simple(false, quality)
        .map_err(|error| ImageError::Encode(format!("{error:?}")))?;

    Ok(output.to_vec())
}
