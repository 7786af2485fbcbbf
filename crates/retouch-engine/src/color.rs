//! Per-pixel color remapping: grayscale, invert and sepia.
//!
//! All three are point operations with exact integer arithmetic, so the
//! outputs are reproducible bit for bit across platforms.

use image::{GrayImage, Rgb};

use crate::catalog::TransformKind;
use crate::types::{Raster, TransformError};

/// ITU-R BT.601 luma of an RGB triple, rounded half up.
///
/// `(299 R + 587 G + 114 B + 500) / 1000`
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn luma(r: u8, g: u8, b: u8) -> u8 {
    let sum = 299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500;
    // The weights sum to 1000, so the quotient never exceeds 255.
    (sum / 1000) as u8
}

/// Convert to single-channel luma using [`luma`].
///
/// A raster that is already single-channel is returned unchanged.
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster.
pub fn grayscale(image: Raster) -> Result<Raster, TransformError> {
    image.ensure_non_empty(TransformKind::Grayscale)?;
    Ok(match image {
        Raster::Luma(img) => Raster::Luma(img),
        Raster::Rgb(img) => Raster::Luma(GrayImage::from_fn(img.width(), img.height(), |x, y| {
            let [r, g, b] = img.get_pixel(x, y).0;
            image::Luma([luma(r, g, b)])
        })),
    })
}

/// Force three channels, then replace every channel value `v` with
/// `255 - v`.
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster.
pub fn invert(image: Raster) -> Result<Raster, TransformError> {
    image.ensure_non_empty(TransformKind::Invert)?;
    let mut rgb = image.into_rgb();
    image::imageops::invert(&mut rgb);
    Ok(Raster::Rgb(rgb))
}

/// Sepia matrix coefficients in thousandths, one row per output channel.
const SEPIA: [[u32; 3]; 3] = [[393, 769, 189], [349, 686, 168], [272, 534, 131]];

/// Apply the sepia tone matrix to one RGB pixel.
///
/// ```text
/// R' = 0.393 R + 0.769 G + 0.189 B
/// G' = 0.349 R + 0.686 G + 0.168 B
/// B' = 0.272 R + 0.534 G + 0.131 B
/// ```
///
/// Evaluated in integer thousandths, rounded half up, clamped to 255.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn sepia_pixel(pixel: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = pixel.0.map(u32::from);
    Rgb(SEPIA.map(|[wr, wg, wb]| {
        let thousandths = wr * r + wg * g + wb * b + 500;
        (thousandths / 1000).min(255) as u8
    }))
}

/// Force three channels, then apply [`sepia_pixel`] to every pixel.
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster.
pub fn sepia(image: Raster) -> Result<Raster, TransformError> {
    image.ensure_non_empty(TransformKind::Sepia)?;
    let mut rgb = image.into_rgb();
    for pixel in rgb.pixels_mut() {
        *pixel = sepia_pixel(*pixel);
    }
    Ok(Raster::Rgb(rgb))
}
