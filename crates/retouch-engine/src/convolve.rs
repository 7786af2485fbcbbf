//! Fixed 3x3 convolution filters: smoothing and edge enhancement.
//!
//! Pixels outside the image are taken from the nearest edge pixel
//! (clamp-to-edge), so every output pixel is defined and the output
//! has the same dimensions as the input.

use image::{ImageBuffer, Pixel};
use imageproc::filter::filter_clamped;
use imageproc::kernel::Kernel;
use imageproc::map::WithChannel;

use crate::catalog::TransformKind;
use crate::types::{Raster, TransformError};

/// Mild low-pass kernel, row-major: `[[1,1,1],[1,5,1],[1,1,1]] / 13`.
pub const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    5.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
];

/// High-frequency boost kernel, row-major:
/// `[[-1,-1,-1],[-1,10,-1],[-1,-1,-1]] / 2`.
pub const EDGE_ENHANCE_KERNEL: [f32; 9] = [-0.5, -0.5, -0.5, -0.5, 5.0, -0.5, -0.5, -0.5, -0.5];

/// Convolve every channel of `image` with a 3x3 `kernel`.
///
/// `imageproc` accumulates in `f32` and reads past the border from the
/// nearest edge pixel. Results are then rounded to the nearest integer
/// and clamped to `[0, 255]`.
#[must_use = "returns the filtered image"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn convolve3x3<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    kernel: &[f32; 9],
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + WithChannel<f32>,
{
    let filtered = filter_clamped::<P, f32, f32>(image, Kernel::new(kernel, 3, 3));
    let mut out = image.clone();
    for (dst, &v) in out.iter_mut().zip(filtered.iter()) {
        *dst = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn filter(
    image: Raster,
    kernel: &[f32; 9],
    transform: TransformKind,
) -> Result<Raster, TransformError> {
    image.ensure_non_empty(transform)?;
    Ok(match image {
        Raster::Luma(img) => Raster::Luma(convolve3x3(&img, kernel)),
        Raster::Rgb(img) => Raster::Rgb(convolve3x3(&img, kernel)),
    })
}

/// Apply [`SMOOTH_KERNEL`].
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster.
pub fn smooth(image: Raster) -> Result<Raster, TransformError> {
    filter(image, &SMOOTH_KERNEL, TransformKind::Smoothing)
}

/// Apply [`EDGE_ENHANCE_KERNEL`].
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster.
pub fn edge_enhance(image: Raster) -> Result<Raster, TransformError> {
    filter(image, &EDGE_ENHANCE_KERNEL, TransformKind::EdgeEnhance)
}
