//! Gaussian blur.
//!
//! Wraps [`imageproc::filter::gaussian_blur_f32`]. The blur radius is the
//! standard deviation of the kernel in pixels. `imageproc` clamps to the
//! nearest edge pixel when the kernel reaches past the border, so edge
//! pixels are blurred with replicated neighbours.
//!
//! [`gaussian_blur_gray`] operates on a single channel.
//! [`gaussian_blur_rgb`] applies the same blur independently to each
//! R/G/B channel of a color image.

use image::GrayImage;

use crate::catalog::TransformKind;
use crate::types::{Raster, RgbImage, TransformError};

/// Apply Gaussian blur to a grayscale image.
///
/// Non-positive sigma values return the image unchanged, since
/// `imageproc`'s underlying function panics on `sigma <= 0.0`.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur_gray(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return image.clone();
    }

    imageproc::filter::gaussian_blur_f32(image, sigma)
}

/// Apply Gaussian blur to an RGB image by blurring each channel
/// independently.
///
/// Splits the image into three single-channel images, blurs each, and
/// reassembles. Gaussian blur is linear and per-channel, so this is
/// equivalent to blurring in color space.
///
/// Non-positive sigma values return the image unchanged.
#[must_use = "returns the blurred RGB image"]
pub fn gaussian_blur_rgb(image: &RgbImage, sigma: f32) -> RgbImage {
    if sigma <= 0.0 {
        return image.clone();
    }

    let (w, h) = (image.width(), image.height());

    let channels: [GrayImage; 3] = std::array::from_fn(|c| {
        GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y).0[c]]))
    });

    let blurred: [GrayImage; 3] =
        std::array::from_fn(|c| imageproc::filter::gaussian_blur_f32(&channels[c], sigma));

    RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([
            blurred[0].get_pixel(x, y).0[0],
            blurred[1].get_pixel(x, y).0[0],
            blurred[2].get_pixel(x, y).0[0],
        ])
    })
}

/// Blur a raster with Gaussian standard deviation `radius`.
///
/// A radius of zero (or below) is the identity.
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster and
/// [`TransformError::InvalidParameter`] for a non-finite radius.
#[allow(clippy::cast_possible_truncation)]
pub fn gaussian_blur(image: Raster, radius: f64) -> Result<Raster, TransformError> {
    image.ensure_non_empty(TransformKind::Blur)?;
    if !radius.is_finite() {
        return Err(TransformError::InvalidParameter {
            transform: TransformKind::Blur,
            value: radius,
        });
    }
    if radius <= 0.0 {
        return Ok(image);
    }

    let sigma = radius as f32;
    Ok(match image {
        Raster::Luma(img) => Raster::Luma(gaussian_blur_gray(&img, sigma)),
        Raster::Rgb(img) => Raster::Rgb(gaussian_blur_rgb(&img, sigma)),
    })
}
