//! Factor-based enhancements: brightness, contrast, saturation, sharpness.
//!
//! Each enhancement blends between a *baseline* image and the input:
//!
//! ```text
//! out = round(baseline + factor * (input - baseline)), clamped to [0, 255]
//! ```
//!
//! | Enhancement | Baseline |
//! |---|---|
//! | brightness | black |
//! | contrast | mean BT.601 luma of the whole image |
//! | saturation | the pixel's own BT.601 luma |
//! | sharpness | the 3x3 smoothed image ([`convolve::SMOOTH_KERNEL`]) |
//!
//! A factor of 1.0 reproduces the input exactly, factors below 1.0 move
//! toward the baseline, and factors above 1.0 extrapolate away from it.
//! The output is monotonic in the factor for every subpixel.

use image::{ImageBuffer, Pixel};
use imageproc::map::WithChannel;

use crate::catalog::TransformKind;
use crate::color::luma;
use crate::convolve;
use crate::types::{Raster, TransformError};

/// Interpolate (or extrapolate) from `baseline` toward `value`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(baseline: u8, value: u8, factor: f64) -> u8 {
    let base = f64::from(baseline);
    factor
        .mul_add(f64::from(value) - base, base)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Reject factors outside `(0, inf)`.
fn validate_factor(transform: TransformKind, factor: f64) -> Result<(), TransformError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(TransformError::InvalidParameter {
            transform,
            value: factor,
        });
    }
    Ok(())
}

/// Scale every subpixel by `factor`.
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster and
/// [`TransformError::InvalidParameter`] for a non-positive or
/// non-finite factor.
pub fn brightness(image: Raster, factor: f64) -> Result<Raster, TransformError> {
    image.ensure_non_empty(TransformKind::Brightness)?;
    validate_factor(TransformKind::Brightness, factor)?;
    Ok(image.map_subpixels(|v| blend(0, v, factor)))
}

/// Mean luma over the whole raster, rounded to the nearest integer.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn mean_luma(image: &Raster) -> u8 {
    let (sum, count): (u64, u64) = match image {
        Raster::Luma(img) => (img.iter().map(|&v| u64::from(v)).sum(), img.len() as u64),
        Raster::Rgb(img) => (
            img.pixels()
                .map(|p| u64::from(luma(p.0[0], p.0[1], p.0[2])))
                .sum(),
            u64::from(img.width()) * u64::from(img.height()),
        ),
    };
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round().clamp(0.0, 255.0) as u8
}

/// Stretch every subpixel away from the image's mean luma by `factor`.
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster and
/// [`TransformError::InvalidParameter`] for a non-positive or
/// non-finite factor.
pub fn contrast(image: Raster, factor: f64) -> Result<Raster, TransformError> {
    image.ensure_non_empty(TransformKind::Contrast)?;
    validate_factor(TransformKind::Contrast, factor)?;
    let mean = mean_luma(&image);
    Ok(image.map_subpixels(|v| blend(mean, v, factor)))
}

/// Push each channel away from its pixel's luma by `factor`.
///
/// A single-channel raster has no chroma and is returned unchanged.
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster and
/// [`TransformError::InvalidParameter`] for a non-positive or
/// non-finite factor.
pub fn saturation(image: Raster, factor: f64) -> Result<Raster, TransformError> {
    image.ensure_non_empty(TransformKind::Saturation)?;
    validate_factor(TransformKind::Saturation, factor)?;
    Ok(match image {
        Raster::Luma(img) => Raster::Luma(img),
        Raster::Rgb(mut img) => {
            for pixel in img.pixels_mut() {
                let [r, g, b] = pixel.0;
                let l = luma(r, g, b);
                pixel.0 = [blend(l, r, factor), blend(l, g, factor), blend(l, b, factor)];
            }
            Raster::Rgb(img)
        }
    })
}

/// Push every subpixel away from a 3x3 smoothed copy by `factor`.
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster and
/// [`TransformError::InvalidParameter`] for a non-positive or
/// non-finite factor.
pub fn sharpness(image: Raster, factor: f64) -> Result<Raster, TransformError> {
    image.ensure_non_empty(TransformKind::Sharpness)?;
    validate_factor(TransformKind::Sharpness, factor)?;
    Ok(match image {
        Raster::Luma(img) => Raster::Luma(sharpen_buffer(img, factor)),
        Raster::Rgb(img) => Raster::Rgb(sharpen_buffer(img, factor)),
    })
}

fn sharpen_buffer<P>(mut image: ImageBuffer<P, Vec<u8>>, factor: f64) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + WithChannel<f32>,
{
    let smoothed = convolve::convolve3x3(&image, &convolve::SMOOTH_KERNEL);
    for (v, &s) in image.iter_mut().zip(smoothed.iter()) {
        *v = blend(s, *v, factor);
    }
    image
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use crate::types::{GrayImage, RgbImage};

    fn photo() -> Raster {
        Raster::Rgb(RgbImage::from_fn(12, 10, |x, y| {
            image::Rgb([
                (40 + x * 15) as u8,
                (30 + y * 20) as u8,
                (((x * y) * 7) % 200) as u8,
            ])
        }))
    }

    fn mean(raster: &Raster) -> f64 {
        let raw = raster.as_raw();
        raw.iter().map(|&v| f64::from(v)).sum::<f64>() / raw.len() as f64
    }

    /// Sum of squared differences between horizontally adjacent subpixels.
    fn roughness(raster: &Raster) -> u64 {
        let rgb = raster.clone().into_rgb();
        let mut total = 0u64;
        for y in 0..rgb.height() {
            for x in 1..rgb.width() {
                for c in 0..3 {
                    let d = i64::from(rgb.get_pixel(x, y).0[c])
                        - i64::from(rgb.get_pixel(x - 1, y).0[c]);
                    total += (d * d).unsigned_abs();
                }
            }
        }
        total
    }

    #[test]
    fn blend_is_identity_at_one() {
        for base in [0u8, 17, 128, 255] {
            for v in [0u8, 1, 99, 200, 255] {
                assert_eq!(blend(base, v, 1.0), v);
            }
        }
    }

    #[test]
    fn blend_is_monotonic_in_factor() {
        let mut last = blend(100, 150, 0.1);
        for step in 2..=30 {
            let factor = f64::from(step) * 0.1;
            let next = blend(100, 150, factor);
            assert!(next >= last, "blend decreased at factor {factor}");
            last = next;
        }
    }

    #[test]
    fn factor_one_is_identity_for_all_enhancements() {
        let img = photo();
        for op in [brightness, contrast, saturation, sharpness] {
            assert_eq!(op(img.clone(), 1.0).unwrap(), img);
        }
    }

    #[test]
    fn invalid_factors_are_rejected() {
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = brightness(photo(), factor);
            assert!(
                matches!(result, Err(TransformError::InvalidParameter { .. })),
                "factor {factor} accepted",
            );
        }
    }

    #[test]
    fn brightness_scales_channels() {
        let img = Raster::Rgb(RgbImage::from_pixel(2, 2, image::Rgb([100, 50, 200])));
        let out = brightness(img, 1.4).unwrap();
        for chunk in out.as_raw().chunks(3) {
            assert_eq!(chunk, &[140, 70, 255]);
        }
    }

    #[test]
    fn brightness_raises_mean() {
        let img = photo();
        let out = brightness(img.clone(), 1.4).unwrap();
        assert!(mean(&out) > mean(&img));
    }

    #[test]
    fn contrast_widens_spread_around_mean() {
        let img = Raster::Luma(GrayImage::from_fn(2, 1, |x, _| {
            image::Luma([if x == 0 { 100 } else { 150 }])
        }));
        // Mean is 125; 100 -> 125 - 1.6*25 = 85, 150 -> 165.
        let out = contrast(img, 1.6).unwrap();
        assert_eq!(out.as_raw(), &[85, 165]);
    }

    #[test]
    fn contrast_of_uniform_image_is_unchanged() {
        let img = Raster::Rgb(RgbImage::from_pixel(5, 5, image::Rgb([90, 90, 90])));
        assert_eq!(contrast(img.clone(), 1.6).unwrap(), img);
    }

    #[test]
    fn saturation_leaves_gray_pixels_alone() {
        let img = Raster::Rgb(RgbImage::from_pixel(3, 3, image::Rgb([128, 128, 128])));
        assert_eq!(saturation(img.clone(), 1.5).unwrap(), img);
    }

    #[test]
    fn saturation_pushes_channels_apart() {
        let img = Raster::Rgb(RgbImage::from_pixel(1, 1, image::Rgb([200, 100, 50])));
        let out = saturation(img, 1.5).unwrap();
        let [r, g, b] = [out.as_raw()[0], out.as_raw()[1], out.as_raw()[2]];
        // Luma is 124: 200 -> 238, 100 -> 88, 50 -> 13.
        assert_eq!([r, g, b], [238, 88, 13]);
    }

    #[test]
    fn saturation_of_luma_is_identity() {
        let img = Raster::Luma(GrayImage::from_pixel(3, 3, image::Luma([10])));
        assert_eq!(saturation(img.clone(), 2.0).unwrap(), img);
    }

    #[test]
    fn sharpness_increases_roughness() {
        let img = photo();
        let out = sharpness(img.clone(), 2.0).unwrap();
        assert!(roughness(&out) > roughness(&img));
    }

    #[test]
    fn sharpness_below_one_softens() {
        let img = photo();
        let out = sharpness(img.clone(), 0.2).unwrap();
        assert!(roughness(&out) < roughness(&img));
    }

    #[test]
    fn enhancements_preserve_channel_count() {
        let gray = Raster::Luma(GrayImage::from_fn(4, 4, |x, _| image::Luma([(x * 60) as u8])));
        for op in [brightness, contrast, saturation, sharpness] {
            let out = op(gray.clone(), 1.3).unwrap();
            assert_eq!(out.channels(), 1);
            assert_eq!(out.dimensions(), gray.dimensions());
        }
    }

    #[test]
    fn zero_area_is_rejected() {
        let empty = Raster::Rgb(RgbImage::new(0, 0));
        for op in [brightness, contrast, saturation, sharpness] {
            assert!(matches!(
                op(empty.clone(), 1.2),
                Err(TransformError::EmptyImage { .. })
            ));
        }
    }
}
