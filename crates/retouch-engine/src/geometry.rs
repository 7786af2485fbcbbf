//! Geometric transforms: mirror flips and rotation with canvas expansion.

use image::{ImageBuffer, Pixel};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

use crate::catalog::TransformKind;
use crate::types::{Dimensions, Raster, TransformError};

/// Slack subtracted before rounding expanded bounds up, so that sizes
/// which are integral up to floating-point noise (e.g. a 90° turn) do
/// not gain a spurious extra row or column.
const BOUNDS_EPSILON: f64 = 1e-6;

/// Mirror left to right.
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster.
pub fn flip_horizontal(image: Raster) -> Result<Raster, TransformError> {
    image.ensure_non_empty(TransformKind::FlipHorizontal)?;
    Ok(match image {
        Raster::Luma(img) => Raster::Luma(image::imageops::flip_horizontal(&img)),
        Raster::Rgb(img) => Raster::Rgb(image::imageops::flip_horizontal(&img)),
    })
}

/// Mirror top to bottom.
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster.
pub fn flip_vertical(image: Raster) -> Result<Raster, TransformError> {
    image.ensure_non_empty(TransformKind::FlipVertical)?;
    Ok(match image {
        Raster::Luma(img) => Raster::Luma(image::imageops::flip_vertical(&img)),
        Raster::Rgb(img) => Raster::Rgb(image::imageops::flip_vertical(&img)),
    })
}

/// Size of the canvas that bounds a `width` x `height` image rotated by
/// `degrees`:
///
/// ```text
/// ceil(w |cos θ| + h |sin θ|)  x  ceil(w |sin θ| + h |cos θ|)
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn expanded_dimensions(width: u32, height: u32, degrees: f64) -> Dimensions {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let (w, h) = (f64::from(width), f64::from(height));
    let bound = |v: f64| (v - BOUNDS_EPSILON).ceil().max(1.0) as u32;
    Dimensions {
        width: bound(w.mul_add(cos, h * sin)),
        height: bound(w.mul_add(sin, h * cos)),
    }
}

/// Rotate counter-clockwise by `degrees` about the image center.
///
/// The canvas grows to [`expanded_dimensions`] so no source pixel is
/// cropped. Sampling is nearest-neighbour. Exposed corners are filled
/// black since neither raster layout carries alpha. Whole turns
/// (multiples of 360°) return the input unchanged.
///
/// # Errors
///
/// Returns [`TransformError::EmptyImage`] for a zero-area raster and
/// [`TransformError::InvalidParameter`] for a non-finite angle.
pub fn rotate(image: Raster, degrees: f64) -> Result<Raster, TransformError> {
    image.ensure_non_empty(TransformKind::Rotate)?;
    if !degrees.is_finite() {
        return Err(TransformError::InvalidParameter {
            transform: TransformKind::Rotate,
            value: degrees,
        });
    }
    if degrees.rem_euclid(360.0).abs() < f64::EPSILON {
        return Ok(image);
    }

    Ok(match image {
        Raster::Luma(img) => Raster::Luma(rotate_expanded(&img, degrees, image::Luma([0]))),
        Raster::Rgb(img) => Raster::Rgb(rotate_expanded(&img, degrees, image::Rgb([0, 0, 0]))),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn rotate_expanded<P>(image: &ImageBuffer<P, Vec<u8>>, degrees: f64, fill: P) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + Send + Sync + 'static,
{
    let Dimensions { width, height } = expanded_dimensions(image.width(), image.height(), degrees);

    // Pixel centers sit on integer coordinates, so the geometric center
    // of an n-pixel axis is (n - 1) / 2.
    let src_cx = (image.width() as f32 - 1.0) / 2.0;
    let src_cy = (image.height() as f32 - 1.0) / 2.0;
    let dst_cx = (width as f32 - 1.0) / 2.0;
    let dst_cy = (height as f32 - 1.0) / 2.0;

    // imageproc rotates clockwise in image space (y down).
    let theta = (-degrees.to_radians()) as f32;
    let projection = Projection::translate(dst_cx, dst_cy)
        * Projection::rotate(theta)
        * Projection::translate(-src_cx, -src_cy);

    let mut out = ImageBuffer::from_pixel(width, height, fill);
    warp_into(image, &projection, Interpolation::Nearest, fill, &mut out);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use crate::types::{GrayImage, RgbImage};

    fn numbered(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 20) as u8, (y * 20) as u8, ((x + y) * 10) as u8])
        })
    }

    // --- flips ---

    #[test]
    fn flip_horizontal_mirrors_columns() {
        let img = numbered(5, 3);
        let out = flip_horizontal(Raster::Rgb(img.clone())).unwrap().into_rgb();
        assert_eq!(out.dimensions(), (5, 3));
        for (x, y, p) in img.enumerate_pixels() {
            assert_eq!(out.get_pixel(4 - x, y), p);
        }
    }

    #[test]
    fn flip_vertical_mirrors_rows() {
        let img = numbered(4, 6);
        let out = flip_vertical(Raster::Rgb(img.clone())).unwrap().into_rgb();
        for (x, y, p) in img.enumerate_pixels() {
            assert_eq!(out.get_pixel(x, 5 - y), p);
        }
    }

    #[test]
    fn flips_are_involutions() {
        let img = Raster::Rgb(numbered(7, 4));
        let hh = flip_horizontal(flip_horizontal(img.clone()).unwrap()).unwrap();
        assert_eq!(hh, img);
        let vv = flip_vertical(flip_vertical(img.clone()).unwrap()).unwrap();
        assert_eq!(vv, img);
    }

    #[test]
    fn flips_preserve_luma_layout() {
        let img = Raster::Luma(GrayImage::from_fn(3, 3, |x, y| image::Luma([(x + 3 * y) as u8])));
        assert_eq!(flip_horizontal(img.clone()).unwrap().channels(), 1);
        assert_eq!(flip_vertical(img).unwrap().channels(), 1);
    }

    // --- expanded_dimensions ---

    #[test]
    fn forty_five_degree_bounds() {
        let (w, h) = (40u32, 20u32);
        let c = 45f64.to_radians().cos();
        let s = 45f64.to_radians().sin();
        let expected_w = (f64::from(w) * c + f64::from(h) * s).ceil() as u32;
        let expected_h = (f64::from(w) * s + f64::from(h) * c).ceil() as u32;
        let dims = expanded_dimensions(w, h, 45.0);
        assert_eq!(dims.width, expected_w);
        assert_eq!(dims.height, expected_h);
        // 60 * 0.7071 = 42.43
        assert_eq!(dims.width, 43);
        assert_eq!(dims.height, 43);
    }

    #[test]
    fn right_angle_swaps_axes_exactly() {
        let dims = expanded_dimensions(8, 3, 90.0);
        assert_eq!(
            dims,
            Dimensions {
                width: 3,
                height: 8
            }
        );
        let dims = expanded_dimensions(8, 3, 180.0);
        assert_eq!(
            dims,
            Dimensions {
                width: 8,
                height: 3
            }
        );
    }

    // --- rotate ---

    #[test]
    fn rotate_expands_canvas() {
        let img = Raster::Rgb(numbered(30, 10));
        let out = rotate(img, 45.0).unwrap();
        assert_eq!(out.dimensions(), expanded_dimensions(30, 10, 45.0));
        assert_eq!(out.channels(), 3);
    }

    #[test]
    fn rotate_never_crops_content() {
        // An all-white source rotated onto a black canvas must keep at
        // least as many white pixels as nearest-neighbour sampling can
        // lose to boundary rounding; losing a corner would drop far more.
        let (w, h) = (21u32, 11u32);
        let img = Raster::Luma(GrayImage::from_pixel(w, h, image::Luma([255])));
        let out = rotate(img, 45.0).unwrap();
        let white = out.as_raw().iter().filter(|&&v| v == 255).count();
        let area = (w * h) as usize;
        let perimeter = (2 * (w + h)) as usize;
        assert!(
            white + perimeter >= area,
            "rotated image kept {white} of {area} pixels",
        );
    }

    #[test]
    fn rotate_fills_exposed_corners_black() {
        let img = Raster::Rgb(RgbImage::from_pixel(10, 10, image::Rgb([255, 255, 255])));
        let out = rotate(img, 45.0).unwrap().into_rgb();
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
        let (w, h) = out.dimensions();
        assert_eq!(out.get_pixel(w - 1, h - 1).0, [0, 0, 0]);
        assert_eq!(out.get_pixel(w / 2, h / 2).0, [255, 255, 255]);
    }

    #[test]
    fn rotate_is_counter_clockwise() {
        // Mark the top-left quadrant. After a 90° counter-clockwise turn
        // it lands in the bottom-left quadrant.
        let img = GrayImage::from_fn(8, 8, |x, y| image::Luma([if x < 4 && y < 4 { 255 } else { 0 }]));
        let out = rotate(Raster::Luma(img), 90.0).unwrap();
        let Raster::Luma(out) = out else {
            unreachable!("rotation keeps luma rasters single-channel");
        };
        assert_eq!(out.dimensions(), (8, 8));
        assert_eq!(out.get_pixel(1, 6).0[0], 255);
        assert_eq!(out.get_pixel(1, 1).0[0], 0);
        assert_eq!(out.get_pixel(6, 6).0[0], 0);
    }

    #[test]
    fn whole_turns_are_identity() {
        let img = Raster::Rgb(numbered(5, 7));
        for degrees in [0.0, 360.0, -720.0] {
            assert_eq!(rotate(img.clone(), degrees).unwrap(), img);
        }
    }

    #[test]
    fn non_finite_angle_is_rejected() {
        let img = Raster::Rgb(numbered(2, 2));
        assert!(matches!(
            rotate(img, f64::INFINITY),
            Err(TransformError::InvalidParameter {
                transform: TransformKind::Rotate,
                ..
            })
        ));
    }

    #[test]
    fn zero_area_is_rejected() {
        let empty = Raster::Rgb(RgbImage::new(0, 4));
        assert!(rotate(empty.clone(), 45.0).is_err());
        assert!(flip_horizontal(empty.clone()).is_err());
        assert!(flip_vertical(empty).is_err());
    }
}
