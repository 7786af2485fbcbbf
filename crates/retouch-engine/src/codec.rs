//! Byte-level boundary: decoding uploaded images into a [`Raster`] and
//! encoding the edited raster back out.
//!
//! Decoding sniffs the container from the leading bytes (PNG, JPEG, BMP,
//! WebP), scales 16-bit samples down to 8 bits and composites any alpha
//! channel over a white background.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};

use crate::types::{
    DecodeError, EncodeConfig, EncodeError, GrayImage, ImageInfo, OutputFormat, Raster, RgbImage,
};

/// A decoded input: the normalized raster and what was learned about
/// the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Pixels, normalized to 8-bit luma or RGB.
    pub raster: Raster,
    /// Source dimensions and sniffed format.
    pub info: ImageInfo,
}

/// Composite one channel value over white with the given alpha.
///
/// `round(c * a / 255 + 255 * (1 - a / 255))`. The numerator is never an
/// exact half-multiple of 255, so adding 127 rounds to nearest.
#[allow(clippy::cast_possible_truncation)]
const fn over_white(c: u8, a: u8) -> u8 {
    let (c, a) = (c as u32, a as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Reduce a decoded image to one of the two [`Raster`] layouts.
fn normalize(img: DynamicImage) -> Raster {
    let color = img.color();
    match img {
        DynamicImage::ImageLuma8(gray) => Raster::Luma(gray),
        DynamicImage::ImageRgb8(rgb) => Raster::Rgb(rgb),
        img if !color.has_color() && color.has_alpha() => {
            let la = img.into_luma_alpha8();
            Raster::Luma(GrayImage::from_fn(la.width(), la.height(), |x, y| {
                let [l, a] = la.get_pixel(x, y).0;
                image::Luma([over_white(l, a)])
            }))
        }
        img if !color.has_color() => Raster::Luma(img.into_luma8()),
        img if color.has_alpha() => {
            let rgba = img.into_rgba8();
            Raster::Rgb(RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                let [r, g, b, a] = rgba.get_pixel(x, y).0;
                image::Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
            }))
        }
        img => Raster::Rgb(img.into_rgb8()),
    }
}

/// Lowercase container name, e.g. `"png"` or `"jpeg"`.
///
/// Formats without an explicit arm use their primary file extension.
fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Bmp => "bmp",
        ImageFormat::WebP => "webp",
        other => other.extensions_str().first().copied().unwrap_or("unknown"),
    }
}

fn sniff_and_decode(bytes: &[u8]) -> image::ImageResult<(ImageFormat, DynamicImage)> {
    let format = image::guess_format(bytes)?;
    Ok((format, image::load_from_memory_with_format(bytes, format)?))
}

/// Decode raw image bytes into a normalized [`Raster`].
///
/// # Errors
///
/// Returns [`DecodeError::EmptyInput`] if `bytes` is empty,
/// [`DecodeError::ImageDecode`] if the format is unrecognized or the data
/// is corrupt, and [`DecodeError::EmptyImage`] if the image has no
/// pixels.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    if bytes.is_empty() {
        log::warn!("rejected empty input");
        return Err(DecodeError::EmptyInput);
    }

    let (format, img) = match sniff_and_decode(bytes) {
        Ok(pair) => pair,
        Err(err) => {
            log::warn!("rejected undecodable input of {} bytes: {err}", bytes.len());
            return Err(err.into());
        }
    };

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        log::warn!("rejected zero-area {width}x{height} input");
        return Err(DecodeError::EmptyImage { width, height });
    }

    let info = ImageInfo {
        width,
        height,
        format: format_name(format).to_string(),
        media_type: format.to_mime_type().to_string(),
    };
    log::debug!(
        "decoded {} {} as {:?}",
        info.format,
        info.size_label(),
        img.color()
    );

    Ok(DecodedImage {
        raster: normalize(img),
        info,
    })
}

/// Serialize `raster` as configured.
///
/// # Errors
///
/// Returns [`EncodeError::InvalidQuality`] if the configured JPEG quality
/// is out of range and [`EncodeError::ImageEncode`] if the encoder fails.
pub fn encode_image(raster: &Raster, config: &EncodeConfig) -> Result<Vec<u8>, EncodeError> {
    config.validate()?;

    let color = match raster {
        Raster::Luma(_) => ExtendedColorType::L8,
        Raster::Rgb(_) => ExtendedColorType::Rgb8,
    };
    let (width, height) = (raster.width(), raster.height());

    let mut buf = Vec::new();
    match config.format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, config.jpeg_quality);
            encoder.write_image(raster.as_raw(), width, height, color)?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new(&mut buf);
            encoder.write_image(raster.as_raw(), width, height, color)?;
        }
    }
    log::debug!(
        "encoded {width}x{height} as {} ({} bytes)",
        config.format,
        buf.len()
    );
    Ok(buf)
}
