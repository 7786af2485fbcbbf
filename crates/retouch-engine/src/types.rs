//! Shared types for the retouch engine.

use serde::{Deserialize, Serialize};

use crate::catalog::TransformKind;

/// Re-export `GrayImage` so downstream crates can build single-channel
/// rasters without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can build color rasters
/// without depending on `image` directly.
pub use image::RgbImage;

/// An 8-bit raster in one of the two pixel layouts the engine works on.
///
/// Decoded inputs are normalized into one of these forms before any
/// transform runs: alpha is composited away and 16-bit data is scaled
/// down, so every transform sees either one or three channels per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Raster {
    /// Single-channel luma.
    Luma(GrayImage),
    /// Three-channel RGB.
    Rgb(RgbImage),
}

impl Raster {
    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        match self {
            Self::Luma(img) => img.width(),
            Self::Rgb(img) => img.width(),
        }
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        match self {
            Self::Luma(img) => img.height(),
            Self::Rgb(img) => img.height(),
        }
    }

    /// Width and height as [`Dimensions`].
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Number of channels per pixel (1 or 3).
    #[must_use]
    pub const fn channels(&self) -> u8 {
        match self {
            Self::Luma(_) => 1,
            Self::Rgb(_) => 3,
        }
    }

    /// Returns `true` if the raster has zero width or zero height.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Raw interleaved subpixel data, row-major.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Self::Luma(img) => img.as_raw(),
            Self::Rgb(img) => img.as_raw(),
        }
    }

    /// Convert into three-channel form, replicating luma into R, G and B.
    ///
    /// An RGB raster is returned as-is without copying.
    #[must_use]
    pub fn into_rgb(self) -> RgbImage {
        match self {
            Self::Luma(img) => image::DynamicImage::ImageLuma8(img).into_rgb8(),
            Self::Rgb(img) => img,
        }
    }

    /// Apply `f` to every subpixel, reusing the owned buffer.
    #[must_use]
    pub(crate) fn map_subpixels(self, f: impl Fn(u8) -> u8) -> Self {
        match self {
            Self::Luma(mut img) => {
                img.iter_mut().for_each(|v| *v = f(*v));
                Self::Luma(img)
            }
            Self::Rgb(mut img) => {
                img.iter_mut().for_each(|v| *v = f(*v));
                Self::Rgb(img)
            }
        }
    }

    /// Reject zero-area rasters before `transform` touches them.
    pub(crate) fn ensure_non_empty(&self, transform: TransformKind) -> Result<(), TransformError> {
        if self.is_empty() {
            return Err(TransformError::EmptyImage {
                transform,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }
}

impl From<GrayImage> for Raster {
    fn from(img: GrayImage) -> Self {
        Self::Luma(img)
    }
}

impl From<RgbImage> for Raster {
    fn from(img: RgbImage) -> Self {
        Self::Rgb(img)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Facts about a decoded input image, reported back to the caller
/// alongside the edited result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Width of the decoded input in pixels.
    pub width: u32,
    /// Height of the decoded input in pixels.
    pub height: u32,
    /// Sniffed container format as a lowercase name (`"png"`, `"jpeg"`,
    /// `"bmp"`, `"webp"`), not an uppercase label like `"PNG"`. Matches
    /// the container's usual file extension.
    pub format: String,
    /// MIME type of the sniffed format (`"image/png"`, ...).
    pub media_type: String,
}

impl ImageInfo {
    /// The input size formatted as `"WxH"`.
    #[must_use]
    pub fn size_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Output container for [`encode_image`](crate::codec::encode_image).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Baseline JPEG at [`EncodeConfig::jpeg_quality`].
    #[default]
    Jpeg,
    /// Lossless PNG.
    Png,
}

impl OutputFormat {
    /// Pick a format from a file extension, case-insensitively.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Canonical file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// MIME type of the encoded bytes.
    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg => f.write_str("jpeg"),
            Self::Png => f.write_str("png"),
        }
    }
}

/// How the edited raster is serialized.
///
/// Missing fields take their defaults when deserializing, so a partial
/// JSON object such as `{"format":"png"}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Output container.
    pub format: OutputFormat,

    /// JPEG quality, 1 to 100. Ignored for PNG output.
    pub jpeg_quality: u8,
}

impl EncodeConfig {
    /// Default output container.
    pub const DEFAULT_FORMAT: OutputFormat = OutputFormat::Jpeg;

    /// Default JPEG quality.
    pub const DEFAULT_JPEG_QUALITY: u8 = 95;

    /// Check that `jpeg_quality` is within 1..=100.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::InvalidQuality`] when it is not.
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(EncodeError::InvalidQuality(self.jpeg_quality));
        }
        Ok(())
    }
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            format: Self::DEFAULT_FORMAT,
            jpeg_quality: Self::DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Errors raised while turning uploaded bytes into a [`Raster`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The bytes are not a recognized or well-formed image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The image decoded but has no pixels.
    #[error("decoded image has zero area ({width}x{height})")]
    EmptyImage {
        /// Decoded width.
        width: u32,
        /// Decoded height.
        height: u32,
    },
}

/// Errors raised by a transform. Fatal to the edit in progress.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// A zero-width or zero-height raster reached a transform.
    #[error("cannot apply {transform} to a zero-area image ({width}x{height})")]
    EmptyImage {
        /// The transform that rejected the raster.
        transform: TransformKind,
        /// Raster width.
        width: u32,
        /// Raster height.
        height: u32,
    },

    /// The parameter is outside the transform's domain.
    #[error("invalid parameter {value} for {transform}")]
    InvalidParameter {
        /// The transform that rejected the parameter.
        transform: TransformKind,
        /// The rejected value.
        value: f64,
    },

    /// A parameterized transform was invoked without a parameter.
    #[error("{transform} requires a parameter")]
    MissingParameter {
        /// The transform that needs a parameter.
        transform: TransformKind,
    },
}

/// Errors raised while serializing the edited raster.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The underlying encoder failed.
    #[error("failed to encode image: {0}")]
    ImageEncode(#[from] image::ImageError),

    /// JPEG quality outside 1..=100.
    #[error("invalid JPEG quality {0}, expected 1 to 100")]
    InvalidQuality(u8),
}

/// Any failure of the decode, dispatch, encode sequence run by
/// [`edit`](crate::edit).
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Decoding the input failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A transform failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Encoding the output failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}
