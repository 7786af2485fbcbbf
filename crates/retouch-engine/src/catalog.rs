//! The fixed transform catalog: identifiers, trigger phrases, default
//! parameters and the pixel function behind each entry.
//!
//! [`CATALOG`] is a `static` table, so it is built before any caller can
//! observe it and can never be mutated. Declaration order is the order in
//! which matched transforms are applied, regardless of where the trigger
//! words appear in the instruction.
//!
//! | # | Transform | Triggers | Parameter |
//! |---|---|---|---|
//! | 1 | brightness | `bright`, `brighter` | factor 1.4 |
//! | 2 | contrast | `contrast` | factor 1.6 |
//! | 3 | saturation | `color`, `vivid`, `vibrant` | factor 1.5 |
//! | 4 | sharpness | `sharp`, `crisp` | factor 2.0 |
//! | 5 | blur | `blur` | radius 3 |
//! | 6 | smoothing | `smooth` | |
//! | 7 | edge-enhance | `edge` | |
//! | 8 | grayscale | `grayscale`, `black and white`, `bw` | |
//! | 9 | invert | `invert`, `negative` | |
//! | 10 | sepia | `sepia`, `vintage` | |
//! | 11 | flip-horizontal | `flip horizontal`, `mirror` | |
//! | 12 | flip-vertical | `flip vertical`, `flip down` | |
//! | 13 | rotate | `rotate` | 45° |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Raster, TransformError};
use crate::{blur, color, convolve, enhance, geometry};

/// Identifier of a catalog transform.
///
/// Variants are declared in catalog order; `kind as usize` is the
/// entry's index in [`CATALOG`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
    /// Scale every channel toward or away from black.
    Brightness,
    /// Scale every channel around the mean luma.
    Contrast,
    /// Scale every channel around its pixel's luma.
    Saturation,
    /// Scale every channel around a 3x3 smoothed copy.
    Sharpness,
    /// Gaussian blur.
    Blur,
    /// Mild 3x3 low-pass filter.
    Smoothing,
    /// Aggressive 3x3 high-pass boost.
    EdgeEnhance,
    /// BT.601 luma, one channel out.
    Grayscale,
    /// `255 - v` on every RGB channel.
    Invert,
    /// Fixed sepia tone matrix.
    Sepia,
    /// Mirror left to right.
    FlipHorizontal,
    /// Mirror top to bottom.
    FlipVertical,
    /// Counter-clockwise rotation with canvas expansion.
    Rotate,
}

impl TransformKind {
    /// Every transform, in catalog order.
    pub const ALL: [Self; 13] = [
        Self::Brightness,
        Self::Contrast,
        Self::Saturation,
        Self::Sharpness,
        Self::Blur,
        Self::Smoothing,
        Self::EdgeEnhance,
        Self::Grayscale,
        Self::Invert,
        Self::Sepia,
        Self::FlipHorizontal,
        Self::FlipVertical,
        Self::Rotate,
    ];

    /// Kebab-case identifier, as used in plans and diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Saturation => "saturation",
            Self::Sharpness => "sharpness",
            Self::Blur => "blur",
            Self::Smoothing => "smoothing",
            Self::EdgeEnhance => "edge-enhance",
            Self::Grayscale => "grayscale",
            Self::Invert => "invert",
            Self::Sepia => "sepia",
            Self::FlipHorizontal => "flip-horizontal",
            Self::FlipVertical => "flip-vertical",
            Self::Rotate => "rotate",
        }
    }

    /// The parameter value that leaves an image unchanged, for
    /// parameterized transforms.
    #[must_use]
    pub const fn identity_parameter(self) -> Option<f64> {
        match self {
            Self::Brightness | Self::Contrast | Self::Saturation | Self::Sharpness => Some(1.0),
            Self::Blur | Self::Rotate => Some(0.0),
            _ => None,
        }
    }

    /// This transform's catalog entry.
    #[must_use]
    pub fn entry(self) -> &'static CatalogEntry {
        &CATALOG[self as usize]
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature shared by every catalog transform.
///
/// The parameter is `None` for transforms that take none.
pub type TransformFn = fn(Raster, Option<f64>) -> Result<Raster, TransformError>;

/// One row of the catalog.
#[derive(Debug)]
pub struct CatalogEntry {
    /// Which transform this row describes.
    pub kind: TransformKind,
    /// Lowercase substrings that activate the transform.
    pub triggers: &'static [&'static str],
    /// Parameter used when a trigger matches.
    pub parameter: Option<f64>,
    apply: TransformFn,
}

impl CatalogEntry {
    /// Returns `true` if any trigger occurs in `normalized`.
    ///
    /// `normalized` must already be lowercase.
    #[must_use]
    pub fn matches(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| normalized.contains(t))
    }

    /// Run the transform on `image`.
    ///
    /// # Errors
    ///
    /// Propagates the transform's [`TransformError`].
    pub fn apply(&self, image: Raster, parameter: Option<f64>) -> Result<Raster, TransformError> {
        (self.apply)(image, parameter)
    }
}

fn required(transform: TransformKind, parameter: Option<f64>) -> Result<f64, TransformError> {
    parameter.ok_or(TransformError::MissingParameter { transform })
}

/// The process-wide transform catalog, in application order.
pub static CATALOG: [CatalogEntry; 13] = [
    CatalogEntry {
        kind: TransformKind::Brightness,
        triggers: &["bright", "brighter"],
        parameter: Some(1.4),
        apply: |image, p| enhance::brightness(image, required(TransformKind::Brightness, p)?),
    },
    CatalogEntry {
        kind: TransformKind::Contrast,
        triggers: &["contrast"],
        parameter: Some(1.6),
        apply: |image, p| enhance::contrast(image, required(TransformKind::Contrast, p)?),
    },
    CatalogEntry {
        kind: TransformKind::Saturation,
        triggers: &["color", "vivid", "vibrant"],
        parameter: Some(1.5),
        apply: |image, p| enhance::saturation(image, required(TransformKind::Saturation, p)?),
    },
    CatalogEntry {
        kind: TransformKind::Sharpness,
        triggers: &["sharp", "crisp"],
        parameter: Some(2.0),
        apply: |image, p| enhance::sharpness(image, required(TransformKind::Sharpness, p)?),
    },
    CatalogEntry {
        kind: TransformKind::Blur,
        triggers: &["blur"],
        parameter: Some(3.0),
        apply: |image, p| blur::gaussian_blur(image, required(TransformKind::Blur, p)?),
    },
    CatalogEntry {
        kind: TransformKind::Smoothing,
        triggers: &["smooth"],
        parameter: None,
        apply: |image, _| convolve::smooth(image),
    },
    CatalogEntry {
        kind: TransformKind::EdgeEnhance,
        triggers: &["edge"],
        parameter: None,
        apply: |image, _| convolve::edge_enhance(image),
    },
    CatalogEntry {
        kind: TransformKind::Grayscale,
        triggers: &["grayscale", "black and white", "bw"],
        parameter: None,
        apply: |image, _| color::grayscale(image),
    },
    CatalogEntry {
        kind: TransformKind::Invert,
        triggers: &["invert", "negative"],
        parameter: None,
        apply: |image, _| color::invert(image),
    },
    CatalogEntry {
        kind: TransformKind::Sepia,
        triggers: &["sepia", "vintage"],
        parameter: None,
        apply: |image, _| color::sepia(image),
    },
    CatalogEntry {
        kind: TransformKind::FlipHorizontal,
        triggers: &["flip horizontal", "mirror"],
        parameter: None,
        apply: |image, _| geometry::flip_horizontal(image),
    },
    CatalogEntry {
        kind: TransformKind::FlipVertical,
        triggers: &["flip vertical", "flip down"],
        parameter: None,
        apply: |image, _| geometry::flip_vertical(image),
    },
    CatalogEntry {
        kind: TransformKind::Rotate,
        triggers: &["rotate"],
        parameter: Some(45.0),
        apply: |image, p| geometry::rotate(image, required(TransformKind::Rotate, p)?),
    },
];

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use crate::types::RgbImage;

    #[test]
    fn entries_are_indexed_by_kind() {
        for (i, entry) in CATALOG.iter().enumerate() {
            assert_eq!(entry.kind as usize, i, "{} out of place", entry.kind);
            assert_eq!(TransformKind::ALL[i], entry.kind);
            assert_eq!(entry.kind.entry().kind, entry.kind);
        }
    }

    #[test]
    fn triggers_are_lowercase_and_nonempty() {
        for entry in &CATALOG {
            assert!(!entry.triggers.is_empty(), "{} has no triggers", entry.kind);
            for t in entry.triggers {
                assert!(!t.is_empty());
                assert_eq!(*t, t.to_lowercase(), "trigger {t:?} is not lowercase");
            }
        }
    }

    #[test]
    fn default_parameters_match_table() {
        let params: Vec<Option<f64>> = CATALOG.iter().map(|e| e.parameter).collect();
        assert_eq!(
            params,
            vec![
                Some(1.4),
                Some(1.6),
                Some(1.5),
                Some(2.0),
                Some(3.0),
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                Some(45.0),
            ]
        );
    }

    #[test]
    fn parameterized_entries_have_identity_values() {
        for entry in &CATALOG {
            assert_eq!(
                entry.parameter.is_some(),
                entry.kind.identity_parameter().is_some(),
                "{}",
                entry.kind,
            );
        }
    }

    #[test]
    fn matches_any_trigger() {
        let saturation = TransformKind::Saturation.entry();
        assert!(saturation.matches("make it more vivid"));
        assert!(saturation.matches("boost the colors"));
        assert!(!saturation.matches("make it brighter"));
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let img = Raster::Rgb(RgbImage::new(2, 2));
        let err = TransformKind::Brightness.entry().apply(img, None).unwrap_err();
        assert_eq!(
            err,
            TransformError::MissingParameter {
                transform: TransformKind::Brightness
            }
        );
    }

    #[test]
    fn parameterless_entries_ignore_parameter() {
        let img = Raster::Rgb(RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30])));
        let a = TransformKind::Invert.entry().apply(img.clone(), None).unwrap();
        let b = TransformKind::Invert.entry().apply(img, Some(9.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn identity_parameters_leave_image_unchanged() {
        let img = Raster::Rgb(RgbImage::from_fn(6, 5, |x, y| {
            image::Rgb([(x * 40) as u8, (y * 50) as u8, ((x + y) * 20) as u8])
        }));
        for kind in TransformKind::ALL {
            if let Some(identity) = kind.identity_parameter() {
                let out = kind.entry().apply(img.clone(), Some(identity)).unwrap();
                assert_eq!(out, img, "{kind} at {identity} is not the identity");
            }
        }
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_string(&TransformKind::EdgeEnhance).unwrap();
        assert_eq!(json, "\"edge-enhance\"");
        let kind: TransformKind = serde_json::from_str("\"flip-horizontal\"").unwrap();
        assert_eq!(kind, TransformKind::FlipHorizontal);
    }
}
