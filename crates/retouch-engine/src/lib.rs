//! retouch-engine: Prompt-driven image edits from a fixed transform
//! catalog (sans-IO).
//!
//! A plain-language instruction is matched against the trigger phrases of
//! a static [`CATALOG`]. Every matching transform runs once, in catalog
//! order, on an 8-bit luma or RGB [`Raster`]:
//!
//! brightness -> contrast -> saturation -> sharpness -> blur ->
//! smoothing -> edge-enhance -> grayscale -> invert -> sepia ->
//! flip-horizontal -> flip-vertical -> rotate
//!
//! When nothing matches, a mild brightness/contrast/saturation boost
//! ([`FALLBACK_PLAN`]) runs instead.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and rasters. Reading and writing files lives in the
//! `retouch` binary. Log records go through the `log` facade; no logger
//! is installed here.

pub mod blur;
pub mod catalog;
pub mod codec;
pub mod color;
pub mod convolve;
pub mod diagnostics;
pub mod dispatch;
pub mod enhance;
pub mod geometry;
pub mod types;

pub use catalog::{CATALOG, CatalogEntry, TransformKind};
pub use codec::{DecodedImage, decode_image, encode_image};
pub use diagnostics::{Clock, EditDiagnostics, dispatch_with_diagnostics};
pub use dispatch::{EditPlan, FALLBACK_PLAN, Step, dispatch, plan};
pub use types::{
    DecodeError, Dimensions, EditError, EncodeConfig, EncodeError, ImageInfo, OutputFormat, Raster,
    TransformError,
};

/// Instruction used when the caller does not supply one.
///
/// It matches no trigger, so it always resolves to [`FALLBACK_PLAN`].
pub const DEFAULT_INSTRUCTION: &str = "Enhance this image";

/// Result of a complete [`edit`].
#[derive(Debug, Clone)]
pub struct EditOutput {
    /// The encoded output image.
    pub bytes: Vec<u8>,
    /// Facts about the decoded input.
    pub info: ImageInfo,
    /// The plan that was applied.
    pub plan: EditPlan,
    /// Dimensions of the output raster.
    pub dimensions: Dimensions,
}

/// Decode `image_bytes`, apply `instruction`, and encode the result.
///
/// # Steps
///
/// 1. Decode and normalize to 8-bit luma or RGB
/// 2. Build the plan for `instruction`
/// 3. Apply the plan
/// 4. Encode as configured
///
/// # Errors
///
/// Returns [`EditError::Decode`] if the input cannot be decoded,
/// [`EditError::Transform`] if a step fails, and [`EditError::Encode`]
/// if the result cannot be encoded. The encode configuration is checked
/// before any pixel work is done.
pub fn edit(
    image_bytes: &[u8],
    instruction: &str,
    config: &EncodeConfig,
) -> Result<EditOutput, EditError> {
    config.validate()?;

    let DecodedImage { raster, info } = decode_image(image_bytes)?;

    let plan = plan(instruction);
    let edited = plan.clone().apply(raster)?;
    let dimensions = edited.dimensions();

    let bytes = encode_image(&edited, config)?;

    Ok(EditOutput {
        bytes,
        info,
        plan,
        dimensions,
    })
}
