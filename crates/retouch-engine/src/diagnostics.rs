//! Edit diagnostics: per-step timing and raster shapes.
//!
//! [`dispatch_with_diagnostics`] runs the same plan as
//! [`dispatch`](crate::dispatch::dispatch) while recording how long each
//! step took and what shape of raster it produced. Time is read through
//! the [`Clock`] trait so the engine itself never touches a platform
//! clock; callers supply one (the CLI wraps `std::time::Instant`).
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatch::{self, EditPlan, Step};
use crate::types::{Raster, TransformError};

/// Source of timestamps for diagnostics.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Width, height and channel count of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterShape {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channels per pixel (1 or 3).
    pub channels: u8,
}

impl RasterShape {
    /// Shape of `raster`.
    #[must_use]
    pub fn of(raster: &Raster) -> Self {
        Self {
            width: raster.width(),
            height: raster.height(),
            channels: raster.channels(),
        }
    }
}

impl std::fmt::Display for RasterShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

/// Diagnostics for one applied step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDiagnostics {
    /// The step that ran.
    pub step: Step,
    /// Wall-clock duration of the step (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Shape going in.
    pub input: RasterShape,
    /// Shape coming out.
    pub output: RasterShape,
}

/// Diagnostics collected from a single edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditDiagnostics {
    /// The plan that was applied.
    pub plan: EditPlan,
    /// Per-step diagnostics in application order.
    pub steps: Vec<StepDiagnostics>,
    /// Shape of the input raster.
    pub input: RasterShape,
    /// Shape of the final raster.
    pub output: RasterShape,
    /// Total wall-clock duration of the edit (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

impl EditDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Edit Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!("Input:  {}", self.input));
        lines.push(format!("Output: {}", self.output));
        if self.plan.is_fallback() {
            lines.push("No transform matched; fallback plan applied".to_string());
        }
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Step", "Duration", "% Total", "Shape"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        for diag in &self.steps {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let name = diag.step.to_string();
            lines.push(format!(
                "{name:<24} {ms:>8.3}ms {pct:>9.1}%  {} -> {}",
                diag.input, diag.output,
            ));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Run the plan for `instruction` on `image`, timing every step with
/// `clock`.
///
/// Produces exactly the same raster as
/// [`dispatch`](crate::dispatch::dispatch).
///
/// # Errors
///
/// Returns the first [`TransformError`] raised by a step.
pub fn dispatch_with_diagnostics<C: Clock>(
    instruction: &str,
    image: Raster,
    clock: &C,
) -> Result<(Raster, EditDiagnostics), TransformError> {
    let start = clock.now();
    let plan = dispatch::plan(instruction);
    let input = RasterShape::of(&image);

    let mut steps = Vec::with_capacity(plan.steps().len());
    let mut current = image;
    for step in plan.steps() {
        let step_start = clock.now();
        let before = RasterShape::of(&current);
        current = step.apply(current)?;
        let duration = clock.elapsed(&step_start);
        log::debug!("{step} took {:.3}ms", duration_ms(duration));
        steps.push(StepDiagnostics {
            step: *step,
            duration,
            input: before,
            output: RasterShape::of(&current),
        });
    }

    let diagnostics = EditDiagnostics {
        plan,
        steps,
        input,
        output: RasterShape::of(&current),
        total_duration: clock.elapsed(&start),
    };
    Ok((current, diagnostics))
}
