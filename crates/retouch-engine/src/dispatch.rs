//! Instruction dispatch: turn free text into an ordered [`EditPlan`] and
//! run it.
//!
//! Matching is case-insensitive substring containment against each
//! catalog entry's triggers. Every entry is tested independently, and
//! matched entries run in catalog order. When nothing matches, the
//! [`FALLBACK_PLAN`] runs instead, so an edit is never a silent no-op.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{CATALOG, TransformKind};
use crate::types::{Raster, TransformError};

/// The general enhancement applied when no trigger matches.
pub const FALLBACK_PLAN: [Step; 3] = [
    Step::new(TransformKind::Brightness, Some(1.2)),
    Step::new(TransformKind::Contrast, Some(1.3)),
    Step::new(TransformKind::Saturation, Some(1.2)),
];

/// One transform invocation within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Which transform to run.
    pub transform: TransformKind,
    /// Its parameter, for parameterized transforms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<f64>,
}

impl Step {
    /// Create a step.
    #[must_use]
    pub const fn new(transform: TransformKind, parameter: Option<f64>) -> Self {
        Self {
            transform,
            parameter,
        }
    }

    /// Run this step on `image`.
    ///
    /// # Errors
    ///
    /// Propagates the transform's [`TransformError`].
    pub fn apply(&self, image: Raster) -> Result<Raster, TransformError> {
        self.transform.entry().apply(image, self.parameter)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parameter {
            Some(p) => write!(f, "{}({p})", self.transform),
            None => write!(f, "{}", self.transform),
        }
    }
}

/// The ordered transforms selected for one instruction.
///
/// A plan is consumed by [`EditPlan::apply`]; build a new one per edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditPlan {
    steps: Vec<Step>,
    fallback: bool,
}

impl EditPlan {
    /// Build the plan for `instruction`.
    ///
    /// An instruction that matches no trigger (including an empty or
    /// whitespace-only one) yields [`EditPlan::fallback`].
    #[must_use]
    pub fn from_instruction(instruction: &str) -> Self {
        let normalized = instruction.to_lowercase();
        let mut matched = false;
        let mut steps = Vec::new();

        for entry in &CATALOG {
            if entry.matches(&normalized) {
                matched = true;
                steps.push(Step::new(entry.kind, entry.parameter));
            }
        }

        if !matched {
            return Self::fallback();
        }
        Self {
            steps,
            fallback: false,
        }
    }

    /// The [`FALLBACK_PLAN`].
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            steps: FALLBACK_PLAN.to_vec(),
            fallback: true,
        }
    }

    /// The steps in application order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns `true` if no trigger matched and the fallback plan was
    /// chosen.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Run every step in order, each consuming the previous output.
    ///
    /// # Errors
    ///
    /// Stops at the first failing step and returns its error. No
    /// partially edited image is returned.
    pub fn apply(self, image: Raster) -> Result<Raster, TransformError> {
        self.steps.iter().try_fold(image, |image, step| {
            log::debug!("applying {step} to {}x{}", image.width(), image.height());
            step.apply(image)
        })
    }

    /// Human-readable summary, e.g. `"brightness(1.4) -> blur(3)"`.
    ///
    /// The fallback plan is suffixed with `" (fallback)"`.
    #[must_use]
    pub fn describe(&self) -> String {
        let chain = self
            .steps
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        if self.fallback {
            format!("{chain} (fallback)")
        } else {
            chain
        }
    }
}

/// Build the plan for `instruction` without touching any pixels.
#[must_use]
pub fn plan(instruction: &str) -> EditPlan {
    let plan = EditPlan::from_instruction(instruction);
    if plan.is_fallback() {
        log::info!("no transform matched {instruction:?}, using fallback plan");
    } else {
        log::info!("planned {} for {instruction:?}", plan.describe());
    }
    plan
}

/// Apply the transforms that `instruction` asks for to `image`.
///
/// # Errors
///
/// Returns the first [`TransformError`] raised by a step.
pub fn dispatch(instruction: &str, image: Raster) -> Result<Raster, TransformError> {
    plan(instruction).apply(image)
}
