//! Pipeline diagnostic types for composition and runtime conditions.
//!
//! Two types cover the full pipeline lifecycle:
//!
//! - [`ComposeError`] — problems found while composing the pipeline
//!   (adding an ineligible stage, adding a duplicate, removing a stage that
//!   is not a member). These are per-item and never abort a batch.
//! - [`StageFault`] — a contract violation recovered inside a stage during
//!   execution (the stage received a value of a shape it does not accept,
//!   reported the fault, and returned an empty fallback).
//!
//! Both carry a stable [`ErrorCode`] for programmatic matching, the name of
//! the stage involved, a human-readable `message`, and an optional `hint`
//! suggesting a fix.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error_code::ErrorCode;
use crate::types::Shape;

// ─── Composition-time diagnostics ───────────────────────────────────────────

/// A problem found while composing the pipeline.
///
/// # Display format
///
/// ```text
/// [ineligible_stage] shuffle_lines: not registered as an eligible stage
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("[{code}] {stage}: {message}")]
pub struct ComposeError {
    /// Stable error code for programmatic matching.
    pub code: ErrorCode,

    /// Name of the offending stage.
    pub stage: String,

    /// Human-readable description of the problem.
    pub message: String,

    /// Optional suggestion for how to fix the problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ComposeError {
    /// Create a new composition error.
    pub fn new(code: ErrorCode, stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            stage: stage.into(),
            message: message.into(),
            hint: None,
        }
    }

    /// Attach a hint suggesting how to fix the problem.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ─── Run-time diagnostics ───────────────────────────────────────────────────

/// A contract violation recovered inside a stage during execution.
///
/// The stage has already degraded gracefully — it returned an empty value
/// of its output shape — so execution of the remaining stages continues.
/// The fault is delivered to the pipeline's observer for visibility.
///
/// # Display format
///
/// ```text
/// [shape_mismatch] remove_numbers: expected text input, got tokens
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("[{code}] {stage}: {message}")]
pub struct StageFault {
    /// Stable error code for programmatic matching.
    pub code: ErrorCode,

    /// Name of the stage that recovered from the fault.
    pub stage: String,

    /// The shape the stage accepts.
    pub expected: Shape,

    /// The shape the stage received.
    pub got: Shape,

    /// Human-readable description of the failure.
    pub message: String,
}

impl StageFault {
    /// Create a shape-mismatch fault.
    pub fn shape_mismatch(stage: impl Into<String>, expected: Shape, got: Shape) -> Self {
        let stage = stage.into();
        let message = format!("expected {expected} input, got {got}");
        Self {
            code: ErrorCode::ShapeMismatch,
            stage,
            expected,
            got,
            message,
        }
    }
}
