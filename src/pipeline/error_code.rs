//! Stable error codes for pipeline diagnostics.
//!
//! Every composition-time and run-time diagnostic carries one of these
//! codes so embedding applications can match on the condition without
//! parsing message strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, machine-readable code identifying a diagnostic condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A stage outside the registry's eligible set was offered to `add`.
    IneligibleStage,
    /// A stage already present in the pipeline was offered to `add` again.
    DuplicateStage,
    /// A stage not present in the pipeline was offered to `remove`.
    UnknownStage,
    /// A stage received a value of a shape it does not accept.
    ShapeMismatch,
}

impl ErrorCode {
    /// Returns the snake_case name used in JSON and display output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IneligibleStage => "ineligible_stage",
            Self::DuplicateStage => "duplicate_stage",
            Self::UnknownStage => "unknown_stage",
            Self::ShapeMismatch => "shape_mismatch",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
