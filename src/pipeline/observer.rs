//! Logging, profiling, and report-capture hooks for pipeline activity.
//!
//! Every observable outcome — composition changes, per-stage execution,
//! recovered stage faults — is delivered to a [`PipelineObserver`] injected
//! at pipeline construction. This keeps reporting out of process-wide
//! state: the default [`LogObserver`] forwards to `tracing`, while tests
//! use [`RecordingObserver`] to capture reports without side effects.

use serde::Serialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::errors::{ComposeError, StageFault};
use crate::types::Shape;

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a composition diagnostic is a hard error or a soft warning.
///
/// Duplicate adds are warnings (the pipeline is left in a valid state);
/// ineligible adds and unknown removes are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Composition notes ──────────────────────────────────────────────────────

/// A successful or informational composition outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum ComposeNote {
    /// A stage was appended to the end of the pipeline.
    Added { stage: String },
    /// A stage was removed; the order of the remaining stages is preserved.
    Removed { stage: String },
    /// The pipeline was emptied of `count` stages.
    Cleared { count: usize },
    /// `clear` was called on an already-empty pipeline (a no-op).
    AlreadyEmpty,
}

// ─── Stage reports ──────────────────────────────────────────────────────────

/// Measurements for one executed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    /// Name of the executed stage.
    pub stage: String,
    /// Shape of the value the stage received.
    pub input: Shape,
    /// Shape of the value the stage returned.
    pub output: Shape,
    /// Length of the output: characters for text, tokens for a sequence.
    pub output_units: usize,
    /// Wall-clock execution time in microseconds.
    pub elapsed_us: u128,
}

/// Wall-clock timer for a single stage execution.
#[derive(Debug)]
pub struct StageClock {
    start: Instant,
}

impl StageClock {
    /// Start timing.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

// ─── Observer trait ─────────────────────────────────────────────────────────

/// Receives every observable pipeline outcome.
///
/// All methods have empty default bodies, so implementations override only
/// the hooks they care about. Implementations must be `Send + Sync`; the
/// pipeline shares the observer with its stages for fault reporting.
pub trait PipelineObserver: Send + Sync {
    /// A composition operation succeeded (add, remove, clear).
    fn composed(&self, _note: &ComposeNote) {}

    /// A composition operation failed for one item; the batch continues.
    fn compose_rejected(&self, _error: &ComposeError, _severity: Severity) {}

    /// A stage is about to run.
    fn stage_started(&self, _stage: &str, _input: Shape) {}

    /// A stage finished; `report` carries shape and timing measurements.
    fn stage_finished(&self, _report: &StageReport) {}

    /// A stage recovered from an input-contract violation and returned its
    /// empty fallback.
    fn stage_fault(&self, _fault: &StageFault) {}
}

// ─── LogObserver ────────────────────────────────────────────────────────────

/// Default observer: forwards every outcome to `tracing`.
///
/// Info on success, warn on duplicates, error on ineligible/missing stages
/// and recovered faults.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn composed(&self, note: &ComposeNote) {
        match note {
            ComposeNote::Added { stage } => {
                tracing::info!(stage, "stage added to the pipeline");
            }
            ComposeNote::Removed { stage } => {
                tracing::info!(stage, "stage removed from the pipeline");
            }
            ComposeNote::Cleared { count } => {
                tracing::info!(count, "all stages removed from the pipeline");
            }
            ComposeNote::AlreadyEmpty => {
                tracing::info!("the pipeline is already empty");
            }
        }
    }

    fn compose_rejected(&self, error: &ComposeError, severity: Severity) {
        match severity {
            Severity::Warning => tracing::warn!(stage = %error.stage, "{error}"),
            Severity::Error => tracing::error!(stage = %error.stage, "{error}"),
        }
    }

    fn stage_started(&self, stage: &str, input: Shape) {
        tracing::debug!(stage, input = %input, "stage started");
    }

    fn stage_finished(&self, report: &StageReport) {
        tracing::debug!(
            stage = %report.stage,
            output = %report.output,
            output_units = report.output_units,
            elapsed_us = report.elapsed_us,
            "stage finished"
        );
    }

    fn stage_fault(&self, fault: &StageFault) {
        tracing::error!(stage = %fault.stage, "{fault}");
    }
}

// ─── NullObserver ───────────────────────────────────────────────────────────

/// Observer that discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {}

// ─── RecordingObserver ──────────────────────────────────────────────────────

/// One captured observer callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ObserverEvent {
    Composed { note: ComposeNote },
    ComposeRejected { error: ComposeError, severity: Severity },
    StageStarted { stage: String, input: Shape },
    StageFinished { report: StageReport },
    StageFault { fault: StageFault },
}

/// Observer that records every callback for later inspection.
///
/// Intended for tests: capture reports without process-wide logger state.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured events, in delivery order.
    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Captured composition rejections, in delivery order.
    pub fn rejections(&self) -> Vec<ComposeError> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObserverEvent::ComposeRejected { error, .. } => Some(error),
                _ => None,
            })
            .collect()
    }

    /// Captured stage faults, in delivery order.
    pub fn faults(&self) -> Vec<StageFault> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObserverEvent::StageFault { fault } => Some(fault),
                _ => None,
            })
            .collect()
    }

    /// Drop all captured events.
    pub fn reset(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: ObserverEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl PipelineObserver for RecordingObserver {
    fn composed(&self, note: &ComposeNote) {
        self.record(ObserverEvent::Composed { note: note.clone() });
    }

    fn compose_rejected(&self, error: &ComposeError, severity: Severity) {
        self.record(ObserverEvent::ComposeRejected {
            error: error.clone(),
            severity,
        });
    }

    fn stage_started(&self, stage: &str, input: Shape) {
        self.record(ObserverEvent::StageStarted {
            stage: stage.to_string(),
            input,
        });
    }

    fn stage_finished(&self, report: &StageReport) {
        self.record(ObserverEvent::StageFinished {
            report: report.clone(),
        });
    }

    fn stage_fault(&self, fault: &StageFault) {
        self.record(ObserverEvent::StageFault {
            fault: fault.clone(),
        });
    }
}
