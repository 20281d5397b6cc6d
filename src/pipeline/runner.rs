//! Pipeline runner — the ordered stage sequence and the execution engine.
//!
//! A [`Pipeline`] owns an ordered, deduplicated list of [`Stage`] handles
//! chosen from a shared [`StageRegistry`]. Composition operations
//! (`add`/`remove`/`clear`) report per-item outcomes and never abort a
//! batch; [`Pipeline::execute`] threads a [`Value`] through the stages in
//! insertion order.
//!
//! # Failure isolation
//!
//! Stages recover from their own input-contract violations (see
//! [`Transform`](super::stage::Transform)), so a malformed stage degrades
//! to an empty value rather than corrupting the run. The engine itself
//! never catches panics: a stage that breaks its no-panic contract
//! propagates out of `execute` with its root cause intact — a fatal,
//! non-retryable condition the composer must prevent.

use std::sync::Arc;

use serde::Serialize;

use super::error_code::ErrorCode;
use super::errors::ComposeError;
use super::observer::{
    ComposeNote, LogObserver, PipelineObserver, Severity, StageClock, StageReport,
};
use super::registry::StageRegistry;
use super::stage::{Stage, StageContext};
use crate::types::Value;

// ============================================================================
// Composition outcomes
// ============================================================================

/// The per-item result of an `add` or `remove` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ComposeOutcome {
    /// The stage was appended to the end of the pipeline.
    Added { stage: String },
    /// The stage was removed; remaining order is preserved.
    Removed { stage: String },
    /// The stage is already present; the add was skipped (warning).
    DuplicateSkipped { error: ComposeError },
    /// The stage is not in the registry's eligible set; the add was
    /// rejected (error).
    Ineligible { error: ComposeError },
    /// The stage is not a member of the pipeline; the remove was rejected
    /// (error).
    NotAMember { error: ComposeError },
}

impl ComposeOutcome {
    /// Name of the stage this outcome concerns.
    pub fn stage(&self) -> &str {
        match self {
            Self::Added { stage } | Self::Removed { stage } => stage,
            Self::DuplicateSkipped { error }
            | Self::Ineligible { error }
            | Self::NotAMember { error } => &error.stage,
        }
    }

    /// Whether the operation changed the pipeline.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Added { .. } | Self::Removed { .. })
    }

    /// The diagnostic, for non-success outcomes.
    pub fn error(&self) -> Option<&ComposeError> {
        match self {
            Self::DuplicateSkipped { error }
            | Self::Ineligible { error }
            | Self::NotAMember { error } => Some(error),
            _ => None,
        }
    }
}

/// Collected per-item outcomes of a batch composition operation.
///
/// A batch never short-circuits: every offered stage gets an outcome, in
/// offer order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComposeReport {
    pub outcomes: Vec<ComposeOutcome>,
}

impl ComposeReport {
    /// Number of stages actually added or removed.
    pub fn changed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Iterate over error-severity diagnostics (ineligible adds, unknown
    /// removes). Duplicate skips are warnings and not included.
    pub fn errors(&self) -> impl Iterator<Item = &ComposeError> {
        self.outcomes.iter().filter_map(|o| match o {
            ComposeOutcome::Ineligible { error } | ComposeOutcome::NotAMember { error } => {
                Some(error)
            }
            _ => None,
        })
    }

    /// Iterate over warning-severity diagnostics (duplicate skips).
    pub fn warnings(&self) -> impl Iterator<Item = &ComposeError> {
        self.outcomes.iter().filter_map(|o| match o {
            ComposeOutcome::DuplicateSkipped { error } => Some(error),
            _ => None,
        })
    }

    /// Returns `true` if any outcome is an error.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// The result of [`Pipeline::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ClearOutcome {
    /// `count` stages were removed.
    Cleared { count: usize },
    /// The pipeline was already empty; nothing changed.
    AlreadyEmpty,
}

// ============================================================================
// Pipeline
// ============================================================================

/// An ordered, deduplicated sequence of stages plus the operations to
/// manage and run it.
///
/// The registry (eligibility set) and observer (reporting collaborator)
/// are injected at construction and shared; the pipeline owns only the
/// ordering. Mutation requires `&mut self`, so concurrent use of one
/// instance is ruled out by the borrow checker — share a registry across
/// one pipeline per worker instead.
pub struct Pipeline {
    registry: Arc<StageRegistry>,
    observer: Arc<dyn PipelineObserver>,
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Create an empty pipeline over the given eligibility registry,
    /// reporting through the default [`LogObserver`].
    pub fn new(registry: Arc<StageRegistry>) -> Self {
        Self::with_observer(registry, Arc::new(LogObserver))
    }

    /// Create an empty pipeline with an injected observer.
    pub fn with_observer(
        registry: Arc<StageRegistry>,
        observer: Arc<dyn PipelineObserver>,
    ) -> Self {
        Self {
            registry,
            observer,
            stages: Vec::new(),
        }
    }

    // ─── Registration ───────────────────────────────────────────────────

    /// Offer one stage for the end of the pipeline.
    ///
    /// Ineligible stages are rejected with an error outcome; stages already
    /// present are skipped with a warning outcome. The outcome is also
    /// delivered to the observer.
    pub fn add(&mut self, stage: Stage) -> ComposeOutcome {
        if !self.registry.is_eligible(&stage) {
            let error = ComposeError::new(
                ErrorCode::IneligibleStage,
                stage.name(),
                "is not an eligible pipeline stage and cannot be added",
            )
            .with_hint("register it with StageRegistry::register first");
            self.observer.compose_rejected(&error, Severity::Error);
            return ComposeOutcome::Ineligible { error };
        }

        if self.stages.iter().any(|s| s.name() == stage.name()) {
            let error = ComposeError::new(
                ErrorCode::DuplicateStage,
                stage.name(),
                "is already in the pipeline",
            );
            self.observer.compose_rejected(&error, Severity::Warning);
            return ComposeOutcome::DuplicateSkipped { error };
        }

        let name = stage.name().to_string();
        self.stages.push(stage);
        self.observer
            .composed(&ComposeNote::Added { stage: name.clone() });
        ComposeOutcome::Added { stage: name }
    }

    /// Offer a batch of stages, in order. A rejected item never aborts the
    /// rest of the batch.
    pub fn add_all(&mut self, stages: impl IntoIterator<Item = Stage>) -> ComposeReport {
        ComposeReport {
            outcomes: stages.into_iter().map(|s| self.add(s)).collect(),
        }
    }

    /// Remove one stage. Absent stages produce an error outcome and leave
    /// the pipeline unchanged; the order of remaining stages is preserved.
    pub fn remove(&mut self, stage: &Stage) -> ComposeOutcome {
        match self.stages.iter().position(|s| s.name() == stage.name()) {
            Some(index) => {
                self.stages.remove(index);
                let name = stage.name().to_string();
                self.observer
                    .composed(&ComposeNote::Removed { stage: name.clone() });
                ComposeOutcome::Removed { stage: name }
            }
            None => {
                let error = ComposeError::new(
                    ErrorCode::UnknownStage,
                    stage.name(),
                    "is not in the pipeline",
                );
                self.observer.compose_rejected(&error, Severity::Error);
                ComposeOutcome::NotAMember { error }
            }
        }
    }

    /// Remove a batch of stages, in order. A missing item never aborts the
    /// rest of the batch.
    pub fn remove_all<'a>(
        &mut self,
        stages: impl IntoIterator<Item = &'a Stage>,
    ) -> ComposeReport {
        ComposeReport {
            outcomes: stages.into_iter().map(|s| self.remove(s)).collect(),
        }
    }

    // ─── Inspection ─────────────────────────────────────────────────────

    /// Lazy, ordered view of the current configuration as
    /// `(position, stage_name)` pairs. Restartable: call again for a fresh
    /// iteration. Does not mutate state.
    pub fn stages(&self) -> impl Iterator<Item = (usize, &str)> {
        self.stages.iter().enumerate().map(|(i, s)| (i, s.name()))
    }

    /// Number of stages currently registered.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Whether a stage with this name is currently in the pipeline.
    pub fn contains(&self, name: &str) -> bool {
        self.stages.iter().any(|s| s.name() == name)
    }

    /// Empty the pipeline. Clearing an already-empty pipeline is a
    /// reportable no-op, not an error.
    pub fn clear(&mut self) -> ClearOutcome {
        if self.stages.is_empty() {
            self.observer.composed(&ComposeNote::AlreadyEmpty);
            return ClearOutcome::AlreadyEmpty;
        }
        let count = self.stages.len();
        self.stages.clear();
        self.observer.composed(&ComposeNote::Cleared { count });
        ClearOutcome::Cleared { count }
    }

    // ─── Execution ──────────────────────────────────────────────────────

    /// Run the ordered stages against an input value.
    ///
    /// Each stage consumes the previous stage's output; the engine performs
    /// no shape normalization between stages — ordering stages so shapes
    /// line up is the composer's responsibility. An empty pipeline returns
    /// the input unchanged.
    pub fn execute(&self, input: impl Into<Value>) -> Value {
        let mut current = input.into();
        let ctx = StageContext::new(self.observer.as_ref());

        for stage in &self.stages {
            let input_shape = current.shape();
            self.observer.stage_started(stage.name(), input_shape);
            let clock = StageClock::start();

            current = stage.apply(current, &ctx);

            self.observer.stage_finished(&StageReport {
                stage: stage.name().to_string(),
                input: input_shape,
                output: current.shape(),
                output_units: match &current {
                    Value::Text(text) => text.chars().count(),
                    Value::Tokens(tokens) => tokens.len(),
                },
                elapsed_us: clock.elapsed().as_micros(),
            });
        }

        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::observer::{ObserverEvent, RecordingObserver};
    use crate::types::Shape;

    fn registry_with(names: &[&str]) -> (Arc<StageRegistry>, Vec<Stage>) {
        let mut registry = StageRegistry::new();
        let stages = names
            .iter()
            .map(|name| registry.register(Stage::from_fn(*name, |v, _| v)))
            .collect();
        (Arc::new(registry), stages)
    }

    fn recording_pipeline(registry: Arc<StageRegistry>) -> (Pipeline, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::new());
        let pipeline = Pipeline::with_observer(registry, observer.clone());
        (pipeline, observer)
    }

    // ─── add ────────────────────────────────────────────────────────────

    #[test]
    fn test_add_appends_in_order() {
        let (registry, stages) = registry_with(&["a", "b", "c"]);
        let mut pipeline = Pipeline::new(registry);

        for stage in stages {
            assert!(pipeline.add(stage).is_success());
        }

        let order: Vec<_> = pipeline.stages().collect();
        assert_eq!(order, vec![(0, "a"), (1, "b"), (2, "c")]);
    }

    #[test]
    fn test_add_duplicate_is_skipped_with_warning() {
        let (registry, stages) = registry_with(&["a"]);
        let (mut pipeline, observer) = recording_pipeline(registry);

        pipeline.add(stages[0].clone());
        let outcome = pipeline.add(stages[0].clone());

        assert!(matches!(outcome, ComposeOutcome::DuplicateSkipped { .. }));
        assert_eq!(pipeline.len(), 1);

        let events = observer.events();
        assert!(events.iter().any(|e| matches!(
            e,
            ObserverEvent::ComposeRejected {
                severity: Severity::Warning,
                ..
            }
        )));
    }

    #[test]
    fn test_add_ineligible_is_rejected_with_error() {
        let (registry, _) = registry_with(&["a"]);
        let (mut pipeline, observer) = recording_pipeline(registry);

        let outsider = Stage::from_fn("outsider", |v, _| v);
        let outcome = pipeline.add(outsider);

        assert!(matches!(outcome, ComposeOutcome::Ineligible { .. }));
        assert_eq!(outcome.error().unwrap().code, ErrorCode::IneligibleStage);
        assert_eq!(outcome.stage(), "outsider");
        assert!(pipeline.is_empty());

        let rejections = observer.rejections();
        assert_eq!(rejections.len(), 1);
        assert_eq!(rejections[0].stage, "outsider");
    }

    #[test]
    fn test_add_batch_continues_past_rejections() {
        let (registry, stages) = registry_with(&["a", "b"]);
        let mut pipeline = Pipeline::new(registry);

        let outsider = Stage::from_fn("outsider", |v, _| v);
        let report = pipeline.add_all([stages[0].clone(), outsider, stages[1].clone()]);

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.changed(), 2);
        assert!(report.has_errors());
        assert_eq!(pipeline.len(), 2);
        // The stage after the rejected one was still processed.
        assert!(pipeline.contains("b"));
    }

    // ─── remove ─────────────────────────────────────────────────────────

    #[test]
    fn test_remove_preserves_order() {
        let (registry, stages) = registry_with(&["a", "b", "c"]);
        let mut pipeline = Pipeline::new(registry);
        pipeline.add_all(stages.iter().cloned());

        pipeline.remove(&stages[1]);

        let order: Vec<_> = pipeline.stages().collect();
        assert_eq!(order, vec![(0, "a"), (1, "c")]);
    }

    #[test]
    fn test_remove_unknown_reports_error_and_batch_continues() {
        let (registry, stages) = registry_with(&["a", "b"]);
        let (mut pipeline, observer) = recording_pipeline(registry);
        pipeline.add(stages[0].clone());

        // "b" is eligible but was never added; "a" is a member.
        let report = pipeline.remove_all([&stages[1], &stages[0]]);

        assert!(matches!(
            report.outcomes[0],
            ComposeOutcome::NotAMember { .. }
        ));
        assert!(matches!(report.outcomes[1], ComposeOutcome::Removed { .. }));
        assert!(pipeline.is_empty());

        let rejections = observer.rejections();
        assert_eq!(rejections[0].code, ErrorCode::UnknownStage);
        assert_eq!(rejections[0].stage, "b");
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        let (registry, stages) = registry_with(&["a", "b"]);
        let mut pipeline = Pipeline::new(registry);
        pipeline.add(stages[0].clone());

        let before: Vec<_> = pipeline
            .stages()
            .map(|(i, n)| (i, n.to_string()))
            .collect();
        pipeline.add(stages[1].clone());
        pipeline.remove(&stages[1]);
        let after: Vec<_> = pipeline
            .stages()
            .map(|(i, n)| (i, n.to_string()))
            .collect();

        assert_eq!(before, after);
    }

    // ─── inspection / clear ─────────────────────────────────────────────

    #[test]
    fn test_stages_iterator_is_restartable() {
        let (registry, stages) = registry_with(&["a", "b"]);
        let mut pipeline = Pipeline::new(registry);
        pipeline.add_all(stages.iter().cloned());

        let first: Vec<_> = pipeline.stages().collect();
        let second: Vec<_> = pipeline.stages().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_clear_distinguishes_empty_from_nonempty() {
        let (registry, stages) = registry_with(&["a", "b"]);
        let (mut pipeline, observer) = recording_pipeline(registry);

        assert_eq!(pipeline.clear(), ClearOutcome::AlreadyEmpty);

        pipeline.add_all(stages.iter().cloned());
        assert_eq!(pipeline.clear(), ClearOutcome::Cleared { count: 2 });
        assert!(pipeline.is_empty());

        let events = observer.events();
        assert!(events.contains(&ObserverEvent::Composed {
            note: ComposeNote::AlreadyEmpty
        }));
        assert!(events.contains(&ObserverEvent::Composed {
            note: ComposeNote::Cleared { count: 2 }
        }));
    }

    // ─── execute ────────────────────────────────────────────────────────

    #[test]
    fn test_execute_empty_pipeline_is_identity() {
        let (registry, _) = registry_with(&[]);
        let pipeline = Pipeline::new(registry);

        assert_eq!(pipeline.execute("unchanged"), Value::from("unchanged"));
        let tokens: Value = ["a", "b"].as_slice().into();
        assert_eq!(pipeline.execute(tokens.clone()), tokens);
    }

    #[test]
    fn test_execute_threads_output_to_next_stage() {
        let mut registry = StageRegistry::new();
        let exclaim = registry.register(Stage::from_fn("exclaim", |v, ctx| match v {
            Value::Text(t) => Value::Text(format!("{t}!")),
            other => ctx.recover("exclaim", Shape::Text, other.shape(), Shape::Text),
        }));
        let double = registry.register(Stage::from_fn("double", |v, ctx| match v {
            Value::Text(t) => Value::Text(format!("{t}{t}")),
            other => ctx.recover("double", Shape::Text, other.shape(), Shape::Text),
        }));

        let mut pipeline = Pipeline::new(Arc::new(registry));
        pipeline.add_all([exclaim, double]);

        assert_eq!(pipeline.execute("hi"), Value::from("hi!hi!"));
    }

    #[test]
    fn test_execute_reports_stage_lifecycle() {
        let (registry, stages) = registry_with(&["a"]);
        let (mut pipeline, observer) = recording_pipeline(registry);
        pipeline.add(stages[0].clone());
        observer.reset();

        pipeline.execute("input");

        let events = observer.events();
        assert!(matches!(&events[0], ObserverEvent::StageStarted { stage, input }
            if stage == "a" && *input == Shape::Text));
        assert!(matches!(&events[1], ObserverEvent::StageFinished { report }
            if report.stage == "a" && report.output_units == "input".len()));
    }

    #[test]
    fn test_execute_continues_after_recovered_fault() {
        let mut registry = StageRegistry::new();
        // Accepts only tokens; fed text, so it must degrade gracefully.
        let tokens_only = registry.register(Stage::from_fn("tokens_only", |v, ctx| match v {
            Value::Tokens(t) => Value::Tokens(t),
            other => ctx.recover("tokens_only", Shape::Tokens, other.shape(), Shape::Tokens),
        }));
        let count = registry.register(Stage::from_fn("count", |v, ctx| match v {
            Value::Tokens(t) => Value::Text(t.len().to_string()),
            other => ctx.recover("count", Shape::Tokens, other.shape(), Shape::Text),
        }));

        let observer = Arc::new(RecordingObserver::new());
        let mut pipeline = Pipeline::with_observer(Arc::new(registry), observer.clone());
        pipeline.add_all([tokens_only, count]);

        // The fault is contained: execution reaches the second stage with
        // the empty fallback.
        assert_eq!(pipeline.execute("not tokens"), Value::from("0"));

        let faults = observer.faults();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].stage, "tokens_only");
    }
}
