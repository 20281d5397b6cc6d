//! The stage contract: the [`Transform`] trait and the [`Stage`] handle.
//!
//! A stage is a single, named, immutable text-transformation unit. Stages
//! are defined once, registered into a [`StageRegistry`](super::registry::StageRegistry)
//! to become pipeline-eligible, and shared by reference across any number
//! of pipelines.

use std::fmt;
use std::sync::Arc;

use super::errors::StageFault;
use super::observer::{NullObserver, PipelineObserver};
use crate::types::{Shape, Value};

// ============================================================================
// Transform — the stage contract
// ============================================================================

/// A single text-transformation unit.
///
/// # Contract
///
/// - **Input**: one [`Value`] — a text unit or a token sequence. Which
///   shapes an implementation accepts is part of its own documentation;
///   stage-specific options live in the implementing struct, fixed at
///   construction time.
/// - **Output**: one [`Value`]; the shape may differ from the input shape.
/// - **No panics**: an implementation must not panic for any input. On a
///   shape it does not accept it reports the fault through
///   [`StageContext::recover`] and returns the empty fallback of its
///   output shape, so pipeline execution continues deterministically.
/// - **Pure with respect to pipeline state**: a stage never mutates the
///   pipeline it runs in; internal resources (lookup tables, lexicons) are
///   immutable after construction.
pub trait Transform: Send + Sync {
    /// Stable identifier for this stage (snake_case, named for what the
    /// stage does). Identity and pipeline deduplication are by name.
    fn name(&self) -> &str;

    /// Apply the transformation.
    fn apply(&self, value: Value, ctx: &StageContext<'_>) -> Value;
}

// ============================================================================
// Stage — shared handle
// ============================================================================

/// A cheaply cloneable, shared handle to a [`Transform`].
///
/// Pipelines hold `Stage` handles by reference; the underlying transform is
/// defined once and lives for the life of the program. Equality is by name,
/// matching the pipeline's deduplication rule.
#[derive(Clone)]
pub struct Stage {
    inner: Arc<dyn Transform>,
}

impl Stage {
    /// Wrap a transform in a shareable handle.
    pub fn new(transform: impl Transform + 'static) -> Self {
        Self {
            inner: Arc::new(transform),
        }
    }

    /// Build a stage from a closure, for ad-hoc transforms and tests.
    ///
    /// The closure is subject to the full [`Transform`] contract.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, &StageContext<'_>) -> Value + Send + Sync + 'static,
    {
        Self::new(FnTransform {
            name: name.into(),
            f,
        })
    }

    /// The stage's stable identifier.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Apply the underlying transform.
    pub fn apply(&self, value: Value, ctx: &StageContext<'_>) -> Value {
        self.inner.apply(value, ctx)
    }

    /// Whether two handles point at the same transform instance.
    pub(crate) fn ptr_eq(&self, other: &Stage) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage").field("name", &self.name()).finish()
    }
}

impl PartialEq for Stage {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Stage {}

/// Closure-backed transform used by [`Stage::from_fn`].
struct FnTransform<F> {
    name: String,
    f: F,
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(Value, &StageContext<'_>) -> Value + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, value: Value, ctx: &StageContext<'_>) -> Value {
        (self.f)(value, ctx)
    }
}

// ============================================================================
// StageContext — fault reporting during execution
// ============================================================================

static DETACHED_OBSERVER: NullObserver = NullObserver;

/// Execution context handed to every stage.
///
/// Carries the pipeline's observer so stages can report recovered contract
/// violations without holding any logging state of their own.
pub struct StageContext<'a> {
    observer: &'a dyn PipelineObserver,
}

impl<'a> StageContext<'a> {
    /// Context backed by the given observer.
    pub fn new(observer: &'a dyn PipelineObserver) -> Self {
        Self { observer }
    }

    /// Context that discards fault reports. Useful when exercising a stage
    /// directly, outside a pipeline.
    pub fn detached() -> StageContext<'static> {
        StageContext {
            observer: &DETACHED_OBSERVER,
        }
    }

    /// Report a shape mismatch and produce the empty fallback of the
    /// stage's output shape.
    ///
    /// This is the local-recovery path of the [`Transform`] contract:
    ///
    /// ```ignore
    /// match value {
    ///     Value::Text(text) => Value::Text(self.process(&text)),
    ///     other => ctx.recover(self.name(), Shape::Text, other.shape(), Shape::Text),
    /// }
    /// ```
    pub fn recover(&self, stage: &str, expected: Shape, got: Shape, fallback: Shape) -> Value {
        self.observer
            .stage_fault(&StageFault::shape_mismatch(stage, expected, got));
        Value::empty(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::observer::RecordingObserver;

    #[test]
    fn test_from_fn_stage() {
        let stage = Stage::from_fn("reverse", |value, ctx| match value {
            Value::Text(text) => Value::Text(text.chars().rev().collect()),
            other => ctx.recover("reverse", Shape::Text, other.shape(), Shape::Text),
        });

        assert_eq!(stage.name(), "reverse");
        let out = stage.apply(Value::from("abc"), &StageContext::detached());
        assert_eq!(out, Value::from("cba"));
    }

    #[test]
    fn test_stage_equality_is_by_name() {
        let a = Stage::from_fn("noop", |v, _| v);
        let b = Stage::from_fn("noop", |v, _| v);
        let c = Stage::from_fn("other", |v, _| v);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&a.clone()));
    }

    #[test]
    fn test_recover_reports_and_falls_back() {
        let observer = RecordingObserver::new();
        let ctx = StageContext::new(&observer);

        let out = ctx.recover("tokenize_words", Shape::Text, Shape::Tokens, Shape::Tokens);
        assert_eq!(out, Value::empty(Shape::Tokens));

        let faults = observer.faults();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].stage, "tokenize_words");
        assert_eq!(faults[0].expected, Shape::Text);
        assert_eq!(faults[0].got, Shape::Tokens);
    }

    #[test]
    fn test_stage_debug_shows_name() {
        let stage = Stage::from_fn("lowercase", |v, _| v);
        assert!(format!("{stage:?}").contains("lowercase"));
    }
}
