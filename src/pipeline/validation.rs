//! Validation engine for pipeline specifications.
//!
//! The engine runs all registered [`ValidationRule`]s against a
//! [`PipelineSpecV1`](super::spec::PipelineSpecV1) and collects every diagnostic
//! into a [`ValidationReport`] — it never short-circuits on the first error,
//! so users see all problems at once.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use rapid_textrank::pipeline::validation::ValidationEngine;
//!
//! let engine = ValidationEngine::with_defaults();
//! let report = engine.validate(&spec);
//! if report.has_errors() {
//!     for err in report.errors() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use serde::Serialize;

use super::error_code::ErrorCode;
use super::errors::PipelineSpecError;
use super::spec::*;

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

/// A single validation finding — an error or warning attached to a
/// [`PipelineSpecError`] that carries the code, path, message, and hint.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: PipelineSpecError,
}

impl ValidationDiagnostic {
    pub fn error(err: PipelineSpecError) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: PipelineSpecError) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &PipelineSpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    /// Iterate over warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &PipelineSpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    /// Returns `true` if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Total number of diagnostics (errors + warnings).
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if there are no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects a [`PipelineSpecV1`] and returns
/// zero or more diagnostics.
///
/// Rules are stateless and must be `Send + Sync` so they can be shared
/// across threads (e.g., in a long-lived validation engine).
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"rank_teleport"`).
    fn name(&self) -> &str;

    /// Inspect `spec` and return any findings.
    fn validate(&self, spec: &PipelineSpecV1) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against a [`PipelineSpecV1`] and collects
/// all diagnostics into a [`ValidationReport`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Create an empty engine with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(RankTeleportRule));
        engine.add_rule(Box::new(TopicGraphDepsRule));
        engine.add_rule(Box::new(GraphTransformDepsRule));
        engine.add_rule(Box::new(RuntimeLimitsRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    /// Register an additional rule.
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Run all rules against `spec` and return the collected report.
    pub fn validate(&self, spec: &PipelineSpecV1) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(spec));
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. personalized_pagerank requires teleport ─────────────────────────────

struct RankTeleportRule;

impl ValidationRule for RankTeleportRule {
    fn name(&self) -> &str {
        "rank_teleport"
    }

    fn validate(&self, spec: &PipelineSpecV1) -> Vec<ValidationDiagnostic> {
        let is_personalized =
            matches!(spec.modules.rank, Some(RankSpec::PersonalizedPagerank { .. }));

        if is_personalized && spec.modules.teleport.is_none() {
            vec![ValidationDiagnostic::error(
                PipelineSpecError::new(
                    ErrorCode::MissingStage,
                    "/modules/teleport",
                    "personalized_pagerank requires a teleport module",
                )
                .with_hint(
                    "Add a teleport module: position, focus_terms, \
                     topic_weights, or uniform",
                ),
            )]
        } else {
            vec![]
        }
    }
}

// ─── 2. topic_graph / candidate_graph require clustering + phrase_candidates ─

struct TopicGraphDepsRule;

impl ValidationRule for TopicGraphDepsRule {
    fn name(&self) -> &str {
        "topic_graph_deps"
    }

    fn validate(&self, spec: &PipelineSpecV1) -> Vec<ValidationDiagnostic> {
        let graph = match &spec.modules.graph {
            Some(g) if matches!(g, GraphSpec::TopicGraph | GraphSpec::CandidateGraph) => g,
            _ => return vec![],
        };

        let mut out = Vec::new();

        if spec.modules.clustering.is_none() {
            out.push(ValidationDiagnostic::error(
                PipelineSpecError::new(
                    ErrorCode::MissingStage,
                    "/modules/clustering",
                    format!("{} requires a clustering module", graph.type_name()),
                )
                .with_hint("Add clustering: \"hac\""),
            ));
        }

        if !matches!(spec.modules.candidates, Some(CandidatesSpec::PhraseCandidates)) {
            out.push(ValidationDiagnostic::error(
                PipelineSpecError::new(
                    ErrorCode::InvalidCombo,
                    "/modules/candidates",
                    format!(
                        "{} requires phrase_candidates, not word_nodes",
                        graph.type_name()
                    ),
                )
                .with_hint("Set candidates to \"phrase_candidates\""),
            ));
        }

        out
    }
}

// ─── 3. remove_intra_cluster_edges requires clustering ──────────────────────

struct GraphTransformDepsRule;

impl ValidationRule for GraphTransformDepsRule {
    fn name(&self) -> &str {
        "graph_transform_deps"
    }

    fn validate(&self, spec: &PipelineSpecV1) -> Vec<ValidationDiagnostic> {
        let needs_clusters = spec
            .modules
            .graph_transforms
            .iter()
            .any(|t| matches!(t, GraphTransformSpec::RemoveIntraClusterEdges));

        if needs_clusters && spec.modules.clustering.is_none() {
            vec![ValidationDiagnostic::error(
                PipelineSpecError::new(
                    ErrorCode::MissingStage,
                    "/modules/clustering",
                    "remove_intra_cluster_edges requires a clustering module",
                )
                .with_hint("Add clustering: \"hac\""),
            )]
        } else {
            vec![]
        }
    }
}

// ─── 4. Runtime limits must be positive when set ────────────────────────────

struct RuntimeLimitsRule;

impl ValidationRule for RuntimeLimitsRule {
    fn name(&self) -> &str {
        "runtime_limits"
    }

    fn validate(&self, spec: &PipelineSpecV1) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();

        let checks: &[(&str, Option<usize>)] = &[
            ("max_tokens", spec.runtime.max_tokens),
            ("max_nodes", spec.runtime.max_nodes),
            ("max_edges", spec.runtime.max_edges),
            ("max_threads", spec.runtime.max_threads),
        ];

        for &(field, value) in checks {
            if value == Some(0) {
                out.push(ValidationDiagnostic::error(
                    PipelineSpecError::new(
                        ErrorCode::LimitExceeded,
                        format!("/runtime/{field}"),
                        format!("{field} must be greater than 0"),
                    )
                    .with_hint(format!("Remove {field} to disable the limit, or set it to a positive value")),
                ));
            }
        }

        out
    }
}

// ─── 5. Unknown fields (strict → error, non-strict → warning) ──────────────

struct UnknownFieldsRule;

impl UnknownFieldsRule {
    /// Collect unknown-field diagnostics at the given JSON pointer `path`
    /// from a `HashMap` of extra fields captured by `#[serde(flatten)]`.
    fn check_unknowns(
        path: &str,
        unknowns: &std::collections::HashMap<String, serde_json::Value>,
        strict: bool,
    ) -> Vec<ValidationDiagnostic> {
        unknowns
            .keys()
            .map(|key| {
                let diag_fn = if strict {
                    ValidationDiagnostic::error
                } else {
                    ValidationDiagnostic::warning
                };
                diag_fn(
                    PipelineSpecError::new(
                        ErrorCode::UnknownField,
                        format!("{path}/{key}"),
                        format!("unrecognized field \"{key}\""),
                    )
                    .with_hint("Check spelling or remove this field"),
                )
            })
            .collect()
    }
}

impl ValidationRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, spec: &PipelineSpecV1) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        out.extend(Self::check_unknowns("", &spec.unknown_fields, spec.strict));
        out.extend(Self::check_unknowns(
            "/modules",
            &spec.modules.unknown_fields,
            spec.strict,
        ));
        out.extend(Self::check_unknowns(
            "/runtime",
            &spec.runtime.unknown_fields,
            spec.strict,
        ));
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════
