//! The eligibility marker: a registry of known pipeline stages.
//!
//! Implementing [`Transform`](super::stage::Transform) makes a unit
//! *callable*; registration makes it *eligible*. A pipeline only accepts
//! stages that are members of its registry, so arbitrary helper transforms
//! cannot be injected accidentally — the same guard the original design
//! expressed by flagging functions at definition time, expressed here as
//! membership in a known-stage set.

use rustc_hash::FxHashMap;

use super::stage::Stage;

/// The set of stages eligible for pipeline registration.
///
/// A registry is built once (typically process-wide, see
/// [`crate::stages::builtin_registry`]), shared via `Arc`, and consulted by
/// every [`Pipeline::add`](super::runner::Pipeline::add) call.
#[derive(Debug, Default)]
pub struct StageRegistry {
    eligible: FxHashMap<String, Stage>,
}

impl StageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a stage as pipeline-eligible and return its shared handle.
    ///
    /// Idempotent: registering a stage under a name that is already
    /// registered has no additional effect — the first registration wins
    /// and its handle is returned.
    pub fn register(&mut self, stage: Stage) -> Stage {
        self.eligible
            .entry(stage.name().to_string())
            .or_insert(stage)
            .clone()
    }

    /// Whether this exact stage is a member of the eligible set.
    ///
    /// Membership requires pointer identity with the registered handle, not
    /// just a matching name, so a foreign transform cannot impersonate a
    /// registered stage by reusing its name.
    pub fn is_eligible(&self, stage: &Stage) -> bool {
        self.eligible
            .get(stage.name())
            .is_some_and(|registered| registered.ptr_eq(stage))
    }

    /// Look up a registered stage by name.
    pub fn get(&self, name: &str) -> Option<Stage> {
        self.eligible.get(name).cloned()
    }

    /// Names of all registered stages, in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.eligible.keys().map(String::as_str)
    }

    /// Number of registered stages.
    pub fn len(&self) -> usize {
        self.eligible.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }
}
