//! Graph construction and representations.
//!
//! Submodules present on disk:
//! - [`builder`] — mutable co-occurrence [`builder::GraphBuilder`]

pub mod builder;
