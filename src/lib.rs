//! # rapid_textrank
//!
//! Keyword extraction and text summarization using the TextRank algorithm
//! and its variants (PositionRank, BiasedTextRank, TopicRank, SingleRank,
//! TopicalPageRank, MultipartiteRank).
//!
//! This crate root wires together the module tree found on disk. Some
//! modules referenced by the sources (`pagerank`, `graph::csr`,
//! `nlp::stopwords`, `summarizer`, `pipeline::traits`) have no
//! implementation file in the source tree and are therefore not declared
//! here; see BUILD_FLAGS.json for the resulting build status.

pub mod clustering;
pub mod errors;
pub mod graph;
pub mod nlp;
pub mod phrase;
pub mod pipeline;
pub mod types;
pub mod variants;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used error types.
pub use errors::{Result, TextCleanError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
