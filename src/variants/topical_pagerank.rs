//! Topical PageRank (SingleTPR) variant
//!
//! Topical PageRank (Sterckx et al., 2015) biases the random walk towards
//! topically important words. It combines SingleRank's graph construction
//! (weighted edges + cross-sentence windowing) with a personalized PageRank
//! whose teleport distribution reflects per-word topic importance.
//!
//! Users supply pre-computed topic weights (`lemma → weight`). Words absent
//! from the map receive a configurable minimum weight (default 0.0, matching
//! PKE's OOV behavior).

use crate::graph::builder::GraphBuilder;
use crate::graph::csr::CsrGraph;
use crate::pagerank::personalized::{topic_weight_personalization, PersonalizedPageRank};
use crate::phrase::extraction::{ExtractionResult, PhraseExtractor};
use crate::types::{Phrase, TextRankConfig, Token};
use std::collections::HashMap;

/// Topical PageRank implementation
#[derive(Debug)]
pub struct TopicalPageRank {
    config: TextRankConfig,
    /// Topic importance weights: lemma → weight
    topic_weights: HashMap<String, f64>,
    /// Weight assigned to words absent from topic_weights (PKE default: 0.0)
    min_weight: f64,
}

impl Default for TopicalPageRank {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicalPageRank {
    /// Create a new TopicalPageRank extractor with default config
    pub fn new() -> Self {
        Self {
            config: TextRankConfig::default(),
            topic_weights: HashMap::new(),
            min_weight: 0.0,
        }
    }

    /// Create with custom config
    pub fn with_config(config: TextRankConfig) -> Self {
        Self {
            config,
            topic_weights: HashMap::new(),
            min_weight: 0.0,
        }
    }

    /// Set topic importance weights (lemma → weight)
    pub fn with_topic_weights(mut self, weights: HashMap<String, f64>) -> Self {
        self.topic_weights = weights;
        self
    }

    /// Set the minimum weight for out-of-vocabulary words
    pub fn with_min_weight(mut self, min_weight: f64) -> Self {
        self.min_weight = min_weight;
        self
    }

    /// Extract keyphrases using Topical PageRank
    pub fn extract(&self, tokens: &[Token]) -> Vec<Phrase> {
        self.extract_with_info(tokens).phrases
    }

    /// Extract keyphrases with PageRank convergence information
    pub fn extract_with_info(&self, tokens: &[Token]) -> ExtractionResult {
        let include_pos = if self.config.include_pos.is_empty() {
            None
        } else {
            Some(self.config.include_pos.as_slice())
        };

        // SingleRank-style graph: weighted edges + cross-sentence windowing
        let builder = GraphBuilder::from_tokens_with_pos_and_boundaries(
            tokens,
            self.config.window_size,
            true,  // always weighted co-occurrence counts
            include_pos,
            self.config.use_pos_in_nodes,
            false, // ignore sentence boundaries
        );

        if builder.is_empty() {
            return ExtractionResult {
                phrases: Vec::new(),
                converged: true,
                iterations: 0,
            };
        }

        let graph = CsrGraph::from_builder(&builder);

        // Build personalization vector from topic weights
        let personalization = topic_weight_personalization(
            &self.topic_weights,
            &graph,
            &self.config.include_pos,
            self.config.use_pos_in_nodes,
            self.min_weight,
        );

        // Run Personalized PageRank
        let pagerank = PersonalizedPageRank::new()
            .with_damping(self.config.damping)
            .with_max_iterations(self.config.max_iterations)
            .with_threshold(self.config.convergence_threshold)
            .with_personalization(personalization)
            .run(&graph);

        let extractor = PhraseExtractor::with_config(self.config.clone());
        let phrases = extractor.extract(tokens, &graph, &pagerank);

        ExtractionResult {
            phrases,
            converged: pagerank.converged,
            iterations: pagerank.iterations,
        }
    }

    /// Get the current topic weights
    pub fn topic_weights(&self) -> &HashMap<String, f64> {
        &self.topic_weights
    }

    /// Get the minimum weight
    pub fn min_weight(&self) -> f64 {
        self.min_weight
    }
}

/// Convenience function to extract keyphrases using Topical PageRank
pub fn extract_keyphrases_topical(
    tokens: &[Token],
    config: &TextRankConfig,
    topic_weights: HashMap<String, f64>,
    min_weight: f64,
) -> Vec<Phrase> {
    TopicalPageRank::with_config(config.clone())
        .with_topic_weights(topic_weights)
        .with_min_weight(min_weight)
        .extract(tokens)
}
