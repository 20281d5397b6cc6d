//! PositionRank variant
//!
//! PositionRank biases PageRank towards words that appear earlier in the document.
//! The intuition is that important keywords often appear early (title, introduction).
//!
//! Bias formula: weight = 1 / (position + 1)
//! where position is the first occurrence position of the word.

use crate::graph::builder::GraphBuilder;
use crate::graph::csr::CsrGraph;
use crate::pagerank::personalized::{position_based_personalization, PersonalizedPageRank};
use crate::phrase::extraction::{ExtractionResult, PhraseExtractor};
use crate::types::{Phrase, TextRankConfig, Token};
use rustc_hash::FxHashMap;

/// PositionRank implementation
#[derive(Debug)]
pub struct PositionRank {
    config: TextRankConfig,
}

impl Default for PositionRank {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionRank {
    /// Create a new PositionRank extractor with default config
    pub fn new() -> Self {
        Self {
            config: TextRankConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: TextRankConfig) -> Self {
        Self { config }
    }

    /// Extract keyphrases using PositionRank
    pub fn extract(&self, tokens: &[Token]) -> Vec<Phrase> {
        self.extract_with_info(tokens).phrases
    }

    /// Extract keyphrases with PageRank convergence information
    pub fn extract_with_info(&self, tokens: &[Token]) -> ExtractionResult {
        // Build graph with POS filtering
        let include_pos = if self.config.include_pos.is_empty() {
            None
        } else {
            Some(self.config.include_pos.as_slice())
        };
        let builder = GraphBuilder::from_tokens_with_pos(
            tokens,
            self.config.window_size,
            self.config.use_edge_weights,
            include_pos,
        );

        if builder.is_empty() {
            return ExtractionResult {
                phrases: Vec::new(),
                converged: true,
                iterations: 0,
            };
        }

        let graph = CsrGraph::from_builder(&builder);

        // Calculate first occurrence positions for each lemma
        let first_positions = self.get_first_positions(tokens, &graph);

        // Build personalization vector
        let personalization =
            position_based_personalization(&first_positions, graph.num_nodes);

        // Run personalized PageRank
        let pagerank = PersonalizedPageRank::new()
            .with_damping(self.config.damping)
            .with_max_iterations(self.config.max_iterations)
            .with_threshold(self.config.convergence_threshold)
            .with_personalization(personalization)
            .run(&graph);

        // Extract phrases
        let extractor = PhraseExtractor::with_config(self.config.clone());
        let phrases = extractor.extract(tokens, &graph, &pagerank);

        ExtractionResult {
            phrases,
            converged: pagerank.converged,
            iterations: pagerank.iterations,
        }
    }

    /// Get the first occurrence position for each lemma in the graph
    fn get_first_positions(&self, tokens: &[Token], graph: &CsrGraph) -> Vec<(u32, usize)> {
        let mut first_positions: FxHashMap<String, usize> = FxHashMap::default();

        // Find first occurrence of each lemma (respecting include_pos config)
        let include_pos = &self.config.include_pos;
        for token in tokens.iter().filter(|t| {
            if t.is_stopword {
                return false;
            }
            if include_pos.is_empty() {
                t.pos.is_content_word()
            } else {
                include_pos.contains(&t.pos)
            }
        }) {
            first_positions
                .entry(token.lemma.clone())
                .or_insert(token.token_idx);
        }

        // Convert to (node_id, position) pairs
        first_positions
            .into_iter()
            .filter_map(|(lemma, position)| {
                graph
                    .get_node_by_lemma(&lemma)
                    .map(|node_id| (node_id, position))
            })
            .collect()
    }
}

/// Convenience function to extract keyphrases using PositionRank
pub fn extract_keyphrases_position(tokens: &[Token], config: &TextRankConfig) -> Vec<Phrase> {
    PositionRank::with_config(config.clone()).extract(tokens)
}
