//! SingleRank variant
//!
//! SingleRank (Wan & Xiao, 2008) extends TextRank with two modifications:
//! 1. **Weighted edges**: Co-occurrence counts are used as edge weights
//!    (always forced, regardless of `use_edge_weights` config).
//! 2. **Cross-sentence windowing**: The sliding window ignores sentence
//!    boundaries, so tokens at the end of one sentence can co-occur with
//!    tokens at the start of the next.
//!
//! The rest of the pipeline (standard PageRank, phrase extraction) is
//! identical to base TextRank.

use crate::pipeline::artifacts::TokenStream;
use crate::pipeline::observer::NoopObserver;
use crate::pipeline::runner::SingleRankPipeline;
use crate::phrase::extraction::ExtractionResult;
use crate::types::{Phrase, TextRankConfig, Token};

/// SingleRank implementation
#[derive(Debug)]
pub struct SingleRank {
    config: TextRankConfig,
}

impl Default for SingleRank {
    fn default() -> Self {
        Self::new()
    }
}

impl SingleRank {
    /// Create a new SingleRank extractor with default config
    pub fn new() -> Self {
        Self {
            config: TextRankConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: TextRankConfig) -> Self {
        Self { config }
    }

    /// Extract keyphrases using SingleRank
    pub fn extract(&self, tokens: &[Token]) -> Vec<Phrase> {
        self.extract_with_info(tokens).phrases
    }

    /// Extract keyphrases with PageRank convergence information
    pub fn extract_with_info(&self, tokens: &[Token]) -> ExtractionResult {
        let pipeline = SingleRankPipeline::single_rank();
        let stream = TokenStream::from_tokens(tokens);
        let mut obs = NoopObserver;
        let result = pipeline.run(stream, &self.config, &mut obs);

        ExtractionResult {
            phrases: result.phrases,
            converged: result.converged,
            iterations: result.iterations as usize,
        }
    }
}

/// Convenience function to extract keyphrases using SingleRank
pub fn extract_keyphrases_singlerank(tokens: &[Token], config: &TextRankConfig) -> Vec<Phrase> {
    SingleRank::with_config(config.clone()).extract(tokens)
}
