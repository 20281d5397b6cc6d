//! MultipartiteRank variant
//!
//! MultipartiteRank (Boudin, NAACL 2018) builds a k-partite directed graph
//! where nodes are individual keyphrase candidates and edges connect only
//! candidates from different topic clusters. An alpha weight-adjustment step
//! boosts incoming edges to the first-occurring variant in each topic,
//! encoding positional preference directly into edge weights before PageRank.

use crate::clustering::{self, compute_gap, extract_candidates, PhraseCandidate};
use crate::graph::builder::GraphBuilder;
use crate::graph::csr::CsrGraph;
use crate::pagerank::standard::StandardPageRank;
use crate::phrase::extraction::ExtractionResult;
use crate::types::{Phrase, TextRankConfig, Token};
use rustc_hash::FxHashMap;

/// MultipartiteRank implementation
#[derive(Debug)]
pub struct MultipartiteRank {
    config: TextRankConfig,
    /// Jaccard similarity threshold for topic clustering (default: 0.26)
    similarity_threshold: f64,
    /// Weight adjustment strength (default: 1.1)
    alpha: f64,
    /// Maximum number of candidate phrases to process (default: 200)
    max_phrases: usize,
}

impl Default for MultipartiteRank {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartiteRank {
    /// Create a new MultipartiteRank extractor with default settings
    pub fn new() -> Self {
        Self {
            config: TextRankConfig::default(),
            similarity_threshold: 0.26,
            alpha: 1.1,
            max_phrases: 200,
        }
    }

    /// Create with custom config
    pub fn with_config(config: TextRankConfig) -> Self {
        Self {
            config,
            similarity_threshold: 0.26,
            alpha: 1.1,
            max_phrases: 200,
        }
    }

    /// Set similarity threshold for topic clustering
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set alpha weight adjustment strength
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.max(0.0);
        self
    }

    /// Set maximum phrases to process
    pub fn with_max_phrases(mut self, max: usize) -> Self {
        self.max_phrases = max;
        self
    }

    /// Extract keyphrases using MultipartiteRank
    pub fn extract(&self, tokens: &[Token]) -> Vec<Phrase> {
        self.extract_with_info(tokens).phrases
    }

    /// Extract keyphrases with PageRank convergence information
    pub fn extract_with_info(&self, tokens: &[Token]) -> ExtractionResult {
        // 1. Extract candidate phrases
        let candidates = extract_candidates(
            tokens,
            self.config.min_phrase_length,
            self.config.max_phrase_length,
            self.max_phrases,
            &self.config.include_pos,
        );

        if candidates.is_empty() {
            return ExtractionResult {
                phrases: Vec::new(),
                converged: true,
                iterations: 0,
            };
        }

        // 2. Cluster candidates into topics
        let clusters = clustering::cluster_phrases(&candidates, self.similarity_threshold);
        if clusters.is_empty() {
            return ExtractionResult {
                phrases: Vec::new(),
                converged: true,
                iterations: 0,
            };
        }

        // Map each candidate to its topic index
        let mut topic_of = vec![0usize; candidates.len()];
        for (topic_idx, members) in clusters.iter().enumerate() {
            for &candidate_idx in members {
                topic_of[candidate_idx] = topic_idx;
            }
        }

        // 3. Build directed multipartite graph (no intra-topic edges)
        let n = candidates.len();
        let mut builder = GraphBuilder::with_capacity(n);

        for i in 0..n {
            builder.get_or_create_node(&format!("c_{}", i));
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if topic_of[i] == topic_of[j] {
                    continue;
                }
                let gap = compute_gap(&candidates[i].chunk, &candidates[j].chunk);
                let weight = 1.0 / gap as f64;
                builder.increment_directed_edge(i as u32, j as u32, weight);
                builder.increment_directed_edge(j as u32, i as u32, weight);
            }
        }

        // 4. Alpha weight adjustment
        if self.alpha > 0.0 {
            self.adjust_weights(&mut builder, &candidates, &clusters, &topic_of);
        }

        // 5. Run PageRank
        let graph = CsrGraph::from_builder(&builder);
        let pagerank = StandardPageRank::new()
            .with_damping(self.config.damping)
            .with_max_iterations(self.config.max_iterations)
            .with_threshold(self.config.convergence_threshold)
            .run(&graph);

        // 6. Group by lemma and build output phrases
        let mut lemma_indices: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (i, candidate) in candidates.iter().enumerate() {
            lemma_indices
                .entry(candidate.lemma.clone())
                .or_default()
                .push(i);
        }

        let mut phrases: Vec<Phrase> = lemma_indices
            .into_values()
            .map(|indices| {
                let best_idx = *indices
                    .iter()
                    .max_by(|&&a, &&b| {
                        pagerank
                            .score(a as u32)
                            .partial_cmp(&pagerank.score(b as u32))
                            .unwrap()
                    })
                    .unwrap();

                let score = pagerank.score(best_idx as u32);
                let candidate = &candidates[best_idx];

                let mut offsets: Vec<(usize, usize)> = indices
                    .iter()
                    .map(|&i| (candidates[i].chunk.start_token, candidates[i].chunk.end_token))
                    .collect();
                offsets.sort_by_key(|(start, _)| *start);

                Phrase {
                    text: candidate.text.clone(),
                    lemma: candidate.lemma.clone(),
                    score,
                    count: offsets.len(),
                    offsets,
                    rank: 0,
                }
            })
            .collect();

        phrases.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());

        for (i, phrase) in phrases.iter_mut().enumerate() {
            phrase.rank = i + 1;
        }

        if self.config.top_n > 0 && phrases.len() > self.config.top_n {
            phrases.truncate(self.config.top_n);
        }

        ExtractionResult {
            phrases,
            converged: pagerank.converged,
            iterations: pagerank.iterations,
        }
    }

    /// Apply alpha weight adjustment to boost first-occurring variants.
    ///
    /// For each topic with multiple variants, the first-occurring variant's
    /// incoming edges are boosted by redirecting "recommendation power" from
    /// secondary variants. The boost is scaled by `alpha * exp(1/(1+p))` where
    /// `p` is the token offset of the first occurrence.
    fn adjust_weights(
        &self,
        builder: &mut GraphBuilder,
        candidates: &[PhraseCandidate],
        clusters: &[Vec<usize>],
        topic_of: &[usize],
    ) {
        let n = candidates.len();

        for cluster in clusters {
            if cluster.len() <= 1 {
                continue;
            }

            // Find first-occurring variant in this topic
            let first_idx = *cluster
                .iter()
                .min_by_key(|&&idx| candidates[idx].chunk.start_token)
                .unwrap();

            let p_first = candidates[first_idx].chunk.start_token;
            let position_factor = (1.0 / (1.0 + p_first as f64)).exp();

            // For each external node c_j (in a different topic)
            for c_j in 0..n {
                if topic_of[c_j] == topic_of[first_idx] {
                    continue;
                }

                // Collect booster weights from other variants in this topic
                let mut booster_sum = 0.0;
                for &v in cluster {
                    if v == first_idx {
                        continue;
                    }
                    if let Some(node) = builder.get_node(v as u32) {
                        if let Some(&w) = node.edges.get(&(c_j as u32)) {
                            booster_sum += w;
                        }
                    }
                }

                if booster_sum > 0.0 {
                    let boost = self.alpha * position_factor * booster_sum;
                    builder.increment_directed_edge(c_j as u32, first_idx as u32, boost);
                }
            }
        }
    }
}

/// Convenience function
pub fn extract_keyphrases_multipartite(tokens: &[Token], config: &TextRankConfig) -> Vec<Phrase> {
    MultipartiteRank::with_config(config.clone()).extract(tokens)
}
