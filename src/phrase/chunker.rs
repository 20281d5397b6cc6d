//! Noun chunk detection
//!
//! Identifies noun phrases using pattern matching on POS tags.
//! Pattern: (DET)? (ADJ)* (NOUN|PROPN)+

use crate::pipeline::artifacts::PhraseSplitEvent;
use crate::types::{ChunkSpan, PosTag, Token};

/// Configuration for noun chunk detection
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Minimum number of tokens in a chunk
    pub min_length: usize,
    /// Maximum number of tokens in a chunk
    pub max_length: usize,
    /// Whether to include determiners in chunks
    pub include_determiners: bool,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 5,
            include_determiners: false,
        }
    }
}

/// Noun chunk detector
#[derive(Debug, Clone)]
pub struct NounChunker {
    config: ChunkerConfig,
}

impl Default for NounChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl NounChunker {
    /// Create a new chunker with default config
    pub fn new() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }

    /// Create a chunker with custom config
    pub fn with_config(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Set minimum chunk length
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.config.min_length = min_length;
        self
    }

    /// Set maximum chunk length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.config.max_length = max_length;
        self
    }

    /// Extract noun chunks from tokens.
    ///
    /// Pattern: (DET)? (ADJ)* (NOUN|PROPN)+
    pub fn extract_chunks(&self, tokens: &[Token]) -> Vec<ChunkSpan> {
        self.extract_chunks_into(tokens, None)
    }

    /// Extract noun chunks with an optional diagnostics sink.
    ///
    /// When `diagnostics` is `None`, behavior is identical to
    /// [`extract_chunks`](NounChunker::extract_chunks) with zero overhead.
    /// When `Some`, every decision point records a [`PhraseSplitEvent`] explaining
    /// why a token was skipped or a chunk was rejected.
    pub fn extract_chunks_into(
        &self,
        tokens: &[Token],
        mut diagnostics: Option<&mut Vec<PhraseSplitEvent>>,
    ) -> Vec<ChunkSpan> {
        let mut chunks = Vec::new();

        // Group tokens by sentence
        let mut sentences: Vec<Vec<&Token>> = Vec::new();
        let mut current_sent = Vec::new();
        let mut current_idx = None;

        for token in tokens {
            if current_idx != Some(token.sentence_idx) {
                if !current_sent.is_empty() {
                    sentences.push(std::mem::take(&mut current_sent));
                }
                current_idx = Some(token.sentence_idx);
            }
            current_sent.push(token);
        }
        if !current_sent.is_empty() {
            sentences.push(current_sent);
        }

        // Extract chunks from each sentence
        for sent_tokens in sentences {
            self.extract_chunks_from_sentence(&sent_tokens, &mut chunks, diagnostics.as_deref_mut());
        }

        chunks
    }

    /// Extract chunks from a single sentence, optionally recording diagnostics.
    fn extract_chunks_from_sentence(
        &self,
        tokens: &[&Token],
        chunks: &mut Vec<ChunkSpan>,
        diagnostics: Option<&mut Vec<PhraseSplitEvent>>,
    ) {
        let mut i = 0;
        // Rebind to make it mutable for repeated use
        let mut diags = diagnostics;

        while i < tokens.len() {
            if tokens[i].is_stopword {
                if let Some(ref mut d) = diags {
                    d.push(PhraseSplitEvent {
                        token_range: (tokens[i].token_idx, tokens[i].token_idx + 1),
                        text: tokens[i].text.clone(),
                        reason: crate::pipeline::artifacts::PhraseSplitReason::StopwordBoundary {
                            stopword: tokens[i].text.clone(),
                        },
                    });
                }
                i += 1;
                continue;
            }
            // Try to match a noun phrase pattern
            if let Some(span) = self.match_noun_phrase(tokens, i) {
                // Validate length constraints
                let len = span.end_token - span.start_token;
                if len >= self.config.min_length && len <= self.config.max_length {
                    let next_i = span.end_token - tokens[0].token_idx; // Move past this chunk
                    chunks.push(span);
                    i = next_i;
                    continue;
                }
                // Chunk below min length
                if len < self.config.min_length {
                    if let Some(ref mut d) = diags {
                        let chunk_text: String = tokens[span.start_token - tokens[0].token_idx
                            ..span.end_token - tokens[0].token_idx]
                            .iter()
                            .map(|t| t.text.as_str())
                            .collect::<Vec<_>>()
                            .join(" ");
                        d.push(PhraseSplitEvent {
                            token_range: (span.start_token, span.end_token),
                            text: chunk_text,
                            reason: crate::pipeline::artifacts::PhraseSplitReason::MinLengthNotMet {
                                length: len,
                                min: self.config.min_length,
                            },
                        });
                    }
                }
                // Chunk exceeded max length
                else if len > self.config.max_length {
                    if let Some(ref mut d) = diags {
                        let chunk_text: String = tokens[span.start_token - tokens[0].token_idx
                            ..span.end_token - tokens[0].token_idx]
                            .iter()
                            .map(|t| t.text.as_str())
                            .collect::<Vec<_>>()
                            .join(" ");
                        d.push(PhraseSplitEvent {
                            token_range: (span.start_token, span.end_token),
                            text: chunk_text,
                            reason: crate::pipeline::artifacts::PhraseSplitReason::MaxLengthExceeded {
                                length: len,
                                max: self.config.max_length,
                            },
                        });
                    }
                }
            } else {
                // match_noun_phrase returned None — token doesn't start a noun phrase
                if let Some(ref mut d) = diags {
                    d.push(PhraseSplitEvent {
                        token_range: (tokens[i].token_idx, tokens[i].token_idx + 1),
                        text: tokens[i].text.clone(),
                        reason: crate::pipeline::artifacts::PhraseSplitReason::PatternMismatch {
                            token: tokens[i].text.clone(),
                            pos: format!("{:?}", tokens[i].pos),
                        },
                    });
                }
            }
            i += 1;
        }
    }

    /// Try to match a noun phrase pattern starting at position i
    ///
    /// Pattern: (DET)? (ADJ)* (NOUN|PROPN)+
    fn match_noun_phrase(&self, tokens: &[&Token], start: usize) -> Option<ChunkSpan> {
        if start >= tokens.len() {
            return None;
        }

        let mut end = start;
        if tokens[end].is_stopword {
            return None;
        }
        let first_token = tokens[start];

        // Optional determiner
        if self.config.include_determiners && tokens[end].pos == PosTag::Determiner {
            end += 1;
        } else if !self.config.include_determiners && tokens[end].pos == PosTag::Determiner {
            // Skip determiner if not including them
            return None;
        }

        if end >= tokens.len() {
            return None;
        }

        // Optional adjectives
        while end < tokens.len() && !tokens[end].is_stopword && tokens[end].pos == PosTag::Adjective
        {
            end += 1;
        }

        // Required: at least one noun
        let noun_start = end;
        while end < tokens.len() && !tokens[end].is_stopword && tokens[end].pos.is_noun() {
            end += 1;
        }

        // Must have at least one noun
        if end == noun_start {
            // No nouns found - check if we're on a standalone noun
            if start < tokens.len() && !tokens[start].is_stopword && tokens[start].pos.is_noun() {
                return Some(ChunkSpan {
                    start_token: tokens[start].token_idx,
                    end_token: tokens[start].token_idx + 1,
                    start_char: tokens[start].start,
                    end_char: tokens[start].end,
                    sentence_idx: tokens[start].sentence_idx,
                });
            }
            return None;
        }

        let last_token = tokens[end - 1];

        Some(ChunkSpan {
            start_token: first_token.token_idx,
            end_token: tokens[end - 1].token_idx + 1,
            start_char: first_token.start,
            end_char: last_token.end,
            sentence_idx: first_token.sentence_idx,
        })
    }
}

/// Extract the text for a chunk span from the original tokens
pub fn chunk_text(tokens: &[Token], chunk: &ChunkSpan) -> String {
    tokens[chunk.start_token..chunk.end_token]
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract the lemmatized text for a chunk span
pub fn chunk_lemma(tokens: &[Token], chunk: &ChunkSpan) -> String {
    tokens[chunk.start_token..chunk.end_token]
        .iter()
        .map(|t| t.lemma.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
