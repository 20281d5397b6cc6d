//! First-class pipeline artifacts.
//!
//! Each type represents a typed intermediate result flowing between pipeline
//! stages. Artifacts use interned IDs internally; string materialization is
//! deferred to the formatting boundary ([`FormattedResult`]).
//!
//! **Owned vs Borrowed**: Hot-path stage interfaces accept `*Ref<'a>` borrows;
//! the pipeline retains ownership of the corresponding owned artifacts.

use crate::types::{PosTag, StringPool, Token};

// ============================================================================
// TokenStream — interned, compact token representation
// ============================================================================

/// A single token stored as interned IDs — compact and `Copy`.
///
/// All string data lives in the parent [`TokenStream`]'s [`StringPool`]; this
/// struct stores only `u32` handles.  At 28 bytes per entry (plus padding to
/// 32) it fits two entries per 64-byte cache line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEntry {
    /// Interned ID for the surface form in the parent pool.
    pub text_id: u32,
    /// Interned ID for the lemmatized form.
    pub lemma_id: u32,
    /// Part-of-speech tag (already an enum — no interning needed).
    pub pos: PosTag,
    /// Character byte-offset of the first byte in the source text.
    pub start: u32,
    /// Character byte-offset one past the last byte.
    pub end: u32,
    /// Sentence index (0-based).
    pub sentence_idx: u32,
    /// Token index within the document (0-based, monotonically increasing).
    pub token_idx: u32,
    /// Whether this token is a stopword.
    pub is_stopword: bool,
}

impl TokenEntry {
    /// Build the graph-node key, mirroring [`Token::graph_key`].
    ///
    /// When `use_pos_in_nodes` is true the key is `"lemma|POS"`, otherwise
    /// just the lemma string.  Requires access to the owning pool.
    #[inline]
    pub fn graph_key(&self, pool: &StringPool, use_pos_in_nodes: bool) -> String {
        let lemma = pool.get(self.lemma_id).unwrap_or("");
        if use_pos_in_nodes {
            format!("{}|{}", lemma, self.pos.as_str())
        } else {
            lemma.to_owned()
        }
    }

    /// Whether this token is a content-word candidate for the graph.
    #[inline]
    pub fn is_graph_candidate(&self) -> bool {
        self.pos.is_content_word() && !self.is_stopword
    }
}

/// Canonical token stream produced by the preprocessor stage.
///
/// Stores tokens as interned [`TokenEntry`] values backed by a shared
/// [`StringPool`].  Sentence boundaries use a CSR-style offset array:
/// `sentence_offsets[i]..sentence_offsets[i+1]` gives the token index range
/// for sentence `i`.
///
/// # Construction
///
/// Use [`TokenStream::from_tokens`] to convert from the legacy `&[Token]`
/// representation (used by the existing tokenizer and JSON input path).
#[derive(Debug)]
pub struct TokenStream {
    /// Interned string storage for text and lemma values.
    pool: StringPool,
    /// Compact, ID-based token entries.
    tokens: Vec<TokenEntry>,
    /// CSR-style sentence boundary offsets.
    ///
    /// Length = `num_sentences + 1`.  The last element equals `tokens.len()`.
    sentence_offsets: Vec<u32>,
}

impl TokenStream {
    /// Build a `TokenStream` from the legacy `Token` slice.
    ///
    /// This is the primary bridge between the existing tokenizer / JSON
    /// deserialization path and the new pipeline artifact system.  It interns
    /// all text and lemma strings into a single pool and computes sentence
    /// boundary offsets in a single pass.
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut pool = StringPool::with_capacity(tokens.len());
        let mut entries = Vec::with_capacity(tokens.len());

        if tokens.is_empty() {
            return Self {
                pool,
                tokens: entries,
                sentence_offsets: Vec::new(),
            };
        }

        // Determine number of sentences for offset pre-allocation.
        let num_sentences = tokens
            .iter()
            .map(|t| t.sentence_idx)
            .max()
            .map_or(0, |m| m + 1);
        // +1 for the sentinel entry at the end.
        let mut sentence_offsets = Vec::with_capacity(num_sentences + 1);

        let mut current_sentence: usize = 0;
        sentence_offsets.push(0); // sentence 0 starts at token 0

        for (i, t) in tokens.iter().enumerate() {
            // Emit boundary markers for any new sentences.
            while t.sentence_idx > current_sentence {
                sentence_offsets.push(i as u32);
                current_sentence += 1;
            }

            let text_id = pool.intern(&t.text);
            let lemma_id = pool.intern(&t.lemma);

            entries.push(TokenEntry {
                text_id,
                lemma_id,
                pos: t.pos,
                start: t.start as u32,
                end: t.end as u32,
                sentence_idx: t.sentence_idx as u32,
                token_idx: t.token_idx as u32,
                is_stopword: t.is_stopword,
            });
        }

        // Sentinel: marks the end of the last sentence.
        sentence_offsets.push(entries.len() as u32);

        Self {
            pool,
            tokens: entries,
            sentence_offsets,
        }
    }

    /// Create a borrowed view for passing to pipeline stages.
    #[inline]
    pub fn as_ref(&self) -> TokenStreamRef<'_> {
        TokenStreamRef {
            pool: &self.pool,
            tokens: &self.tokens,
            sentence_offsets: &self.sentence_offsets,
        }
    }

    /// Number of tokens in the stream.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the stream contains no tokens.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of sentences.
    #[inline]
    pub fn num_sentences(&self) -> usize {
        // offsets has num_sentences + 1 entries.
        self.sentence_offsets.len().saturating_sub(1)
    }

    /// Access the shared string pool.
    #[inline]
    pub fn pool(&self) -> &StringPool {
        &self.pool
    }

    /// Access all token entries as a slice.
    #[inline]
    pub fn tokens(&self) -> &[TokenEntry] {
        &self.tokens
    }

    /// Access the CSR-style sentence boundary offsets.
    #[inline]
    pub fn sentence_offsets(&self) -> &[u32] {
        &self.sentence_offsets
    }

    /// Get the token index range for sentence `idx`.
    ///
    /// Returns `None` if `idx >= num_sentences()`.
    #[inline]
    pub fn sentence_token_range(&self, idx: usize) -> Option<std::ops::Range<usize>> {
        if idx + 1 < self.sentence_offsets.len() {
            let start = self.sentence_offsets[idx] as usize;
            let end = self.sentence_offsets[idx + 1] as usize;
            Some(start..end)
        } else {
            None
        }
    }

    /// Resolve the surface text for a token entry.
    #[inline]
    pub fn text(&self, entry: &TokenEntry) -> &str {
        self.pool.get(entry.text_id).unwrap_or("")
    }

    /// Resolve the lemma string for a token entry.
    #[inline]
    pub fn lemma(&self, entry: &TokenEntry) -> &str {
        self.pool.get(entry.lemma_id).unwrap_or("")
    }
}

/// Borrowed view into a [`TokenStream`].
///
/// This is the primary interface stages use to read tokens without requiring
/// ownership or allocation.  All three inner references point into the parent
/// `TokenStream`'s storage.
#[derive(Debug, Clone, Copy)]
pub struct TokenStreamRef<'a> {
    pool: &'a StringPool,
    tokens: &'a [TokenEntry],
    sentence_offsets: &'a [u32],
}

impl<'a> TokenStreamRef<'a> {
    /// Number of tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the stream is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of sentences.
    #[inline]
    pub fn num_sentences(&self) -> usize {
        self.sentence_offsets.len().saturating_sub(1)
    }

    /// Access the shared string pool.
    #[inline]
    pub fn pool(&self) -> &'a StringPool {
        self.pool
    }

    /// Access all token entries as a slice.
    #[inline]
    pub fn tokens(&self) -> &'a [TokenEntry] {
        self.tokens
    }

    /// Access the sentence boundary offsets.
    #[inline]
    pub fn sentence_offsets(&self) -> &'a [u32] {
        self.sentence_offsets
    }

    /// Get the token index range for sentence `idx`.
    #[inline]
    pub fn sentence_token_range(&self, idx: usize) -> Option<std::ops::Range<usize>> {
        if idx + 1 < self.sentence_offsets.len() {
            let start = self.sentence_offsets[idx] as usize;
            let end = self.sentence_offsets[idx + 1] as usize;
            Some(start..end)
        } else {
            None
        }
    }

    /// Resolve the surface text for a token entry.
    #[inline]
    pub fn text(&self, entry: &TokenEntry) -> &'a str {
        self.pool.get(entry.text_id).unwrap_or("")
    }

    /// Resolve the lemma string for a token entry.
    #[inline]
    pub fn lemma(&self, entry: &TokenEntry) -> &'a str {
        self.pool.get(entry.lemma_id).unwrap_or("")
    }
}

// ============================================================================
// CandidateSet — unified word-level and phrase-level candidates
// ============================================================================

/// A single word-level candidate node (TextRank / PositionRank / BiasedTextRank
/// / SingleRank / TopicalPageRank families).
///
/// One entry per unique graph key (`lemma` or `lemma|POS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCandidate {
    /// Interned lemma ID in the parent [`TokenStream`]'s pool.
    pub lemma_id: u32,
    /// Part-of-speech tag.
    pub pos: PosTag,
    /// Token index of the first occurrence in the document.
    pub first_position: u32,
}

impl WordCandidate {
    /// Build the graph-node key, mirroring [`TokenEntry::graph_key`].
    #[inline]
    pub fn graph_key(&self, pool: &StringPool, use_pos_in_nodes: bool) -> String {
        let lemma = pool.get(self.lemma_id).unwrap_or("");
        if use_pos_in_nodes {
            format!("{}|{}", lemma, self.pos.as_str())
        } else {
            lemma.to_owned()
        }
    }
}

/// A single phrase-level candidate (TopicRank / MultipartiteRank families).
///
/// Represents a noun chunk with its token span, surface forms, and the term
/// set used for Jaccard-based clustering.
#[derive(Debug, Clone)]
pub struct PhraseCandidate {
    /// Start token index (inclusive) in the parent token stream.
    pub start_token: u32,
    /// End token index (exclusive).
    pub end_token: u32,
    /// Character byte-offset of the first byte.
    pub start_char: u32,
    /// Character byte-offset one past the last byte.
    pub end_char: u32,
    /// Sentence this phrase belongs to.
    pub sentence_idx: u32,
    /// Interned IDs for individual lemma tokens within the phrase.
    ///
    /// Used for Jaccard similarity during clustering.  Ordered to match the
    /// token sequence; equality/hashing uses the set of unique IDs.
    pub lemma_ids: Vec<u32>,
    /// Interned IDs for non-stopword surface forms (the "term set").
    ///
    /// This mirrors the `FxHashSet<String>` in the legacy `PhraseCandidate`
    /// but uses interned IDs for cheaper set operations.
    pub term_ids: Vec<u32>,
}

impl PhraseCandidate {
    /// Token span length.
    #[inline]
    pub fn token_len(&self) -> u32 {
        self.end_token - self.start_token
    }
}

/// Distinguishes the two candidate families.
///
/// Downstream stages (GraphBuilder, TeleportBuilder, etc.) can match on this
/// to select the appropriate processing strategy.
#[derive(Debug, Clone)]
pub enum CandidateKind {
    /// Word-level candidates (one per unique graph key).
    Words(Vec<WordCandidate>),
    /// Phrase-level candidates (one per noun chunk).
    Phrases(Vec<PhraseCandidate>),
}

/// Set of candidate nodes (word-level or phrase-level) selected for graph
/// construction.
///
/// Wraps a [`CandidateKind`] enum so downstream stages can work with
/// candidate indices uniformly while dispatching on the variant family.
///
/// # Construction
///
/// Use [`CandidateSet::from_word_tokens`] to build from a token stream
/// (word-level), or [`CandidateSet::from_phrase_chunks`] for phrase-level.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    kind: CandidateKind,
}

impl CandidateSet {
    /// Build a word-level candidate set from a token stream.
    ///
    /// Filters tokens by `include_pos` (or default content-word check when
    /// empty) and stopword flag, deduplicates by graph key, and records the
    /// first occurrence position for each unique key.
    pub fn from_word_tokens(
        stream: &TokenStream,
        include_pos: &[PosTag],
        use_pos_in_nodes: bool,
    ) -> Self {
        use rustc_hash::FxHashMap;

        // Key: (lemma_id, optional POS discriminant) → index into `words`.
        let mut seen: FxHashMap<(u32, Option<PosTag>), usize> = FxHashMap::default();
        let mut words = Vec::new();

        for entry in stream.tokens() {
            if entry.is_stopword {
                continue;
            }
            let pass = if include_pos.is_empty() {
                entry.pos.is_content_word()
            } else {
                include_pos.contains(&entry.pos)
            };
            if !pass {
                continue;
            }

            let key = if use_pos_in_nodes {
                (entry.lemma_id, Some(entry.pos))
            } else {
                (entry.lemma_id, None)
            };

            if !seen.contains_key(&key) {
                seen.insert(key, words.len());
                words.push(WordCandidate {
                    lemma_id: entry.lemma_id,
                    pos: entry.pos,
                    first_position: entry.token_idx,
                });
            }
        }

        Self {
            kind: CandidateKind::Words(words),
        }
    }

    /// Build a phrase-level candidate set from pre-computed chunk spans.
    ///
    /// Each chunk is turned into a [`PhraseCandidate`] whose `lemma_ids` and
    /// `term_ids` are resolved against the token stream's interning pool.
    pub fn from_phrase_chunks(
        stream: &TokenStream,
        chunks: &[crate::types::ChunkSpan],
    ) -> Self {
        let mut phrases = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let start = chunk.start_token;
            let end = chunk.end_token;

            let mut lemma_ids = Vec::with_capacity(end - start);
            let mut term_ids = Vec::new();

            for &entry in &stream.tokens()[start..end] {
                lemma_ids.push(entry.lemma_id);
                if !entry.is_stopword {
                    // Use text_id for term set (matches legacy `t.text.clone()`)
                    if !term_ids.contains(&entry.text_id) {
                        term_ids.push(entry.text_id);
                    }
                }
            }

            phrases.push(PhraseCandidate {
                start_token: start as u32,
                end_token: end as u32,
                start_char: chunk.start_char as u32,
                end_char: chunk.end_char as u32,
                sentence_idx: chunk.sentence_idx as u32,
                lemma_ids,
                term_ids,
            });
        }

        Self {
            kind: CandidateKind::Phrases(phrases),
        }
    }

    /// The candidate variant (word-level or phrase-level).
    #[inline]
    pub fn kind(&self) -> &CandidateKind {
        &self.kind
    }

    /// Number of candidates.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.kind {
            CandidateKind::Words(w) => w.len(),
            CandidateKind::Phrases(p) => p.len(),
        }
    }

    /// Whether there are no candidates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow as a [`CandidateSetRef`].
    #[inline]
    pub fn as_ref(&self) -> CandidateSetRef<'_> {
        CandidateSetRef { kind: &self.kind }
    }

    /// Access word candidates (panics if phrase-level).
    #[inline]
    pub fn words(&self) -> &[WordCandidate] {
        match &self.kind {
            CandidateKind::Words(w) => w,
            CandidateKind::Phrases(_) => panic!("called words() on phrase-level CandidateSet"),
        }
    }

    /// Access phrase candidates (panics if word-level).
    #[inline]
    pub fn phrases(&self) -> &[PhraseCandidate] {
        match &self.kind {
            CandidateKind::Phrases(p) => p,
            CandidateKind::Words(_) => panic!("called phrases() on word-level CandidateSet"),
        }
    }
}

/// Borrowed view into a [`CandidateSet`].
///
/// Stages accept this to avoid requiring ownership of the candidate data.
#[derive(Debug, Clone, Copy)]
pub struct CandidateSetRef<'a> {
    kind: &'a CandidateKind,
}

impl<'a> CandidateSetRef<'a> {
    /// The candidate variant.
    #[inline]
    pub fn kind(&self) -> &'a CandidateKind {
        self.kind
    }

    /// Number of candidates.
    #[inline]
    pub fn len(&self) -> usize {
        match self.kind {
            CandidateKind::Words(w) => w.len(),
            CandidateKind::Phrases(p) => p.len(),
        }
    }

    /// Whether there are no candidates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Access word candidates.
    #[inline]
    pub fn words(&self) -> &'a [WordCandidate] {
        match self.kind {
            CandidateKind::Words(w) => w,
            CandidateKind::Phrases(_) => panic!("called words() on phrase-level CandidateSetRef"),
        }
    }

    /// Access phrase candidates.
    #[inline]
    pub fn phrases(&self) -> &'a [PhraseCandidate] {
        match self.kind {
            CandidateKind::Phrases(p) => p,
            CandidateKind::Words(_) => panic!("called phrases() on word-level CandidateSetRef"),
        }
    }
}

// ============================================================================
// Graph — pipeline artifact wrapping the CSR representation
// ============================================================================

/// Pipeline-level graph artifact wrapping the existing CSR-backed adjacency
/// + weights.
///
/// This is a thin wrapper around [`CsrGraph`] that turns the graph into a
/// first-class pipeline artifact.  The inner CSR storage is fully accessible
/// for hot-path PageRank iteration, and the wrapper provides attachment
/// points for metadata (transform history, observer hooks, etc.).
///
/// # Construction
///
/// Use [`Graph::from_builder`] to convert from an existing [`GraphBuilder`],
/// or [`Graph::from_csr`] if you already have a [`CsrGraph`].
#[derive(Debug, Clone)]
pub struct Graph {
    /// The underlying CSR graph.
    csr: crate::graph::csr::CsrGraph,
    /// Whether this graph has been modified by any [`GraphTransform`] stage.
    ///
    /// Set to `true` after transforms such as intra-cluster edge removal
    /// (MultipartiteRank) or alpha-boost weighting.  Observers can use this
    /// to log whether the graph they see is the original build or a
    /// transformed variant.
    transformed: bool,
}

impl Graph {
    /// Build from an existing [`GraphBuilder`].
    ///
    /// This is the primary construction path — the existing graph builder
    /// infrastructure produces a `GraphBuilder`, and this method converts it
    /// to the pipeline artifact via [`CsrGraph::from_builder`].
    pub fn from_builder(builder: &crate::graph::builder::GraphBuilder) -> Self {
        Self {
            csr: crate::graph::csr::CsrGraph::from_builder(builder),
            transformed: false,
        }
    }

    /// Wrap a pre-existing [`CsrGraph`].
    pub fn from_csr(csr: crate::graph::csr::CsrGraph) -> Self {
        Self {
            csr,
            transformed: false,
        }
    }

    /// Access the inner CSR graph (immutable).
    ///
    /// Use this for hot-path operations like PageRank iteration where you
    /// need direct access to the CSR arrays.
    #[inline]
    pub fn csr(&self) -> &crate::graph::csr::CsrGraph {
        &self.csr
    }

    /// Mutable access to the inner CSR graph.
    ///
    /// Used by [`GraphTransform`] stages that modify edge weights in-place
    /// (e.g., intra-cluster edge removal, alpha-boost weighting).
    /// Automatically sets the `transformed` flag.
    #[inline]
    pub fn csr_mut(&mut self) -> &mut crate::graph::csr::CsrGraph {
        self.transformed = true;
        &mut self.csr
    }

    /// Consume this wrapper and return the inner [`CsrGraph`].
    #[inline]
    pub fn into_csr(self) -> crate::graph::csr::CsrGraph {
        self.csr
    }

    /// Whether any transform stage has modified this graph.
    #[inline]
    pub fn is_transformed(&self) -> bool {
        self.transformed
    }

    /// Mark this graph as transformed (e.g., after an external modification).
    #[inline]
    pub fn set_transformed(&mut self) {
        self.transformed = true;
    }

    // ------------------------------------------------------------------
    // Delegated convenience methods
    // ------------------------------------------------------------------

    /// Number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.csr.num_nodes
    }

    /// Number of directed edge entries in the CSR arrays.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.csr.num_edges()
    }

    /// Whether the graph has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.csr.is_empty()
    }

    /// Look up a node by its graph key (lemma or `lemma|POS`).
    #[inline]
    pub fn get_node_by_lemma(&self, lemma: &str) -> Option<u32> {
        self.csr.get_node_by_lemma(lemma)
    }

    /// Iterate over (neighbor_id, weight) pairs for a node.
    #[inline]
    pub fn neighbors(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.csr.neighbors(node)
    }

    /// Get the lemma / graph key for a node.
    #[inline]
    pub fn lemma(&self, node: u32) -> &str {
        self.csr.lemma(node)
    }

    /// Dangling nodes (no outgoing edges).
    #[inline]
    pub fn dangling_nodes(&self) -> Vec<u32> {
        self.csr.dangling_nodes()
    }
}

// ============================================================================
// RankOutput — PageRank scores + convergence metadata
// ============================================================================

/// Optional diagnostics captured during PageRank iteration.
///
/// These are only populated when debug/expose mode is enabled, so the hot
/// path incurs zero allocation overhead.
#[derive(Debug, Clone, Default)]
pub struct RankDiagnostics {
    /// Per-iteration residual (L1 norm of score delta).
    ///
    /// `residuals[i]` is the residual after iteration `i`.  Empty when
    /// diagnostics are not requested.
    pub residuals: Vec<f64>,
}

/// PageRank output: per-node scores, convergence info, and optional
/// diagnostics.
///
/// Scores are stored as a `Vec<f64>` indexed by node ID for cache-friendly
/// access — the same layout used by the existing [`PageRankResult`].
///
/// # Construction
///
/// Use [`RankOutput::from_pagerank_result`] to bridge from the existing
/// `PageRankResult` type.
#[derive(Debug, Clone)]
pub struct RankOutput {
    /// Per-node scores indexed by CSR node ID.
    scores: Vec<f64>,
    /// Whether the power iteration converged within the threshold.
    converged: bool,
    /// Number of iterations actually performed.
    iterations: u32,
    /// Final L1-norm convergence delta between the last two iterations.
    final_delta: f64,
    /// Optional debug diagnostics (empty by default).
    diagnostics: Option<RankDiagnostics>,
}

impl RankOutput {
    /// Construct from the existing [`PageRankResult`].
    pub fn from_pagerank_result(pr: &crate::pagerank::PageRankResult) -> Self {
        Self {
            scores: pr.scores.clone(),
            converged: pr.converged,
            iterations: pr.iterations as u32,
            final_delta: pr.delta,
            diagnostics: None,
        }
    }

    /// Build directly (for tests or future stage implementations).
    pub fn new(scores: Vec<f64>, converged: bool, iterations: u32, final_delta: f64) -> Self {
        Self {
            scores,
            converged,
            iterations,
            final_delta,
            diagnostics: None,
        }
    }

    /// Attach diagnostics (call after construction when debug is enabled).
    pub fn with_diagnostics(mut self, diag: RankDiagnostics) -> Self {
        self.diagnostics = Some(diag);
        self
    }

    /// Per-node score slice, indexed by CSR node ID.
    #[inline]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Score for a specific node.
    #[inline]
    pub fn score(&self, node_id: u32) -> f64 {
        self.scores.get(node_id as usize).copied().unwrap_or(0.0)
    }

    /// Whether PageRank converged.
    #[inline]
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Iteration count.
    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Final convergence delta.
    #[inline]
    pub fn final_delta(&self) -> f64 {
        self.final_delta
    }

    /// Access diagnostics (if attached).
    #[inline]
    pub fn diagnostics(&self) -> Option<&RankDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// Number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.scores.len()
    }
}

// ============================================================================
// PhraseSet — pre-format phrase collection
// ============================================================================

/// A single scored phrase entry in a [`PhraseSet`].
///
/// Uses interned IDs where possible; surface forms are optional and lazily
/// materialized only when needed for formatting.
#[derive(Debug, Clone)]
pub struct PhraseEntry {
    /// Interned lemma IDs for the tokens in this phrase (ordered).
    pub lemma_ids: Vec<u32>,
    /// Aggregated score from PageRank.
    pub score: f64,
    /// Number of occurrences in the document.
    pub count: u32,
    /// Optional canonical surface form (materialized lazily).
    pub surface: Option<String>,
    /// Optional lemma string (materialized lazily for grouping key).
    pub lemma_text: Option<String>,
    /// Optional token-span pairs for each occurrence (debug only).
    pub spans: Option<Vec<(u32, u32)>>,
}

/// Pre-format phrase collection: scored phrases with interned lemma IDs.
///
/// This is the last internal artifact before [`FormattedResult`] produces the
/// public output.  Surface forms are lazily materialized — the hot path
/// operates on interned IDs only.
///
/// # Construction
///
/// Use [`PhraseSet::from_phrases`] to bridge from the existing `Vec<Phrase>`.
#[derive(Debug, Clone)]
pub struct PhraseSet {
    entries: Vec<PhraseEntry>,
}

impl PhraseSet {
    /// Construct from the existing `Vec<Phrase>` type.
    ///
    /// Interns lemma tokens via the provided pool and eagerly stores the
    /// surface/lemma strings (since they're already materialized in the
    /// legacy path).
    pub fn from_phrases(phrases: &[crate::types::Phrase], pool: &mut StringPool) -> Self {
        let entries = phrases
            .iter()
            .map(|p| {
                let lemma_ids: Vec<u32> = p
                    .lemma
                    .split_whitespace()
                    .map(|w| pool.intern(w))
                    .collect();
                let spans = if p.offsets.is_empty() {
                    None
                } else {
                    Some(
                        p.offsets
                            .iter()
                            .map(|&(s, e)| (s as u32, e as u32))
                            .collect(),
                    )
                };
                PhraseEntry {
                    lemma_ids,
                    score: p.score,
                    count: p.count as u32,
                    surface: Some(p.text.clone()),
                    lemma_text: Some(p.lemma.clone()),
                    spans,
                }
            })
            .collect();
        Self { entries }
    }

    /// Build from raw entries.
    pub fn from_entries(entries: Vec<PhraseEntry>) -> Self {
        Self { entries }
    }

    /// Access the phrase entries.
    #[inline]
    pub fn entries(&self) -> &[PhraseEntry] {
        &self.entries
    }

    /// Number of phrases.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no phrases.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow as a [`PhraseSetRef`].
    #[inline]
    pub fn as_ref(&self) -> PhraseSetRef<'_> {
        PhraseSetRef {
            entries: &self.entries,
        }
    }
}

/// Borrowed view into a [`PhraseSet`].
#[derive(Debug, Clone, Copy)]
pub struct PhraseSetRef<'a> {
    entries: &'a [PhraseEntry],
}

impl<'a> PhraseSetRef<'a> {
    /// Access the phrase entries.
    #[inline]
    pub fn entries(&self) -> &'a [PhraseEntry] {
        self.entries
    }

    /// Number of phrases.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no phrases.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// FormattedResult — public-facing output (stability boundary)
// ============================================================================

/// Public-facing formatted output — the stability boundary.
///
/// Everything before this type is internal and may change; **this type is the
/// public contract** exposed to Python and JSON consumers.  It wraps the
/// existing `Vec<Phrase>` + convergence metadata, plus an optional debug
/// payload for power users.
///
/// # Construction
///
/// Use [`FormattedResult::from_extraction`] to bridge from the existing
/// `ExtractionResult`.
#[derive(Debug, Clone)]
pub struct FormattedResult {
    /// The ranked phrases (public output).
    pub phrases: Vec<crate::types::Phrase>,
    /// Whether PageRank converged.
    pub converged: bool,
    /// Number of PageRank iterations.
    pub iterations: u32,
    /// Optional debug payload (opt-in via `expose` config).
    pub debug: Option<DebugPayload>,
}

/// Optional debug information attached to a [`FormattedResult`].
///
/// Power users can request this via the `expose` config key.  Fields are
/// individually optional so callers pay only for what they ask for.
#[derive(Debug, Clone, Default)]
pub struct DebugPayload {
    /// Top-K node scores (node lemma → score).
    pub node_scores: Option<Vec<(String, f64)>>,
    /// Graph statistics.
    pub graph_stats: Option<GraphStats>,
    /// Per-stage timing in milliseconds.
    pub stage_timings: Option<Vec<(String, f64)>>,
    /// PageRank convergence residuals.
    pub residuals: Option<Vec<f64>>,
}

/// Summary statistics for the co-occurrence graph.
#[derive(Debug, Clone)]
pub struct GraphStats {
    pub num_nodes: usize,
    pub num_edges: usize,
}

impl FormattedResult {
    /// Construct from the existing `ExtractionResult`.
    pub fn from_extraction(er: &crate::phrase::extraction::ExtractionResult) -> Self {
        Self {
            phrases: er.phrases.clone(),
            converged: er.converged,
            iterations: er.iterations as u32,
            debug: None,
        }
    }

    /// Build directly.
    pub fn new(
        phrases: Vec<crate::types::Phrase>,
        converged: bool,
        iterations: u32,
    ) -> Self {
        Self {
            phrases,
            converged,
            iterations,
            debug: None,
        }
    }

    /// Attach debug payload.
    pub fn with_debug(mut self, debug: DebugPayload) -> Self {
        self.debug = Some(debug);
        self
    }
}

// ============================================================================
// PipelineWorkspace — reusable scratch buffers
// ============================================================================

/// Reusable scratch buffers for reducing allocator churn across repeated
/// pipeline invocations (common in Python batch processing).
///
/// The workspace owns heap-allocated buffers that are **cleared but not
/// deallocated** between runs via [`PipelineWorkspace::clear`].  This avoids
/// repeated `malloc`/`free` cycles for the most allocation-heavy stages.
///
/// # Usage
///
/// Create once, pass `&mut workspace` into `PipelineRunner`, and reuse across
/// documents in a batch loop.
#[derive(Debug)]
pub struct PipelineWorkspace {
    /// Scratch buffer for edge pairs during graph construction.
    pub edge_buf: Vec<(u32, u32, f64)>,
    /// Scratch buffer for PageRank score vector.
    pub score_buf: Vec<f64>,
    /// Scratch buffer for PageRank normalization / dangling-mass.
    pub norm_buf: Vec<f64>,
    /// Scratch buffer for phrase grouping keys.
    pub group_keys: Vec<String>,
}

impl PipelineWorkspace {
    /// Create a new workspace with default (empty) buffers.
    pub fn new() -> Self {
        Self {
            edge_buf: Vec::new(),
            score_buf: Vec::new(),
            norm_buf: Vec::new(),
            group_keys: Vec::new(),
        }
    }

    /// Create a workspace with pre-allocated buffer capacities.
    ///
    /// Useful when approximate document sizes are known up front.
    pub fn with_capacity(
        edge_cap: usize,
        node_cap: usize,
        phrase_cap: usize,
    ) -> Self {
        Self {
            edge_buf: Vec::with_capacity(edge_cap),
            score_buf: Vec::with_capacity(node_cap),
            norm_buf: Vec::with_capacity(node_cap),
            group_keys: Vec::with_capacity(phrase_cap),
        }
    }

    /// Clear all buffers without deallocating.
    ///
    /// After this call, all buffers have `len() == 0` but retain their
    /// allocated capacity for the next pipeline invocation.
    pub fn clear(&mut self) {
        self.edge_buf.clear();
        self.score_buf.clear();
        self.norm_buf.clear();
        self.group_keys.clear();
    }

    /// Total heap capacity held by all buffers (in bytes, approximate).
    pub fn capacity_bytes(&self) -> usize {
        self.edge_buf.capacity() * std::mem::size_of::<(u32, u32, f64)>()
            + self.score_buf.capacity() * std::mem::size_of::<f64>()
            + self.norm_buf.capacity() * std::mem::size_of::<f64>()
            + self.group_keys.capacity() * std::mem::size_of::<String>()
    }
}

impl Default for PipelineWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
