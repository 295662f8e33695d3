//! Domain types shared by the index, the retriever and the answer layer.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub type ChunkId = u32;

/// A source filing as read from disk.
///
/// `source` is the path relative to the ingestion directory and doubles as
/// the document identity in citations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub source: String,
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source: source.into(), text: text.into() }
    }
}

/// A fixed-width window over a [`Document`], the atomic retrieval unit.
///
/// - `chunk_id`: unique within one index build, assigned in corpus order
/// - `chunk_index`: position of the chunk within its document
/// - `start_offset`/`end_offset`: character (not byte) offsets into the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    pub source: String,
    pub chunk_index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub text: String,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.end_offset - self.start_offset
    }
}

/// One ranked retrieval hit. `score` is a cosine similarity in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk_id: ChunkId,
    pub score: f32,
}

/// Rank order: higher score first, then lower `chunk_id`.
pub fn rank_order(a: &ScoredChunk, b: &ScoredChunk) -> Ordering {
    b.score.total_cmp(&a.score).then(a.chunk_id.cmp(&b.chunk_id))
}

/// Ranked hits, descending by score with ties broken by ascending `chunk_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    hits: Vec<ScoredChunk>,
}

impl RetrievalResult {
    /// Sorts `hits` into rank order; callers may pass them unordered.
    pub fn from_hits(mut hits: Vec<ScoredChunk>) -> Self {
        hits.sort_by(rank_order);
        Self { hits }
    }

    pub fn top(&self) -> Option<&ScoredChunk> {
        self.hits.first()
    }

    pub fn hits(&self) -> &[ScoredChunk] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredChunk> {
        self.hits.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub chunk_id: ChunkId,
    pub text: String,
    pub score: f32,
}

/// The query boundary's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub confidence: f32,
    pub abstained: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Summary of the index currently being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    pub chunks: usize,
    pub vocabulary_size: usize,
    pub index_loaded: bool,
}
