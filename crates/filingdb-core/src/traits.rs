use crate::config::TermPolicy;
use crate::types::{Chunk, ChunkId, RetrievalResult};

/// A searchable, read-only chunk corpus.
///
/// Implementations must be deterministic: the same query against the same
/// corpus always yields the same ranking.
pub trait Retriever: Send + Sync {
    fn retrieve(&self, query: &str, top_k: usize) -> RetrievalResult;
    fn chunk(&self, chunk_id: ChunkId) -> Option<&Chunk>;
    /// Normalization applied to queries; answer extraction matches terms the same way.
    fn term_policy(&self) -> &TermPolicy;
}
