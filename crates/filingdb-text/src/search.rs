use filingdb_core::config::TermPolicy;
use filingdb_core::traits::Retriever;
use filingdb_core::types::{rank_order, Chunk, ChunkId, RetrievalResult, ScoredChunk};

use crate::index::Index;
use crate::vocabulary::vectorize;

impl Index {
	/// Cosine similarity of `query` against every chunk, best `top_k` first.
	///
	/// Scores lie in `[0, 1]`; chunks sharing no term with the query score 0
	/// and still fill the ranking when the corpus has fewer than `top_k` hits.
	pub fn retrieve(&self, query: &str, top_k: usize) -> RetrievalResult {
		if top_k == 0 || self.is_empty() {
			return RetrievalResult::default();
		}
		let settings = self.settings();
		let q = vectorize(query, self.vocabulary(), self.idf(), &settings.terms);
		let q_norm = q.norm();

		let mut dots = vec![0.0f32; self.len()];
		if q_norm > 0.0 {
			for (column, q_weight) in q.iter() {
				for &(row, c_weight) in self.postings(column) {
					dots[row] += q_weight * c_weight;
				}
			}
		}

		let mut hits: Vec<ScoredChunk> = self
			.chunks()
			.iter()
			.zip(dots)
			.enumerate()
			.map(|(row, (chunk, dot))| {
				let c_norm = self.norm(row);
				let score = if q_norm > 0.0 && c_norm > 0.0 { (dot / (q_norm * c_norm)).clamp(0.0, 1.0) } else { 0.0 };
				ScoredChunk { chunk_id: chunk.chunk_id, score }
			})
			.collect();

		let k = top_k.min(hits.len());
		if k < hits.len() {
			hits.select_nth_unstable_by(k - 1, rank_order);
			hits.truncate(k);
		}
		let result = RetrievalResult::from_hits(hits);
		tracing::debug!(
			query_terms = q.len(),
			hits = result.len(),
			top_score = result.top().map_or(0.0, |h| h.score),
			"retrieved"
		);
		result
	}
}

impl Retriever for Index {
	fn retrieve(&self, query: &str, top_k: usize) -> RetrievalResult {
		Index::retrieve(self, query, top_k)
	}

	fn chunk(&self, chunk_id: ChunkId) -> Option<&Chunk> {
		self.chunk_by_id(chunk_id)
	}

	fn term_policy(&self) -> &TermPolicy {
		&self.settings().terms
	}
}
