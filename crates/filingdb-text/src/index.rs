use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use filingdb_core::config::{ChunkingConfig, TermPolicy};
use filingdb_core::types::{Chunk, ChunkId, IndexStats};

use crate::vocabulary::{build_vocabulary, vectorize, SparseVector, Vocabulary};

/// Build-time parameters recorded alongside the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
	pub chunking: ChunkingConfig,
	pub terms: TermPolicy,
}

/// An immutable TF-IDF index over a chunk corpus.
///
/// Norms and per-column postings are derived at construction and never
/// persisted; rebuilding means constructing a new `Index`.
#[derive(Debug, Clone)]
pub struct Index {
	settings: IndexSettings,
	vocabulary: Vocabulary,
	idf: Vec<f32>,
	chunks: Vec<Chunk>,
	vectors: Vec<SparseVector>,
	norms: Vec<f32>,
	/// column -> (row, weight)
	postings: Vec<Vec<(usize, f32)>>,
	rows_by_id: HashMap<ChunkId, usize>,
}

impl Index {
	pub fn build(chunks: Vec<Chunk>, settings: IndexSettings) -> Self {
		let (vocabulary, idf) = build_vocabulary(chunks.iter().map(|c| c.text.as_str()), &settings.terms);
		let vectors = chunks.iter().map(|c| vectorize(&c.text, &vocabulary, &idf, &settings.terms)).collect();
		tracing::info!(chunks = chunks.len(), terms = vocabulary.len(), "built index");
		Self::assemble(settings, vocabulary, idf, chunks, vectors)
	}

	pub fn empty() -> Self {
		Self::build(Vec::new(), IndexSettings::default())
	}

	/// Reassembles an index from persisted parts, checking every structural
	/// invariant a freshly built index guarantees.
	pub fn from_parts(
		settings: IndexSettings,
		vocabulary: Vocabulary,
		idf: Vec<f32>,
		chunks: Vec<Chunk>,
		vectors: Vec<SparseVector>,
	) -> Result<Self, String> {
		settings.chunking.validate().map_err(|e| e.to_string())?;
		settings.terms.validate().map_err(|e| e.to_string())?;
		if idf.len() != vocabulary.len() {
			return Err(format!("{} idf weights for {} vocabulary terms", idf.len(), vocabulary.len()));
		}
		if idf.iter().any(|w| !w.is_finite() || *w <= 0.0) {
			return Err("idf weights must be finite and positive".to_string());
		}
		if chunks.len() != vectors.len() {
			return Err(format!("{} chunks but {} vectors", chunks.len(), vectors.len()));
		}
		let mut ids = HashSet::with_capacity(chunks.len());
		for chunk in &chunks {
			if !ids.insert(chunk.chunk_id) {
				return Err(format!("duplicate chunk id {}", chunk.chunk_id));
			}
			if chunk.start_offset >= chunk.end_offset || chunk.text.chars().count() != chunk.char_len() {
				return Err(format!("chunk {} has inconsistent offsets", chunk.chunk_id));
			}
		}
		for (chunk, vector) in chunks.iter().zip(&vectors) {
			vector.validate(vocabulary.len()).map_err(|e| format!("vector of chunk {}: {e}", chunk.chunk_id))?;
		}
		Ok(Self::assemble(settings, vocabulary, idf, chunks, vectors))
	}

	fn assemble(
		settings: IndexSettings,
		vocabulary: Vocabulary,
		idf: Vec<f32>,
		chunks: Vec<Chunk>,
		vectors: Vec<SparseVector>,
	) -> Self {
		let norms = vectors.iter().map(SparseVector::norm).collect();
		let mut postings = vec![Vec::new(); vocabulary.len()];
		for (row, vector) in vectors.iter().enumerate() {
			for (column, weight) in vector.iter() {
				postings[column as usize].push((row, weight));
			}
		}
		let rows_by_id = chunks.iter().enumerate().map(|(row, c)| (c.chunk_id, row)).collect();
		Self { settings, vocabulary, idf, chunks, vectors, norms, postings, rows_by_id }
	}

	pub fn settings(&self) -> &IndexSettings {
		&self.settings
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn idf(&self) -> &[f32] {
		&self.idf
	}

	pub fn chunks(&self) -> &[Chunk] {
		&self.chunks
	}

	pub fn vectors(&self) -> &[SparseVector] {
		&self.vectors
	}

	pub fn len(&self) -> usize {
		self.chunks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chunks.is_empty()
	}

	pub fn chunk_by_id(&self, chunk_id: ChunkId) -> Option<&Chunk> {
		self.rows_by_id.get(&chunk_id).map(|&row| &self.chunks[row])
	}

	/// Distinct sources that contributed at least one chunk.
	pub fn document_count(&self) -> usize {
		self.chunks.iter().map(|c| c.source.as_str()).collect::<HashSet<_>>().len()
	}

	/// Counts for this index. `index_loaded` is always set here; only an
	/// engine that has not been given an index reports it unset.
	pub fn stats(&self) -> IndexStats {
		IndexStats {
			documents: self.document_count(),
			chunks: self.len(),
			vocabulary_size: self.vocabulary.len(),
			index_loaded: true,
		}
	}

	pub(crate) fn norm(&self, row: usize) -> f32 {
		self.norms[row]
	}

	pub(crate) fn postings(&self, column: u32) -> &[(usize, f32)] {
		self.postings.get(column as usize).map_or(&[], Vec::as_slice)
	}
}
