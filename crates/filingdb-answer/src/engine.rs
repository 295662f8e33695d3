//! Query boundary and ingestion entry point.

use parking_lot::RwLock;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use filingdb_core::config::EngineConfig;
use filingdb_core::data_processor::DataProcessor;
use filingdb_core::error::{Error, Result};
use filingdb_core::types::{AnswerResponse, IndexStats};
use filingdb_text::{Index, IndexSettings};

use crate::compose::compose;
use crate::policy::decide;

/// Serves questions against the current index.
///
/// The index is held as an `Arc` behind a lock that is only taken to copy or
/// replace the pointer; queries run against their own snapshot, so a
/// concurrent [`Engine::swap_index`] never exposes a half-built index.
pub struct Engine {
    index: RwLock<Arc<Index>>,
    loaded: AtomicBool,
    config: EngineConfig,
}

impl Engine {
    pub fn new(index: Index, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { index: RwLock::new(Arc::new(index)), loaded: AtomicBool::new(true), config })
    }

    /// An engine with no index yet. Every question abstains until an index
    /// is swapped in.
    pub fn unloaded(config: EngineConfig) -> Result<Self> {
        let engine = Self::new(Index::empty(), config)?;
        engine.loaded.store(false, Ordering::Release);
        Ok(engine)
    }

    /// Loads the artifact at `path` and serves it.
    pub fn open(path: &Path, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let index = filingdb_text::load(path)?;
        Self::new(index, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The index as of now; unaffected by later swaps.
    pub fn snapshot(&self) -> Arc<Index> {
        Arc::clone(&self.index.read())
    }

    /// Publishes `index`, returning the one it replaced.
    pub fn swap_index(&self, index: Index) -> Arc<Index> {
        let chunks = index.len();
        let previous = std::mem::replace(&mut *self.index.write(), Arc::new(index));
        self.loaded.store(true, Ordering::Release);
        tracing::info!(chunks, "swapped serving index");
        previous
    }

    /// Loads `path` off to the side and swaps it in. On failure the current
    /// index keeps serving.
    pub fn reload(&self, path: &Path) -> Result<()> {
        let index = filingdb_text::load(path)?;
        self.swap_index(index);
        Ok(())
    }

    /// Retrieve, decide, compose. Query-time problems surface as abstention,
    /// never as errors.
    pub fn answer_question(&self, question: &str) -> AnswerResponse {
        let index = self.snapshot();
        let result = index.retrieve(question, self.config.retrieval.top_k);
        let decision = decide(&result, self.config.retrieval.abstention_threshold);
        tracing::debug!(confidence = decision.confidence, abstain = decision.abstain, "answered");
        compose(question, &result, &*index, decision, &self.config.answer)
    }

    pub fn stats(&self) -> IndexStats {
        let stats = self.snapshot().stats();
        IndexStats { index_loaded: self.loaded.load(Ordering::Acquire), ..stats }
    }
}

/// Outcome of [`build_index`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub documents: usize,
    pub chunks: usize,
    pub vocabulary_size: usize,
    pub index_path: PathBuf,
}

/// Reads every filing under `filings_dir`, builds the TF-IDF index and
/// atomically publishes it at `index_path`.
///
/// A corpus that yields no chunks at all is an error; individual empty
/// documents are skipped.
pub fn build_index(filings_dir: &Path, index_path: &Path, config: &EngineConfig) -> Result<BuildReport> {
    config.validate()?;
    let processor = DataProcessor::new(&config.chunking)?;
    let documents = processor.read_documents(filings_dir)?;
    let chunks = processor.chunk_documents(&documents);
    if chunks.is_empty() {
        return Err(Error::EmptyCorpus { dir: filings_dir.to_path_buf() });
    }

    let settings = IndexSettings { chunking: config.chunking.clone(), terms: config.terms.clone() };
    let index = Index::build(chunks, settings);
    filingdb_text::save(&index, index_path)?;

    let report = BuildReport {
        documents: documents.len(),
        chunks: index.len(),
        vocabulary_size: index.vocabulary().len(),
        index_path: index_path.to_path_buf(),
    };
    tracing::info!(documents = report.documents, chunks = report.chunks, terms = report.vocabulary_size, "index built");
    Ok(report)
}
