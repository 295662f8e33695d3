//! filingdb-core
//!
//! Domain types, errors, configuration and the ingestion front half
//! (document reading and chunking) shared by the index and answer crates.

pub mod chunker;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use chunker::Chunker;
pub use config::{AnswerConfig, ChunkingConfig, EngineConfig, RetrievalConfig, TermPolicy};
pub use error::{Error, ErrorKind, Result};
pub use traits::Retriever;
pub use types::{AnswerResponse, Chunk, ChunkId, Citation, Document, IndexStats, RetrievalResult, ScoredChunk};
