//! filingdb-text
//!
//! TF-IDF indexing and cosine retrieval over filing chunks, plus the
//! single-file index artifact. See `index`, `search` and `store`.

pub mod index;
pub mod search;
pub mod store;
pub mod tokenize;
pub mod vocabulary;

pub use index::{Index, IndexSettings};
pub use store::{load, save};
pub use vocabulary::{build_vocabulary, vectorize, SparseVector, Vocabulary};
