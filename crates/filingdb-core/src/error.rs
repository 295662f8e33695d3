use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of failures, one per stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Ingestion,
    IndexLoad,
    Configuration,
    Retrieval,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot read corpus directory {}: {source}", dir.display())]
    CorpusUnavailable {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read document {}: {source}", path.display())]
    UnreadableDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corpus under {} produced no chunks", dir.display())]
    EmptyCorpus { dir: PathBuf },

    #[error("Cannot write index artifact {}: {source}", path.display())]
    IndexWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot load index artifact {}: {reason}", path.display())]
    IndexLoad { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CorpusUnavailable { .. }
            | Error::UnreadableDocument { .. }
            | Error::EmptyCorpus { .. }
            | Error::IndexWrite { .. } => ErrorKind::Ingestion,
            Error::IndexLoad { .. } => ErrorKind::IndexLoad,
            Error::InvalidConfig(_) => ErrorKind::Configuration,
            Error::Retrieval(_) => ErrorKind::Retrieval,
        }
    }

    pub fn index_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::IndexLoad { path: path.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
