use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::chunker::Chunker;
use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkId, Document};

/// Reads a directory of plain-text filings and turns it into chunks.
pub struct DataProcessor {
    chunker: Chunker,
}

impl DataProcessor {
    pub fn new(config: &ChunkingConfig) -> Result<Self> {
        Ok(Self { chunker: Chunker::from_config(config)? })
    }

    /// Every `*.txt` file under `data_dir`, sorted by path so chunk ids are
    /// stable across runs.
    pub fn read_documents(&self, data_dir: &Path) -> Result<Vec<Document>> {
        let files = list_txt_files(data_dir)?;
        if files.is_empty() {
            tracing::warn!(dir = %data_dir.display(), "no .txt files found");
        }
        let pb = progress_bar(files.len());
        let mut documents = Vec::with_capacity(files.len());
        for file_path in &files {
            pb.set_message(file_path.display().to_string());
            let text = read_file_content(file_path)?;
            documents.push(Document { source: source_name(file_path, data_dir), text });
            pb.inc(1);
        }
        pb.finish_and_clear();
        Ok(documents)
    }

    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut next_id: ChunkId = 0;
        let mut all_chunks = Vec::new();
        for document in documents {
            let chunks = self.chunker.chunk(document, &mut next_id);
            if chunks.is_empty() {
                tracing::warn!(source = %document.source, "document is empty, skipping");
            }
            all_chunks.extend(chunks);
        }
        all_chunks
    }

    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<Chunk>> {
        let documents = self.read_documents(data_dir)?;
        let chunks = self.chunk_documents(&documents);
        tracing::info!(files = documents.len(), chunks = chunks.len(), "processed corpus");
        Ok(chunks)
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}") {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn read_file_content(file_path: &Path) -> Result<String> {
    let bytes = fs::read(file_path).map_err(|source| Error::UnreadableDocument { path: file_path.to_path_buf(), source })?;
    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(e) => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

/// Path relative to the corpus root with `/` separators.
fn source_name(file_path: &Path, data_dir: &Path) -> String {
    let relative = file_path.strip_prefix(data_dir).unwrap_or(file_path);
    relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
}

fn list_txt_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut txt_files = Vec::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            let source = e.into_io_error().unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            if path == root { Error::CorpusUnavailable { dir: path, source } } else { Error::UnreadableDocument { path, source } }
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().and_then(|s| s.to_str()) == Some("txt") {
            txt_files.push(path.to_path_buf());
        }
    }
    txt_files.sort();
    Ok(txt_files)
}
