//! Fixed-width character windows with a constant overlap.

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkId, Document};

#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be at least 1".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!(
                "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Splits `document` into windows, numbering them from `*next_id` and
    /// advancing it past the last id handed out.
    pub fn chunk(&self, document: &Document, next_id: &mut ChunkId) -> Vec<Chunk> {
        // Byte offset of every char boundary, plus the end of the string.
        let boundaries: Vec<usize> = document
            .text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(document.text.len()))
            .collect();
        let char_len = boundaries.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < char_len {
            let end = (start + self.chunk_size).min(char_len);
            chunks.push(Chunk {
                chunk_id: *next_id,
                source: document.source.clone(),
                chunk_index: chunks.len(),
                start_offset: start,
                end_offset: end,
                text: document.text[boundaries[start]..boundaries[end]].to_string(),
            });
            *next_id += 1;
            if end == char_len {
                break;
            }
            start = end - self.overlap;
        }
        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self { chunk_size: config.chunk_size, overlap: config.overlap }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chunk_all(chunker: &Chunker, text: &str) -> Vec<Chunk> {
        let mut next_id = 0;
        chunker.chunk(&Document::new("10k.txt", text), &mut next_id)
    }

    #[test]
    fn short_document_is_one_chunk() {
        let chunker = Chunker::new(512, 64).unwrap();
        let chunks = chunk_all(&chunker, "Net revenue increased 12%.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Net revenue increased 12%.");
        assert_eq!((chunks[0].start_offset, chunks[0].end_offset), (0, 26));
    }

    #[test]
    fn empty_document_yields_nothing() {
        let chunker = Chunker::default();
        let mut next_id = 5;
        assert!(chunker.chunk(&Document::new("empty.txt", ""), &mut next_id).is_empty());
        assert_eq!(next_id, 5);
    }

    #[test]
    fn windows_advance_by_size_minus_overlap() {
        let chunker = Chunker::new(4, 1).unwrap();
        let chunks = chunk_all(&chunker, "abcdefghij");
        let spans: Vec<(usize, usize)> = chunks.iter().map(|c| (c.start_offset, c.end_offset)).collect();
        assert_eq!(spans, vec![(0, 4), (3, 7), (6, 10)]);
        assert_eq!(chunks[1].text, "defg");
        let ids: Vec<ChunkId> = chunks.iter().map(|c| c.chunk_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let chunker = Chunker::new(3, 0).unwrap();
        let chunks = chunk_all(&chunker, "€€€€é");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "€€€");
        assert_eq!(chunks[1].text, "€é");
        assert_eq!(chunks[1].end_offset, 5);
    }

    #[test]
    fn ids_continue_across_documents() {
        let chunker = Chunker::new(4, 0).unwrap();
        let mut next_id = 0;
        let first = chunker.chunk(&Document::new("a.txt", "aaaaaaaa"), &mut next_id);
        let second = chunker.chunk(&Document::new("b.txt", "bb"), &mut next_id);
        assert_eq!(first.len(), 2);
        assert_eq!(second[0].chunk_id, 2);
        assert_eq!(second[0].chunk_index, 0);
        assert_eq!(next_id, 3);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(Chunker::new(64, 64).is_err());
        assert!(Chunker::new(0, 0).is_err());
    }

    proptest! {
        #[test]
        fn windows_cover_document(text in "\\PC{0,300}", size in 1usize..40, overlap_seed in 0usize..40) {
            let overlap = overlap_seed % size;
            let chunker = Chunker::new(size, overlap).unwrap();
            let chunks = chunk_all(&chunker, &text);
            let char_len = text.chars().count();

            if char_len == 0 {
                prop_assert!(chunks.is_empty());
            } else {
                prop_assert_eq!(chunks[0].start_offset, 0);
                prop_assert_eq!(chunks.last().unwrap().end_offset, char_len);
            }

            // Rebuild the document from each chunk's non-overlapping tail.
            let mut rebuilt = String::new();
            let mut covered = 0;
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert!(chunk.start_offset < chunk.end_offset);
                prop_assert!(chunk.char_len() <= size);
                if i + 1 < chunks.len() {
                    prop_assert_eq!(chunk.char_len(), size);
                }
                if i > 0 {
                    prop_assert_eq!(chunk.start_offset, chunks[i - 1].end_offset - overlap);
                }
                rebuilt.extend(chunk.text.chars().skip(covered - chunk.start_offset));
                covered = chunk.end_offset;
            }
            prop_assert_eq!(rebuilt, text);
        }
    }
}
