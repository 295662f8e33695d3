//! Single-file index artifact.
//!
//! Layout: one JSON header line `{format, version, payload_bytes, checksum}`
//! followed by the JSON payload. The checksum is the hex XxHash64 (seed 0)
//! of the payload bytes, so truncated or corrupted artifacts are rejected
//! before any parsing of the payload happens.

use serde::{Deserialize, Serialize};
use std::fs;
use std::hash::Hasher;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use twox_hash::XxHash64;

use filingdb_core::error::{Error, Result};
use filingdb_core::types::Chunk;

use crate::index::{Index, IndexSettings};
use crate::vocabulary::{SparseVector, Vocabulary};

pub const FORMAT: &str = "filingdb-index";
pub const VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
	format: String,
	version: u32,
	payload_bytes: u64,
	checksum: String,
}

#[derive(Serialize)]
struct PayloadRef<'a> {
	settings: &'a IndexSettings,
	vocabulary: &'a Vocabulary,
	idf: &'a [f32],
	chunks: &'a [Chunk],
	vectors: &'a [SparseVector],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Payload {
	settings: IndexSettings,
	vocabulary: Vocabulary,
	idf: Vec<f32>,
	chunks: Vec<Chunk>,
	vectors: Vec<SparseVector>,
}

fn checksum(bytes: &[u8]) -> String {
	let mut hasher = XxHash64::with_seed(0);
	hasher.write(bytes);
	format!("{:016x}", hasher.finish())
}

/// Writes `index` to `path` atomically: the artifact is written and synced
/// to a temporary file next to `path`, then renamed over it. Readers never
/// observe a partial artifact.
pub fn save(index: &Index, path: &Path) -> Result<()> {
	let write_err = |source: io::Error| Error::IndexWrite { path: path.to_path_buf(), source };

	let payload = serde_json::to_vec(&PayloadRef {
		settings: index.settings(),
		vocabulary: index.vocabulary(),
		idf: index.idf(),
		chunks: index.chunks(),
		vectors: index.vectors(),
	})
	.map_err(|e| write_err(e.into()))?;
	let header = Header {
		format: FORMAT.to_string(),
		version: VERSION,
		payload_bytes: payload.len() as u64,
		checksum: checksum(&payload),
	};

	let dir = match path.parent() {
		Some(p) if !p.as_os_str().is_empty() => p,
		_ => Path::new("."),
	};
	fs::create_dir_all(dir).map_err(write_err)?;
	let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
	{
		let mut writer = BufWriter::new(tmp.as_file_mut());
		serde_json::to_writer(&mut writer, &header).map_err(|e| write_err(e.into()))?;
		writer.write_all(b"\n").map_err(write_err)?;
		writer.write_all(&payload).map_err(write_err)?;
		writer.flush().map_err(write_err)?;
	}
	tmp.as_file().sync_all().map_err(write_err)?;
	tmp.persist(path).map_err(|e| write_err(e.error))?;

	tracing::info!(path = %path.display(), bytes = payload.len(), chunks = index.len(), "saved index");
	Ok(())
}

/// Reads an artifact written by [`save`]. Missing, truncated, corrupted or
/// schema-mismatched artifacts are [`Error::IndexLoad`] errors.
pub fn load(path: &Path) -> Result<Index> {
	let fail = |reason: String| Error::index_load(path, reason);

	let bytes = fs::read(path).map_err(|e| fail(e.to_string()))?;
	let newline = bytes.iter().position(|&b| b == b'\n').ok_or_else(|| fail("missing header line".to_string()))?;
	let header: Header =
		serde_json::from_slice(&bytes[..newline]).map_err(|e| fail(format!("malformed header: {e}")))?;
	if header.format != FORMAT {
		return Err(fail(format!("unexpected format {:?}", header.format)));
	}
	if header.version != VERSION {
		return Err(fail(format!("unsupported version {} (expected {VERSION})", header.version)));
	}

	let payload = &bytes[newline + 1..];
	if payload.len() as u64 != header.payload_bytes {
		return Err(fail(format!("truncated payload: expected {} bytes, found {}", header.payload_bytes, payload.len())));
	}
	if checksum(payload) != header.checksum {
		return Err(fail("checksum mismatch".to_string()));
	}

	let Payload { settings, vocabulary, idf, chunks, vectors } =
		serde_json::from_slice(payload).map_err(|e| fail(format!("schema mismatch: {e}")))?;
	let index = Index::from_parts(settings, vocabulary, idf, chunks, vectors).map_err(fail)?;
	tracing::info!(path = %path.display(), chunks = index.len(), terms = index.vocabulary().len(), "loaded index");
	Ok(index)
}
