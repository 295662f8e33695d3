use std::fs;
use std::path::{Path, PathBuf};

use filingdb_core::config::{ChunkingConfig, TermPolicy};
use filingdb_core::data_processor::DataProcessor;
use filingdb_core::ErrorKind;
use filingdb_text::{load, save, Index, IndexSettings};
use tempfile::TempDir;

const QUERIES: &[&str] = &[
    "What are the main risk factors?",
    "How did revenue change year over year?",
    "interest rate exposure on debt",
    "goodwill impairment",
];

fn write_corpus(dir: &Path) {
    fs::write(
        dir.join("acme_10k_2023.txt"),
        "Item 1A. Risk Factors. Our business is exposed to interest rate risk on variable rate debt. \
         Rising rates increase interest expense. Competition in the cloud market is intense. \
         Item 7. Revenue increased 12% year over year driven by subscription growth.",
    )
    .unwrap();
    fs::write(
        dir.join("globex_10k_2023.txt"),
        "Globex recorded a goodwill impairment charge related to its retail segment. \
         Liquidity remains strong with cash and equivalents of $2.1 billion. \
         Cybersecurity incidents could materially harm operations.",
    )
    .unwrap();
    fs::write(dir.join("empty.txt"), "").unwrap();
}

fn build(dir: &Path, settings: IndexSettings) -> Index {
    let processor = DataProcessor::new(&settings.chunking).expect("chunking config");
    let chunks = processor.process_directory(dir).expect("process corpus");
    Index::build(chunks, settings)
}

fn small_chunks() -> IndexSettings {
    IndexSettings { chunking: ChunkingConfig { chunk_size: 120, overlap: 20 }, terms: TermPolicy::default() }
}

fn artifact(tmp: &TempDir) -> PathBuf {
    tmp.path().join("index").join("filingdb.index")
}

#[test]
fn save_then_load_preserves_retrieval() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let index = build(tmp.path(), small_chunks());
    assert!(index.len() > 2);

    let path = artifact(&tmp);
    save(&index, &path).expect("save");
    let loaded = load(&path).expect("load");

    assert_eq!(loaded.vocabulary(), index.vocabulary());
    assert_eq!(loaded.chunks(), index.chunks());
    assert_eq!(loaded.settings(), index.settings());
    for query in QUERIES {
        let before = index.retrieve(query, 3);
        let after = loaded.retrieve(query, 3);
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.chunk_id, b.chunk_id, "query {query:?}");
            assert!((a.score - b.score).abs() < 1e-6, "query {query:?}");
        }
    }
}

#[test]
fn rebuilding_an_unchanged_corpus_is_deterministic() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let first = build(tmp.path(), small_chunks());
    let second = build(tmp.path(), small_chunks());

    let a = tmp.path().join("a.index");
    let b = tmp.path().join("b.index");
    save(&first, &a).unwrap();
    save(&second, &b).unwrap();
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    for query in QUERIES {
        assert_eq!(first.retrieve(query, 3), second.retrieve(query, 3));
    }
}

#[test]
fn missing_artifact_is_a_load_error() {
    let tmp = TempDir::new().unwrap();
    let err = load(&tmp.path().join("absent.index")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexLoad);
    assert!(err.to_string().contains("absent.index"));
}

#[test]
fn truncated_artifact_is_a_load_error() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let path = artifact(&tmp);
    save(&build(tmp.path(), small_chunks()), &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();
    let err = load(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexLoad);
    assert!(err.to_string().contains("truncated"), "{err}");
}

#[test]
fn corrupted_payload_fails_checksum() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let path = artifact(&tmp);
    save(&build(tmp.path(), small_chunks()), &path).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 2;
    bytes[last] = if bytes[last] == b'0' { b'1' } else { b'0' };
    fs::write(&path, &bytes).unwrap();
    let err = load(&path).unwrap_err();
    assert!(err.to_string().contains("checksum"), "{err}");
}

#[test]
fn foreign_file_is_a_load_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("notes.index");
    fs::write(&path, "{\"format\":\"something-else\",\"version\":1,\"payload_bytes\":2,\"checksum\":\"0\"}\n{}").unwrap();
    assert_eq!(load(&path).unwrap_err().kind(), ErrorKind::IndexLoad);

    fs::write(&path, "not an index").unwrap();
    assert_eq!(load(&path).unwrap_err().kind(), ErrorKind::IndexLoad);
}

#[test]
fn saving_leaves_no_temporary_files_behind() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let path = artifact(&tmp);
    let index = build(tmp.path(), small_chunks());
    save(&index, &path).unwrap();
    save(&index, &path).unwrap();

    let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().filter_map(Result::ok).collect();
    assert_eq!(entries.len(), 1, "only the published artifact remains");
}

#[test]
fn empty_index_round_trips() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.index");
    save(&Index::empty(), &path).unwrap();
    let loaded = load(&path).unwrap();
    assert!(loaded.is_empty());
    assert!(loaded.retrieve("revenue", 3).is_empty());
}

#[test]
fn bigram_policy_survives_round_trip() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let settings = IndexSettings {
        chunking: ChunkingConfig::default(),
        terms: TermPolicy { stop_words: true, max_ngram: 2, max_features: Some(50) },
    };
    let index = build(tmp.path(), settings.clone());
    assert!(index.vocabulary().len() <= 50);
    assert!(index.vocabulary().terms().iter().any(|t| t.contains(' ')));

    let path = artifact(&tmp);
    save(&index, &path).unwrap();
    let loaded = load(&path).unwrap();
    assert_eq!(loaded.settings(), &settings);
    assert_eq!(loaded.retrieve("interest rate", 2), index.retrieve("interest rate", 2));
}
