//! Typed engine configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `FILINGDB_*` env vars (`__` separates nested keys, e.g.
//! `FILINGDB_RETRIEVAL__TOP_K=5`). Every loaded value is validated before it
//! reaches the build or query path.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const ENV_PREFIX: &str = "FILINGDB_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Characters per chunk.
    pub chunk_size: usize,
    /// Characters shared with the previous chunk of the same document.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 512, overlap: 64 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Answers whose top score falls strictly below this value are withheld.
    pub abstention_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3, abstention_threshold: 0.15 }
    }
}

/// Term extraction policy. Persisted with the index so queries are
/// normalized exactly like the chunks were.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermPolicy {
    pub stop_words: bool,
    /// Longest word n-gram emitted as a term (1 = unigrams only).
    pub max_ngram: usize,
    /// Keep only the most frequent terms of the corpus.
    pub max_features: Option<usize>,
}

impl Default for TermPolicy {
    fn default() -> Self {
        Self { stop_words: true, max_ngram: 1, max_features: None }
    }
}

/// Shape of extractive answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub max_sentences: usize,
    pub min_sentence_chars: usize,
    pub excerpt_chars: usize,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self { max_sentences: 3, min_sentence_chars: 20, excerpt_chars: 300 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub filings_dir: String,
    pub index_path: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { filings_dir: "data/filings".to_string(), index_path: "index/filingdb.index".to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub terms: TermPolicy,
    pub answer: AnswerConfig,
    pub paths: PathsConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.retrieval.validate()?;
        self.terms.validate()?;
        if self.answer.max_sentences == 0 {
            return Err(Error::InvalidConfig("answer.max_sentences must be at least 1".to_string()));
        }
        if self.answer.excerpt_chars == 0 {
            return Err(Error::InvalidConfig("answer.excerpt_chars must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be at least 1".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.abstention_threshold) {
            return Err(Error::InvalidConfig(format!(
                "retrieval.abstention_threshold must lie in [0, 1], got {}",
                self.abstention_threshold
            )));
        }
        Ok(())
    }
}

impl TermPolicy {
    pub fn validate(&self) -> Result<()> {
        if !(1..=3).contains(&self.max_ngram) {
            return Err(Error::InvalidConfig(format!(
                "terms.max_ngram must lie in 1..=3, got {}",
                self.max_ngram
            )));
        }
        if self.max_features == Some(0) {
            return Err(Error::InvalidConfig("terms.max_features must be at least 1 when set".to_string()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Loads layered configuration for the environment named by `RUST_ENV`
    /// (default `dev`). Unknown environment names are rejected.
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        validate_env(&env_name)?;
        Ok(Self::for_env(&env_name))
    }

    pub fn for_env(env_name: &str) -> Self {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default())).merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self { figment }
    }

    /// Layers an extra TOML file on top of everything loaded so far.
    pub fn with_file(mut self, path: &Path) -> Self {
        self.figment = self.figment.merge(Toml::file(path));
        self
    }

    pub fn engine(&self) -> Result<EngineConfig> {
        let config: EngineConfig =
            self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

fn validate_env(env_name: &str) -> Result<()> {
    match env_name {
        "dev" | "development" | "prod" | "production" | "test" | "testing" => Ok(()),
        other => Err(Error::InvalidConfig(format!(
            "RUST_ENV must be one of dev, prod or test (or their long forms), got {other:?}"
        ))),
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
