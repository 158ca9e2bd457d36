use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BurrowError, Result};
use crate::query::ScoringMode;

/// Index build configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// JSON-lines corpus, one document per line
    pub corpus_path: PathBuf,
    /// Inverted index file
    pub index_path: PathBuf,
    /// Byte budget of the in-memory index before it is merged to disk
    pub memory_limit_bytes: usize,
    pub tokenizer: TokenizerConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("documents.jsonl"),
            index_path: PathBuf::from("inverted_index.bin"),
            // 100KB
            memory_limit_bytes: 100 * 1024,
            tokenizer: TokenizerConfig::default(),
        }
    }
}

impl IndexConfig {
    /// Create a configuration for the given corpus and index files
    pub fn new(corpus_path: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            index_path: index_path.into(),
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let config: IndexConfig = serde_json::from_slice(&data)
            .map_err(|e| BurrowError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit_bytes = bytes;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.memory_limit_bytes == 0 {
            return Err(BurrowError::Config(
                "memory_limit_bytes must be greater than zero".to_string(),
            ));
        }
        if self.tokenizer.min_token_length > self.tokenizer.max_token_length {
            return Err(BurrowError::Config(format!(
                "min_token_length {} is larger than max_token_length {}",
                self.tokenizer.min_token_length, self.tokenizer.max_token_length
            )));
        }
        Ok(())
    }
}

/// Language of the stemmer and stopword list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    German,
}

impl std::str::FromStr for Language {
    type Err = BurrowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "german" | "de" => Ok(Language::German),
            other => Err(BurrowError::Config(format!("unknown language '{}'", other))),
        }
    }
}

/// Tokenizer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
    pub language: Language,
    /// Stopword list with one word per line, used instead of the built-in
    /// list for `language`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopwords_path: Option<PathBuf>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: true,
            stem: true,
            min_token_length: 3,
            max_token_length: 50,
            language: Language::English,
            stopwords_path: None,
        }
    }
}

impl TokenizerConfig {
    /// Lowercasing only, no filters or stemming
    pub fn with_stopwords_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.remove_stopwords = true;
        self.stopwords_path = Some(path.into());
        self
    }

    pub fn plain() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: false,
            stem: false,
            min_token_length: 1,
            max_token_length: 50,
            language: Language::English,
            stopwords_path: None,
        }
    }
}

/// Query execution configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub mode: ScoringMode,
    /// Buffer all matches and order them by score
    pub ranked: bool,
}

impl QueryConfig {
    pub fn new(mode: ScoringMode) -> Self {
        Self {
            mode,
            ranked: false,
        }
    }

    pub fn ranked(mut self) -> Self {
        self.ranked = true;
        self
    }
}
