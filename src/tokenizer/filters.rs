use std::collections::HashSet;
use std::path::Path;

use rust_stemmers::{Algorithm, Stemmer};
use stop_words::{get, LANGUAGE};

use super::pipeline::{TextProcessor, TokenStream};
use crate::config::Language;
use crate::error::Result;

/// Drops tokens with fewer than `min_len` characters
#[derive(Clone, Debug)]
pub struct ShortTokenFilter {
    min_len: usize,
}

impl ShortTokenFilter {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }
}

impl TextProcessor for ShortTokenFilter {
    fn process<'a>(&'a self, tokens: TokenStream<'a>) -> TokenStream<'a> {
        Box::new(tokens.filter(move |t| t.chars().count() >= self.min_len))
    }
}

/// Drops tokens with more than `max_len` characters
#[derive(Clone, Debug)]
pub struct LongTokenFilter {
    max_len: usize,
}

impl LongTokenFilter {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }
}

impl TextProcessor for LongTokenFilter {
    fn process<'a>(&'a self, tokens: TokenStream<'a>) -> TokenStream<'a> {
        Box::new(tokens.filter(move |t| t.chars().count() <= self.max_len))
    }
}

/// Removes stopwords of a language
pub struct StopwordFilter {
    stopwords: HashSet<String>,
}

impl StopwordFilter {
    pub fn new(language: Language) -> Self {
        let list = match language {
            Language::English => LANGUAGE::English,
            Language::German => LANGUAGE::German,
        };
        let stopwords = get(list).into_iter().map(|s| s.to_lowercase()).collect();
        Self { stopwords }
    }

    /// Build a filter from an explicit word list
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Load a word list with one stopword per line
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_words(contents.lines()))
    }

    /// Number of words in the list
    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}

impl TextProcessor for StopwordFilter {
    fn process<'a>(&'a self, tokens: TokenStream<'a>) -> TokenStream<'a> {
        Box::new(tokens.filter(move |t| !self.stopwords.contains(t)))
    }
}

/// Snowball stemmer for the configured language
pub struct SnowballStemmer {
    stemmer: Stemmer,
}

impl SnowballStemmer {
    pub fn new(language: Language) -> Self {
        let algorithm = match language {
            Language::English => Algorithm::English,
            Language::German => Algorithm::German,
        };
        Self {
            stemmer: Stemmer::create(algorithm),
        }
    }

    pub fn stem(&self, token: &str) -> String {
        self.stemmer.stem(token).into_owned()
    }
}

impl TextProcessor for SnowballStemmer {
    fn process<'a>(&'a self, tokens: TokenStream<'a>) -> TokenStream<'a> {
        Box::new(tokens.map(move |t| self.stem(&t)))
    }
}
