use crate::config::TokenizerConfig;
use crate::error::Result;

use super::filters::{LongTokenFilter, ShortTokenFilter, SnowballStemmer, StopwordFilter};
use super::tokenizer::UnicodeTokenizer;

/// Lazy sequence of tokens flowing through the pipeline
pub type TokenStream<'a> = Box<dyn Iterator<Item = String> + 'a>;

/// A single stage of the text processing pipeline
pub trait TextProcessor {
    /// Transform a token stream into another token stream
    fn process<'a>(&'a self, tokens: TokenStream<'a>) -> TokenStream<'a>;
}

/// Tokenizer followed by an ordered chain of processors
pub struct Pipeline {
    tokenizer: UnicodeTokenizer,
    stages: Vec<Box<dyn TextProcessor>>,
}

impl Pipeline {
    /// Create a pipeline with only a tokenizer stage
    pub fn new(tokenizer: UnicodeTokenizer) -> Self {
        Self {
            tokenizer,
            stages: Vec::new(),
        }
    }

    /// Assemble the standard chain described by the configuration:
    /// tokenizer -> length filters -> stopwords -> stemmer
    ///
    /// Fails only when a configured stopword file cannot be read.
    pub fn from_config(config: &TokenizerConfig) -> Result<Self> {
        let stopwords = match (&config.stopwords_path, config.remove_stopwords) {
            (_, false) => None,
            (Some(path), true) => Some(StopwordFilter::from_file(path)?),
            (None, true) => Some(StopwordFilter::new(config.language)),
        };
        Ok(Self::assemble(config, stopwords))
    }

    fn assemble(config: &TokenizerConfig, stopwords: Option<StopwordFilter>) -> Self {
        let mut pipeline = Self::new(UnicodeTokenizer::new(config.lowercase))
            .with_stage(ShortTokenFilter::new(config.min_token_length))
            .with_stage(LongTokenFilter::new(config.max_token_length));

        if let Some(stopwords) = stopwords {
            pipeline = pipeline.with_stage(stopwords);
        }
        if config.stem {
            pipeline = pipeline.with_stage(SnowballStemmer::new(config.language));
        }

        pipeline
    }

    /// Append a processing stage
    pub fn with_stage<P: TextProcessor + 'static>(mut self, stage: P) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Number of stages after the tokenizer
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Run raw text through every stage, lazily
    pub fn process<'a>(&'a self, text: &'a str) -> TokenStream<'a> {
        self.stages
            .iter()
            .fold(self.tokenizer.tokenize(text), |tokens, stage| {
                stage.process(tokens)
            })
    }

    /// Convenience for callers that need the whole processed stream
    pub fn tokens(&self, text: &str) -> Vec<String> {
        self.process(text).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        let config = TokenizerConfig::default();
        Self::assemble(&config, Some(StopwordFilter::new(config.language)))
    }
}
