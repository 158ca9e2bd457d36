//! Text processing pipeline
//!
//! Raw text is split into words by [`UnicodeTokenizer`] and then passed
//! through a chain of [`TextProcessor`] stages (length filters, stopword
//! removal, stemming). Every stage is lazy, so documents are never
//! materialized as token vectors while indexing.

mod filters;
mod pipeline;
mod tokenizer;

pub use filters::{LongTokenFilter, ShortTokenFilter, SnowballStemmer, StopwordFilter};
pub use pipeline::{Pipeline, TextProcessor, TokenStream};
pub use tokenizer::UnicodeTokenizer;
