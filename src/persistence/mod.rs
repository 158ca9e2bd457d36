//! Persistence primitives: the JSON-lines corpus addressed by byte offset.

mod corpus;

pub use corpus::{Corpus, Documents};
