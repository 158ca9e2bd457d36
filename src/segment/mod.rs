//! Disk-backed inverted index for full-text search
//!
//! # Architecture
//!
//! - `MemoryIndex`: bounded in-memory buffer for the current build pass
//! - `IndexStore`: one sorted file of token records, rewritten on every merge
//! - `TermDictionary`: in-memory token -> posting list pointer table
//! - `IndexMetadata`: document frequencies for tf-idf scoring
//! - `IndexBuilder`: drives corpus -> memory index -> store

mod buffer;
mod merge;
mod postings;
mod statistics;
mod store;
mod term_dict;
mod types;
mod writer;

pub use buffer::*;
pub use merge::*;
pub use postings::*;
pub use statistics::*;
pub use store::*;
pub use term_dict::*;
pub use types::*;
pub use writer::*;
