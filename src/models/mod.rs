pub mod document;
pub mod search;

pub use document::Document;
pub use search::{Hit, ScoredDocument, SearchResult};
