//! Query execution over the on-disk index
//!
//! - `QueryEngine`: strict AND over sorted posting cursors, lazily
//! - `ScoringMode`: boolean, term frequency or tf-idf scoring
//! - `snippet`: display snippets from raw document text
//! - `FullScan`: index-free baseline used for checking and timing

pub mod executor;
pub mod naive;
pub mod scoring;
pub mod snippet;

pub use executor::{open_query_engine, sort_ranked, Matches, QueryEngine};
pub use naive::{FullScan, FullScanMatches};
pub use scoring::{tf_idf, ScoringMode};
pub use snippet::{assemble, load_result, snippet, SNIPPET_WINDOW};
