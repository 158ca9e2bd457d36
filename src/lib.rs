pub mod config;
pub mod error;
pub mod models;
pub mod persistence;
pub mod query;
pub mod segment;
pub mod tokenizer;

pub use config::{IndexConfig, Language, QueryConfig, TokenizerConfig};
pub use error::{BurrowError, Result};
pub use models::*;
pub use persistence::Corpus;
pub use query::{open_query_engine, FullScan, QueryEngine, ScoringMode};
pub use segment::{build_from_config, build_index, BuildStats, IndexBuilder, IndexStore};
pub use tokenizer::Pipeline;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
