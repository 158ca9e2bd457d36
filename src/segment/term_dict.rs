//! Term dictionary: token -> location of its posting list
//!
//! Built with one scan of the index file. Holds only pointers, so it fits
//! in memory even when the postings do not.

use std::collections::HashMap;

use tracing::debug;

use super::store::IndexStore;
use super::types::IndexPointer;
use crate::error::Result;

/// In-memory lookup table over an index file
#[derive(Clone, Debug, Default)]
pub struct TermDictionary {
    terms: HashMap<String, IndexPointer>,
    total_postings: u64,
}

impl TermDictionary {
    /// Scan the whole store once, recording each token's pointer
    pub fn build(store: &IndexStore) -> Result<Self> {
        let mut terms = HashMap::new();
        let mut total_postings = 0u64;
        for record in store.scan()? {
            let record = record?;
            total_postings += record.posting_count as u64;
            terms.insert(record.token.clone(), record.pointer());
        }
        debug!(
            terms = terms.len(),
            postings = total_postings,
            "built term dictionary"
        );
        Ok(Self {
            terms,
            total_postings,
        })
    }

    /// Look up a token's posting list
    pub fn get(&self, token: &str) -> Option<IndexPointer> {
        self.terms.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.terms.contains_key(token)
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sum of all posting counts
    pub fn total_postings(&self) -> u64 {
        self.total_postings
    }

    /// All entries in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, IndexPointer)> {
        self.terms.iter().map(|(t, p)| (t.as_str(), *p))
    }
}

/// Build the lookup table for a store
pub fn build_lookup(store: &IndexStore) -> Result<TermDictionary> {
    TermDictionary::build(store)
}
