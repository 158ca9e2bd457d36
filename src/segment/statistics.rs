//! Per-term document frequencies and index statistics

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::postings::ReadMode;
use super::store::IndexStore;
use super::term_dict::TermDictionary;
use super::types::{DocumentId, IndexMetadataPointer, IndexPointer};
use crate::error::Result;

/// Document frequencies for every token plus the corpus document count
///
/// Needed only for tf-idf scoring. Built with one pass over every posting
/// list.
#[derive(Clone, Debug, Default)]
pub struct IndexMetadata {
    terms: HashMap<String, IndexMetadataPointer>,
    document_count: u64,
}

impl IndexMetadata {
    pub fn build(store: &IndexStore, lookup: &TermDictionary) -> Result<Self> {
        // Visit lists in file order so the reads stay sequential
        let mut entries: Vec<_> = lookup.iter().collect();
        entries.sort_unstable_by_key(|(_, pointer)| pointer.offset);

        let mut terms = HashMap::with_capacity(entries.len());
        let mut documents: HashSet<DocumentId> = HashSet::new();

        for (token, pointer) in entries {
            let cursor =
                store.read_postings_with(pointer.posting_count, pointer.offset, ReadMode::Sequential);
            let mut document_frequency = 0u32;
            let mut last: Option<DocumentId> = None;
            for posting in cursor {
                let posting = posting?;
                // Postings are sorted, so a new document id is a transition
                if last != Some(posting.document_id) {
                    document_frequency += 1;
                    last = Some(posting.document_id);
                    documents.insert(posting.document_id);
                }
            }
            terms.insert(
                token.to_string(),
                IndexMetadataPointer::new(pointer, document_frequency),
            );
        }

        debug!(
            terms = terms.len(),
            documents = documents.len(),
            "built index metadata"
        );
        Ok(Self {
            terms,
            document_count: documents.len() as u64,
        })
    }

    pub fn get(&self, token: &str) -> Option<&IndexMetadataPointer> {
        self.terms.get(token)
    }

    /// Distinct documents containing the token, 0 if unknown
    pub fn document_frequency(&self, token: &str) -> u32 {
        self.terms
            .get(token)
            .map(|m| m.document_frequency)
            .unwrap_or(0)
    }

    /// Distinct documents across the whole index
    pub fn document_count(&self) -> u64 {
        self.document_count
    }
}

/// Build tf-idf metadata for a store from its lookup table
pub fn build_metadata(store: &IndexStore, lookup: &TermDictionary) -> Result<IndexMetadata> {
    IndexMetadata::build(store, lookup)
}

/// One token's entry in [`IndexStats`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenFrequency {
    pub token: String,
    pub posting_count: u32,
    /// Where the posting list starts, as a fraction of the file size
    pub relative_offset: f64,
}

/// Summary of an index for reporting
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub vocabulary_size: usize,
    pub total_postings: u64,
    pub index_bytes: u64,
    /// Highest posting counts first
    pub most_frequent: Vec<TokenFrequency>,
    /// Lowest posting counts first
    pub least_frequent: Vec<TokenFrequency>,
}

impl IndexStats {
    /// Number of tokens listed at each end by default
    pub const DEFAULT_TOP: usize = 20;

    pub fn collect(lookup: &TermDictionary, index_bytes: u64, top: usize) -> Self {
        let mut entries: Vec<_> = lookup.iter().collect();
        // Ties broken by token so the report is stable
        entries.sort_unstable_by(|a, b| {
            b.1.posting_count
                .cmp(&a.1.posting_count)
                .then_with(|| a.0.cmp(b.0))
        });

        let to_frequency = |(token, pointer): &(&str, IndexPointer)| {
            TokenFrequency {
                token: token.to_string(),
                posting_count: pointer.posting_count,
                relative_offset: if index_bytes == 0 {
                    0.0
                } else {
                    pointer.offset as f64 / index_bytes as f64
                },
            }
        };

        let most_frequent = entries.iter().take(top).map(to_frequency).collect();
        let least_frequent = entries.iter().rev().take(top).map(to_frequency).collect();

        Self {
            vocabulary_size: lookup.len(),
            total_postings: lookup.total_postings(),
            index_bytes,
            most_frequent,
            least_frequent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::buffer::MemoryIndex;
    use crate::segment::types::Posting;
    use tempfile::TempDir;

    fn store_with(entries: &[(&str, u32, u16)]) -> (TempDir, IndexStore) {
        let dir = TempDir::new().unwrap();
        let mut store = IndexStore::open_for_build(dir.path().join("index.bin")).unwrap();
        let mut memory = MemoryIndex::new(usize::MAX);
        for &(token, doc, pos) in entries {
            memory.add(token, Posting::new(doc, pos)).unwrap();
        }
        store.merge(&memory).unwrap();
        (dir, store)
    }

    #[test]
    fn test_document_frequency_counts_distinct_documents() {
        let (_dir, store) = store_with(&[
            ("sun", 0, 0),
            ("sun", 0, 4),
            ("sun", 30, 1),
            ("moon", 30, 0),
            ("star", 61, 2),
        ]);
        let lookup = TermDictionary::build(&store).unwrap();
        let metadata = build_metadata(&store, &lookup).unwrap();

        assert_eq!(metadata.document_frequency("sun"), 2);
        assert_eq!(metadata.document_frequency("moon"), 1);
        assert_eq!(metadata.document_frequency("comet"), 0);
        assert_eq!(metadata.document_count(), 3);
        assert_eq!(metadata.get("sun").unwrap().posting_count, 3);
    }

    #[test]
    fn test_index_stats() {
        let (_dir, store) = store_with(&[
            ("alpha", 0, 0),
            ("beta", 0, 1),
            ("beta", 1, 0),
            ("gamma", 0, 2),
            ("gamma", 1, 1),
            ("gamma", 2, 0),
        ]);
        let lookup = TermDictionary::build(&store).unwrap();
        let size = store.size_bytes().unwrap();
        let stats = IndexStats::collect(&lookup, size, 2);

        assert_eq!(stats.vocabulary_size, 3);
        assert_eq!(stats.total_postings, 6);
        assert_eq!(stats.index_bytes, size);

        let most: Vec<&str> = stats.most_frequent.iter().map(|t| t.token.as_str()).collect();
        let least: Vec<&str> = stats.least_frequent.iter().map(|t| t.token.as_str()).collect();
        assert_eq!(most, vec!["gamma", "beta"]);
        assert_eq!(least, vec!["alpha", "beta"]);

        let alpha = &stats.least_frequent[0];
        assert!(alpha.relative_offset > 0.0 && alpha.relative_offset < 1.0);
    }
}
