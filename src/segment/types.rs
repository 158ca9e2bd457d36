//! Core types for the on-disk inverted index

use serde::{Deserialize, Serialize};
use std::fmt;

/// Document identifier: the byte offset of the document's line in the
/// corpus file. Readers seek to it directly, so the corpus must stay
/// append-only for the life of an index.
pub type DocumentId = u32;

/// Separates a token from its posting count in a record
pub const DELIMITER: u8 = b'#';

/// Encoded size of one posting: 4-byte document id + 2-byte position
pub const POSTING_SIZE: usize = 6;

/// Encoded size of a record's posting count
pub const COUNT_SIZE: usize = 3;

/// Largest posting count a single record can carry
pub const MAX_POSTING_COUNT: u32 = (1 << 24) - 1;

/// A single (document, position) occurrence of a token
///
/// Ordering is by document first, then position, which is the order
/// postings are stored in within one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Posting {
    pub document_id: DocumentId,
    /// Ordinal of the token in the document's processed token stream
    pub position: u16,
}

impl Posting {
    pub fn new(document_id: DocumentId, position: u16) -> Self {
        Self {
            document_id,
            position,
        }
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.document_id, self.position)
    }
}

/// Location of a token's posting list in the index file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexPointer {
    /// Byte offset of the first posting (just past the count field)
    pub offset: u64,
    pub posting_count: u32,
}

impl IndexPointer {
    pub fn new(offset: u64, posting_count: u32) -> Self {
        Self {
            offset,
            posting_count,
        }
    }

    /// Byte offset just past the last posting
    pub fn end_offset(&self) -> u64 {
        self.offset + self.posting_count as u64 * POSTING_SIZE as u64
    }
}

/// Index pointer enriched with the token's document frequency
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexMetadataPointer {
    pub offset: u64,
    pub posting_count: u32,
    /// Number of distinct documents containing the token
    pub document_frequency: u32,
}

impl IndexMetadataPointer {
    pub fn new(pointer: IndexPointer, document_frequency: u32) -> Self {
        Self {
            offset: pointer.offset,
            posting_count: pointer.posting_count,
            document_frequency,
        }
    }

    pub fn pointer(&self) -> IndexPointer {
        IndexPointer::new(self.offset, self.posting_count)
    }
}
