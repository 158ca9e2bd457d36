//! Bounded in-memory index
//!
//! Holds token -> postings for the current build pass until its byte
//! budget is exceeded, then gets merged into the index file and cleared.

use std::collections::HashMap;
use std::mem;

use super::types::Posting;
use crate::error::{BurrowError, Result};

/// Fixed cost of one buffered token besides its bytes
const TERM_OVERHEAD: usize = mem::size_of::<String>() + mem::size_of::<Vec<Posting>>();

/// Cost of one buffered posting
const POSTING_COST: usize = mem::size_of::<Posting>();

/// One buffered token with its postings, in ascending order
#[derive(Clone, Copy, Debug)]
pub struct BufferedTerm<'a> {
    pub token: &'a str,
    pub postings: &'a [Posting],
}

impl BufferedTerm<'_> {
    pub fn posting_count(&self) -> usize {
        self.postings.len()
    }
}

/// In-memory token -> postings map with a byte budget
#[derive(Debug)]
pub struct MemoryIndex {
    terms: HashMap<String, Vec<Posting>>,
    /// Approximate footprint in bytes
    size_bytes: usize,
    limit_bytes: usize,
    posting_count: usize,
}

impl MemoryIndex {
    pub fn new(limit_bytes: usize) -> Self {
        Self {
            terms: HashMap::new(),
            size_bytes: 0,
            limit_bytes,
            posting_count: 0,
        }
    }

    /// Add a posting for a token
    ///
    /// The posting is always stored. If the estimated size now exceeds the
    /// limit, `CapacityExceeded` is returned and the caller must merge and
    /// clear before adding more.
    pub fn add(&mut self, token: &str, posting: Posting) -> Result<()> {
        match self.terms.get_mut(token) {
            Some(postings) => {
                // Build passes add in ascending order; keep it sorted anyway
                match postings.last() {
                    Some(last) if *last > posting => {
                        let idx = postings.partition_point(|p| *p <= posting);
                        postings.insert(idx, posting);
                    }
                    _ => postings.push(posting),
                }
            }
            None => {
                self.size_bytes += token.len() + TERM_OVERHEAD;
                self.terms.insert(token.to_string(), vec![posting]);
            }
        }
        self.size_bytes += POSTING_COST;
        self.posting_count += 1;

        if self.size_bytes > self.limit_bytes {
            return Err(BurrowError::CapacityExceeded {
                limit: self.limit_bytes,
                size: self.size_bytes,
            });
        }
        Ok(())
    }

    /// Buffered terms in ascending token order
    pub fn iter(&self) -> impl Iterator<Item = BufferedTerm<'_>> {
        let mut terms: Vec<(&String, &Vec<Posting>)> = self.terms.iter().collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(b.0));
        terms.into_iter().map(|(token, postings)| BufferedTerm {
            token: token.as_str(),
            postings: postings.as_slice(),
        })
    }

    pub fn get(&self, token: &str) -> Option<&[Posting]> {
        self.terms.get(token).map(|p| p.as_slice())
    }

    pub fn clear(&mut self) {
        self.terms.clear();
        self.size_bytes = 0;
        self.posting_count = 0;
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn limit_bytes(&self) -> usize {
        self.limit_bytes
    }

    pub fn posting_count(&self) -> usize {
        self.posting_count
    }
}
