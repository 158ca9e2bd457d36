//! Brute-force conjunctive search without an index
//!
//! Reads every document and runs it through the pipeline. Used as a
//! baseline to check and time the index engine.

use std::collections::HashSet;

use crate::error::{BurrowError, Result};
use crate::models::{Hit, ScoredDocument};
use crate::persistence::{Corpus, Documents};
use crate::segment::DocumentId;
use crate::tokenizer::Pipeline;

pub struct FullScan<'a> {
    corpus: &'a Corpus,
    pipeline: &'a Pipeline,
}

impl<'a> FullScan<'a> {
    pub fn new(corpus: &'a Corpus, pipeline: &'a Pipeline) -> Self {
        Self { corpus, pipeline }
    }

    /// Documents containing every processed token of `text`, in corpus order
    pub fn query(&self, text: &str) -> Result<FullScanMatches<'a>> {
        let mut terms: Vec<String> = Vec::new();
        for token in self.pipeline.process(text) {
            if !terms.contains(&token) {
                terms.push(token);
            }
        }
        Ok(FullScanMatches {
            documents: self.corpus.documents()?,
            pipeline: self.pipeline,
            terms,
            done: false,
        })
    }
}

/// Lazy results of a [`FullScan`] query
pub struct FullScanMatches<'a> {
    documents: Documents,
    pipeline: &'a Pipeline,
    terms: Vec<String>,
    done: bool,
}

impl FullScanMatches<'_> {
    fn next_match(&mut self) -> Result<Option<ScoredDocument>> {
        if self.terms.is_empty() {
            return Ok(None);
        }
        for entry in self.documents.by_ref() {
            let (offset, document) = entry?;
            let mut hits = Vec::new();
            let mut found = HashSet::new();

            for (position, token) in self.pipeline.process(&document.text).enumerate() {
                if let Some(idx) = self.terms.iter().position(|t| *t == token) {
                    let position = u16::try_from(position)
                        .map_err(|_| BurrowError::PositionOverflow { position })?;
                    hits.push(Hit::new(token, position));
                    found.insert(idx);
                }
            }

            if found.len() == self.terms.len() {
                let document_id = DocumentId::try_from(offset)
                    .map_err(|_| BurrowError::DocumentOffsetOverflow(offset))?;
                return Ok(Some(ScoredDocument::new(document_id, hits, None)));
            }
        }
        Ok(None)
    }
}

impl Iterator for FullScanMatches<'_> {
    type Item = Result<ScoredDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_match() {
            Ok(Some(document)) => Some(Ok(document)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
