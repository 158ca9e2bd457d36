//! Conjunctive query execution over sorted posting cursors
//!
//! One cursor per distinct query term, all sharing the store's file
//! handle. Each round takes the largest head document as the candidate,
//! moves every cursor up to it and emits the candidate when every term
//! has a posting there. Results come out lazily in ascending document
//! order.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use tracing::debug;

use super::scoring::{Scoring, ScoringMode};
use crate::error::{BurrowError, Result};
use crate::models::{Hit, ScoredDocument};
use crate::segment::{IndexMetadata, IndexStore, Posting, PostingCursor, TermDictionary};
use crate::tokenizer::Pipeline;

/// Query engine over one index file
pub struct QueryEngine {
    store: IndexStore,
    pipeline: Pipeline,
    lookup: TermDictionary,
    scoring: Scoring,
}

impl QueryEngine {
    /// Load the lookup table (and metadata for tf-idf) for a store
    pub fn open(store: IndexStore, pipeline: Pipeline, mode: ScoringMode) -> Result<Self> {
        let started = Instant::now();
        let lookup = TermDictionary::build(&store)?;
        let scoring = match mode {
            ScoringMode::Boolean => Scoring::Boolean,
            ScoringMode::TermFrequency => Scoring::TermFrequency,
            ScoringMode::TfIdf => Scoring::TfIdf(IndexMetadata::build(&store, &lookup)?),
            ScoringMode::Positional => {
                return Err(BurrowError::Config(
                    "positional scoring is not supported".to_string(),
                ))
            }
        };

        debug!(
            terms = lookup.len(),
            mode = %mode,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "opened query engine"
        );
        Ok(Self {
            store,
            pipeline,
            lookup,
            scoring,
        })
    }

    pub fn mode(&self) -> ScoringMode {
        self.scoring.mode()
    }

    /// Documents containing every processed token of `text`
    pub fn query(&self, text: &str) -> Result<Matches<'_>> {
        let tokens = self.pipeline.tokens(text);
        self.query_terms(&tokens)
    }

    /// Documents containing every one of the already processed `tokens`
    pub fn query_terms<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Matches<'_>> {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();

        for token in tokens.iter().map(|t| t.as_ref()) {
            if !seen.insert(token) {
                continue;
            }
            let Some(pointer) = self.lookup.get(token) else {
                debug!(token, "query term not in index");
                return Ok(Matches::empty(&self.scoring));
            };
            let mut cursor = self.store.read_pointer(pointer);
            let head = cursor.next().transpose()?;
            if head.is_none() {
                return Ok(Matches::empty(&self.scoring));
            }
            terms.push(TermCursor {
                token: token.to_string(),
                cursor,
                head,
            });
        }

        if terms.is_empty() {
            return Ok(Matches::empty(&self.scoring));
        }
        Ok(Matches {
            terms,
            scoring: &self.scoring,
            done: false,
        })
    }

    /// All matches sorted by score descending, then document id ascending
    ///
    /// Buffers the whole result set.
    pub fn ranked(&self, text: &str) -> Result<Vec<ScoredDocument>> {
        let mut results = self.query(text)?.collect::<Result<Vec<_>>>()?;
        sort_ranked(&mut results);
        Ok(results)
    }
}

/// Order results by score descending, then document id ascending
pub fn sort_ranked(results: &mut [ScoredDocument]) {
    results.sort_by(|a, b| {
        b.rank_score()
            .total_cmp(&a.rank_score())
            .then_with(|| a.document_id.cmp(&b.document_id))
    });
}

/// Open the index at `index_path` for querying
pub fn open_query_engine(
    index_path: impl AsRef<Path>,
    pipeline: Pipeline,
    mode: ScoringMode,
) -> Result<QueryEngine> {
    QueryEngine::open(IndexStore::open(index_path)?, pipeline, mode)
}

struct TermCursor {
    token: String,
    cursor: PostingCursor,
    /// Next unconsumed posting; `None` once exhausted
    head: Option<Posting>,
}

impl TermCursor {
    fn advance(&mut self) -> Result<()> {
        self.head = self.cursor.next().transpose()?;
        Ok(())
    }
}

/// Lazy sequence of documents matching every query term
pub struct Matches<'a> {
    terms: Vec<TermCursor>,
    scoring: &'a Scoring,
    done: bool,
}

impl<'a> Matches<'a> {
    fn empty(scoring: &'a Scoring) -> Self {
        Self {
            terms: Vec::new(),
            scoring,
            done: true,
        }
    }

    /// Run rounds until one produces a match or a cursor runs out
    fn next_match(&mut self) -> Result<Option<ScoredDocument>> {
        loop {
            let heads = self.terms.iter().filter_map(|t| t.head);
            let Some(candidate) = heads.map(|p| p.document_id).max() else {
                return Ok(None);
            };

            let mut hits = Vec::new();
            let mut frequencies = Vec::with_capacity(self.terms.len());
            let mut all_found = true;
            let mut exhausted = false;

            for term in &mut self.terms {
                while let Some(posting) = term.head {
                    if posting.document_id >= candidate {
                        break;
                    }
                    term.advance()?;
                }
                let Some(head) = term.head else {
                    // Candidates only grow, so this term can never match again
                    return Ok(None);
                };

                if head.document_id > candidate {
                    all_found = false;
                    frequencies.push(0);
                    continue;
                }

                let mut tf = 0u32;
                while let Some(posting) = term.head {
                    if posting.document_id != candidate {
                        break;
                    }
                    hits.push(Hit::new(term.token.clone(), posting.position));
                    tf += 1;
                    term.advance()?;
                }
                frequencies.push(tf);
                if term.head.is_none() {
                    exhausted = true;
                }
            }

            if exhausted {
                self.done = true;
            }
            if all_found {
                let tfs: Vec<(&str, u32)> = self
                    .terms
                    .iter()
                    .zip(&frequencies)
                    .map(|(t, tf)| (t.token.as_str(), *tf))
                    .collect();
                let score = self.scoring.score(&tfs);
                return Ok(Some(ScoredDocument::new(candidate, hits, score)));
            }
            if exhausted {
                return Ok(None);
            }
        }
    }
}

impl Iterator for Matches<'_> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenizerConfig;
    use crate::segment::{DocumentId, MemoryIndex};
    use tempfile::TempDir;

    fn engine(entries: &[(&str, u32, u16)], mode: ScoringMode) -> (TempDir, QueryEngine) {
        let dir = TempDir::new().unwrap();
        let mut store = IndexStore::open_for_build(dir.path().join("index.bin")).unwrap();
        let mut memory = MemoryIndex::new(usize::MAX);
        for &(token, doc, pos) in entries {
            memory.add(token, Posting::new(doc, pos)).unwrap();
        }
        store.merge(&memory).unwrap();
        let pipeline = Pipeline::from_config(&TokenizerConfig::plain()).unwrap();
        let engine = QueryEngine::open(store, pipeline, mode).unwrap();
        (dir, engine)
    }

    fn documents(matches: Matches<'_>) -> Vec<DocumentId> {
        matches.map(|m| m.unwrap().document_id).collect()
    }

    #[test]
    fn test_intersection() {
        let (_dir, engine) = engine(
            &[
                ("sun", 1, 0),
                ("sun", 3, 0),
                ("sun", 5, 2),
                ("sun", 9, 0),
                ("moon", 3, 1),
                ("moon", 4, 0),
                ("moon", 9, 4),
                ("moon", 9, 6),
            ],
            ScoringMode::Boolean,
        );

        let results: Vec<ScoredDocument> = engine
            .query("sun moon")
            .unwrap()
            .map(|m| m.unwrap())
            .collect();
        assert_eq!(
            results.iter().map(|r| r.document_id).collect::<Vec<_>>(),
            vec![3, 9]
        );
        assert_eq!(
            results[1].hits,
            vec![Hit::new("sun", 0), Hit::new("moon", 4), Hit::new("moon", 6)]
        );
        assert!(results.iter().all(|r| r.score.is_none()));
    }

    #[test]
    fn test_exhaustion_after_last_match_still_emits() {
        // Both lists end on the matching document
        let (_dir, engine) = engine(
            &[("sun", 2, 0), ("sun", 7, 0), ("moon", 7, 1)],
            ScoringMode::TermFrequency,
        );

        let results: Vec<ScoredDocument> = engine
            .query("moon sun")
            .unwrap()
            .map(|m| m.unwrap())
            .collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_id, 7);
        assert_eq!(results[0].score, Some(2.0));
    }

    #[test]
    fn test_exhausted_term_does_not_leak_into_later_terms() {
        // "sun" runs out on doc 5 while "moon" still has doc 5
        let (_dir, engine) = engine(
            &[("sun", 5, 0), ("moon", 5, 1), ("moon", 8, 0)],
            ScoringMode::Boolean,
        );
        assert_eq!(documents(engine.query("sun moon").unwrap()), vec![5]);
    }

    #[test]
    fn test_unknown_term_yields_nothing() {
        let (_dir, engine) = engine(&[("sun", 1, 0)], ScoringMode::Boolean);
        assert!(documents(engine.query("sun comet").unwrap()).is_empty());
        assert!(documents(engine.query("").unwrap()).is_empty());
    }

    #[test]
    fn test_duplicate_query_terms() {
        let (_dir, engine) = engine(&[("sun", 1, 0), ("sun", 1, 3)], ScoringMode::TermFrequency);

        let results: Vec<ScoredDocument> = engine
            .query("sun sun")
            .unwrap()
            .map(|m| m.unwrap())
            .collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].hits.len(), 2);
        assert_eq!(results[0].score, Some(2.0));
    }

    #[test]
    fn test_tf_idf_ranking() {
        // 4 documents; "sun" in 0 and 1, "moon" only in 1
        let (_dir, engine) = engine(
            &[
                ("sun", 0, 0),
                ("sun", 0, 2),
                ("sun", 1, 0),
                ("moon", 1, 1),
                ("star", 2, 0),
                ("star", 3, 0),
            ],
            ScoringMode::TfIdf,
        );

        let ranked = engine.ranked("sun").unwrap();
        assert_eq!(
            ranked.iter().map(|r| r.document_id).collect::<Vec<_>>(),
            vec![0, 1]
        );
        let expected = 2f64.ln() * 2f64.ln();
        assert!((ranked[1].score.unwrap() - expected).abs() < 1e-12);
        assert!((ranked[0].score.unwrap() - 3f64.ln() * 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_ranked_ties_by_document() {
        let mut results = vec![
            ScoredDocument::new(9, vec![], Some(1.0)),
            ScoredDocument::new(2, vec![], Some(1.0)),
            ScoredDocument::new(5, vec![], Some(3.0)),
        ];
        sort_ranked(&mut results);
        assert_eq!(
            results.iter().map(|r| r.document_id).collect::<Vec<_>>(),
            vec![5, 2, 9]
        );
    }

    #[test]
    fn test_positional_mode_rejected() {
        let dir = TempDir::new().unwrap();
        let store = IndexStore::open_for_build(dir.path().join("index.bin")).unwrap();
        let result = QueryEngine::open(store, Pipeline::default(), ScoringMode::Positional);
        assert!(matches!(result, Err(BurrowError::Config(_))));
    }

    #[test]
    fn test_query_terms_skips_pipeline() {
        let (_dir, engine) = engine(&[("Sun", 1, 0)], ScoringMode::Boolean);
        // The plain pipeline would lowercase this away
        assert!(documents(engine.query("Sun").unwrap()).is_empty());
        assert_eq!(documents(engine.query_terms(&["Sun"]).unwrap()), vec![1]);
    }
}
