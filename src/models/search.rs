use serde::{Deserialize, Serialize};

use crate::segment::DocumentId;

/// One matched occurrence of a query term
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub term: String,
    /// Position in the document's processed token stream
    pub position: u16,
}

impl Hit {
    pub fn new(term: impl Into<String>, position: u16) -> Self {
        Self {
            term: term.into(),
            position,
        }
    }
}

/// A document matching every query term
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document_id: DocumentId,
    pub hits: Vec<Hit>,
    /// `None` in boolean mode
    pub score: Option<f64>,
}

impl ScoredDocument {
    pub fn new(document_id: DocumentId, hits: Vec<Hit>, score: Option<f64>) -> Self {
        Self {
            document_id,
            hits,
            score,
        }
    }

    /// Score used for ordering; unscored documents rank as 0
    pub fn rank_score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// A match ready for display
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: DocumentId,
    pub reference: Option<String>,
    pub snippet: String,
    pub score: Option<f64>,
    pub hit_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_score_defaults_to_zero() {
        let unscored = ScoredDocument::new(4, vec![Hit::new("sun", 0)], None);
        let scored = ScoredDocument::new(4, vec![], Some(1.5));

        assert_eq!(unscored.rank_score(), 0.0);
        assert_eq!(scored.rank_score(), 1.5);
    }

    #[test]
    fn test_scored_document_json() {
        let doc = ScoredDocument::new(12, vec![Hit::new("moon", 3)], Some(2.0));
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["document_id"], 12);
        assert_eq!(json["hits"][0]["term"], "moon");
        assert_eq!(json["score"], 2.0);
    }
}
