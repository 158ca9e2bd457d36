//! Scoring modes for conjunctive queries

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BurrowError;
use crate::segment::IndexMetadata;

/// How matched documents are scored
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Match only, no score
    #[default]
    Boolean,
    /// Number of hits in the document
    TermFrequency,
    /// Sum over query terms of `ln(1 + tf) * ln(N / df)`
    TfIdf,
    /// Term order and proximity aware scoring. Not implemented; engines
    /// refuse to open in this mode.
    Positional,
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScoringMode::Boolean => "boolean",
            ScoringMode::TermFrequency => "tf",
            ScoringMode::TfIdf => "tf-idf",
            ScoringMode::Positional => "positional",
        };
        f.write_str(name)
    }
}

impl FromStr for ScoringMode {
    type Err = BurrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(ScoringMode::Boolean),
            "tf" | "term_frequency" | "term-frequency" => Ok(ScoringMode::TermFrequency),
            "tfidf" | "tf_idf" | "tf-idf" => Ok(ScoringMode::TfIdf),
            "positional" => Ok(ScoringMode::Positional),
            other => Err(BurrowError::Config(format!("unknown scoring mode '{}'", other))),
        }
    }
}

/// tf-idf weight of one term in one document
///
/// A term with no documents contributes nothing.
pub fn tf_idf(tf: u32, df: u32, document_count: u64) -> f64 {
    if df == 0 || tf == 0 {
        return 0.0;
    }
    (1.0 + tf as f64).ln() * (document_count as f64 / df as f64).ln()
}

/// Scoring strategy shared by every intersection
#[derive(Clone, Debug)]
pub(crate) enum Scoring {
    Boolean,
    TermFrequency,
    TfIdf(IndexMetadata),
}

impl Scoring {
    pub(crate) fn mode(&self) -> ScoringMode {
        match self {
            Scoring::Boolean => ScoringMode::Boolean,
            Scoring::TermFrequency => ScoringMode::TermFrequency,
            Scoring::TfIdf(_) => ScoringMode::TfIdf,
        }
    }

    /// Score a document from each query term's hit count
    pub(crate) fn score(&self, term_frequencies: &[(&str, u32)]) -> Option<f64> {
        match self {
            Scoring::Boolean => None,
            Scoring::TermFrequency => {
                Some(term_frequencies.iter().map(|(_, tf)| *tf as f64).sum())
            }
            Scoring::TfIdf(metadata) => {
                let n = metadata.document_count();
                Some(
                    term_frequencies
                        .iter()
                        .map(|(term, tf)| tf_idf(*tf, metadata.document_frequency(term), n))
                        .sum(),
                )
            }
        }
    }
}
