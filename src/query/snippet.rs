//! Human-readable snippets for matched documents
//!
//! Hit positions index the processed token stream, which is shorter than
//! the raw text (stopwords and short tokens are gone). The snippet search
//! starts at the hit position in the whitespace-split raw text and walks
//! forward to the first raw token containing the hit term.

use crate::error::Result;
use crate::models::{Document, ScoredDocument, SearchResult};
use crate::persistence::Corpus;

/// Raw tokens shown on each side of the hit
pub const SNIPPET_WINDOW: usize = 10;

/// Snippet of `text` around `term`, searching from `position`
pub fn snippet(text: &str, term: &str, position: usize) -> String {
    let raw: Vec<&str> = text.split_whitespace().collect();
    if raw.is_empty() {
        return String::new();
    }

    let needle = term.to_lowercase();
    let centre = raw
        .iter()
        .enumerate()
        .skip(position)
        .find(|(_, token)| token.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .unwrap_or_else(|| position.min(raw.len() - 1));

    let start = centre.saturating_sub(SNIPPET_WINDOW);
    let end = (centre + SNIPPET_WINDOW + 1).min(raw.len());
    raw[start..end].join(" ")
}

/// Build the display form of a match from its document
pub fn assemble(document: &Document, matched: &ScoredDocument) -> SearchResult {
    let snippet = match matched.hits.first() {
        Some(hit) => snippet(&document.text, &hit.term, hit.position as usize),
        None => String::new(),
    };
    SearchResult {
        document_id: matched.document_id,
        reference: document.reference(),
        snippet,
        score: matched.score,
        hit_count: matched.hits.len(),
    }
}

/// Load a matched document from the corpus and assemble it
pub fn load_result(corpus: &Corpus, matched: &ScoredDocument) -> Result<SearchResult> {
    let document = corpus.read_document_at(matched.document_id as u64)?;
    Ok(assemble(&document, matched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Hit;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_walks_forward_to_term() {
        // Processed position 1 lands before the raw "Running" at index 4
        let text = "And the man was Running to the hills";
        assert_eq!(snippet(text, "run", 1), text);
    }

    #[test]
    fn test_window_is_ten_each_side() {
        let text = format!("{} needle {}", words(15), words(15));
        let snip = snippet(&text, "needle", 15);
        let tokens: Vec<&str> = snip.split(' ').collect();

        assert_eq!(tokens.len(), 21);
        assert_eq!(tokens[10], "needle");
        assert_eq!(tokens[0], "w5");
    }

    #[test]
    fn test_window_clamped_at_edges() {
        let text = format!("needle {}", words(3));
        assert_eq!(snippet(&text, "needle", 0), text);
    }

    #[test]
    fn test_fallback_to_raw_position() {
        let text = words(30);
        let snip = snippet(&text, "absent", 20);
        let tokens: Vec<&str> = snip.split(' ').collect();
        assert_eq!(tokens.first(), Some(&"w10"));
        assert_eq!(tokens.last(), Some(&"w29"));

        // Position past the end clamps to the last token
        assert!(snippet(&text, "absent", 500).ends_with("w29"));
        assert_eq!(snippet("", "absent", 3), "");
    }

    #[test]
    fn test_assemble() {
        let document = Document::new("the quiet moon rose").with_title("Night");
        let matched = ScoredDocument::new(7, vec![Hit::new("moon", 0)], Some(1.5));

        let result = assemble(&document, &matched);
        assert_eq!(result.document_id, 7);
        assert_eq!(result.reference.as_deref(), Some("Night"));
        assert_eq!(result.snippet, "the quiet moon rose");
        assert_eq!(result.hit_count, 1);
        assert_eq!(result.score, Some(1.5));
    }
}
