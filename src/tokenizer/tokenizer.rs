use unicode_segmentation::UnicodeSegmentation;

use super::pipeline::TokenStream;
use crate::segment::DELIMITER;

/// Splits raw text into words on Unicode word boundaries
#[derive(Clone, Debug)]
pub struct UnicodeTokenizer {
    lowercase: bool,
}

impl UnicodeTokenizer {
    pub fn new(lowercase: bool) -> Self {
        Self { lowercase }
    }

    /// Tokenize text into a lazy stream of words
    ///
    /// The index record delimiter never survives tokenization.
    pub fn tokenize<'a>(&self, text: &'a str) -> TokenStream<'a> {
        let lowercase = self.lowercase;
        Box::new(text.unicode_words().filter_map(move |word| {
            let mut token: String = word.chars().filter(|&c| c != DELIMITER as char).collect();
            if token.is_empty() {
                return None;
            }
            if lowercase {
                token = token.to_lowercase();
            }
            Some(token)
        }))
    }
}

impl Default for UnicodeTokenizer {
    fn default() -> Self {
        Self::new(true)
    }
}
