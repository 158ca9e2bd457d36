use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A corpus document
///
/// Corpus lines either carry `text` directly or a `verses` array of
/// `{"text": ...}` objects, which are joined with single spaces. Any other
/// fields are kept in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            title: None,
            text: text.into(),
            extra: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Human-readable label: the title, or `book chapter` when the corpus
    /// carries those fields instead
    pub fn reference(&self) -> Option<String> {
        if let Some(title) = &self.title {
            return Some(title.clone());
        }
        let field = |name: &str| match self.extra.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        let book = field("book").or_else(|| field("buch"));
        let chapter = field("chapter").or_else(|| field("kapitel"));
        match (book, chapter) {
            (Some(book), Some(chapter)) => Some(format!("{} {}", book, chapter)),
            (Some(book), None) => Some(book),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    verses: Vec<Verse>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct Verse {
    text: String,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        let text = match raw.text {
            Some(text) => text,
            None => raw
                .verses
                .iter()
                .map(|v| v.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        };
        Self {
            title: raw.title,
            text,
            extra: raw.extra,
        }
    }
}
