use thiserror::Error;

/// Main error type for Burrow operations
#[derive(Error, Debug)]
pub enum BurrowError {
    /// The in-memory index grew past its byte budget. Raised after the
    /// posting has been stored; the caller is expected to flush and clear.
    #[error("In-memory index exceeded its limit: {size} bytes > {limit} bytes")]
    CapacityExceeded { limit: usize, size: usize },

    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token '{token}' has {count} postings, more than a record can hold")]
    TermFrequencyOverflow { token: String, count: u64 },

    #[error("Invalid token: {0:?}")]
    InvalidToken(String),

    #[error("Token position {position} does not fit in 16 bits")]
    PositionOverflow { position: usize },

    #[error("Document offset {0} does not fit in 32 bits")]
    DocumentOffsetOverflow(u64),

    #[error("Malformed corpus line at offset {offset}: {source}")]
    Corpus {
        offset: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for Burrow operations
pub type Result<T> = std::result::Result<T, BurrowError>;

impl BurrowError {
    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        BurrowError::CorruptIndex(message.into())
    }

    /// Check if this error is a flush signal rather than a failure
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BurrowError::CapacityExceeded { .. })
    }
}
