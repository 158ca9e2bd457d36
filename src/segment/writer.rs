//! Index build driver
//!
//! Streams the corpus through the text pipeline into a bounded memory
//! index. Whenever the memory index signals it is over budget, it is
//! merged into the index file and cleared; the posting that tripped the
//! limit is already stored and goes out with that merge.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::buffer::MemoryIndex;
use super::postings::validate_token;
use super::store::IndexStore;
use super::types::{DocumentId, Posting};
use crate::config::IndexConfig;
use crate::error::{BurrowError, Result};
use crate::models::Document;
use crate::persistence::Corpus;
use crate::tokenizer::Pipeline;

/// Summary of a finished build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub documents: u64,
    pub postings: u64,
    /// Merges into the index file, including the final one
    pub merges: u64,
    pub index_bytes: u64,
}

/// Builds one index file from a stream of documents
pub struct IndexBuilder<'p> {
    store: IndexStore,
    memory: MemoryIndex,
    pipeline: &'p Pipeline,
    stats: BuildStats,
}

impl<'p> IndexBuilder<'p> {
    /// Truncate the index file and start a new build
    pub fn new(
        index_path: impl AsRef<Path>,
        pipeline: &'p Pipeline,
        memory_limit_bytes: usize,
    ) -> Result<Self> {
        Ok(Self {
            store: IndexStore::open_for_build(index_path)?,
            memory: MemoryIndex::new(memory_limit_bytes),
            pipeline,
            stats: BuildStats::default(),
        })
    }

    /// Add every processed token of a document
    ///
    /// `offset` is the document's byte offset in the corpus and becomes its id.
    pub fn ingest_document(&mut self, offset: u64, document: &Document) -> Result<()> {
        let document_id =
            DocumentId::try_from(offset).map_err(|_| BurrowError::DocumentOffsetOverflow(offset))?;
        let pipeline = self.pipeline;

        let mut postings = 0u64;
        for (position, token) in pipeline.process(&document.text).enumerate() {
            let position =
                u16::try_from(position).map_err(|_| BurrowError::PositionOverflow { position })?;
            validate_token(&token)?;

            match self.memory.add(&token, Posting::new(document_id, position)) {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => self.flush()?,
                Err(e) => return Err(e),
            }
            postings += 1;
        }

        self.stats.documents += 1;
        self.stats.postings += postings;
        debug!(document_id, postings, "ingested document");
        Ok(())
    }

    /// Merge whatever is buffered into the index file
    pub fn flush(&mut self) -> Result<()> {
        if self.memory.is_empty() {
            return Ok(());
        }
        debug!(
            tokens = self.memory.len(),
            size_bytes = self.memory.size_bytes(),
            "flushing memory index"
        );
        self.store.merge(&self.memory)?;
        self.memory.clear();
        self.stats.merges += 1;
        Ok(())
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Final merge; hands back the finished store
    pub fn finish(mut self) -> Result<(IndexStore, BuildStats)> {
        self.flush()?;
        self.stats.index_bytes = self.store.size_bytes()?;
        Ok((self.store, self.stats))
    }
}

/// Build an index file from a corpus
pub fn build_index(
    corpus: &Corpus,
    pipeline: &Pipeline,
    index_path: impl AsRef<Path>,
    memory_limit_bytes: usize,
) -> Result<(IndexStore, BuildStats)> {
    let started = Instant::now();
    let mut builder = IndexBuilder::new(index_path, pipeline, memory_limit_bytes)?;
    for entry in corpus.documents()? {
        let (offset, document) = entry?;
        builder.ingest_document(offset, &document)?;
    }
    let (store, stats) = builder.finish()?;

    info!(
        corpus = %corpus.path().display(),
        index = %store.path().display(),
        documents = stats.documents,
        postings = stats.postings,
        merges = stats.merges,
        index_bytes = stats.index_bytes,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "index build complete"
    );
    Ok((store, stats))
}

/// Build the index described by a configuration
pub fn build_from_config(config: &IndexConfig) -> Result<(IndexStore, BuildStats)> {
    config.validate()?;
    let corpus = Corpus::open(&config.corpus_path)?;
    let pipeline = Pipeline::from_config(&config.tokenizer)?;
    build_index(
        &corpus,
        &pipeline,
        &config.index_path,
        config.memory_limit_bytes,
    )
}
