//! Persistent index store: one sorted file of token records

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

use super::buffer::MemoryIndex;
use super::merge::{merge_streams, MergeStats};
use super::postings::{read_record_header, PostingCursor, ReadMode, RecordWriter, SharedFile};
use super::types::{IndexPointer, POSTING_SIZE};
use crate::error::{BurrowError, Result};

/// Read buffer for record headers; tokens are short
const HEADER_READ_BUFFER: usize = 128;

/// The on-disk inverted index
///
/// Owns the only handle to the index file. Cursors handed out by
/// [`IndexStore::scan`] and [`IndexStore::read_postings`] share it.
pub struct IndexStore {
    path: PathBuf,
    file: SharedFile,
}

impl IndexStore {
    /// Create or truncate the index file for a new build
    pub fn open_for_build(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        debug!(path = %path.display(), "truncated index file");
        Self::open(path)
    }

    /// Open an existing index file for querying
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the index file in bytes
    pub fn size_bytes(&self) -> Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    /// Single forward pass over every record in file order
    pub fn scan(&self) -> Result<Scan<'_>> {
        let file_len = self.size_bytes()?;
        Ok(Scan {
            file: &self.file,
            offset: 0,
            file_len,
            done: false,
        })
    }

    /// Open a conflict-safe cursor over `posting_count` postings at `offset`
    pub fn read_postings(&self, posting_count: u32, offset: u64) -> PostingCursor {
        self.read_postings_with(posting_count, offset, ReadMode::ConflictSafe)
    }

    pub fn read_postings_with(
        &self,
        posting_count: u32,
        offset: u64,
        mode: ReadMode,
    ) -> PostingCursor {
        PostingCursor::new(self.file.clone(), offset, posting_count, mode)
    }

    pub fn read_pointer(&self, pointer: IndexPointer) -> PostingCursor {
        self.read_postings(pointer.posting_count, pointer.offset)
    }

    /// Fold a memory index into the store
    ///
    /// The merged output goes to a temporary file next to the index which
    /// replaces it only once fully written. On error the previous index file
    /// is left untouched.
    pub fn merge(&mut self, memory: &MemoryIndex) -> Result<MergeStats> {
        let started = Instant::now();
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let tmp = NamedTempFile::new_in(&dir)?;
        let mut writer = RecordWriter::new(BufWriter::new(tmp));
        let stats = merge_streams(self.scan()?, memory.iter(), &mut writer)?;

        let tmp = writer
            .finish()?
            .into_inner()
            .map_err(|e| BurrowError::Io(e.into_error()))?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| BurrowError::Io(e.error))?;

        // Outstanding cursors keep the replaced file; new ones see the merged one
        self.file = Arc::new(Mutex::new(File::open(&self.path)?));

        debug!(
            path = %self.path.display(),
            buffered_tokens = memory.len(),
            records = stats.records,
            postings = stats.postings,
            bytes = stats.bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "merged memory index into store"
        );
        Ok(stats)
    }
}

/// One record produced by a scan
pub struct TermRecord {
    pub token: String,
    /// Offset of the first posting, just past the count field
    pub offset: u64,
    pub posting_count: u32,
    /// Lazy postings of this record. Leaving them unread is fine.
    pub postings: PostingCursor,
}

impl TermRecord {
    pub fn pointer(&self) -> IndexPointer {
        IndexPointer::new(self.offset, self.posting_count)
    }
}

/// Forward scan over the index file
///
/// Tracks its own offset so it can interleave with posting cursors on the
/// shared handle.
pub struct Scan<'a> {
    file: &'a SharedFile,
    /// Offset of the next record header
    offset: u64,
    file_len: u64,
    done: bool,
}

impl Scan<'_> {
    fn read_next(&mut self) -> Result<Option<TermRecord>> {
        let header = {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(self.offset))?;
            let mut reader = BufReader::with_capacity(HEADER_READ_BUFFER, &mut *file);
            read_record_header(&mut reader)?
        };
        let Some(header) = header else {
            return Ok(None);
        };

        let offset = self.offset + header.encoded_len;
        let end = offset + header.posting_count as u64 * POSTING_SIZE as u64;
        if end > self.file_len {
            return Err(BurrowError::corrupt(format!(
                "record '{}' extends past end of index file ({} > {})",
                header.token, end, self.file_len
            )));
        }
        self.offset = end;

        Ok(Some(TermRecord {
            postings: PostingCursor::new(
                self.file.clone(),
                offset,
                header.posting_count,
                ReadMode::ConflictSafe,
            ),
            token: header.token,
            offset,
            posting_count: header.posting_count,
        }))
    }
}

impl Iterator for Scan<'_> {
    type Item = Result<TermRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
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
