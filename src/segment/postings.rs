//! Byte-exact record codec and posting cursors
//!
//! Index file layout, repeated until end of file:
//! - token bytes (UTF-8, never containing `#`)
//! - delimiter `#` (0x23)
//! - posting count: 3 bytes, little endian
//! - postings: count x (document id: u32 LE, position: u16 LE)

use std::fs::File;
use std::io::{self, BufRead, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use super::types::{Posting, COUNT_SIZE, DELIMITER, MAX_POSTING_COUNT, POSTING_SIZE};
use crate::error::{BurrowError, Result};

/// File handle shared by every cursor reading the same index file
pub(crate) type SharedFile = Arc<Mutex<File>>;

/// Postings fetched from the file per underlying read
pub const CURSOR_BATCH_POSTINGS: usize = 256;

/// Encode a posting as 6 little-endian bytes
pub fn encode_posting(posting: &Posting) -> [u8; POSTING_SIZE] {
    let mut buf = [0u8; POSTING_SIZE];
    buf[0..4].copy_from_slice(&posting.document_id.to_le_bytes());
    buf[4..6].copy_from_slice(&posting.position.to_le_bytes());
    buf
}

/// Decode a posting from 6 little-endian bytes
pub fn decode_posting(buf: &[u8; POSTING_SIZE]) -> Posting {
    Posting {
        document_id: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
        position: u16::from_le_bytes([buf[4], buf[5]]),
    }
}

/// Encode a posting count into 3 little-endian bytes
pub fn encode_count(count: u32) -> Option<[u8; COUNT_SIZE]> {
    if count > MAX_POSTING_COUNT {
        return None;
    }
    let bytes = count.to_le_bytes();
    Some([bytes[0], bytes[1], bytes[2]])
}

pub fn decode_count(buf: [u8; COUNT_SIZE]) -> u32 {
    u32::from_le_bytes([buf[0], buf[1], buf[2], 0])
}

/// Check that a token can be stored as a record key
pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() || token.as_bytes().contains(&DELIMITER) {
        return Err(BurrowError::InvalidToken(token.to_string()));
    }
    Ok(())
}

/// Encode `<token>#<count>` for the start of a record
pub fn encode_record_header(token: &str, posting_count: u64) -> Result<Vec<u8>> {
    validate_token(token)?;
    let count = u32::try_from(posting_count)
        .ok()
        .and_then(encode_count)
        .ok_or_else(|| BurrowError::TermFrequencyOverflow {
            token: token.to_string(),
            count: posting_count,
        })?;

    let mut header = Vec::with_capacity(token.len() + 1 + COUNT_SIZE);
    header.extend_from_slice(token.as_bytes());
    header.push(DELIMITER);
    header.extend_from_slice(&count);
    Ok(header)
}

/// Decoded record header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    pub token: String,
    pub posting_count: u32,
    /// Bytes occupied by token, delimiter and count
    pub encoded_len: u64,
}

/// Read a record header from the reader's current position
///
/// Returns `None` on a clean end of file. Running out of bytes anywhere
/// inside the header is reported as a corrupt index.
pub fn read_record_header<R: BufRead>(reader: &mut R) -> Result<Option<RecordHeader>> {
    let mut token = Vec::new();
    let read = reader.read_until(DELIMITER, &mut token)?;
    if read == 0 {
        return Ok(None);
    }
    if token.pop() != Some(DELIMITER) {
        return Err(BurrowError::corrupt(
            "reached end of index file before token delimiter",
        ));
    }

    let mut count = [0u8; COUNT_SIZE];
    reader.read_exact(&mut count).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            BurrowError::corrupt("reached end of index file inside posting count")
        }
        _ => BurrowError::Io(e),
    })?;

    let token = String::from_utf8(token)
        .map_err(|_| BurrowError::corrupt("token is not valid UTF-8"))?;
    if token.is_empty() {
        return Err(BurrowError::corrupt("empty token"));
    }

    Ok(Some(RecordHeader {
        token,
        posting_count: decode_count(count),
        encoded_len: (read + COUNT_SIZE) as u64,
    }))
}

/// Streaming writer for index records
///
/// Checks the format invariants while writing: tokens strictly ascending
/// and every record holding exactly as many postings as it declares.
pub struct RecordWriter<W: Write> {
    inner: W,
    last_token: Option<String>,
    /// Postings still owed to the current record
    remaining: u64,
    bytes_written: u64,
    records: u64,
    postings: u64,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            last_token: None,
            remaining: 0,
            bytes_written: 0,
            records: 0,
            postings: 0,
        }
    }

    /// Start a new record
    pub fn start_record(&mut self, token: &str, posting_count: u64) -> Result<()> {
        if self.remaining != 0 {
            return Err(BurrowError::corrupt(format!(
                "record '{}' is missing {} postings",
                self.last_token.as_deref().unwrap_or_default(),
                self.remaining
            )));
        }
        if let Some(last) = &self.last_token {
            if token <= last.as_str() {
                return Err(BurrowError::corrupt(format!(
                    "token '{}' written after '{}'",
                    token, last
                )));
            }
        }

        let header = encode_record_header(token, posting_count)?;
        self.inner.write_all(&header)?;
        self.bytes_written += header.len() as u64;
        self.records += 1;
        self.remaining = posting_count;
        self.last_token = Some(token.to_string());
        Ok(())
    }

    /// Write the next posting of the current record
    pub fn write_posting(&mut self, posting: &Posting) -> Result<()> {
        if self.remaining == 0 {
            return Err(BurrowError::corrupt(format!(
                "record '{}' received more postings than declared",
                self.last_token.as_deref().unwrap_or_default()
            )));
        }
        self.inner.write_all(&encode_posting(posting))?;
        self.bytes_written += POSTING_SIZE as u64;
        self.postings += 1;
        self.remaining -= 1;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn postings(&self) -> u64 {
        self.postings
    }

    /// Finish writing and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        if self.remaining != 0 {
            return Err(BurrowError::corrupt(format!(
                "record '{}' is missing {} postings",
                self.last_token.as_deref().unwrap_or_default(),
                self.remaining
            )));
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// How a cursor positions the shared file handle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadMode {
    /// Seek once, then read from wherever the handle is. Only valid while
    /// no other reader touches the handle.
    Sequential,
    /// Seek to the cursor's own offset before every read. Required when
    /// several cursors interleave on one handle.
    ConflictSafe,
}

/// Lazy reader over one posting list
///
/// Holds at most [`CURSOR_BATCH_POSTINGS`] decoded postings at a time.
pub struct PostingCursor {
    file: SharedFile,
    mode: ReadMode,
    /// File offset of the next posting not yet fetched
    offset: u64,
    /// Postings not yet fetched from the file
    unread: u32,
    posting_count: u32,
    seeked: bool,
    batch: Vec<Posting>,
    batch_pos: usize,
    bytes: Vec<u8>,
    failed: bool,
}

impl PostingCursor {
    pub(crate) fn new(file: SharedFile, offset: u64, posting_count: u32, mode: ReadMode) -> Self {
        Self {
            file,
            mode,
            offset,
            unread: posting_count,
            posting_count,
            seeked: false,
            batch: Vec::new(),
            batch_pos: 0,
            bytes: Vec::new(),
            failed: false,
        }
    }

    /// Total postings in the list
    pub fn posting_count(&self) -> u32 {
        self.posting_count
    }

    /// Postings not yet returned
    pub fn remaining(&self) -> u32 {
        self.unread + (self.batch.len() - self.batch_pos) as u32
    }

    fn fill_batch(&mut self) -> Result<()> {
        let n = (self.unread as usize).min(CURSOR_BATCH_POSTINGS);
        self.bytes.resize(n * POSTING_SIZE, 0);

        {
            let mut file = self.file.lock();
            if self.mode == ReadMode::ConflictSafe || !self.seeked {
                file.seek(SeekFrom::Start(self.offset))?;
                self.seeked = true;
            }
            file.read_exact(&mut self.bytes).map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => BurrowError::corrupt(format!(
                    "posting list truncated at offset {}",
                    self.offset
                )),
                _ => BurrowError::Io(e),
            })?;
        }

        self.batch.clear();
        self.batch_pos = 0;
        for chunk in self.bytes.chunks_exact(POSTING_SIZE) {
            let mut buf = [0u8; POSTING_SIZE];
            buf.copy_from_slice(chunk);
            self.batch.push(decode_posting(&buf));
        }
        self.offset += (n * POSTING_SIZE) as u64;
        self.unread -= n as u32;
        Ok(())
    }
}

impl Iterator for PostingCursor {
    type Item = Result<Posting>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.batch_pos == self.batch.len() {
            if self.unread == 0 {
                return None;
            }
            if let Err(e) = self.fill_batch() {
                self.failed = true;
                return Some(Err(e));
            }
        }
        let posting = self.batch[self.batch_pos];
        self.batch_pos += 1;
        Some(Ok(posting))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        (0, Some(self.remaining() as usize))
    }
}
