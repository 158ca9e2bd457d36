use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{BurrowError, Result};
use crate::models::Document;

/// JSON-lines corpus addressed by byte offset
///
/// A document's id is the byte offset of its line, so the file must not be
/// rewritten while an index built from it is in use.
pub struct Corpus {
    path: PathBuf,
    file: Mutex<File>,
}

impl Corpus {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    /// Read the document whose line starts at `offset`
    pub fn read_document_at(&self, offset: u64) -> Result<Document> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        let mut line = String::new();
        BufReader::new(&mut *file).read_line(&mut line)?;
        parse_line(offset, &line)
    }

    /// Every document with its offset, in file order
    ///
    /// Uses its own file handle, so random reads through
    /// [`Corpus::read_document_at`] may happen while iterating.
    pub fn documents(&self) -> Result<Documents> {
        Ok(Documents {
            reader: BufReader::new(File::open(&self.path)?),
            offset: 0,
            line: String::new(),
            done: false,
        })
    }
}

fn parse_line(offset: u64, line: &str) -> Result<Document> {
    serde_json::from_str(line).map_err(|source| BurrowError::Corpus { offset, source })
}

/// Lazy iterator over `(offset, document)` pairs
pub struct Documents {
    reader: BufReader<File>,
    offset: u64,
    line: String,
    done: bool,
}

impl Iterator for Documents {
    type Item = Result<(u64, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.line.clear();
            let read = match self.reader.read_line(&mut self.line) {
                Ok(read) => read,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            if read == 0 {
                self.done = true;
                break;
            }

            let offset = self.offset;
            self.offset += read as u64;
            if self.line.trim().is_empty() {
                continue;
            }
            return Some(parse_line(offset, &self.line).map(|doc| (offset, doc)));
        }
        None
    }
}
