//! Two-way sorted merge of the index file with a memory index
//!
//! Every flush re-merges the whole file with the buffered terms into one
//! new sorted run. Within a token shared by both sides, postings are
//! merged by document id; on an equal document id the on-disk posting is
//! written first.

use std::cmp::Ordering;
use std::io::Write;

use tracing::debug;

use super::buffer::BufferedTerm;
use super::postings::RecordWriter;
use super::store::TermRecord;
use super::types::Posting;
use crate::error::Result;

/// Summary of one merge
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records written to the new file
    pub records: u64,
    pub postings: u64,
    pub bytes: u64,
    /// Records copied unchanged from the old file
    pub stored_only: u64,
    /// Records coming only from the memory index
    pub fresh_only: u64,
    /// Records present on both sides
    pub combined: u64,
}

/// Merge the stored records with the buffered terms into `out`
///
/// Both inputs must be in ascending token order; `out` rejects anything
/// else as a corrupt index.
pub fn merge_streams<'a, S, F, W>(
    mut stored: S,
    mut fresh: F,
    out: &mut RecordWriter<W>,
) -> Result<MergeStats>
where
    S: Iterator<Item = Result<TermRecord>>,
    F: Iterator<Item = BufferedTerm<'a>>,
    W: Write,
{
    let mut stats = MergeStats::default();
    let mut stored_head = stored.next().transpose()?;
    let mut fresh_head = fresh.next();

    loop {
        match (stored_head.take(), fresh_head.take()) {
            (None, None) => break,
            (Some(record), None) => {
                copy_stored(record, out)?;
                stats.stored_only += 1;
                stored_head = stored.next().transpose()?;
            }
            (None, Some(term)) => {
                write_fresh(term, out)?;
                stats.fresh_only += 1;
                fresh_head = fresh.next();
            }
            (Some(record), Some(term)) => match record.token.as_str().cmp(term.token) {
                Ordering::Less => {
                    copy_stored(record, out)?;
                    stats.stored_only += 1;
                    stored_head = stored.next().transpose()?;
                    fresh_head = Some(term);
                }
                Ordering::Greater => {
                    write_fresh(term, out)?;
                    stats.fresh_only += 1;
                    stored_head = Some(record);
                    fresh_head = fresh.next();
                }
                Ordering::Equal => {
                    combine(record, term, out)?;
                    stats.combined += 1;
                    stored_head = stored.next().transpose()?;
                    fresh_head = fresh.next();
                }
            },
        }
    }

    stats.records = out.records();
    stats.postings = out.postings();
    stats.bytes = out.bytes_written();
    debug!(
        stored_only = stats.stored_only,
        fresh_only = stats.fresh_only,
        combined = stats.combined,
        "merge streams exhausted"
    );
    Ok(stats)
}

fn copy_stored<W: Write>(record: TermRecord, out: &mut RecordWriter<W>) -> Result<()> {
    out.start_record(&record.token, record.posting_count as u64)?;
    for posting in record.postings {
        out.write_posting(&posting?)?;
    }
    Ok(())
}

fn write_fresh<W: Write>(term: BufferedTerm<'_>, out: &mut RecordWriter<W>) -> Result<()> {
    out.start_record(term.token, term.posting_count() as u64)?;
    for posting in term.postings {
        out.write_posting(posting)?;
    }
    Ok(())
}

fn combine<W: Write>(
    record: TermRecord,
    term: BufferedTerm<'_>,
    out: &mut RecordWriter<W>,
) -> Result<()> {
    let total = record.posting_count as u64 + term.posting_count() as u64;
    out.start_record(&record.token, total)?;

    let mut disk = record.postings;
    let mut disk_head: Option<Posting> = disk.next().transpose()?;
    let mut buffered = term.postings.iter().peekable();

    loop {
        match (disk_head, buffered.peek()) {
            (Some(d), Some(&&b)) => {
                if b.document_id < d.document_id {
                    out.write_posting(&b)?;
                    buffered.next();
                } else {
                    out.write_posting(&d)?;
                    disk_head = disk.next().transpose()?;
                }
            }
            (Some(d), None) => {
                out.write_posting(&d)?;
                disk_head = disk.next().transpose()?;
            }
            (None, Some(&&b)) => {
                out.write_posting(&b)?;
                buffered.next();
            }
            (None, None) => break,
        }
    }
    Ok(())
}
