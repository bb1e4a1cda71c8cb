//! Binary framing for the merged per-query target list.
//!
//! Wire format, little-endian, one record per query:
//! `query_id: u32 | byte_len: u32 | (database_id: u32, score: u16) * n`
//! where `byte_len` is the length of the `(u32,u16)` tail only — six bytes
//! per target — and is back-patched after the tail is written (the
//! "intro/finish" seek-back-and-patch pattern).

use std::io::Read;

use parking_lot::Mutex;

use crate::error::{AlignError, Result};
use crate::types::ReferenceDictionary;

const RECORD_STRIDE: usize = 6; // u32 database_id + u16 score

/// Tracks how many alignment hits landed on each database id, mirroring the
/// `Statistics::TARGET_HITS1` counter this pipeline stage bumps.
#[derive(Debug, Default)]
pub struct Stats {
    pub target_hits1: u64,
}

impl Stats {
    pub fn inc_target_hits1(&mut self) {
        self.target_hits1 += 1;
    }
}

/// Begin a query's record: write its id and a zeroed placeholder length,
/// returning the offset to patch once the target list is known
/// (`finish_merged_query_list`).
pub fn intro(query_id: u32, buf: &mut Vec<u8>) -> usize {
    let seek_pos = buf.len();
    buf.extend_from_slice(&query_id.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    seek_pos
}

/// Append one `(database_id, score)` target record, translating the
/// block-local id through `dict` and marking `ranking_db_filter`.
pub fn write_record(
    r: &crate::types::IntermediateRecord,
    dict: &dyn ReferenceDictionary,
    buf: &mut Vec<u8>,
    ranking_db_filter: &mut bitvec::vec::BitVec,
    stat: &mut Stats,
) {
    let database_id = dict.database_id(r.subject_dict_id);
    buf.extend_from_slice(&database_id.to_le_bytes());
    buf.extend_from_slice(&(r.score as u16).to_le_bytes());
    if database_id as usize >= ranking_db_filter.len() {
        ranking_db_filter.resize(database_id as usize + 1, false);
    }
    ranking_db_filter.set(database_id as usize, true);
    stat.inc_target_hits1();
}

/// Patch the length placeholder written by [`intro`] now that every target
/// record for this query has been appended.
pub fn finish(buf: &mut [u8], seek_pos: usize) {
    let len = (buf.len() - seek_pos - 2 * std::mem::size_of::<u32>()) as u32;
    buf[seek_pos + 4..seek_pos + 8].copy_from_slice(&len.to_le_bytes());
}

/// One query's targets as read back off the merged list.
#[derive(Debug, Clone)]
pub struct QueryList {
    pub last_query_block_id: u32,
    pub query_block_id: u32,
    pub targets: Vec<(u32, u16)>,
    pub end_of_stream: bool,
}

/// Serializes concurrent reads of the merged query list across worker
/// threads — each call hands back the next query's full target list, or
/// `end_of_stream` once the input is exhausted.
pub struct QueryTargetReader<R: Read> {
    state: Mutex<(R, u32)>,
}

impl<R: Read> QueryTargetReader<R> {
    pub fn new(reader: R) -> Self {
        Self { state: Mutex::new((reader, 0)) }
    }

    pub fn fetch_query_targets(&self) -> Result<QueryList> {
        let mut guard = self.state.lock();
        let (reader, next_query) = &mut *guard;
        let last_query_block_id = *next_query;

        let query_block_id = match read_u32_boundary(reader) {
            Ok(v) => v,
            Err(AlignError::EndOfStream) => {
                tracing::debug!(last_query_block_id, "merged query list exhausted");
                return Ok(QueryList { last_query_block_id, query_block_id: 0, targets: Vec::new(), end_of_stream: true });
            }
            Err(e) => return Err(e),
        };
        *next_query = query_block_id + 1;

        let byte_len = read_u32_strict(reader)? as usize;
        if byte_len % RECORD_STRIDE != 0 {
            return Err(AlignError::MalformedRecord(format!(
                "payload length {byte_len} is not a multiple of the {RECORD_STRIDE}-byte record stride"
            )));
        }
        let n = byte_len / RECORD_STRIDE;
        let mut targets = Vec::with_capacity(n);
        for _ in 0..n {
            let target = read_u32_strict(reader)?;
            let score = read_u16_strict(reader)?;
            targets.push((target, score));
        }
        tracing::trace!(query_block_id, targets = targets.len(), "fetched query target list");
        Ok(QueryList { last_query_block_id, query_block_id, targets, end_of_stream: false })
    }
}

/// EOF here is expected (clean end of the stream between queries).
fn read_u32_boundary<R: Read>(r: &mut R) -> Result<u32> {
    let mut b = [0u8; 4];
    match r.read_exact(&mut b) {
        Ok(()) => Ok(u32::from_le_bytes(b)),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(AlignError::EndOfStream),
        Err(e) => Err(AlignError::Io(e)),
    }
}

/// EOF here means a truncated record, not a clean stream end.
fn read_u32_strict<R: Read>(r: &mut R) -> Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b).map_err(|_| AlignError::MalformedRecord("truncated u32 field".into()))?;
    Ok(u32::from_le_bytes(b))
}

fn read_u16_strict<R: Read>(r: &mut R) -> Result<u16> {
    let mut b = [0u8; 2];
    r.read_exact(&mut b).map_err(|_| AlignError::MalformedRecord("truncated u16 field".into()))?;
    Ok(u16::from_le_bytes(b))
}
