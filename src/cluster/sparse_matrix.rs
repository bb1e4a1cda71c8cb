//! Streaming, memory-bounded sparse similarity graph.
//!
//! Edges are accumulated in memory (max-merge on a `(row, col)` collision,
//! ordered by row then column) until the buffer crosses a configured
//! memory ceiling, at which point connected components are computed from
//! the disjoint set accumulated so far and each component's edges are
//! flushed to disk as one length-prefixed block. The on-disk format is:
//!
//! ```text
//! header:  n: u64 | index_version: u32 (always 0)
//! block*:  first_index: u32 | edge_count: u32 | edge(16B)*
//! edge:    row: u32 | col: u32 | value: f64
//! ```

use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{AlignError, Result};

use super::disjoint_set::{DisjointSet, LazyDisjointIntegralSet, LazyDisjointTypeSet};

const EDGE_STRIDE: usize = 4 + 4 + 8;
const HEADER_STRIDE: usize = 8 + 4;
const INDEX_VERSION: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparseEdge {
    pub row: u32,
    pub col: u32,
    pub value: f64,
}

pub struct SparseMatrixStream {
    n: usize,
    max_size_bytes: u64,
    data: BTreeMap<(u32, u32), f64>,
    disjoint: Box<dyn DisjointSet>,
    sink: Option<std::fs::File>,
}

impl SparseMatrixStream {
    /// Builds against the full `0..n` universe, spilling components to
    /// `graph_path` once `set_max_mem` is crossed.
    pub fn new(n: usize, graph_path: Option<&std::path::Path>) -> Result<Self> {
        let sink = match graph_path {
            Some(p) => {
                let mut f = std::fs::File::create(p)?;
                f.write_all(&(n as u64).to_le_bytes())?;
                f.write_all(&INDEX_VERSION.to_le_bytes())?;
                Some(f)
            }
            None => None,
        };
        Ok(Self {
            n,
            max_size_bytes: 2 * 1024 * 1024 * 1024, // 2 GiB default flush threshold
            data: BTreeMap::new(),
            disjoint: Box::new(LazyDisjointIntegralSet::new(n)),
            sink,
        })
    }

    /// Builds restricted to `ids`, used when rebuilding the components that
    /// touch a specific subset (`collect_components`).
    pub fn restricted(ids: &HashSet<u32>) -> Self {
        Self {
            n: ids.len(),
            max_size_bytes: 2 * 1024 * 1024 * 1024,
            data: BTreeMap::new(),
            disjoint: Box::new(LazyDisjointTypeSet::new(ids)),
            sink: None,
        }
    }

    pub fn set_max_mem(&mut self, bytes: u64) {
        self.max_size_bytes = bytes;
    }

    pub fn num_edges(&self) -> usize {
        self.data.len()
    }

    /// Insert one edge, max-merging into an existing `(row, col)` entry,
    /// then spill if the in-memory buffer crossed the memory ceiling.
    pub fn insert(&mut self, edge: SparseEdge) -> Result<()> {
        let key = (edge.row, edge.col);
        match self.data.get(&key) {
            None => {
                self.data.insert(key, edge.value);
                self.disjoint.merge(edge.row, edge.col);
            }
            Some(&existing) if edge.value > existing => {
                self.data.insert(key, edge.value);
            }
            Some(_) => {}
        }
        if self.sink.is_some() && self.estimated_bytes() >= self.max_size_bytes {
            self.dump()?;
            self.data.clear();
        }
        Ok(())
    }

    /// Parse a raw byte buffer of back-to-back edges (wire chunk) and
    /// insert each one. Mirrors `SparseMatrixStream::consume`.
    pub fn consume(&mut self, bytes: &[u8]) -> Result<()> {
        for edge in decode_edges(bytes)? {
            self.insert(edge)?;
        }
        Ok(())
    }

    /// Like [`consume`](Self::consume) but only folds edges into the
    /// disjoint set, without retaining them — used to rebuild component
    /// membership from a graph file without materializing every edge.
    pub fn build_graph(&mut self, bytes: &[u8]) -> Result<()> {
        for edge in decode_edges(bytes)? {
            self.disjoint.merge(edge.row, edge.col);
        }
        Ok(())
    }

    fn estimated_bytes(&self) -> u64 {
        (self.data.len() * EDGE_STRIDE) as u64
    }

    fn component_indices(&self) -> Vec<Vec<u32>> {
        self.disjoint.list_of_sets().into_iter().map(|s| {
            let mut v: Vec<u32> = s.into_iter().collect();
            v.sort_unstable();
            v
        }).collect()
    }

    /// Write every buffered edge, grouped by connected component, as one
    /// length-prefixed block per component with at least one edge.
    pub fn dump(&mut self) -> Result<()> {
        let Some(sink) = self.sink.as_mut() else { return Ok(()) };
        if self.data.is_empty() {
            return Ok(());
        }
        let indices = self.component_indices();
        let mut index_to_set: std::collections::HashMap<u32, usize> = std::collections::HashMap::new();
        for (iset, ids) in indices.iter().enumerate() {
            for &id in ids {
                index_to_set.insert(id, iset);
            }
        }
        let mut by_component: Vec<Vec<SparseEdge>> = vec![Vec::new(); indices.len()];
        for (&(row, col), &value) in self.data.iter() {
            let iset = index_to_set[&row];
            by_component[iset].push(SparseEdge { row, col, value });
        }
        let mut blocks_written = 0usize;
        for (iset, edges) in by_component.into_iter().enumerate() {
            if edges.is_empty() {
                continue;
            }
            let first_index = indices[iset][0];
            sink.write_all(&first_index.to_le_bytes())?;
            sink.write_all(&(edges.len() as u32).to_le_bytes())?;
            for e in edges {
                sink.write_all(&e.row.to_le_bytes())?;
                sink.write_all(&e.col.to_le_bytes())?;
                sink.write_all(&e.value.to_le_bytes())?;
            }
            blocks_written += 1;
        }
        tracing::debug!(blocks_written, edges = self.data.len(), "spilled component blocks to graph file");
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.dump()?;
        self.data.clear();
        Ok(())
    }

    pub fn get_indices(&self) -> Vec<Vec<u32>> {
        self.component_indices()
    }

    /// Rebuild full component membership (no edge data kept) by streaming
    /// every block of `graph_path` through [`build_graph`](Self::build_graph).
    pub fn from_file(graph_path: &std::path::Path) -> Result<Self> {
        let mut f = std::fs::File::open(graph_path)?;
        let n = read_header(&mut f)?;
        let mut sms = Self::new(n, None)?;
        const BUF_CAP: usize = 5 * 1024 * 1024;
        let buf_cap = (BUF_CAP / EDGE_STRIDE) * EDGE_STRIDE;
        let mut buffer = vec![0u8; buf_cap];
        let mut blocks_read = 0usize;
        loop {
            let Some((_first, size)) = read_block_header(&mut f)? else { break };
            let mut remaining = size as usize * EDGE_STRIDE;
            while remaining > 0 {
                let take = remaining.min(buf_cap);
                f.read_exact(&mut buffer[..take])?;
                sms.build_graph(&buffer[..take])?;
                remaining -= take;
            }
            blocks_read += 1;
        }
        tracing::debug!(n, blocks_read, "rebuilt full component membership from graph file");
        Ok(sms)
    }

    /// Rebuild only the connected components touching `indices`, reading at
    /// most a 5 MiB scratch buffer regardless of component size (each
    /// caller is expected to be one of several concurrent worker threads).
    pub fn collect_components(indices: &[Vec<u32>], graph_path: &std::path::Path) -> Result<Vec<Vec<SparseEdge>>> {
        let mut f = std::fs::File::open(graph_path)?;
        let _n = read_header(&mut f)?;

        let wanted: HashSet<u32> = indices.iter().flatten().copied().collect();
        let mut sms = Self::restricted(&wanted);

        const BUF_CAP: usize = 5 * 1024 * 1024;
        let mut buffer = vec![0u8; BUF_CAP];
        let mut blocks_consumed = 0usize;
        let mut blocks_skipped = 0usize;
        loop {
            let Some((first, size)) = read_block_header(&mut f)? else { break };
            let block_bytes = size as usize * EDGE_STRIDE;
            if wanted.contains(&first) {
                let mut remaining = block_bytes;
                while remaining > 0 {
                    let take = remaining.min(BUF_CAP - (BUF_CAP % EDGE_STRIDE));
                    f.read_exact(&mut buffer[..take])?;
                    sms.consume(&buffer[..take])?;
                    remaining -= take;
                }
                blocks_consumed += 1;
            } else {
                f.seek(SeekFrom::Current(block_bytes as i64))?;
                blocks_skipped += 1;
            }
        }
        tracing::debug!(wanted = wanted.len(), blocks_consumed, blocks_skipped, "rebuilt requested components from graph file");
        Ok(sms.get_components(indices))
    }

    fn get_components(&self, indices: &[Vec<u32>]) -> Vec<Vec<SparseEdge>> {
        let mut index_to_set: std::collections::HashMap<u32, usize> = std::collections::HashMap::new();
        for (iset, ids) in indices.iter().enumerate() {
            for &id in ids {
                index_to_set.insert(id, iset);
            }
        }
        let mut by_component: Vec<Vec<SparseEdge>> = vec![Vec::new(); indices.len()];
        for (&(row, col), &value) in self.data.iter() {
            if let Some(&iset) = index_to_set.get(&row) {
                by_component[iset].push(SparseEdge { row, col, value });
            }
        }
        by_component.into_iter().filter(|c| !c.is_empty()).collect()
    }
}

fn decode_edges(bytes: &[u8]) -> Result<Vec<SparseEdge>> {
    if bytes.len() % EDGE_STRIDE != 0 {
        return Err(AlignError::MalformedRecord("edge buffer not a multiple of the 16-byte edge stride".into()));
    }
    let mut out = Vec::with_capacity(bytes.len() / EDGE_STRIDE);
    for chunk in bytes.chunks_exact(EDGE_STRIDE) {
        let row = u32::from_le_bytes(chunk[0..4].try_into().unwrap());
        let col = u32::from_le_bytes(chunk[4..8].try_into().unwrap());
        let value = f64::from_le_bytes(chunk[8..16].try_into().unwrap());
        out.push(SparseEdge { row, col, value });
    }
    Ok(out)
}

fn read_header(f: &mut std::fs::File) -> Result<usize> {
    let mut b = [0u8; HEADER_STRIDE];
    f.read_exact(&mut b).map_err(|_| AlignError::MalformedRecord("truncated graph file header".into()))?;
    let n = u64::from_le_bytes(b[0..8].try_into().unwrap()) as usize;
    let version = u32::from_le_bytes(b[8..12].try_into().unwrap());
    if version != INDEX_VERSION {
        return Err(AlignError::UnsupportedVersion(version));
    }
    Ok(n)
}

fn read_block_header(f: &mut std::fs::File) -> Result<Option<(u32, u32)>> {
    let mut b = [0u8; 8];
    match f.read_exact(&mut b) {
        Ok(()) => {
            let first = u32::from_le_bytes(b[0..4].try_into().unwrap());
            let size = u32::from_le_bytes(b[4..8].try_into().unwrap());
            Ok(Some((first, size)))
        }
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(AlignError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_max_merges_colliding_edges() {
        let mut sms = SparseMatrixStream::new(4, None).unwrap();
        sms.insert(SparseEdge { row: 0, col: 1, value: 0.5 }).unwrap();
        sms.insert(SparseEdge { row: 0, col: 1, value: 0.9 }).unwrap();
        sms.insert(SparseEdge { row: 0, col: 1, value: 0.1 }).unwrap();
        assert_eq!(sms.num_edges(), 1);
        assert_eq!(sms.data[&(0, 1)], 0.9);
    }

    #[test]
    fn insert_merges_disjoint_set_membership() {
        let mut sms = SparseMatrixStream::new(5, None).unwrap();
        sms.insert(SparseEdge { row: 0, col: 1, value: 1.0 }).unwrap();
        sms.insert(SparseEdge { row: 1, col: 2, value: 1.0 }).unwrap();
        let indices = sms.get_indices();
        let component = indices.iter().find(|c| c.contains(&0)).unwrap();
        assert!(component.contains(&1) && component.contains(&2));
    }

    #[test]
    fn dump_and_from_file_roundtrip_component_membership() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.bin");
        {
            let mut sms = SparseMatrixStream::new(6, Some(&path)).unwrap();
            sms.insert(SparseEdge { row: 0, col: 1, value: 1.0 }).unwrap();
            sms.insert(SparseEdge { row: 1, col: 2, value: 1.0 }).unwrap();
            sms.insert(SparseEdge { row: 4, col: 5, value: 1.0 }).unwrap();
            sms.flush().unwrap();
        }
        let rebuilt = SparseMatrixStream::from_file(&path).unwrap();
        let indices = rebuilt.get_indices();
        assert_eq!(indices.len(), 3); // {0,1,2}, {3}, {4,5}
        let big = indices.iter().find(|c| c.contains(&0)).unwrap();
        assert!(big.contains(&1) && big.contains(&2));
    }

    #[test]
    fn collect_components_only_rebuilds_requested_subset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.bin");
        {
            let mut sms = SparseMatrixStream::new(6, Some(&path)).unwrap();
            sms.insert(SparseEdge { row: 0, col: 1, value: 2.0 }).unwrap();
            sms.insert(SparseEdge { row: 4, col: 5, value: 3.0 }).unwrap();
            sms.flush().unwrap();
        }
        let components = SparseMatrixStream::collect_components(&[vec![4, 5]], &path).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 1);
        assert_eq!(components[0][0].value, 3.0);
    }
}
