//! SIMD-style SWIPE local-alignment kernel, generalized over [`ScoreInt`] so
//! the same column loop serves the i8 → i16 → i32 precision escalation
//! without duplicating the recurrence.

pub mod matrix;
pub mod profile;
pub mod target_buffer;

use crate::score_vector::{ScoreInt, Vector, LANES};
use crate::types::Hsp;
use matrix::Matrix;
use profile::{ScoreMatrix, SwipeProfile};
use target_buffer::TargetBuffer;

/// Affine-gap Smith-Waterman cell update for one query row, one column,
/// `LANES` targets wide. `vgap` is the caller's running vertical-gap state
/// for this column (reset to zero at the top of each column); `hgap`/`best`
/// are read-modify-write through the column iterator and the lane's
/// best-score accumulator respectively.
#[inline]
fn swipe_cell_update<S: ScoreInt>(
    diag: Vector<S, LANES>,
    profile_score: Vector<S, LANES>,
    extend_penalty: Vector<S, LANES>,
    open_penalty: Vector<S, LANES>,
    hgap: &mut Vector<S, LANES>,
    vgap: &mut Vector<S, LANES>,
    best: &mut Vector<S, LANES>,
) -> Vector<S, LANES> {
    let diag_score = diag.saturating_add(&profile_score).max(&Vector::zero());
    let score = diag_score.max(hgap).max(vgap);
    *best = best.max(&score);
    let opened = score.saturating_sub(&open_penalty);
    *hgap = opened.max(&hgap.saturating_sub(&extend_penalty));
    *vgap = opened.max(&vgap.saturating_sub(&extend_penalty));
    score
}

/// One precision layer of the SWIPE driver: aligns `query` against every
/// sequence in `subjects`, recycling lanes as targets finish or a lane's
/// running best saturates `S::MAX_SCORE`. Returns the accepted HSPs (target
/// indices are local to `subjects`) and the local indices that overflowed
/// and must be rescored at the next precision.
pub fn run_swipe_layer<S: ScoreInt>(
    query: &[u8],
    subjects: &[&[u8]],
    score_cutoff: i32,
    matrix: &dyn ScoreMatrix,
    gap_open: i32,
    gap_extend: i32,
) -> (Vec<Hsp>, Vec<usize>) {
    let mut out = Vec::new();
    let mut overflow = Vec::new();
    if subjects.is_empty() {
        return (out, overflow);
    }

    let qlen = query.len();
    let mut dp = Matrix::<S>::new(qlen);
    let mut targets = TargetBuffer::new(subjects);
    let mut best = Vector::<S, LANES>::zero();
    let mut profile = SwipeProfile::<S>::new(matrix);
    let open_penalty = Vector::<S, LANES>::splat(S::from_i32(gap_open + gap_extend));
    let extend_penalty = Vector::<S, LANES>::splat(S::from_i32(gap_extend));

    while !targets.active.is_empty() {
        profile.set(targets.seq_vector());
        let mut vgap = Vector::<S, LANES>::zero();
        let mut last = Vector::<S, LANES>::zero();
        let mut col = dp.begin();
        for query_letter in query.iter().copied() {
            let mut hgap = col.hgap();
            let diag = col.diag();
            let profile_score = profile.get(query_letter);
            let next = swipe_cell_update(diag, profile_score, extend_penalty, open_penalty, &mut hgap, &mut vgap, &mut best);
            col.set_hgap(hgap);
            col.set_score(last);
            last = next;
            col.advance();
        }
        col.set_score(last);

        let mut i = 0;
        while i < targets.active.len() {
            let lane = targets.active[i];
            let mut advance = true;
            if best.extract_channel(lane) == S::MAX_SCORE {
                overflow.push(targets.target_index(lane));
                if targets.init_target(i, lane) {
                    dp.set_zero(lane);
                    best.set_channel(lane, S::ZERO_SCORE);
                } else {
                    advance = false;
                }
            } else if !targets.inc(lane) {
                let score = best.extract_channel(lane).int_score();
                if score >= score_cutoff {
                    out.push(Hsp { score, target_index: targets.target_index(lane) });
                }
                if targets.init_target(i, lane) {
                    dp.set_zero(lane);
                    best.set_channel(lane, S::ZERO_SCORE);
                } else {
                    advance = false;
                }
            }
            if advance {
                i += 1;
            }
        }
    }

    (out, overflow)
}

/// Full precision-escalation shell: tries i8 first, rescoring any lane that
/// saturated at i16 then i32, remapping overflow indices back through each
/// layer's index table so every emitted [`Hsp`] refers to the caller's
/// original target positions.
pub fn run_swipe(
    query: &[u8],
    subjects: &[&[u8]],
    score_cutoff: i32,
    matrix: &dyn ScoreMatrix,
    gap_open: i32,
    gap_extend: i32,
) -> Vec<Hsp> {
    let (mut out, overflow8) = run_swipe_layer::<i8>(query, subjects, score_cutoff, matrix, gap_open, gap_extend);
    if overflow8.is_empty() {
        return out;
    }

    tracing::debug!(overflowed = overflow8.len(), "swipe i8 layer saturated, escalating to i16");
    let subjects16: Vec<&[u8]> = overflow8.iter().map(|&i| subjects[i]).collect();
    let (out16, overflow16) = run_swipe_layer::<i16>(query, &subjects16, score_cutoff, matrix, gap_open, gap_extend);
    out.extend(out16.into_iter().map(|h| Hsp { score: h.score, target_index: overflow8[h.target_index] }));
    if overflow16.is_empty() {
        return out;
    }

    tracing::debug!(overflowed = overflow16.len(), "swipe i16 layer saturated, escalating to i32");
    let subjects32: Vec<&[u8]> = overflow16.iter().map(|&i| subjects16[i]).collect();
    let (out32, overflow32) = run_swipe_layer::<i32>(query, &subjects32, score_cutoff, matrix, gap_open, gap_extend);
    debug_assert!(overflow32.is_empty(), "i32 layer overflowed: no realistic alignment score exceeds i32 range");
    out.extend(out32.into_iter().map(|h| Hsp { score: h.score, target_index: overflow8[overflow16[h.target_index]] }));
    out
}

/// Aligns a batch of queries against the same target pool concurrently, one
/// query per rayon task. Queries are independent, so this is embarrassingly
/// parallel with no shared mutable state between tasks.
pub fn run_swipe_batch(
    queries: &[Vec<u8>],
    subjects: &[&[u8]],
    score_cutoff: i32,
    matrix: &(dyn ScoreMatrix + Sync),
    gap_open: i32,
    gap_extend: i32,
) -> Vec<Vec<Hsp>> {
    use rayon::prelude::*;
    queries.par_iter().map(|q| run_swipe(q, subjects, score_cutoff, matrix, gap_open, gap_extend)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile::SimpleMatrix;

    #[test]
    fn identical_sequences_score_full_match_length() {
        let matrix = SimpleMatrix::default();
        let query = b"MKVLAT";
        let subjects: Vec<&[u8]> = vec![b"MKVLAT"];
        let hsps = run_swipe(query, &subjects, 0, &matrix, 10, 1);
        assert_eq!(hsps.len(), 1);
        assert_eq!(hsps[0].score, 5 * 6);
        assert_eq!(hsps[0].target_index, 0);
    }

    #[test]
    fn unrelated_sequences_score_below_cutoff_are_dropped() {
        let matrix = SimpleMatrix::default();
        let query = b"AAAAAA";
        let subjects: Vec<&[u8]> = vec![b"WWWWWW"];
        let hsps = run_swipe(query, &subjects, 1, &matrix, 10, 1);
        assert!(hsps.is_empty());
    }

    #[test]
    fn more_targets_than_lanes_recycles_and_preserves_original_indices() {
        let matrix = SimpleMatrix::default();
        let query = b"MKVLAT";
        let subjects: Vec<&[u8]> = vec![
            b"MKVLAT", b"WWWWWW", b"MKVLAT", b"WWWWWW", b"MKVLAT", b"WWWWWW", b"MKVLAT", b"WWWWWW",
            b"MKVLAT", b"WWWWWW", b"MKVLAT",
        ];
        let hsps = run_swipe(query, &subjects, 1, &matrix, 10, 1);
        let hit_indices: Vec<usize> = hsps.iter().map(|h| h.target_index).collect();
        for expect in [0usize, 2, 4, 6, 8, 10] {
            assert!(hit_indices.contains(&expect), "missing hit for target {expect}");
        }
        for h in &hsps {
            assert_eq!(h.score, 30);
        }
    }

    #[test]
    fn run_swipe_batch_matches_sequential_run_swipe_per_query() {
        let matrix = SimpleMatrix::default();
        let subjects: Vec<&[u8]> = vec![b"MKVLAT", b"WWWWWW"];
        let queries = vec![b"MKVLAT".to_vec(), b"WWWWWA".to_vec()];
        let batch = run_swipe_batch(&queries, &subjects, 0, &matrix, 10, 1);
        for (q, expected) in queries.iter().zip(batch.iter()) {
            let sequential = run_swipe(q, &subjects, 0, &matrix, 10, 1);
            assert_eq!(expected.len(), sequential.len());
        }
    }

    #[test]
    fn gap_penalty_reduces_score_of_an_indel_alignment() {
        let matrix = SimpleMatrix::default();
        let query = b"MKVLATMK";
        let subjects: Vec<&[u8]> = vec![b"MKVLATX", b"MKVLATMK"];
        let hsps = run_swipe(query, &subjects, 0, &matrix, 10, 1);
        let exact = hsps.iter().find(|h| h.target_index == 1).unwrap();
        assert_eq!(exact.score, 5 * 8);
        let gapped = hsps.iter().find(|h| h.target_index == 0);
        assert!(gapped.is_none() || gapped.unwrap().score < exact.score);
    }
}
