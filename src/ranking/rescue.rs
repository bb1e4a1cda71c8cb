//! Exact rescoring of seed hits whose packed byte score saturated.

use crate::swipe::profile::ScoreMatrix;
use crate::types::{SeedHit, OVERFLOW_SCORE};

/// Running-sum ungapped local alignment: floors at zero like the SWIPE
/// recurrence itself, tracking the best prefix sum seen.
pub fn ungapped_window(query: &[u8], subject: &[u8], matrix: &dyn ScoreMatrix) -> i32 {
    let len = query.len().min(subject.len());
    let mut sum = 0i32;
    let mut best = 0i32;
    for k in 0..len {
        sum += matrix.score(query[k], subject[k]);
        if sum < 0 {
            sum = 0;
        }
        best = best.max(sum);
    }
    best
}

/// For every hit in `seed_hits` whose packed score saturated
/// (`OVERFLOW_SCORE`), re-extend it exactly within a `window`-residue
/// window centered on the hit and keep the best exact score seen.
pub fn recompute_overflow_scores(seed_hits: &[SeedHit], query: &[u8], target: &[u8], matrix: &dyn ScoreMatrix, window: usize) -> u16 {
    let window = window as i32;
    let mut score = 0i32;
    for hit in seed_hits {
        if hit.score != OVERFLOW_SCORE {
            continue;
        }
        let clip_start = (hit.i - window).max(0);
        let window_left = hit.i - clip_start;
        let clip_end = (hit.i + window) as usize;
        let q_start = clip_start as usize;
        let q_end = clip_end.min(query.len());
        if q_start >= q_end {
            continue;
        }
        let t_start_signed = hit.j - window_left;
        if t_start_signed < 0 {
            continue;
        }
        let t_start = t_start_signed as usize;
        let want_len = q_end - q_start;
        let t_end = (t_start + want_len).min(target.len());
        if t_start >= t_end {
            continue;
        }
        let len = (q_end - q_start).min(t_end - t_start);
        let s = ungapped_window(&query[q_start..q_start + len], &target[t_start..t_start + len], matrix);
        score = score.max(s);
    }
    score.min(u16::MAX as i32) as u16
}
