//! Assembles the final per-query ranked target list.

use crate::config::Config;
use crate::ranking::rescue::recompute_overflow_scores;
use crate::swipe::profile::ScoreMatrix;
use crate::types::{Match, SeedHit, TargetScore, OVERFLOW_SCORE};

/// Rescue every overflowed entry in `target_scores` (assumed sorted by
/// score descending on entry) to an exact score, re-sort by score
/// descending / **database block id ascending** if any rescue happened,
/// then truncate to `config.global_ranking_targets`.
///
/// The block-id tiebreak (rather than the local `TargetScore::target`
/// index `TargetScore`'s own `Ord` uses) matters: only a rescore, not every
/// sort, needs this secondary key, so it's applied explicitly here instead
/// of folded into `TargetScore`'s derived ordering (see DESIGN.md).
///
/// `seed_hits_for` / `target_seq_for` resolve a `TargetScore::target` (a
/// local index into this query's candidate list) to the seed hits backing
/// it and the raw target sequence, respectively.
pub fn ranking_list(
    target_scores: &mut Vec<TargetScore>,
    target_block_ids: &[u32],
    seed_hits_for: impl Fn(u32) -> Vec<SeedHit>,
    target_seq_for: impl Fn(u32) -> Vec<u8>,
    query: &[u8],
    matrix: &dyn ScoreMatrix,
    config: &Config,
) -> Vec<Match> {
    let mut overflows = 0usize;
    for ts in target_scores.iter_mut() {
        if ts.score == OVERFLOW_SCORE as u16 {
            let hits = seed_hits_for(ts.target);
            let subject = target_seq_for(ts.target);
            ts.score = recompute_overflow_scores(&hits, query, &subject, matrix, config.ungapped_window);
            overflows += 1;
        }
    }
    if overflows > 0 {
        target_scores.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(target_block_ids[a.target as usize].cmp(&target_block_ids[b.target as usize]))
        });
    }

    target_scores
        .iter()
        .take(config.global_ranking_targets)
        .map(|ts| Match { block_id: target_block_ids[ts.target as usize], score: ts.score })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swipe::profile::SimpleMatrix;

    #[test]
    fn truncates_to_configured_target_count_in_score_order() {
        // already sorted by score desc, as callers are required to provide
        let mut scores = vec![
            TargetScore { target: 1, score: 30 },
            TargetScore { target: 2, score: 20 },
            TargetScore { target: 0, score: 10 },
        ];
        let block_ids = vec![100, 101, 102];
        let matrix = SimpleMatrix::default();
        let mut config = Config::default();
        config.global_ranking_targets = 2;

        let r = ranking_list(&mut scores, &block_ids, |_| Vec::new(), |_| Vec::new(), b"", &matrix, &config);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].block_id, 101);
        assert_eq!(r[1].block_id, 102);
    }

    #[test]
    fn rescues_overflowed_scores_before_truncating() {
        let mut scores = vec![
            TargetScore { target: 0, score: OVERFLOW_SCORE as u16 },
            TargetScore { target: 1, score: 5 },
        ];
        let block_ids = vec![200, 201];
        let matrix = SimpleMatrix::default();
        let config = Config::default();
        let query = b"MKVLATMKVLAT".to_vec();
        let subject = query.clone();
        let hits = vec![SeedHit { i: 4, j: 4, frame: 0, score: OVERFLOW_SCORE }];

        let r = ranking_list(
            &mut scores,
            &block_ids,
            move |_| hits.clone(),
            move |_| subject.clone(),
            &query,
            &matrix,
            &config,
        );
        assert!(r.iter().any(|m| m.block_id == 200 && m.score > 5));
    }

    #[test]
    fn rescore_tiebreak_is_block_id_ascending_not_local_target_index() {
        // target 0 maps to the higher block id (900), target 1 to the lower
        // (100); both rescue to the same exact score, so only a true
        // block-id tiebreak (not TargetScore's own Ord, which ties on
        // `target`) puts block 100 first.
        let mut scores = vec![
            TargetScore { target: 0, score: OVERFLOW_SCORE as u16 },
            TargetScore { target: 1, score: OVERFLOW_SCORE as u16 },
        ];
        let block_ids = vec![900, 100];
        let matrix = SimpleMatrix::default();
        let config = Config::default();
        let query = b"MKVLAT".to_vec();
        let subject = query.clone();
        let hits = vec![SeedHit { i: 3, j: 3, frame: 0, score: OVERFLOW_SCORE }];

        let r = ranking_list(&mut scores, &block_ids, move |_| hits.clone(), move |_| subject.clone(), &query, &matrix, &config);
        assert_eq!(r[0].block_id, 100);
        assert_eq!(r[1].block_id, 900);
    }
}
