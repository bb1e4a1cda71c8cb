//! Run with:
//! ```bash
//! cargo run --example pipeline_demo --release
//! ```

use clap::Parser;
use seq_align_core::cluster::driver::{cluster_assignments, cluster_count, run_two_pass};
use seq_align_core::config::{CliArgs, Config};
use seq_align_core::swipe::profile::SimpleMatrix;
use seq_align_core::swipe::run_swipe;
use seq_align_core::types::{Match, TargetScore};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Instant;

const ALPHABET: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";
const SEED: u64 = 0xDEAD_BEEF_CAFE_BABE;
const N_TARGETS: usize = 64;
const SEQ_LEN: usize = 200;

fn random_sequence(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())]).collect()
}

fn divider() {
    println!("{}", "─".repeat(60));
}

fn main() -> anyhow::Result<()> {
    seq_align_core::logging::init();
    let config: Config = CliArgs::parse().into();

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║       seq-align-core pipeline demo (synthetic data)        ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    divider();
    println!("Phase 1 — Generating a synthetic query and target database");
    let mut rng = StdRng::seed_from_u64(SEED);
    let query = random_sequence(&mut rng, SEQ_LEN);
    let subjects: Vec<Vec<u8>> = (0..N_TARGETS).map(|_| random_sequence(&mut rng, SEQ_LEN)).collect();
    // plant a few near-duplicates of the query so SWIPE has something to find
    let mut subjects = subjects;
    subjects[3] = query.clone();
    subjects[10] = query.clone();
    let refs: Vec<&[u8]> = subjects.iter().map(|s| s.as_slice()).collect();
    println!("  {} targets, {} residues each", N_TARGETS, SEQ_LEN);

    divider();
    println!("Phase 2 — SWIPE local alignment");
    let matrix = SimpleMatrix::default();
    let t0 = Instant::now();
    let hsps = run_swipe(&query, &refs, 20, &matrix, 11, 1);
    tracing::info!(hits = hsps.len(), elapsed = ?t0.elapsed(), "swipe complete");
    println!("  {} HSPs above cutoff in {:?}", hsps.len(), t0.elapsed());
    for h in hsps.iter().take(5) {
        println!("    target {:>3}  score {:>4}", h.target_index, h.score);
    }

    divider();
    println!("Phase 3 — Global ranking list");
    let mut target_scores: Vec<TargetScore> =
        hsps.iter().map(|h| TargetScore { target: h.target_index as u32, score: h.score.clamp(0, u16::MAX as i32) as u16 }).collect();
    target_scores.sort();
    let block_ids: Vec<u32> = (0..N_TARGETS as u32).collect();
    let matches: Vec<Match> = target_scores.iter().take(config.global_ranking_targets).map(|t| Match { block_id: block_ids[t.target as usize], score: t.score }).collect();
    println!("  top {} of {} candidate targets kept:", matches.len(), target_scores.len());
    for m in &matches {
        println!("    block {:>3}  score {:>4}", m.block_id, m.score);
    }

    divider();
    println!("Phase 4 — Vertex-cover clustering over the ranked hits");
    let pass1_edges: Vec<(u32, u32)> = matches.iter().map(|m| (0u32, m.block_id)).collect();
    let n = N_TARGETS + 1; // +1 for the query itself as node 0
    let centroid = run_two_pass(n, &pass1_edges, |rep1| {
        pass1_edges.iter().copied().filter(|&(a, b)| rep1[a as usize] && rep1[b as usize]).collect()
    });
    let assignments = cluster_assignments(&centroid, |i| i as u64);
    println!("  {} sequences collapsed into {} clusters", n, cluster_count(&centroid));
    for (id, rep) in assignments.iter().take(5) {
        println!("    seq {id:>3} -> representative {rep:>3}");
    }

    Ok(())
}
