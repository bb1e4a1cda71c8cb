//! # seq-align-core — protein aligner ranking, alignment, and clustering core
//!
//! ## Architecture Overview
//!
//! This crate is the numeric core of a protein sequence aligner: it takes
//! ungapped seed hits that have already survived a coarse search stage and
//! runs them through three largely independent subsystems.
//!
//! ### SIMD-style local alignment (`swipe`)
//!
//! [`swipe::run_swipe`] aligns one query against many subject sequences at
//! once by packing [`score_vector::LANES`] targets into lanes of a fixed-
//! width array and stepping every lane through the same Smith-Waterman
//! column together. There is no portable,
//! stable-Rust SIMD type that maps cleanly onto 8/16/32-bit saturating
//! lanes without nightly intrinsics, so lanes are plain arrays processed
//! with explicit per-lane loops, the same manual-unroll idiom this crate's
//! ancestor used for its dot-product hot path. Three precision layers
//! (`i8`, `i16`, `i32`) run in succession: whichever lanes saturate at one
//! precision are rescored at the next, so the common case (scores that fit
//! in a byte) never pays for wider arithmetic.
//!
//! ### Global ranking (`ranking`)
//!
//! Multiple search workers independently discover candidate targets for
//! the same query across different database blocks. [`ranking::codec`]
//! defines the on-disk format those workers merge through; [`ranking::rescue`]
//! exactly rescoring any entry whose packed byte score saturated, and
//! [`ranking::list_builder`] assembles the final, truncated, rank-ordered
//! target list per query.
//!
//! ### Clustering (`cluster`)
//!
//! [`cluster::sparse_matrix`] streams a similarity graph too large to hold
//! in memory to disk in connected-component-sized chunks; [`cluster::driver`]
//! runs the greedy two-pass vertex-cover algorithm over it to collapse
//! near-duplicate sequences down to cluster representatives.
//!
//! ### Ambient stack
//!
//! Errors are a closed `thiserror` enum ([`error::AlignError`]); logging
//! goes through `tracing` ([`logging::init`]); configuration layers
//! defaults, a config file, environment variables and CLI flags
//! ([`config::Config`]).

// Global Allocator: mimalloc
//
// The hot paths here are dominated by many small, short-lived allocations
// (per-target scratch buffers, per-query match lists) rather than a few
// huge ones. mimalloc's per-thread size-segregated free lists keep that
// pattern close to O(1) without the contention of the system allocator.
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod cluster;
pub mod config;
pub mod error;
pub mod logging;
pub mod ranking;
pub mod score_vector;
pub mod swipe;
pub mod tools;
pub mod types;

pub use config::Config;
pub use error::{AlignError, Result};
