//! SWIPE matrix and column iterator.
//!
//! `hgap`/`score` are the per-worker scratch buffers, passed by reference
//! rather than kept in thread-local statics: the driver allocates one
//! `Matrix` per precision layer and reuses it across every target batch in
//! that layer, the same zero-allocation reuse pattern as an inner search
//! loop that keeps one flat scratch buffer across queries instead of
//! reallocating per call.

use crate::score_vector::{ScoreInt, Vector, LANES};

pub struct Matrix<S: ScoreInt> {
    hgap: Vec<Vector<S, LANES>>,
    score: Vec<Vector<S, LANES>>,
}

impl<S: ScoreInt> Matrix<S> {
    pub fn new(qlen: usize) -> Self {
        Self {
            hgap: vec![Vector::zero(); qlen],
            score: vec![Vector::zero(); qlen + 1],
        }
    }

    /// Reset lane `c` across the entire column buffer — called when a lane
    /// is recycled to a new target.
    pub fn set_zero(&mut self, c: usize) {
        for v in self.hgap.iter_mut() {
            v.set_channel(c, S::ZERO_SCORE);
        }
        for v in self.score.iter_mut() {
            v.set_channel(c, S::ZERO_SCORE);
        }
    }

    pub fn begin(&mut self) -> ColumnIterator<'_, S> {
        ColumnIterator { hgap: &mut self.hgap, score: &mut self.score, pos: 0 }
    }
}

/// Walks the `hgap`/`score` arrays in lockstep, one query row at a time.
pub struct ColumnIterator<'a, S: ScoreInt> {
    hgap: &'a mut [Vector<S, LANES>],
    score: &'a mut [Vector<S, LANES>],
    pos: usize,
}

impl<'a, S: ScoreInt> ColumnIterator<'a, S> {
    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub fn hgap(&self) -> Vector<S, LANES> {
        self.hgap[self.pos]
    }

    #[inline]
    pub fn diag(&self) -> Vector<S, LANES> {
        self.score[self.pos]
    }

    #[inline]
    pub fn set_hgap(&mut self, x: Vector<S, LANES>) {
        self.hgap[self.pos] = x;
    }

    #[inline]
    pub fn set_score(&mut self, x: Vector<S, LANES>) {
        self.score[self.pos] = x;
    }
}
