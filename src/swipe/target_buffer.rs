//! Lane-lifetime management: tracks which target occupies each SIMD lane,
//! recycles idle lanes onto the next pending target, and removes a lane
//! from rotation once the target pool is exhausted.

use crate::score_vector::LANES;

pub struct TargetBuffer<'a> {
    subjects: &'a [&'a [u8]],
    next_pending: usize,
    /// Lane ids (`0..LANES`) currently holding a live target, in rotation
    /// order. Shrinks as the pool runs dry.
    pub active: Vec<usize>,
    target: [usize; LANES],
    cursor: [usize; LANES],
}

impl<'a> TargetBuffer<'a> {
    pub fn new(subjects: &'a [&'a [u8]]) -> Self {
        let initial = subjects.len().min(LANES);
        let mut target = [0usize; LANES];
        let mut cursor = [0usize; LANES];
        let mut active = Vec::with_capacity(initial);
        for lane in 0..initial {
            target[lane] = lane;
            cursor[lane] = 0;
            active.push(lane);
        }
        Self { subjects, next_pending: initial, active, target, cursor }
    }

    /// The original-index assignment for `lane`.
    pub fn target_index(&self, lane: usize) -> usize {
        self.target[lane]
    }

    /// One letter per lane at the current column; idle/unassigned lanes
    /// read as `0` and are never consulted by the driver.
    pub fn seq_vector(&self) -> [u8; LANES] {
        let mut out = [0u8; LANES];
        for &lane in &self.active {
            let t = self.target[lane];
            out[lane] = self.subjects[t][self.cursor[lane]];
        }
        out
    }

    /// Advance `lane` by one column. Returns `false` once its target is
    /// exhausted.
    pub fn inc(&mut self, lane: usize) -> bool {
        self.cursor[lane] += 1;
        self.cursor[lane] < self.subjects[self.target[lane]].len()
    }

    /// Assign the next pending target to `lane`, which currently sits at
    /// position `slot` in `active`. Returns `false` (and drops `slot` from
    /// `active`) when the pool is exhausted.
    pub fn init_target(&mut self, slot: usize, lane: usize) -> bool {
        if self.next_pending < self.subjects.len() {
            self.target[lane] = self.next_pending;
            self.cursor[lane] = 0;
            self.next_pending += 1;
            true
        } else {
            self.active.remove(slot);
            false
        }
    }
}
