//! Union-find backing the similarity graph.
//!
//! Two flavors, matching the two constructors [`super::sparse_matrix::SparseMatrixStream`]
//! picks between: a dense array-backed set sized to the whole database
//! (`LazyDisjointIntegralSet`), and a hash-map-backed set restricted to a
//! specific subset of ids (`LazyDisjointTypeSet`), used when rebuilding
//! just the connected components touching a handful of representatives.

use std::collections::{HashMap, HashSet};

/// Common union-find surface both backings expose to `SparseMatrixStream`.
pub trait DisjointSet {
    fn merge(&mut self, a: u32, b: u32);
    fn list_of_sets(&self) -> Vec<HashSet<u32>>;
}

/// Dense, array-backed union-find over `0..n`. Union by rank with path
/// compression.
pub struct LazyDisjointIntegralSet {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl LazyDisjointIntegralSet {
    pub fn new(n: usize) -> Self {
        Self { parent: (0..n as u32).collect(), rank: vec![0; n] }
    }

    fn find(&mut self, x: u32) -> u32 {
        if self.parent[x as usize] != x {
            let root = self.find(self.parent[x as usize]);
            self.parent[x as usize] = root;
        }
        self.parent[x as usize]
    }
}

impl DisjointSet for LazyDisjointIntegralSet {
    fn merge(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra as usize].cmp(&self.rank[rb as usize]) {
            std::cmp::Ordering::Less => self.parent[ra as usize] = rb,
            std::cmp::Ordering::Greater => self.parent[rb as usize] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb as usize] = ra;
                self.rank[ra as usize] += 1;
            }
        }
    }

    fn list_of_sets(&self) -> Vec<HashSet<u32>> {
        let mut clone = LazyDisjointIntegralSet { parent: self.parent.clone(), rank: self.rank.clone() };
        let mut by_root: HashMap<u32, HashSet<u32>> = HashMap::new();
        for i in 0..clone.parent.len() as u32 {
            let root = clone.find(i);
            by_root.entry(root).or_default().insert(i);
        }
        by_root.into_values().collect()
    }
}

/// Hash-map-backed union-find restricted to an explicit id subset — used
/// when the universe is a sparse handful of database ids rather than a
/// dense `0..n` range.
pub struct LazyDisjointTypeSet {
    parent: HashMap<u32, u32>,
    rank: HashMap<u32, u8>,
}

impl LazyDisjointTypeSet {
    pub fn new(ids: &HashSet<u32>) -> Self {
        let parent = ids.iter().map(|&id| (id, id)).collect();
        let rank = ids.iter().map(|&id| (id, 0u8)).collect();
        Self { parent, rank }
    }

    fn find(&mut self, x: u32) -> u32 {
        let p = self.parent[&x];
        if p != x {
            let root = self.find(p);
            self.parent.insert(x, root);
        }
        self.parent[&x]
    }
}

impl DisjointSet for LazyDisjointTypeSet {
    fn merge(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let rank_a = self.rank[&ra];
        let rank_b = self.rank[&rb];
        if rank_a < rank_b {
            self.parent.insert(ra, rb);
        } else if rank_a > rank_b {
            self.parent.insert(rb, ra);
        } else {
            self.parent.insert(rb, ra);
            self.rank.insert(ra, rank_a + 1);
        }
    }

    fn list_of_sets(&self) -> Vec<HashSet<u32>> {
        let mut clone = LazyDisjointTypeSet { parent: self.parent.clone(), rank: self.rank.clone() };
        let mut by_root: HashMap<u32, HashSet<u32>> = HashMap::new();
        let ids: Vec<u32> = clone.parent.keys().copied().collect();
        for id in ids {
            let root = clone.find(id);
            by_root.entry(root).or_default().insert(id);
        }
        by_root.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_set_merges_transitively() {
        let mut ds = LazyDisjointIntegralSet::new(6);
        ds.merge(0, 1);
        ds.merge(1, 2);
        ds.merge(4, 5);
        let sets = ds.list_of_sets();
        assert_eq!(sets.len(), 3); // {0,1,2}, {3}, {4,5}
        let sizes: std::collections::BTreeSet<usize> = sets.iter().map(|s| s.len()).collect();
        assert_eq!(sizes, [1, 2, 3].into_iter().collect());
    }

    #[test]
    fn sparse_set_restricted_to_id_subset() {
        let ids: HashSet<u32> = [10, 20, 30].into_iter().collect();
        let mut ds = LazyDisjointTypeSet::new(&ids);
        ds.merge(10, 20);
        let sets = ds.list_of_sets();
        assert_eq!(sets.len(), 2);
        assert!(sets.iter().any(|s| s.contains(&10) && s.contains(&20)));
        assert!(sets.iter().any(|s| s.contains(&30) && s.len() == 1));
    }
}
