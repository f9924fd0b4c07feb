//! Groups near-duplicates into connected components.
//!
//! If A matches B and B matches C, then {A, B, C} forms a single group
//! even if A doesn't directly match C, regardless of the order the
//! records arrive in.

use super::matrix::DistanceMatrix;
use super::traits::MatchPolicy;
use super::Cluster;

/// Union-find over record indices
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    /// Find root with path halving
    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }
        let (big, small) = if self.size[root_a] >= self.size[root_b] {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
    }
}

/// Groups records transitively over every matching pair
pub struct TransitiveGrouper;

impl TransitiveGrouper {
    pub fn new() -> Self {
        Self
    }

    /// Connected components of the match graph, with at least two members
    ///
    /// Components come out ordered by their earliest member, members in
    /// input order.
    pub(crate) fn group(&self, matrix: &DistanceMatrix, policy: &dyn MatchPolicy) -> Vec<Cluster> {
        let n = matrix.len();
        let mut set = DisjointSet::new(n);
        let mut edges = Vec::new();

        for i in 0..n {
            for j in (i + 1)..n {
                let distance = matrix.get(i, j);
                if policy.is_match(distance) {
                    set.union(i, j);
                    edges.push((i, distance.primary));
                }
            }
        }

        let mut slot_of_root: Vec<Option<usize>> = vec![None; n];
        let mut clusters: Vec<Cluster> = Vec::new();

        for index in 0..n {
            let root = set.find(index);
            match slot_of_root[root] {
                Some(slot) => clusters[slot].members.push(index),
                None => {
                    slot_of_root[root] = Some(clusters.len());
                    clusters.push(Cluster {
                        members: vec![index],
                        max_distance: 0,
                    });
                }
            }
        }

        for (index, distance) in edges {
            let root = set.find(index);
            if let Some(slot) = slot_of_root[root] {
                let cluster = &mut clusters[slot];
                cluster.max_distance = cluster.max_distance.max(distance);
            }
        }

        clusters.retain(|c| c.members.len() >= 2);
        clusters
    }
}

impl Default for TransitiveGrouper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::comparator::ThresholdPolicy;
    use crate::core::record::{partition_hashed, HashRequirement, PhotoRecord};

    fn matrix_for(hashes: &[&str]) -> DistanceMatrix {
        let records: Vec<PhotoRecord> = hashes
            .iter()
            .enumerate()
            .map(|(i, h)| PhotoRecord::new(i.to_string(), format!("{i}.jpg")).with_hashes(*h, *h))
            .collect();
        let eligible = partition_hashed(&records, HashRequirement::Both);
        DistanceMatrix::compute(&eligible.records).unwrap()
    }

    #[test]
    fn empty_matrix_returns_empty() {
        let matrix = matrix_for(&[]);
        assert!(TransitiveGrouper::new()
            .group(&matrix, &ThresholdPolicy::new(10, true))
            .is_empty());
    }

    #[test]
    fn transitive_grouping() {
        // a~b and b~c (within 3) should create {a, b, c}; a-c is 6 apart
        let matrix = matrix_for(&["0000000000000000", "0000000000000007", "000000000000003f"]);

        let clusters = TransitiveGrouper::new().group(&matrix, &ThresholdPolicy::new(3, true));

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![0, 1, 2]);
        assert_eq!(clusters[0].max_distance, 3);
    }

    #[test]
    fn result_does_not_depend_on_order() {
        let forward = matrix_for(&["0000000000000000", "0000000000000007", "00000000000000f0"]);
        let reordered = matrix_for(&["0000000000000007", "0000000000000000", "00000000000000f0"]);
        let policy = ThresholdPolicy::new(5, true);

        let a = TransitiveGrouper::new().group(&forward, &policy);
        let b = TransitiveGrouper::new().group(&reordered, &policy);

        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].members.len(), 3);
        assert_eq!(b[0].members.len(), 3);
    }

    #[test]
    fn disjoint_pairs_create_separate_groups() {
        let matrix = matrix_for(&[
            "0000000000000000",
            "ffffffffffffffff",
            "0000000000000001",
            "fffffffffffffffe",
        ]);

        let clusters = TransitiveGrouper::new().group(&matrix, &ThresholdPolicy::new(10, true));

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec![0, 2]);
        assert_eq!(clusters[1].members, vec![1, 3]);
    }
}
