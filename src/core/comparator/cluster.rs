//! Greedy anchor-based clustering of near-duplicates.
//!
//! Records are visited in input order. Each record not yet claimed becomes
//! the anchor of a new group, and every later unclaimed record within the
//! policy's threshold *of the anchor* joins it.
//!
//! Membership is judged against the anchor only, so the result depends on
//! input order: a record equidistant from two unrelated clusters ends up
//! with whichever anchor reaches it first. Use
//! [`Linkage::Transitive`](super::Linkage::Transitive) when that matters.

use super::matrix::DistanceMatrix;
use super::traits::MatchPolicy;
use super::Cluster;

/// Walk the matrix in input order, anchoring a group at each unclaimed record
pub(crate) fn anchor_clusters(matrix: &DistanceMatrix, policy: &dyn MatchPolicy) -> Vec<Cluster> {
    let n = matrix.len();
    let mut processed = vec![false; n];
    let mut clusters = Vec::new();

    for anchor in 0..n {
        if processed[anchor] {
            continue;
        }
        processed[anchor] = true;

        let mut cluster = Cluster {
            members: vec![anchor],
            max_distance: 0,
        };

        for candidate in (anchor + 1)..n {
            if processed[candidate] {
                continue;
            }

            let distance = matrix.get(anchor, candidate);
            if policy.is_match(distance) {
                processed[candidate] = true;
                cluster.members.push(candidate);
                cluster.max_distance = cluster.max_distance.max(distance.primary);
            }
        }

        if cluster.members.len() >= 2 {
            clusters.push(cluster);
        }
    }

    clusters
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
    fn anchor_pulls_in_records_that_are_far_from_each_other() {
        // a-b = 3, a-c = 4, b-c = 7
        let matrix = matrix_for(&["0000000000000000", "0000000000000007", "00000000000000f0"]);

        let clusters = anchor_clusters(&matrix, &ThresholdPolicy::new(5, true));

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![0, 1, 2]);
        assert_eq!(clusters[0].max_distance, 4);
    }

    #[test]
    fn order_decides_membership() {
        // b first: b-a = 3 joins, b-c = 7 does not, c is left alone
        let matrix = matrix_for(&["0000000000000007", "0000000000000000", "00000000000000f0"]);

        let clusters = anchor_clusters(&matrix, &ThresholdPolicy::new(5, true));

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![0, 1]);
    }

    #[test]
    fn no_singletons() {
        let matrix = matrix_for(&["0000000000000000", "ffffffffffffffff", "00000000ffffffff"]);
        let policy = ThresholdPolicy::new(ThresholdPolicy::DEFAULT_THRESHOLD, true);
        assert!(anchor_clusters(&matrix, &policy).is_empty());
    }

    #[test]
    fn claimed_records_are_not_re_anchored() {
        let matrix = matrix_for(&["0000000000000000", "0000000000000001", "0000000000000003"]);
        let clusters = anchor_clusters(&matrix, &ThresholdPolicy::new(2, true));
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![0, 1, 2]);
    }

    #[test]
    fn raising_the_threshold_can_move_a_record_between_groups() {
        // a-b = 12, b-c = 5, a-c = 15
        let matrix = matrix_for(&["0000000000000000", "0000000000000fff", "000000000000fffe"]);

        let tight = anchor_clusters(&matrix, &ThresholdPolicy::new(10, true));
        assert_eq!(tight.len(), 1);
        assert_eq!(tight[0].members, vec![1, 2]);

        let loose = anchor_clusters(&matrix, &ThresholdPolicy::new(12, true));
        assert_eq!(loose.len(), 1);
        assert_eq!(loose[0].members, vec![0, 1]);
    }
}
