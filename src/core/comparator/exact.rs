//! Groups records whose fingerprint pairs are bit-identical.
//!
//! This is the production default: a single hash-map bucketing pass that
//! can never produce a false positive, at the cost of missing re-encodes
//! and slightly different crops.

use super::Cluster;
use crate::core::fingerprint::Fingerprint;
use crate::core::record::HashedRecord;
use std::collections::HashMap;

/// Bucket records by their `(primary, secondary)` pair
///
/// Buckets are returned in order of their first member, members in input
/// order. Records without a secondary hash never match.
pub(crate) fn exact_clusters(records: &[HashedRecord<'_>]) -> Vec<Cluster> {
    let mut buckets: HashMap<(&Fingerprint, &Fingerprint), usize> = HashMap::new();
    let mut clusters: Vec<Cluster> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let Some(secondary) = record.secondary.as_ref() else {
            continue;
        };

        match buckets.get(&(&record.primary, secondary)) {
            Some(&slot) => clusters[slot].members.push(index),
            None => {
                buckets.insert((&record.primary, secondary), clusters.len());
                clusters.push(Cluster {
                    members: vec![index],
                    max_distance: 0,
                });
            }
        }
    }

    clusters.retain(|c| c.members.len() >= 2);
    clusters
}
