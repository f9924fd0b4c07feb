//! # Comparator Module
//!
//! Finds duplicate groups by comparing fingerprint pairs.
//!
//! ## Strategies
//! - **Exact match** - buckets bit-identical `(primary, secondary)` pairs.
//!   O(n), no false positives. The production default.
//! - **Threshold** - O(n²) comparison under a Hamming threshold on both
//!   (or either) hash families, grouped either around the first-seen anchor
//!   or transitively.
//!
//! ## Comparison Thresholds (64-bit codes)
//! | Distance | Classification |
//! |----------|---------------|
//! | 0        | Exact match   |
//! | 1-4      | Near-exact    |
//! | 5-10     | Similar       |
//! | 11+      | Different     |

mod cluster;
mod exact;
mod grouper;
mod matrix;
mod traits;

pub use grouper::TransitiveGrouper;
pub use matrix::{DistanceMatrix, PairDistance};
pub use traits::{MatchPolicy, ThresholdPolicy};

use crate::core::record::{
    partition_hashed, Eligible, HashRequirement, HashedRecord, PhotoRecord,
};
use crate::core::selector;
use crate::error::CompareError;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Classification of match types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Distance = 0, identical perceptual content
    Exact,
    /// Distance 1-4, virtually identical
    NearExact,
    /// Distance 5-10, likely duplicates
    Similar,
    /// Distance 11+, grouped only under a loose threshold
    MaybeSimilar,
}

impl MatchType {
    /// Classify based on Hamming distance
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => MatchType::Exact,
            1..=4 => MatchType::NearExact,
            5..=10 => MatchType::Similar,
            _ => MatchType::MaybeSimilar,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "Exact Match"),
            MatchType::NearExact => write!(f, "Near-Exact Match"),
            MatchType::Similar => write!(f, "Similar"),
            MatchType::MaybeSimilar => write!(f, "Possibly Similar"),
        }
    }
}

/// How threshold groups are linked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    /// Members must match the group's first-seen record (order-sensitive)
    #[default]
    Anchor,
    /// Members are connected through any chain of matches
    Transitive,
}

/// Which grouping policy a pass uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GroupingStrategy {
    /// Only bit-identical fingerprint pairs
    ExactMatch,
    /// Fingerprints within a Hamming threshold
    Threshold {
        threshold: u32,
        require_both_hashes: bool,
        #[serde(default)]
        linkage: Linkage,
    },
}

impl GroupingStrategy {
    /// Threshold grouping with the default threshold, both hashes, anchor linkage
    pub fn threshold() -> Self {
        GroupingStrategy::Threshold {
            threshold: ThresholdPolicy::DEFAULT_THRESHOLD,
            require_both_hashes: true,
            linkage: Linkage::Anchor,
        }
    }
}

impl Default for GroupingStrategy {
    fn default() -> Self {
        GroupingStrategy::ExactMatch
    }
}

/// A group of duplicate photos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Identifier for this group, stable only within one pass
    pub id: Uuid,
    /// All member ids, in input order
    pub member_ids: Vec<String>,
    /// The member to keep visible
    pub representative_id: String,
    /// The type of match for this group
    pub match_type: MatchType,
    /// Largest primary distance that linked a member into the group
    pub max_distance: u32,
}

impl DuplicateGroup {
    /// Create a new duplicate group
    pub fn new(member_ids: Vec<String>, representative_id: String, max_distance: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_ids,
            representative_id,
            match_type: MatchType::from_distance(max_distance),
            max_distance,
        }
    }

    /// Get the number of duplicates (excluding the representative)
    pub fn duplicate_count(&self) -> usize {
        self.member_ids.len().saturating_sub(1)
    }

    /// Members other than the representative
    pub fn suppressed_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.member_ids
            .iter()
            .map(String::as_str)
            .filter(move |id| *id != self.representative_id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.member_ids.iter().any(|m| m == id)
    }
}

/// Record indices forming one group, before ids and representative are filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cluster {
    pub members: Vec<usize>,
    pub max_distance: u32,
}

/// Group records with bit-identical fingerprint pairs
///
/// Records missing either hash are skipped.
pub fn group_by_exact_hash(records: &[PhotoRecord]) -> Vec<DuplicateGroup> {
    let eligible = partition_hashed(records, HashRequirement::Both);
    let clusters = exact::exact_clusters(&eligible.records);
    into_groups(&eligible, clusters)
}

/// Group near-duplicates around the first-seen record of each group
///
/// `require_both_hashes` selects between both families agreeing (fewer
/// false positives) and either one agreeing.
pub fn cluster_by_similarity(
    records: &[PhotoRecord],
    threshold: u32,
    require_both_hashes: bool,
) -> Result<Vec<DuplicateGroup>, CompareError> {
    group_duplicates(
        records,
        &GroupingStrategy::Threshold {
            threshold,
            require_both_hashes,
            linkage: Linkage::Anchor,
        },
    )
}

/// Group a record set under the given strategy
pub fn group_duplicates(
    records: &[PhotoRecord],
    strategy: &GroupingStrategy,
) -> Result<Vec<DuplicateGroup>, CompareError> {
    let eligible = partition_hashed(records, HashRequirement::Both);
    group_eligible(&eligible, strategy)
}

/// Group records that already passed the eligibility filter
#[instrument(skip(eligible), fields(records = eligible.records.len()))]
pub fn group_eligible(
    eligible: &Eligible<'_>,
    strategy: &GroupingStrategy,
) -> Result<Vec<DuplicateGroup>, CompareError> {
    let clusters = match *strategy {
        GroupingStrategy::ExactMatch => exact::exact_clusters(&eligible.records),
        GroupingStrategy::Threshold {
            threshold,
            require_both_hashes,
            linkage,
        } => {
            let mut clusters = Vec::new();
            for class in eligible.width_classes() {
                clusters.extend(threshold_clusters(
                    eligible,
                    &class,
                    threshold,
                    require_both_hashes,
                    linkage,
                )?);
            }
            clusters.sort_by_key(|c| c.members.first().copied());
            clusters
        }
    };

    let groups = into_groups(eligible, clusters);
    debug!(groups = groups.len(), "grouping finished");
    Ok(groups)
}

/// Cluster one width class, mapping members back to `eligible` indices
fn threshold_clusters(
    eligible: &Eligible<'_>,
    class: &[usize],
    threshold: u32,
    require_both_hashes: bool,
    linkage: Linkage,
) -> Result<Vec<Cluster>, CompareError> {
    let records: Vec<HashedRecord<'_>> =
        class.iter().map(|&i| eligible.records[i].clone()).collect();
    let Some((primary_bits, secondary_bits)) = records.first().map(HashedRecord::widths) else {
        return Ok(Vec::new());
    };

    // Every pair matches past the widest code, so clamp to it
    let max_bits = primary_bits.max(secondary_bits.unwrap_or(0));
    if threshold > max_bits {
        warn!(threshold, max_bits, "threshold exceeds fingerprint width, clamping");
    }
    let policy = ThresholdPolicy::new(threshold.min(max_bits), require_both_hashes);

    let matrix = DistanceMatrix::compute(&records)?;
    debug!(
        bits = primary_bits,
        records = records.len(),
        pairs = matrix.pair_count(),
        threshold = policy.threshold(),
        policy = %policy.description(),
        "computed distance matrix"
    );

    let clusters = match linkage {
        Linkage::Anchor => cluster::anchor_clusters(&matrix, &policy),
        Linkage::Transitive => TransitiveGrouper::new().group(&matrix, &policy),
    };

    Ok(clusters
        .into_iter()
        .map(|cluster| Cluster {
            members: cluster.members.iter().map(|&k| class[k]).collect(),
            max_distance: cluster.max_distance,
        })
        .collect())
}

fn into_groups(eligible: &Eligible<'_>, clusters: Vec<Cluster>) -> Vec<DuplicateGroup> {
    clusters
        .into_iter()
        .filter_map(|cluster| {
            let members: Vec<_> = cluster
                .members
                .iter()
                .map(|&i| eligible.records[i].record)
                .collect();
            let representative = selector::best_of(members.iter().copied())?;
            Some(DuplicateGroup::new(
                members.iter().map(|r| r.id.clone()).collect(),
                representative.id.clone(),
                cluster.max_distance,
            ))
        })
        .collect()
}
