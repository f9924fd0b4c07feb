//! # Selection Module
//!
//! Picks the keepers of a shoot automatically.
//!
//! ## Steps
//! 1. Drop photos the scoring pipeline flagged as rejects
//! 2. Drop suppressed duplicates, keeping one representative per group
//! 3. Rank the rest best-first
//! 4. Select everything scoring at or above the threshold

use crate::core::comparator::DuplicateGroup;
use crate::core::record::PhotoRecord;
use crate::core::selector::compare_quality;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Parameters for automatic selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Minimum quality score (0-100) for a photo to be selected
    pub min_score: f64,
    /// Leave out photos flagged as rejects
    pub skip_rejects: bool,
}

impl SelectionConfig {
    pub const DEFAULT_MIN_SCORE: f64 = 75.0;
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_score: Self::DEFAULT_MIN_SCORE,
            skip_rejects: true,
        }
    }
}

/// Where every record ended up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    /// Selected ids, best first
    pub selected: Vec<String>,
    /// Kept candidates scoring below the threshold (or unscored), best first
    pub below_threshold: Vec<String>,
    /// Flagged rejects, in input order
    pub rejected: Vec<String>,
    /// Non-representative group members, in input order
    pub suppressed: Vec<String>,
    /// Number of duplicate groups considered
    pub duplicate_groups_processed: usize,
}

impl SelectionOutcome {
    pub fn total(&self) -> usize {
        self.selected.len()
            + self.below_threshold.len()
            + self.rejected.len()
            + self.suppressed.len()
    }
}

/// Select the best photos of a record set
pub fn smart_select(
    records: &[PhotoRecord],
    groups: &[DuplicateGroup],
    config: &SelectionConfig,
) -> SelectionOutcome {
    let suppressed_ids: HashSet<&str> = groups.iter().flat_map(|g| g.suppressed_ids()).collect();

    let mut outcome = SelectionOutcome {
        duplicate_groups_processed: groups.len(),
        ..Default::default()
    };
    let mut candidates = Vec::new();

    for record in records {
        if config.skip_rejects && record.is_reject {
            outcome.rejected.push(record.id.clone());
        } else if suppressed_ids.contains(record.id.as_str()) {
            outcome.suppressed.push(record.id.clone());
        } else {
            candidates.push(record);
        }
    }

    candidates.sort_by(|a, b| compare_quality(a, b));

    for record in candidates {
        if record.score().is_some_and(|s| s >= config.min_score) {
            outcome.selected.push(record.id.clone());
        } else {
            outcome.below_threshold.push(record.id.clone());
        }
    }

    debug!(
        selected = outcome.selected.len(),
        rejected = outcome.rejected.len(),
        suppressed = outcome.suppressed.len(),
        "smart selection finished"
    );
    outcome
}
