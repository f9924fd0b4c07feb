//! # Assignment Module
//!
//! Turns duplicate groups into the per-record values the persistence layer
//! writes back: group id, suppression flag and representative id.
//!
//! ## Stores
//! - `AssignmentStore` - the seam a record store implements
//! - `InMemoryAssignmentStore` - for testing and single-process callers
//!
//! Group ids are fresh on every pass, so `apply_pass` carries an existing
//! group id forward when a group's representative is unchanged. Re-running
//! detection over unchanged records and applying the result is a no-op.
//! Records with a stored assignment that the pass no longer groups are
//! released.

mod memory;

pub use memory::InMemoryAssignmentStore;

use crate::core::comparator::DuplicateGroup;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// What the persistence layer records for one photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateAssignment {
    pub record_id: String,
    pub group_id: Uuid,
    pub representative_id: String,
    /// True for every member except the representative
    pub is_duplicate: bool,
}

/// One assignment per member of every group
pub fn assignments_for(groups: &[DuplicateGroup]) -> Vec<DuplicateAssignment> {
    groups
        .iter()
        .flat_map(|group| {
            group.member_ids.iter().map(move |id| DuplicateAssignment {
                record_id: id.clone(),
                group_id: group.id,
                representative_id: group.representative_id.clone(),
                is_duplicate: *id != group.representative_id,
            })
        })
        .collect()
}

/// Trait for stores that persist duplicate assignments
pub trait AssignmentStore: Send + Sync {
    /// Current assignment for a record, if any
    fn get(&self, record_id: &str) -> Result<Option<DuplicateAssignment>, StoreError>;

    /// Store an assignment
    ///
    /// Returns `true` if the stored value changed.
    fn apply(&self, assignment: DuplicateAssignment) -> Result<bool, StoreError>;

    /// Remove a record's assignment (it is no longer in any group)
    ///
    /// Returns `true` if there was one.
    fn release(&self, record_id: &str) -> Result<bool, StoreError>;

    /// Ids of every record with an assignment
    fn record_ids(&self) -> Result<Vec<String>, StoreError>;

    /// Number of records with an assignment
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Apply every assignment from one detection pass
    ///
    /// A group keeps the id already stored for its representative when that
    /// record is still the representative. Returns the number of records
    /// whose stored value changed, counting released records.
    fn apply_pass(&self, assignments: &[DuplicateAssignment]) -> Result<usize, StoreError> {
        let mut carried: HashMap<Uuid, Uuid> = HashMap::new();
        for assignment in assignments.iter().filter(|a| !a.is_duplicate) {
            if let Some(existing) = self.get(&assignment.record_id)? {
                if existing.representative_id == assignment.representative_id {
                    carried.insert(assignment.group_id, existing.group_id);
                }
            }
        }

        let mut changed = 0;
        for assignment in assignments {
            let mut assignment = assignment.clone();
            if let Some(&group_id) = carried.get(&assignment.group_id) {
                assignment.group_id = group_id;
            }
            if self.apply(assignment)? {
                changed += 1;
            }
        }

        let grouped: HashSet<&str> = assignments.iter().map(|a| a.record_id.as_str()).collect();
        for record_id in self.record_ids()? {
            if !grouped.contains(record_id.as_str()) && self.release(&record_id)? {
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(members: &[&str], representative: &str) -> DuplicateGroup {
        DuplicateGroup::new(
            members.iter().map(|s| s.to_string()).collect(),
            representative.to_string(),
            0,
        )
    }

    #[test]
    fn every_member_but_representative_is_suppressed() {
        let groups = vec![group(&["a", "b", "c"], "b")];

        let assignments = assignments_for(&groups);

        assert_eq!(assignments.len(), 3);
        let flags: Vec<_> = assignments
            .iter()
            .map(|a| (a.record_id.as_str(), a.is_duplicate))
            .collect();
        assert_eq!(flags, vec![("a", true), ("b", false), ("c", true)]);
        assert!(assignments.iter().all(|a| a.group_id == groups[0].id));
        assert!(assignments.iter().all(|a| a.representative_id == "b"));
    }

    #[test]
    fn no_groups_means_no_assignments() {
        assert!(assignments_for(&[]).is_empty());
    }
}
