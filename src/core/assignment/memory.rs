//! In-memory assignment store.

use super::{AssignmentStore, DuplicateAssignment};
use crate::error::StoreError;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory assignment store
///
/// Useful for testing and callers that keep state in process.
pub struct InMemoryAssignmentStore {
    entries: RwLock<HashMap<String, DuplicateAssignment>>,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryAssignmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentStore for InMemoryAssignmentStore {
    fn get(&self, record_id: &str) -> Result<Option<DuplicateAssignment>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(record_id).cloned())
    }

    fn apply(&self, assignment: DuplicateAssignment) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;

        if entries.get(&assignment.record_id) == Some(&assignment) {
            return Ok(false);
        }
        entries.insert(assignment.record_id.clone(), assignment);
        Ok(true)
    }

    fn release(&self, record_id: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.remove(record_id).is_some())
    }

    fn record_ids(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.keys().cloned().collect())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.len())
    }
}
