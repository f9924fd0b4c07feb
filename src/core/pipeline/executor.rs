//! Pipeline execution implementation.

use super::DetectionConfig;
use crate::core::assignment::{assignments_for, AssignmentStore, DuplicateAssignment};
use crate::core::burst::{BurstConfig, BurstDetector, BurstSequence};
use crate::core::comparator::{group_eligible, DuplicateGroup, GroupingStrategy};
use crate::core::record::{partition_hashed, Exclusion, HashRequirement, PhotoRecord};
use crate::core::selection::{smart_select, SelectionConfig, SelectionOutcome};
use crate::error::DetectorError;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument};

/// Result of one detection pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Duplicate groups, in order of their first member
    pub groups: Vec<DuplicateGroup>,
    /// Burst sequences, earliest first
    pub bursts: Vec<BurstSequence>,
    /// One entry per grouped record, for the persistence layer
    pub assignments: Vec<DuplicateAssignment>,
    /// Automatic selection over the whole record set
    pub selection: SelectionOutcome,
    /// Records left out of duplicate grouping
    pub excluded_from_grouping: Vec<Exclusion>,
    /// Records left out of burst detection
    pub excluded_from_bursts: Vec<Exclusion>,
    /// Records supplied
    pub total_records: usize,
    /// Records that took part in duplicate grouping
    pub eligible_records: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl DetectionReport {
    /// Records hidden behind a representative
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.duplicate_count()).sum()
    }

    /// Write this pass's assignments to a store
    ///
    /// Returns the number of records whose stored assignment changed,
    /// including records released because they left every group.
    pub fn persist(&self, store: &dyn AssignmentStore) -> Result<usize, DetectorError> {
        let changed = store.apply_pass(&self.assignments)?;
        info!(changed, "assignments persisted");
        Ok(changed)
    }
}

/// Builder for pipeline configuration
pub struct DetectionPipelineBuilder {
    config: DetectionConfig,
}

impl DetectionPipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: DetectionConfig::default(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: DetectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the grouping strategy
    pub fn strategy(mut self, strategy: GroupingStrategy) -> Self {
        self.config.grouping = strategy;
        self
    }

    /// Set burst detection parameters
    pub fn burst(mut self, burst: BurstConfig) -> Self {
        self.config.burst = burst;
        self
    }

    /// Turn burst detection on or off
    pub fn detect_bursts(mut self, enabled: bool) -> Self {
        self.config.detect_bursts = enabled;
        self
    }

    /// Set smart selection parameters
    pub fn selection(mut self, selection: SelectionConfig) -> Self {
        self.config.selection = selection;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<DetectionPipeline, DetectorError> {
        self.config.validate()?;
        Ok(DetectionPipeline {
            config: self.config,
        })
    }
}

impl Default for DetectionPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The duplicate and burst detection pipeline
///
/// Holds only configuration, so one pipeline can serve any number of
/// concurrent passes.
#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    config: DetectionConfig,
}

impl DetectionPipeline {
    /// Create a new pipeline builder
    pub fn builder() -> DetectionPipelineBuilder {
        DetectionPipelineBuilder::new()
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run one pass over a record set
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn run(&self, records: &[PhotoRecord]) -> Result<DetectionReport, DetectorError> {
        let start_time = Instant::now();

        // Phase 1: Eligibility
        let eligible = partition_hashed(records, HashRequirement::Both);
        let eligible_records = eligible.records.len();

        // Phase 2: Grouping (representatives chosen here)
        let groups = group_eligible(&eligible, &self.config.grouping)?;
        let assignments = assignments_for(&groups);

        // Phase 3: Selection
        let selection = smart_select(records, &groups, &self.config.selection);

        // Phase 4: Bursts
        let (bursts, excluded_from_bursts) = if self.config.detect_bursts {
            let outcome = BurstDetector::new(self.config.burst).detect(records);
            (outcome.sequences, outcome.excluded)
        } else {
            (Vec::new(), Vec::new())
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            total = records.len(),
            eligible = eligible_records,
            groups = groups.len(),
            bursts = bursts.len(),
            duration_ms,
            "detection pass finished"
        );

        Ok(DetectionReport {
            groups,
            bursts,
            assignments,
            selection,
            excluded_from_grouping: eligible.excluded,
            excluded_from_bursts,
            total_records: records.len(),
            eligible_records,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assignment::InMemoryAssignmentStore;
    use crate::core::comparator::Linkage;
    use crate::error::ConfigError;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;
    use std::thread;

    const H1: &str = "ab12cd34ef56ab12";
    const H2: &str = "0000000000000000";

    fn records() -> Vec<PhotoRecord> {
        let base = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        vec![
            PhotoRecord::new("a", "a.jpg")
                .with_hashes(H1, H1)
                .with_capture_time(base)
                .with_quality_score(70.0),
            PhotoRecord::new("b", "b.jpg")
                .with_hashes(H1, H1)
                .with_capture_time(base + Duration::seconds(2))
                .with_quality_score(90.0),
            PhotoRecord::new("c", "c.jpg")
                .with_hashes(H2, H2)
                .with_quality_score(80.0),
            PhotoRecord::new("d", "d.jpg"),
        ]
    }

    #[test]
    fn pipeline_builder_creates_pipeline() {
        let pipeline = DetectionPipeline::builder()
            .strategy(GroupingStrategy::threshold())
            .detect_bursts(false)
            .build()
            .unwrap();

        assert_eq!(pipeline.config().grouping, GroupingStrategy::threshold());
        assert!(!pipeline.config().detect_bursts);
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = DetectionPipeline::builder()
            .burst(BurstConfig::new(f64::NAN, 30))
            .build();
        assert!(matches!(
            result,
            Err(DetectorError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn pipeline_handles_empty_input() {
        let pipeline = DetectionPipeline::builder().build().unwrap();

        let report = pipeline.run(&[]).unwrap();

        assert_eq!(report.total_records, 0);
        assert!(report.groups.is_empty());
        assert!(report.bursts.is_empty());
        assert!(report.assignments.is_empty());
    }

    #[test]
    fn full_pass_groups_selects_and_finds_bursts() {
        let pipeline = DetectionPipeline::builder().build().unwrap();

        let report = pipeline.run(&records()).unwrap();

        assert_eq!(report.total_records, 4);
        assert_eq!(report.eligible_records, 3);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].representative_id, "b");
        assert_eq!(report.duplicate_count(), 1);
        assert_eq!(report.assignments.len(), 2);

        assert_eq!(report.selection.selected, vec!["b", "c"]);
        assert_eq!(report.selection.suppressed, vec!["a"]);

        assert_eq!(report.bursts.len(), 1);
        assert_eq!(report.bursts[0].member_ids, vec!["a", "b"]);

        assert_eq!(report.excluded_from_grouping.len(), 1);
        assert_eq!(report.excluded_from_grouping[0].record_id, "d");
        assert_eq!(report.excluded_from_bursts.len(), 2);
    }

    #[test]
    fn threshold_above_bit_width_still_completes() {
        let pipeline = DetectionPipeline::builder()
            .strategy(GroupingStrategy::Threshold {
                threshold: 65,
                require_both_hashes: true,
                linkage: Linkage::Transitive,
            })
            .build()
            .unwrap();

        let report = pipeline.run(&records()).unwrap();

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].member_ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn persisting_clears_records_that_left_their_group() {
        let pipeline = DetectionPipeline::builder().build().unwrap();
        let store = InMemoryAssignmentStore::new();

        let mut records = records();
        let first = pipeline.run(&records).unwrap();
        assert_eq!(first.persist(&store).unwrap(), 2);
        assert!(store.get("a").unwrap().unwrap().is_duplicate);

        records[0].primary_hash = Some(H2.to_string());
        let second = pipeline.run(&records).unwrap();

        assert!(second.groups.is_empty());
        assert_eq!(second.persist(&store).unwrap(), 2);
        assert_eq!(store.get("a").unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn concurrent_passes_agree() {
        let pipeline = Arc::new(
            DetectionPipeline::builder()
                .strategy(GroupingStrategy::threshold())
                .build()
                .unwrap(),
        );
        let records = Arc::new(records());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                let records = Arc::clone(&records);
                thread::spawn(move || {
                    let report = pipeline.run(&records).unwrap();
                    report
                        .groups
                        .into_iter()
                        .map(|g| (g.member_ids, g.representative_id))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(
            results[0],
            vec![(vec!["a".to_string(), "b".to_string()], "b".to_string())]
        );
    }
}
